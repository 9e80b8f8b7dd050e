use crate::signature::SignatureRegistry;

#[derive(Debug, Clone)]
pub struct LowerOptions {
  /// Name of the produced module; also its `source_filename`.
  pub module_name: String,
  /// Name of the function top-level statements are lowered into. It has
  /// type `i32 (ptr)` and returns 0.
  pub entry_name: String,
  pub signatures: SignatureRegistry,
}

impl Default for LowerOptions {
  fn default() -> Self {
    LowerOptions {
      module_name: "app".to_string(),
      entry_name: "main".to_string(),
      signatures: SignatureRegistry::new(),
    }
  }
}

impl LowerOptions {
  pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
    self.module_name = name.into();
    self
  }

  pub fn with_entry_name(mut self, name: impl Into<String>) -> Self {
    self.entry_name = name.into();
    self
  }

  pub fn with_signatures(mut self, signatures: SignatureRegistry) -> Self {
    self.signatures = signatures;
    self
  }
}
