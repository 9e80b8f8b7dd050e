use ahash::HashMap;
use llir::FnType;
use llir::Type;
use serde::Deserialize;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SigType {
  Void,
  Ptr,
  I32,
  I64,
}

impl SigType {
  pub fn to_ir(self) -> Type {
    match self {
      SigType::Void => Type::Void,
      SigType::Ptr => Type::Ptr,
      SigType::I32 => Type::I32,
      SigType::I64 => Type::I64,
    }
  }
}

/// Declared shape of an external function.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FnSig {
  pub ret: SigType,
  #[serde(default)]
  pub params: Vec<SigType>,
  #[serde(default)]
  pub variadic: bool,
}

impl FnSig {
  pub fn new(ret: SigType, params: impl IntoIterator<Item = SigType>, variadic: bool) -> FnSig {
    FnSig {
      ret,
      params: params.into_iter().collect(),
      variadic,
    }
  }

  pub fn to_fn_type(&self) -> FnType {
    FnType::new(
      self.ret.to_ir(),
      self.params.iter().map(|p| p.to_ir()),
      self.variadic,
    )
  }
}

/// `void (ptr, ...)`: what a call to an unknown external function is lowered
/// against.
pub fn default_sig() -> FnSig {
  FnSig::new(SigType::Void, [SigType::Ptr], true)
}

#[derive(Debug)]
pub enum SignatureError {
  Json(serde_json::Error),
  VoidParameter { function: String, index: usize },
}

impl Display for SignatureError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      SignatureError::Json(err) => write!(f, "invalid signature file: {err}"),
      SignatureError::VoidParameter { function, index } => {
        write!(f, "parameter {index} of `{function}` cannot be void")
      }
    }
  }
}

impl Error for SignatureError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      SignatureError::Json(err) => Some(err),
      _ => None,
    }
  }
}

/// Signatures of external functions, by name. Calls to names not present
/// here, and not defined in the program, use [`default_sig`].
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SignatureRegistry {
  sigs: HashMap<String, FnSig>,
}

impl SignatureRegistry {
  pub fn new() -> SignatureRegistry {
    SignatureRegistry::default()
  }

  /// Parses `{"name": {"ret": "i32", "params": ["ptr"], "variadic": false}}`.
  pub fn from_json(json: &str) -> Result<SignatureRegistry, SignatureError> {
    let registry: SignatureRegistry = serde_json::from_str(json).map_err(SignatureError::Json)?;
    let mut names = registry.sigs.keys().collect::<Vec<_>>();
    names.sort();
    for name in names {
      if let Some(index) = registry.sigs[name]
        .params
        .iter()
        .position(|p| *p == SigType::Void)
      {
        return Err(SignatureError::VoidParameter {
          function: name.clone(),
          index,
        });
      }
    }
    Ok(registry)
  }

  pub fn insert(&mut self, name: impl Into<String>, sig: FnSig) -> Option<FnSig> {
    self.sigs.insert(name.into(), sig)
  }

  pub fn with(mut self, name: impl Into<String>, sig: FnSig) -> SignatureRegistry {
    self.insert(name, sig);
    self
  }

  pub fn get(&self, name: &str) -> Option<&FnSig> {
    self.sigs.get(name)
  }

  pub fn len(&self) -> usize {
    self.sigs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sigs.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn loads_from_json() {
    let registry = SignatureRegistry::from_json(
      r#"{
        "puts": { "ret": "i32", "params": ["ptr"] },
        "printf": { "ret": "i32", "params": ["ptr"], "variadic": true },
        "now": { "ret": "i64" }
      }"#,
    )
    .unwrap();
    assert_eq!(registry.len(), 3);
    assert_eq!(
      registry.get("puts").unwrap().to_fn_type(),
      FnType::new(Type::I32, [Type::Ptr], false)
    );
    assert!(registry.get("printf").unwrap().variadic);
    assert!(registry.get("now").unwrap().params.is_empty());
    assert!(registry.get("print").is_none());
  }

  #[test]
  fn rejects_void_parameters() {
    let err =
      SignatureRegistry::from_json(r#"{ "f": { "ret": "void", "params": ["ptr", "void"] } }"#)
        .unwrap_err();
    assert_eq!(err.to_string(), "parameter 1 of `f` cannot be void");
    assert!(matches!(
      SignatureRegistry::from_json("[]"),
      Err(SignatureError::Json(_))
    ));
  }

  #[test]
  fn default_is_variadic_void() {
    assert_eq!(default_sig().to_fn_type().to_string(), "void (ptr, ...)");
  }
}
