use diagnostics::FileId;
use diagnostics::Span;
use diagnostics::TextRange;
use serde_json::Value;

/// A half-open range of UTF-8 byte offsets into the source the tree was
/// parsed from.
///
/// Producers that did not record offsets yield `Loc(0, 0)`; a location is
/// best effort and never used for semantics.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  /// Reads offsets from an ESTree node, accepting esprima's `range: [s, e]`
  /// as well as acorn's top-level `start`/`end`.
  pub fn from_estree(node: &Value) -> Loc {
    let offset = |v: Option<&Value>| v.and_then(Value::as_u64).map(|v| v as usize);
    if let Some(Value::Array(range)) = node.get("range") {
      if let (Some(start), Some(end)) = (offset(range.first()), offset(range.get(1))) {
        return Loc(start, end);
      }
    }
    match (offset(node.get("start")), offset(node.get("end"))) {
      (Some(start), Some(end)) => Loc(start, end),
      _ => Loc::default(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn to_diagnostics_range_with_note(self) -> (TextRange, Option<String>) {
    TextRange::from_offsets_with_overflow_note(self.0, self.1)
  }

  pub fn to_span(self, file: FileId) -> Span {
    Span::new(file, self.to_diagnostics_range_with_note().0)
  }
}
