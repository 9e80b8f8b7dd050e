use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use diagnostics::Diagnostic;
use diagnostics::FileId;
use diagnostics::Span;
use estree_js::loc::Loc;
use llir::VerifyError;
use std::error::Error;
use std::fmt::Display;

/// Why lowering stopped. Every variant is fatal.
///
/// Diagnostic codes (prefix `LOWER`) are stable:
/// - `LOWER0001`: [`LowerErrorType::UnsupportedStatementType`]
/// - `LOWER0002`: [`LowerErrorType::UnsupportedExpressionType`]
/// - `LOWER0003`: [`LowerErrorType::UnsupportedPatternType`]
/// - `LOWER0004`: [`LowerErrorType::UnsupportedFeature`]
/// - `LOWER0005`: [`LowerErrorType::UndeclaredVariable`]
/// - `LOWER0006`: [`LowerErrorType::VerificationFailure`]
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum LowerErrorType {
  /// Statement kind outside the supported subset, by ESTree `type`.
  UnsupportedStatementType(String),
  UnsupportedExpressionType(String),
  UnsupportedPatternType(String),
  /// A supported node kind used in a way that is deliberately not handled.
  UnsupportedFeature(String),
  UndeclaredVariable(String),
  VerificationFailure(VerifyError),
}

#[derive(Clone, PartialEq, Eq)]
pub struct LowerError {
  pub typ: LowerErrorType,
  pub loc: Loc,
}

impl LowerError {
  pub fn new(typ: LowerErrorType, loc: Loc) -> LowerError {
    LowerError { typ, loc }
  }

  pub fn to_diagnostic(&self, file: FileId) -> Diagnostic {
    let (range, overflow_note) = self.loc.to_diagnostics_range_with_note();
    let mut diagnostic =
      Diagnostic::error(self.typ.code(), self.typ.message(), Span::new(file, range));
    if let LowerErrorType::VerificationFailure(err) = &self.typ {
      if let Some(func) = &err.function {
        diagnostic = diagnostic.with_note(format!("in IR function @{func}"));
      }
    }
    if let Some(note) = overflow_note {
      diagnostic = diagnostic.with_note(note);
    }
    diagnostic
  }
}

impl Debug for LowerError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self, self.loc.0, self.loc.1)
  }
}

impl Display for LowerError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] {}", self.typ.code(), self.typ.message())
  }
}

impl Error for LowerError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match &self.typ {
      LowerErrorType::VerificationFailure(err) => Some(err),
      _ => None,
    }
  }
}

pub type LowerResult<T> = Result<T, LowerError>;

impl LowerErrorType {
  pub fn code(&self) -> &'static str {
    match self {
      LowerErrorType::UnsupportedStatementType(_) => "LOWER0001",
      LowerErrorType::UnsupportedExpressionType(_) => "LOWER0002",
      LowerErrorType::UnsupportedPatternType(_) => "LOWER0003",
      LowerErrorType::UnsupportedFeature(_) => "LOWER0004",
      LowerErrorType::UndeclaredVariable(_) => "LOWER0005",
      LowerErrorType::VerificationFailure(_) => "LOWER0006",
    }
  }

  pub fn message(&self) -> String {
    match self {
      LowerErrorType::UnsupportedStatementType(kind) => {
        format!("unsupported statement type {kind}")
      }
      LowerErrorType::UnsupportedExpressionType(kind) => {
        format!("unsupported expression type {kind}")
      }
      LowerErrorType::UnsupportedPatternType(kind) => format!("unsupported pattern type {kind}"),
      LowerErrorType::UnsupportedFeature(what) => format!("unsupported: {what}"),
      LowerErrorType::UndeclaredVariable(name) => format!("use of undeclared variable `{name}`"),
      LowerErrorType::VerificationFailure(err) => {
        format!("generated IR failed verification: {err}")
      }
    }
  }

  pub fn at(self, loc: Loc) -> LowerError {
    LowerError::new(self, loc)
  }
}

pub(crate) fn unsupported_feature(loc: Loc, what: impl Into<String>) -> LowerError {
  LowerErrorType::UnsupportedFeature(what.into()).at(loc)
}

/// Non-fatal findings. Lowering continues and the module is still produced.
///
/// - `LOWER1001`: [`LowerWarningType::IgnoredDefaultParameter`]
/// - `LOWER1002`: [`LowerWarningType::UninitializedDeclaration`]
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum LowerWarningType {
  /// Parameter default values are not applied; carries the parameter's name.
  IgnoredDefaultParameter(String),
  /// `var x;` creates no storage; carries the declared name.
  UninitializedDeclaration(String),
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LowerWarning {
  pub typ: LowerWarningType,
  pub loc: Loc,
}

impl LowerWarningType {
  pub fn code(&self) -> &'static str {
    match self {
      LowerWarningType::IgnoredDefaultParameter(_) => "LOWER1001",
      LowerWarningType::UninitializedDeclaration(_) => "LOWER1002",
    }
  }

  pub fn message(&self) -> String {
    match self {
      LowerWarningType::IgnoredDefaultParameter(name) => {
        format!("default value of parameter `{name}` is ignored")
      }
      LowerWarningType::UninitializedDeclaration(name) => {
        format!("`{name}` is declared without an initializer and gets no storage")
      }
    }
  }
}

impl LowerWarning {
  pub fn to_diagnostic(&self, file: FileId) -> Diagnostic {
    Diagnostic::warning(self.typ.code(), self.typ.message(), self.loc.to_span(file))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use diagnostics::Severity;

  #[test]
  fn diagnostics_carry_codes_and_spans() {
    let err = LowerErrorType::UndeclaredVariable("y".into()).at(Loc(6, 7));
    let diag = err.to_diagnostic(FileId(0));
    assert_eq!(diag.code, "LOWER0005");
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.primary.range.start, 6);
    assert_eq!(diag.primary.range.end, 7);
    assert_eq!(err.to_string(), "[LOWER0005] use of undeclared variable `y`");

    let warning = LowerWarning {
      typ: LowerWarningType::UninitializedDeclaration("x".into()),
      loc: Loc(0, 6),
    };
    let diag = warning.to_diagnostic(FileId(0));
    assert_eq!(diag.code, "LOWER1002");
    assert_eq!(diag.severity, Severity::Warning);
  }
}
