use crate::loc::Loc;
use diagnostics::Diagnostic;
use diagnostics::FileId;
use diagnostics::Span;
use diagnostics::TextRange;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

/// Failure to turn producer output into a syntax tree.
///
/// Diagnostic codes:
/// - `INPUT0001`: [`LoadError::Json`]
/// - `INPUT0002`: [`LoadError::NotAProgram`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
  /// The input is not JSON, or a modelled node is missing required fields.
  /// `line`/`column` point into the JSON text and are zero when the error
  /// came from an already-parsed value.
  Json {
    message: String,
    line: usize,
    column: usize,
  },
  /// The root node is not an ESTree `Program`.
  NotAProgram { found: Option<String>, loc: Loc },
}

pub type LoadResult<T> = Result<T, LoadError>;

impl LoadError {
  pub(crate) fn from_json(err: serde_json::Error) -> LoadError {
    LoadError::Json {
      message: err.to_string(),
      line: err.line(),
      column: err.column(),
    }
  }

  pub fn code(&self) -> &'static str {
    match self {
      LoadError::Json { .. } => "INPUT0001",
      LoadError::NotAProgram { .. } => "INPUT0002",
    }
  }

  pub fn to_diagnostic(&self, file: FileId) -> Diagnostic {
    match self {
      LoadError::Json { line, column, .. } => {
        let mut diagnostic = Diagnostic::error(
          self.code(),
          self.to_string(),
          Span::new(file, TextRange::new(0, 0)),
        );
        if *line > 0 {
          diagnostic = diagnostic.with_note(format!("at JSON line {line}, column {column}"));
        }
        diagnostic
      }
      LoadError::NotAProgram { loc, .. } => {
        Diagnostic::error(self.code(), self.to_string(), loc.to_span(file))
      }
    }
  }
}

impl Display for LoadError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      LoadError::Json { message, .. } => write!(f, "malformed ESTree input: {message}"),
      LoadError::NotAProgram { found: Some(kind), .. } => {
        write!(f, "expected a Program node at the root, found {kind}")
      }
      LoadError::NotAProgram { found: None, .. } => {
        write!(f, "expected a Program node at the root")
      }
    }
  }
}

impl Error for LoadError {}
