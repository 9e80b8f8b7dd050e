//! Shared diagnostics model and rendering utilities.
//!
//! Lowering errors, loader errors and warnings all end up as a [`Diagnostic`]
//! so hosts only need one way to print them.
//!
//! ```
//! use diagnostics::render::{render_diagnostic, SourceProvider};
//! use diagnostics::{Diagnostic, FileId, Span, TextRange};
//!
//! struct SingleFile {
//!   name: String,
//!   text: String,
//! }
//!
//! impl SourceProvider for SingleFile {
//!   fn file_name(&self, _file: FileId) -> Option<&str> {
//!     Some(&self.name)
//!   }
//!
//!   fn file_text(&self, _file: FileId) -> Option<&str> {
//!     Some(&self.text)
//!   }
//! }
//!
//! let provider = SingleFile {
//!   name: "app.js".into(),
//!   text: "print(y);".into(),
//! };
//! let diag = Diagnostic::error(
//!   "LOWER0005",
//!   "`y` is not declared",
//!   Span::new(FileId(0), TextRange::new(6, 7)),
//! );
//!
//! let rendered = render_diagnostic(&provider, &diag);
//! assert!(rendered.contains("LOWER0005"));
//! assert!(rendered.contains("--> app.js:1:7"));
//! ```

pub mod render;

use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;

/// A stable identifier for a file in a compilation run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize)]
pub struct FileId(pub u32);

/// A byte range in a file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct TextRange {
  pub start: u32,
  pub end: u32,
}

impl TextRange {
  pub const fn new(start: u32, end: u32) -> Self {
    Self { start, end }
  }

  pub fn len(&self) -> u32 {
    self.end.saturating_sub(self.start)
  }

  pub fn is_empty(&self) -> bool {
    self.start >= self.end
  }

  /// Builds a range from `usize` offsets, saturating to `u32` and returning a
  /// note describing any truncation that occurred.
  pub fn from_offsets_with_overflow_note(start: usize, end: usize) -> (Self, Option<String>) {
    let (s, start_overflow) = saturating_to_u32(start);
    let (e, end_overflow) = saturating_to_u32(end);
    let note = (start_overflow || end_overflow).then(|| {
      format!(
        "byte offsets truncated to fit u32 (start={}, end={})",
        start, end
      )
    });
    (Self { start: s, end: e }, note)
  }
}

/// A span across a specific file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct Span {
  pub file: FileId,
  pub range: TextRange,
}

impl Span {
  pub const fn new(file: FileId, range: TextRange) -> Self {
    Self { file, range }
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Error,
  Warning,
  Note,
}

impl Severity {
  pub const fn as_str(&self) -> &'static str {
    match self {
      Severity::Error => "error",
      Severity::Warning => "warning",
      Severity::Note => "note",
    }
  }
}

impl Display for Severity {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A user-facing diagnostic with optional notes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  pub code: &'static str,
  pub severity: Severity,
  pub message: String,
  pub primary: Span,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub notes: Vec<String>,
}

impl Diagnostic {
  pub fn new(
    severity: Severity,
    code: &'static str,
    message: impl Into<String>,
    primary: Span,
  ) -> Self {
    Self {
      code,
      severity,
      message: message.into(),
      primary,
      notes: Vec::new(),
    }
  }

  pub fn error(code: &'static str, message: impl Into<String>, primary: Span) -> Self {
    Self::new(Severity::Error, code, message, primary)
  }

  pub fn warning(code: &'static str, message: impl Into<String>, primary: Span) -> Self {
    Self::new(Severity::Warning, code, message, primary)
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.notes.push(note.into());
    self
  }
}

/// A diagnostic raised by the host rather than by compilation itself, e.g.
/// an unreadable input file.
pub fn host_error(span: Option<Span>, message: impl Into<String>) -> Diagnostic {
  Diagnostic::error(
    "HOST0001",
    message,
    span.unwrap_or(Span::new(FileId(0), TextRange::new(0, 0))),
  )
}

/// Orders diagnostics by file, then position, then code.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
  diagnostics.sort_by(|a, b| {
    a.primary
      .file
      .cmp(&b.primary.file)
      .then(a.primary.range.start.cmp(&b.primary.range.start))
      .then(a.primary.range.end.cmp(&b.primary.range.end))
      .then(a.code.cmp(b.code))
      .then(a.message.cmp(&b.message))
  });
}

fn saturating_to_u32(value: usize) -> (u32, bool) {
  if value > u32::MAX as usize {
    (u32::MAX, true)
  } else {
    (value as u32, false)
  }
}
