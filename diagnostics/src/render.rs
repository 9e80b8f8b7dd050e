use crate::Diagnostic;
use crate::FileId;
use crate::Span;
use std::fmt::Write;

/// Provides access to source text for rendering diagnostics.
pub trait SourceProvider {
  fn file_name(&self, file: FileId) -> Option<&str>;
  fn file_text(&self, file: FileId) -> Option<&str>;
}

/// A provider for hosts that only know the file name, e.g. when lowering an
/// ESTree dump without the original source text at hand.
pub struct NameOnly<'a>(pub &'a str);

impl<'a> SourceProvider for NameOnly<'a> {
  fn file_name(&self, _file: FileId) -> Option<&str> {
    Some(self.0)
  }

  fn file_text(&self, _file: FileId) -> Option<&str> {
    None
  }
}

/// Render a diagnostic into a human-readable string with caret highlighting.
pub fn render_diagnostic(provider: &dyn SourceProvider, diagnostic: &Diagnostic) -> String {
  let mut output = String::new();
  writeln!(
    output,
    "{}[{}]: {}",
    diagnostic.severity, diagnostic.code, diagnostic.message
  )
  .unwrap();

  render_span(provider, &mut output, diagnostic.primary, &diagnostic.message);

  for note in &diagnostic.notes {
    writeln!(output, "= note: {}", note).unwrap();
  }

  output
}

fn render_span(
  provider: &dyn SourceProvider,
  output: &mut String,
  span: Span,
  message: &str,
) {
  let name = provider.file_name(span.file).unwrap_or("<unknown file>");
  let Some(text) = provider.file_text(span.file) else {
    writeln!(
      output,
      " --> {}@{}..{}",
      name, span.range.start, span.range.end
    )
    .unwrap();
    return;
  };

  let start = clamp_offset(text, span.range.start as usize);
  let end = clamp_offset(text, span.range.end as usize).max(start);
  let lines = line_starts(text);
  let first_line = line_index(&lines, start);
  let last_line = line_index(&lines, end.saturating_sub(1).max(start));

  let col = text[lines[first_line]..start].chars().count() + 1;
  writeln!(output, " --> {}:{}:{}", name, first_line + 1, col).unwrap();

  let gutter = (last_line + 1).to_string().len();
  writeln!(output, "{:>gutter$} |", "").unwrap();
  for line in first_line..=last_line {
    let line_start = lines[line];
    let line_end = lines
      .get(line + 1)
      .map(|next| next - 1)
      .unwrap_or(text.len())
      .max(line_start);
    let line_text = text[line_start..line_end].trim_end_matches('\r');
    writeln!(output, "{:>gutter$} | {}", line + 1, line_text).unwrap();

    let hl_start = start.max(line_start);
    let hl_end = end.min(line_start + line_text.len());
    let pad = text[line_start..hl_start].chars().count();
    let len = text[hl_start..hl_end.max(hl_start)].chars().count().max(1);
    let mut underline = format!("{:>gutter$} | {}", "", " ".repeat(pad));
    underline.extend(std::iter::repeat('^').take(len));
    if line == first_line && !message.is_empty() {
      underline.push(' ');
      underline.push_str(message);
    }
    writeln!(output, "{}", underline).unwrap();
  }
}

fn clamp_offset(text: &str, offset: usize) -> usize {
  let mut offset = offset.min(text.len());
  while !text.is_char_boundary(offset) {
    offset -= 1;
  }
  offset
}

fn line_starts(text: &str) -> Vec<usize> {
  std::iter::once(0)
    .chain(text.match_indices('\n').map(|(i, _)| i + 1))
    .collect()
}

fn line_index(lines: &[usize], offset: usize) -> usize {
  match lines.binary_search(&offset) {
    Ok(idx) => idx,
    Err(idx) => idx - 1,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::TextRange;

  struct TestSource {
    name: String,
    text: String,
  }

  impl SourceProvider for TestSource {
    fn file_name(&self, _file: FileId) -> Option<&str> {
      Some(&self.name)
    }

    fn file_text(&self, _file: FileId) -> Option<&str> {
      Some(&self.text)
    }
  }

  fn span(start: u32, end: u32) -> Span {
    Span::new(FileId(0), TextRange::new(start, end))
  }

  #[test]
  fn render_single_line_span() {
    let source = TestSource {
      name: "app.js".into(),
      text: "var x = 1;".into(),
    };
    let diagnostic = Diagnostic::error("TEST0001", "unused variable", span(4, 5));

    let rendered = render_diagnostic(&source, &diagnostic);
    let expected =
      "error[TEST0001]: unused variable\n --> app.js:1:5\n  |\n1 | var x = 1;\n  |     ^ unused variable\n";
    assert_eq!(rendered, expected);
  }

  #[test]
  fn render_multi_line_span() {
    let source = TestSource {
      name: "app.js".into(),
      text: "function f() {\n  return 1;\n}\n".into(),
    };
    let diagnostic = Diagnostic::error("TEST0002", "broken", span(0, 28));

    let rendered = render_diagnostic(&source, &diagnostic);
    let expected = concat!(
      "error[TEST0002]: broken\n",
      " --> app.js:1:1\n",
      "  |\n",
      "1 | function f() {\n",
      "  | ^^^^^^^^^^^^^^ broken\n",
      "2 |   return 1;\n",
      "  | ^^^^^^^^^^^\n",
      "3 | }\n",
      "  | ^\n",
    );
    assert_eq!(rendered, expected);
  }

  #[test]
  fn render_without_source_text_uses_offsets() {
    let diagnostic = Diagnostic::error("TEST0003", "oops", span(3, 8))
      .with_note("extra");
    let rendered = render_diagnostic(&NameOnly("app.json"), &diagnostic);
    assert_eq!(
      rendered,
      "error[TEST0003]: oops\n --> app.json@3..8\n= note: extra\n"
    );
  }
}
