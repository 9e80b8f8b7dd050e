use clap::Parser;
use diagnostics::host_error;
use diagnostics::sort_diagnostics;
use diagnostics::render::render_diagnostic;
use diagnostics::render::SourceProvider;
use diagnostics::Diagnostic;
use diagnostics::FileId;
use estree_js::parse_program_json;
use lower_js::lower_program;
use lower_js::LowerOptions;
use lower_js::SignatureRegistry;
use std::fs;
use std::io::stdin;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(
  name = "lower-js",
  version,
  about = "Lower an ESTree JSON syntax tree to LLVM textual IR"
)]
struct Cli {
  /// ESTree JSON of the program; omit for stdin.
  #[arg(short, long)]
  input: Option<PathBuf>,

  /// Where to write the `.ll` module. Parent directories are created.
  #[arg(short, long, default_value = "build/app.ll")]
  output: PathBuf,

  /// Module name, also used as `source_filename`.
  #[arg(long, default_value = "app")]
  module_name: String,

  /// Name of the function top-level code is lowered into.
  #[arg(long, default_value = "main")]
  entry_name: String,

  /// JSON file of external function signatures, e.g.
  /// `{"puts": {"ret": "i32", "params": ["ptr"]}}`.
  #[arg(long)]
  signatures: Option<PathBuf>,

  /// Also write the symbol tables as JSON to this path.
  #[arg(long)]
  emit_symbols: Option<PathBuf>,

  /// JavaScript source the tree was parsed from, to show in diagnostics.
  #[arg(long)]
  source: Option<PathBuf>,

  /// Emit tracing spans as JSON on stderr.
  #[arg(long)]
  trace: bool,
}

struct InputSource {
  name: String,
  text: Option<String>,
}

impl SourceProvider for InputSource {
  fn file_name(&self, _file: FileId) -> Option<&str> {
    Some(&self.name)
  }

  fn file_text(&self, _file: FileId) -> Option<&str> {
    self.text.as_deref()
  }
}

fn init_tracing(enabled: bool) {
  if !enabled {
    return;
  }
  let _ = tracing_subscriber::fmt()
    .with_span_events(FmtSpan::CLOSE)
    .with_max_level(Level::TRACE)
    .with_writer(std::io::stderr)
    .json()
    .with_ansi(false)
    .try_init();
}

fn report(source: &InputSource, diagnostic: &Diagnostic) {
  eprintln!("{}", render_diagnostic(source, diagnostic));
}

fn fail(source: &InputSource, message: impl Into<String>) -> ExitCode {
  report(source, &host_error(None, message));
  ExitCode::FAILURE
}

fn read_input(path: Option<&Path>) -> Result<String, String> {
  match path {
    Some(p) => {
      fs::read_to_string(p).map_err(|err| format!("failed to read {}: {err}", p.display()))
    }
    None => {
      let mut text = String::new();
      stdin()
        .read_to_string(&mut text)
        .map_err(|err| format!("failed to read stdin: {err}"))?;
      Ok(text)
    }
  }
}

fn write_file(path: &Path, contents: &str) -> Result<(), String> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)
      .map_err(|err| format!("failed to create {}: {err}", parent.display()))?;
  }
  fs::write(path, contents).map_err(|err| format!("failed to write {}: {err}", path.display()))
}

fn main() -> ExitCode {
  let args = Cli::parse();
  init_tracing(args.trace);

  let name = match (&args.source, &args.input) {
    (Some(p), _) | (None, Some(p)) => p.display().to_string(),
    (None, None) => "<stdin>".to_string(),
  };
  let mut source = InputSource { name, text: None };
  if let Some(path) = &args.source {
    match fs::read_to_string(path) {
      Ok(text) => source.text = Some(text),
      Err(err) => return fail(&source, format!("failed to read {}: {err}", path.display())),
    }
  }

  let json = match read_input(args.input.as_deref()) {
    Ok(json) => json,
    Err(err) => return fail(&source, err),
  };

  let mut options = LowerOptions::default()
    .with_module_name(args.module_name.as_str())
    .with_entry_name(args.entry_name.as_str());
  if let Some(path) = &args.signatures {
    let registry = fs::read_to_string(path)
      .map_err(|err| format!("failed to read {}: {err}", path.display()))
      .and_then(|text| SignatureRegistry::from_json(&text).map_err(|err| err.to_string()));
    match registry {
      Ok(registry) => options = options.with_signatures(registry),
      Err(err) => return fail(&source, err),
    }
  }

  let program = match parse_program_json(&json) {
    Ok(program) => program,
    Err(err) => {
      report(&source, &err.to_diagnostic(FileId(0)));
      return ExitCode::FAILURE;
    }
  };

  let out = match lower_program(&program, &options) {
    Ok(out) => out,
    Err(err) => {
      report(&source, &err.to_diagnostic(FileId(0)));
      return ExitCode::FAILURE;
    }
  };
  let mut warnings: Vec<Diagnostic> = out
    .warnings
    .iter()
    .map(|warning| warning.to_diagnostic(FileId(0)))
    .collect();
  sort_diagnostics(&mut warnings);
  for warning in warnings.iter() {
    report(&source, warning);
  }

  if let Err(err) = write_file(&args.output, &out.module.to_string()) {
    return fail(&source, err);
  }
  if let Some(path) = &args.emit_symbols {
    let written = out
      .symbols_json()
      .map_err(|err| format!("failed to serialize symbols: {err}"))
      .and_then(|json| write_file(path, &json));
    if let Err(err) = written {
      return fail(&source, err);
    }
  }
  ExitCode::SUCCESS
}
