//! Lowers ESTree JavaScript syntax trees to a typed, LLVM-style IR module.
//!
//! Every runtime value is an opaque `ptr`. Top-level statements run inside an
//! entry function (`i32 main(ptr)` by default), each function declaration
//! becomes an IR function taking and returning `ptr`, and calls to anything
//! else become calls to external functions whose types come from a
//! [`SignatureRegistry`].
//!
//! Lowering is single pass and fails fast: the first unsupported construct
//! aborts the run and no module is produced. A module that is returned has
//! passed [`llir::verify`].
//!
//! ```
//! use lower_js::lower_program;
//! use lower_js::LowerOptions;
//!
//! let program = estree_js::parse_program_json(r#"{
//!   "type": "Program",
//!   "body": [{
//!     "type": "ExpressionStatement",
//!     "expression": {
//!       "type": "CallExpression",
//!       "callee": { "type": "Identifier", "name": "print" },
//!       "arguments": [{ "type": "Literal", "value": "hi", "raw": "\"hi\"" }]
//!     }
//!   }]
//! }"#).unwrap();
//! let out = lower_program(&program, &LowerOptions::default()).unwrap();
//! assert!(out.module.to_string().contains("call void (ptr, ...) @print(ptr @.str)"));
//! ```

pub mod analysis;
pub mod error;
pub mod lower;
pub mod options;
pub mod signature;
pub mod symbol;

use analysis::DeclAnalysis;
use estree_js::ast::node::Node;
use estree_js::ast::Program;
use llir::FnType;
use llir::InsertPoint;
use llir::Linkage;
use llir::Module;
use llir::Type;
use llir::Value;
use lower::Lowerer;
use serde::Serialize;
use tracing::debug;
use tracing::debug_span;

pub use error::LowerError;
pub use error::LowerErrorType;
pub use error::LowerResult;
pub use error::LowerWarning;
pub use error::LowerWarningType;
pub use options::LowerOptions;
pub use signature::default_sig;
pub use signature::FnSig;
pub use signature::SigType;
pub use signature::SignatureRegistry;
pub use symbol::Frame;

/// A verified module and what lowering learned on the way.
#[derive(Debug)]
pub struct LowerOutput {
  pub module: Module,
  /// Globals first, then one frame per lowered function.
  pub symbols: Vec<Frame>,
  pub warnings: Vec<LowerWarning>,
}

#[derive(Serialize)]
struct SymbolReport<'a> {
  frames: &'a [Frame],
}

impl LowerOutput {
  /// The symbol tables as JSON, for inspection tools.
  pub fn symbols_json(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SymbolReport {
      frames: &self.symbols,
    })
  }
}

pub fn lower_program(program: &Node<Program>, options: &LowerOptions) -> LowerResult<LowerOutput> {
  let span = debug_span!("lower_program", module = options.module_name.as_str());
  let _guard = span.enter();

  let analysis = DeclAnalysis::run(program, &options.entry_name)?;

  let mut module = Module::new(options.module_name.as_str());
  let main = module.add_function(
    options.entry_name.as_str(),
    FnType::new(Type::I32, [Type::Ptr], false),
    Linkage::External,
  );
  let entry = module.function_mut(main).append_block("entry");

  let mut lowerer = Lowerer::new(options, analysis, module, InsertPoint {
    func: main,
    block: entry,
  });
  lowerer.lower_stmts(&program.stx.body)?;
  lowerer.builder().build_ret(Some(Value::i32(0)));

  let Lowerer {
    mut module,
    symbols,
    warnings,
    ..
  } = lowerer;
  let pruned = module.function_mut(main).remove_unreachable_blocks();
  debug!(
    pruned,
    functions = module.functions().count(),
    globals = module.globals().count(),
    "lowered program"
  );

  llir::verify(&module)
    .map_err(|err| LowerErrorType::VerificationFailure(err).at(program.loc))?;

  Ok(LowerOutput {
    module,
    symbols: symbols.into_frames(),
    warnings,
  })
}
