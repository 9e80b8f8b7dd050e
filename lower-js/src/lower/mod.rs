pub mod control;
pub mod expr;
pub mod func;
pub mod pat;
pub mod stmt;

use crate::analysis::DeclAnalysis;
use crate::error::unsupported_feature;
use crate::error::LowerResult;
use crate::error::LowerWarning;
use crate::error::LowerWarningType;
use crate::options::LowerOptions;
use crate::symbol::SymbolTable;
use ahash::HashMap;
use estree_js::loc::Loc;
use llir::Builder;
use llir::FuncId;
use llir::InsertPoint;
use llir::Module;
use llir::Type;
use llir::Value;
use tracing::warn;

// Runtime entry points lowered code calls into. The runtime supplies them.
pub const ARRAY_CALLEE: &str = "__js_array";
pub const ARRAY_HOLE: &str = "__js_array_hole";
pub const FORIN_COUNT_CALLEE: &str = "__js_forin_count";
pub const FORIN_KEY_CALLEE: &str = "__js_forin_key";

const RUNTIME_NAMES: [&str; 4] = [ARRAY_CALLEE, ARRAY_HOLE, FORIN_COUNT_CALLEE, FORIN_KEY_CALLEE];

/// Programs may neither define nor call the runtime entry points.
pub(crate) fn reject_runtime_name(name: &str, loc: Loc) -> LowerResult<()> {
  if RUNTIME_NAMES.contains(&name) {
    return Err(unsupported_feature(
      loc,
      format!("`{name}` is reserved for the runtime"),
    ));
  }
  Ok(())
}

/// Per-call lowering context.
///
/// `pending` carries a value that is about to be bound to a name; `raw_name`
/// asks identifier lowering to bind rather than read.
#[derive(Clone, Copy, Debug, Default)]
pub struct Meta {
  pub pending: Option<Value>,
  pub raw_name: bool,
}

impl Meta {
  /// Plain value context: identifiers are read.
  pub fn value() -> Meta {
    Meta::default()
  }

  /// Binding context: the identifier being lowered receives `value`.
  pub fn binding(value: Value) -> Meta {
    Meta {
      pending: Some(value),
      raw_name: true,
    }
  }
}

/// All state of one lowering run. Nothing here outlives the run.
pub struct Lowerer<'a> {
  pub(crate) options: &'a LowerOptions,
  pub(crate) analysis: DeclAnalysis,
  pub(crate) module: Module,
  pub(crate) at: InsertPoint,
  pub(crate) symbols: SymbolTable,
  // Functions declared by the program, by name.
  pub(crate) functions: HashMap<String, FuncId>,
  pub(crate) warnings: Vec<LowerWarning>,
  // Number of for-in bodies enclosing the current statement.
  pub(crate) loop_depth: u32,
}

impl<'a> Lowerer<'a> {
  pub(crate) fn new(
    options: &'a LowerOptions,
    analysis: DeclAnalysis,
    module: Module,
    at: InsertPoint,
  ) -> Lowerer<'a> {
    Lowerer {
      options,
      analysis,
      module,
      at,
      symbols: SymbolTable::new(),
      functions: HashMap::default(),
      warnings: Vec::new(),
      loop_depth: 0,
    }
  }

  /// A builder at the current insertion point. Moving it does not move the
  /// lowerer; assign `self.at` for that.
  pub(crate) fn builder(&mut self) -> Builder<'_> {
    Builder::new(&mut self.module, self.at)
  }

  /// Starts a fresh block and continues there. Used after a terminator so
  /// that statements that follow still have somewhere to go; the block is
  /// pruned later if nothing branches to it.
  pub(crate) fn continue_in_new_block(&mut self, name: &str) {
    let block = self.builder().append_block(name);
    self.at.block = block;
  }

  /// Whether reads may use a slot's known contents instead of loading: only
  /// top-level code outside any loop runs exactly once, in order.
  pub(crate) fn straight_line(&self) -> bool {
    !self.symbols.in_function() && self.loop_depth == 0
  }

  pub(crate) fn warn(&mut self, typ: LowerWarningType, loc: Loc) {
    warn!(code = typ.code(), start = loc.0, end = loc.1, "{}", typ.message());
    self.warnings.push(LowerWarning { typ, loc });
  }

  /// Converts between the pointer-sized slot every source value occupies and
  /// the integer types external signatures may use.
  pub(crate) fn coerce(&mut self, value: Value, to: Type) -> Value {
    let from = self
      .module
      .function(self.at.func)
      .value_type(value)
      .unwrap_or(Type::Ptr);
    if from == to {
      return value;
    }
    let mut b = self.builder();
    match (from, to) {
      (Type::Int(_), Type::Ptr) => b.build_int_to_ptr(value),
      (Type::Ptr, Type::Int(_)) => b.build_ptr_to_int(value, to),
      (Type::Int(_), Type::Int(_)) => {
        let ptr = b.build_int_to_ptr(value);
        b.build_ptr_to_int(ptr, to)
      }
      _ => value,
    }
  }

  /// Zero value of a parameter type, for arguments the caller left out.
  pub(crate) fn missing_arg(ty: Type) -> Value {
    match ty {
      Type::Int(_) => Value::int(ty, 0),
      _ => Value::null(),
    }
  }
}
