use crate::cfg::Dominators;
use crate::inst::Inst;
use crate::inst::InstKind;
use crate::module::Function;
use crate::module::Initializer;
use crate::module::Linkage;
use crate::module::Module;
use crate::types::Type;
use crate::value::BlockId;
use crate::value::InstId;
use crate::value::Value;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

/// The first structural problem found in a module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyError {
  pub function: Option<String>,
  pub block: Option<String>,
  pub message: String,
}

impl Display for VerifyError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match (&self.function, &self.block) {
      (Some(func), Some(block)) => write!(f, "in @{func}, block {block}: {}", self.message),
      (Some(func), None) => write!(f, "in @{func}: {}", self.message),
      _ => write!(f, "{}", self.message),
    }
  }
}

impl Error for VerifyError {}

pub type VerifyResult = Result<(), VerifyError>;

fn module_error(message: String) -> VerifyError {
  VerifyError {
    function: None,
    block: None,
    message,
  }
}

/// Checks that:
/// - symbol names are unique across functions and globals;
/// - global initializers are constants of the declared type;
/// - every block ends with exactly one terminator, and none appears earlier;
/// - operand types agree with each instruction and call signature;
/// - branch targets are blocks of the same function;
/// - every instruction result dominates its uses.
pub fn verify(module: &Module) -> VerifyResult {
  let mut names = HashSet::new();
  for (_, func) in module.functions() {
    if !names.insert(func.name.as_str()) {
      return Err(module_error(format!("duplicate symbol @{}", func.name)));
    }
  }
  for (_, global) in module.globals() {
    if !names.insert(global.name.as_str()) {
      return Err(module_error(format!("duplicate symbol @{}", global.name)));
    }
    match &global.init {
      None => {
        if global.linkage != Linkage::External {
          return Err(module_error(format!(
            "declared global @{} must have external linkage",
            global.name
          )));
        }
      }
      Some(Initializer::CString(bytes)) => {
        if global.ty != Type::Bytes(bytes.len() as u64) {
          return Err(module_error(format!(
            "global @{} has type {} but holds {} bytes",
            global.name,
            global.ty,
            bytes.len()
          )));
        }
      }
      Some(Initializer::Value(value)) => {
        let ty = value.const_type();
        if ty != Some(global.ty) {
          return Err(module_error(format!(
            "initializer of global @{} is not a constant of type {}",
            global.name, global.ty
          )));
        }
      }
    }
  }
  for (_, func) in module.functions() {
    FunctionVerifier::new(module, func).run()?;
  }
  Ok(())
}

struct FunctionVerifier<'a> {
  module: &'a Module,
  func: &'a Function,
  // Defining block and position within it of every placed instruction.
  defs: HashMap<InstId, (BlockId, usize)>,
}

impl<'a> FunctionVerifier<'a> {
  fn new(module: &'a Module, func: &'a Function) -> Self {
    let mut defs = HashMap::new();
    for &block in func.layout() {
      for (i, &inst) in func.block(block).insts.iter().enumerate() {
        defs.insert(inst, (block, i));
      }
    }
    FunctionVerifier { module, func, defs }
  }

  fn err(&self, block: Option<BlockId>, message: String) -> VerifyError {
    VerifyError {
      function: Some(self.func.name.clone()),
      block: block.map(|b| self.func.block(b).name.clone()),
      message,
    }
  }

  fn run(&self) -> VerifyResult {
    if self.func.is_declaration() {
      if self.func.linkage != Linkage::External {
        return Err(self.err(None, "declaration must have external linkage".to_string()));
      }
      return Ok(());
    }
    if self.func.ty.variadic {
      return Err(self.err(None, "variadic functions cannot be defined".to_string()));
    }
    let layout: HashSet<BlockId> = self.func.layout().iter().copied().collect();
    let dom = Dominators::compute(self.func);
    for &block in self.func.layout() {
      let insts = &self.func.block(block).insts;
      if insts.is_empty() {
        return Err(self.err(Some(block), "block has no terminator".to_string()));
      }
      for (pos, &id) in insts.iter().enumerate() {
        let inst = self.func.inst(id);
        let is_last = pos + 1 == insts.len();
        if inst.is_terminator() && !is_last {
          return Err(self.err(Some(block), "instruction after terminator".to_string()));
        }
        if !inst.is_terminator() && is_last {
          return Err(self.err(Some(block), "block has no terminator".to_string()));
        }
        for target in inst.successors() {
          if !layout.contains(&target) {
            return Err(self.err(
              Some(block),
              format!("branch to block #{} outside the function", target.0),
            ));
          }
        }
        for operand in inst.operands() {
          self.check_operand(&dom, block, pos, operand)?;
        }
        self
          .check_types(inst)
          .map_err(|message| self.err(Some(block), message))?;
      }
    }
    Ok(())
  }

  fn check_operand(
    &self,
    dom: &Dominators,
    block: BlockId,
    pos: usize,
    operand: Value,
  ) -> VerifyResult {
    match operand {
      Value::Param(i) if i as usize >= self.func.ty.params.len() => Err(self.err(
        Some(block),
        format!("reference to missing parameter %arg{i}"),
      )),
      Value::Global(g) if g.0 as usize >= self.module.globals().count() => {
        Err(self.err(Some(block), format!("reference to missing global #{}", g.0)))
      }
      Value::Func(f) if f.0 as usize >= self.module.functions().count() => {
        Err(self.err(Some(block), format!("reference to missing function #{}", f.0)))
      }
      Value::Inst(id) => {
        let Some(&(def_block, def_pos)) = self.defs.get(&id) else {
          return Err(self.err(Some(block), "use of an instruction not in any block".to_string()));
        };
        if self.func.inst(id).ty == Type::Void {
          return Err(self.err(Some(block), "use of a void value".to_string()));
        }
        // Uses in unreachable blocks are vacuously dominated.
        let ok = !dom.is_reachable(block)
          || if def_block == block {
            def_pos < pos
          } else {
            dom.dominates(def_block, block)
          };
        if ok {
          Ok(())
        } else {
          Err(self.err(
            Some(block),
            "instruction does not dominate all uses".to_string(),
          ))
        }
      }
      _ => Ok(()),
    }
  }

  fn ty(&self, value: Value) -> Result<Type, String> {
    self
      .func
      .value_type(value)
      .ok_or_else(|| format!("invalid operand {value:?}"))
  }

  fn expect(&self, what: &str, value: Value, want: Type) -> Result<(), String> {
    let got = self.ty(value)?;
    if got != want {
      return Err(format!("{what} has type {got}, expected {want}"));
    }
    Ok(())
  }

  fn check_types(&self, inst: &Inst) -> Result<(), String> {
    match &inst.kind {
      InstKind::Alloca { ty } => {
        if !ty.is_first_class() {
          return Err(format!("cannot allocate {ty}"));
        }
      }
      InstKind::Load { ty, ptr } => {
        if !ty.is_first_class() {
          return Err(format!("cannot load {ty}"));
        }
        self.expect("load address", *ptr, Type::Ptr)?;
      }
      InstKind::Store { value, ptr } => {
        if !self.ty(*value)?.is_first_class() {
          return Err("stored value is not first-class".to_string());
        }
        self.expect("store address", *ptr, Type::Ptr)?;
      }
      InstKind::Add { lhs, rhs } | InstKind::ICmp { lhs, rhs, .. } => {
        let ty = self.ty(*lhs)?;
        if !ty.is_int() {
          return Err(format!("integer operation on {ty}"));
        }
        self.expect("right operand", *rhs, ty)?;
      }
      InstKind::IntToPtr { value } => {
        let ty = self.ty(*value)?;
        if !ty.is_int() {
          return Err(format!("inttoptr from {ty}"));
        }
      }
      InstKind::PtrToInt { value, ty } => {
        if !ty.is_int() {
          return Err(format!("ptrtoint to {ty}"));
        }
        self.expect("ptrtoint operand", *value, Type::Ptr)?;
      }
      InstKind::Call { callee, args } => {
        let sig = &self.module.function(*callee).ty;
        let name = &self.module.function(*callee).name;
        if !sig.accepts_arity(args.len()) {
          return Err(format!(
            "call to @{name} with {} arguments, expected {}{}",
            args.len(),
            sig.params.len(),
            if sig.variadic { " or more" } else { "" }
          ));
        }
        for (i, arg) in args.iter().enumerate() {
          match sig.params.get(i) {
            Some(&param) => self.expect(&format!("argument {i} to @{name}"), *arg, param)?,
            None => {
              if !self.ty(*arg)?.is_first_class() {
                return Err(format!("variadic argument {i} to @{name} is not first-class"));
              }
            }
          }
        }
      }
      InstKind::Ret { value } => match (value, self.func.ty.ret) {
        (None, Type::Void) => {}
        (None, ret) => return Err(format!("ret void in function returning {ret}")),
        (Some(v), ret) => self.expect("returned value", *v, ret)?,
      },
      InstKind::Br { .. } => {}
      InstKind::CondBr { cond, .. } => self.expect("branch condition", *cond, Type::I1)?,
    }
    Ok(())
  }
}
