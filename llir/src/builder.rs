use crate::inst::Inst;
use crate::inst::InstKind;
use crate::inst::IntPredicate;
use crate::module::Function;
use crate::module::Module;
use crate::types::Type;
use crate::value::BlockId;
use crate::value::FuncId;
use crate::value::Value;

/// Where the next instruction goes: the end of `block` in `func`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertPoint {
  pub func: FuncId,
  pub block: BlockId,
}

/// Emits instructions at an insertion point. Nothing is checked here beyond
/// computing result types; run [`crate::verify`] on the finished module.
pub struct Builder<'m> {
  module: &'m mut Module,
  at: InsertPoint,
}

impl<'m> Builder<'m> {
  pub fn new(module: &'m mut Module, at: InsertPoint) -> Builder<'m> {
    Builder { module, at }
  }

  pub fn module(&mut self) -> &mut Module {
    &mut *self.module
  }

  pub fn insert_point(&self) -> InsertPoint {
    self.at
  }

  pub fn position_at_end(&mut self, block: BlockId) {
    self.at.block = block;
  }

  pub fn function(&self) -> &Function {
    self.module.function(self.at.func)
  }

  fn function_mut(&mut self) -> &mut Function {
    self.module.function_mut(self.at.func)
  }

  /// Appends a new block to the current function without moving there.
  pub fn append_block(&mut self, name: &str) -> BlockId {
    self.function_mut().append_block(name)
  }

  pub fn is_terminated(&self) -> bool {
    self.function().is_terminated(self.at.block)
  }

  fn emit(&mut self, kind: InstKind, ty: Type) -> Value {
    let block = self.at.block;
    Value::Inst(self.function_mut().push_inst(block, Inst { kind, ty }))
  }

  pub fn build_alloca(&mut self, ty: Type) -> Value {
    self.emit(InstKind::Alloca { ty }, Type::Ptr)
  }

  /// Allocates in the entry block, after any allocas already there, so the
  /// slot dominates every block of the function.
  pub fn build_entry_alloca(&mut self, ty: Type) -> Value {
    let Some(entry) = self.function().entry() else {
      // No body yet; the current block is the only candidate.
      return self.build_alloca(ty);
    };
    let func = self.function_mut();
    let at = func
      .block_insts(entry)
      .take_while(|(_, inst)| matches!(inst.kind, InstKind::Alloca { .. }))
      .count();
    Value::Inst(func.insert_inst(
      entry,
      at,
      Inst {
        kind: InstKind::Alloca { ty },
        ty: Type::Ptr,
      },
    ))
  }

  pub fn build_load(&mut self, ty: Type, ptr: Value) -> Value {
    self.emit(InstKind::Load { ty, ptr }, ty)
  }

  pub fn build_store(&mut self, value: Value, ptr: Value) {
    self.emit(InstKind::Store { value, ptr }, Type::Void);
  }

  pub fn build_add(&mut self, lhs: Value, rhs: Value) -> Value {
    let ty = self.function().value_type(lhs).unwrap_or(Type::Void);
    self.emit(InstKind::Add { lhs, rhs }, ty)
  }

  pub fn build_icmp(&mut self, pred: IntPredicate, lhs: Value, rhs: Value) -> Value {
    self.emit(InstKind::ICmp { pred, lhs, rhs }, Type::I1)
  }

  pub fn build_int_to_ptr(&mut self, value: Value) -> Value {
    self.emit(InstKind::IntToPtr { value }, Type::Ptr)
  }

  pub fn build_ptr_to_int(&mut self, value: Value, ty: Type) -> Value {
    self.emit(InstKind::PtrToInt { value, ty }, ty)
  }

  /// The returned value has type `void` if the callee returns nothing and
  /// must not be used as an operand.
  pub fn build_call(&mut self, callee: FuncId, args: Vec<Value>) -> Value {
    let ret = self.module.function(callee).ty.ret;
    self.emit(InstKind::Call { callee, args }, ret)
  }

  pub fn build_ret(&mut self, value: Option<Value>) {
    self.emit(InstKind::Ret { value }, Type::Void);
  }

  pub fn build_br(&mut self, target: BlockId) {
    self.emit(InstKind::Br { target }, Type::Void);
  }

  pub fn build_cond_br(&mut self, cond: Value, then_: BlockId, else_: BlockId) {
    self.emit(InstKind::CondBr { cond, then_, else_ }, Type::Void);
  }

  /// Pointer to a private constant holding `text`.
  pub fn build_global_string(&mut self, text: &str) -> Value {
    Value::Global(self.module.intern_cstring(text))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::module::Linkage;
  use crate::types::FnType;

  #[test]
  fn entry_allocas_stay_grouped_at_the_top() {
    let mut m = Module::new("m");
    let f = m.add_function("f", FnType::new(Type::Void, [], false), Linkage::External);
    let entry = m.function_mut(f).append_block("entry");
    let mut b = Builder::new(&mut m, InsertPoint { func: f, block: entry });
    let first = b.build_entry_alloca(Type::I64);
    b.build_store(Value::i64(0), first);
    let next = b.append_block("next");
    b.build_br(next);
    b.position_at_end(next);
    let second = b.build_entry_alloca(Type::Ptr);
    b.build_ret(None);

    let func = m.function(f);
    let kinds = func
      .block_insts(entry)
      .map(|(id, inst)| (Value::Inst(id), inst.kind.clone()))
      .collect::<Vec<_>>();
    assert_eq!(kinds[0].0, first);
    assert_eq!(kinds[1].0, second);
    assert!(matches!(kinds[2].1, InstKind::Store { .. }));
    assert!(matches!(kinds[3].1, InstKind::Br { .. }));
    assert_eq!(func.block(next).insts.len(), 1);
  }
}
