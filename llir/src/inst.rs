use crate::types::Type;
use crate::value::BlockId;
use crate::value::FuncId;
use crate::value::Value;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntPredicate {
  Eq,
  Ne,
  Slt,
  Sle,
  Sgt,
  Sge,
}

impl IntPredicate {
  pub fn as_str(self) -> &'static str {
    match self {
      IntPredicate::Eq => "eq",
      IntPredicate::Ne => "ne",
      IntPredicate::Slt => "slt",
      IntPredicate::Sle => "sle",
      IntPredicate::Sgt => "sgt",
      IntPredicate::Sge => "sge",
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum InstKind {
  Alloca { ty: Type },
  Load { ty: Type, ptr: Value },
  Store { value: Value, ptr: Value },
  Add { lhs: Value, rhs: Value },
  ICmp { pred: IntPredicate, lhs: Value, rhs: Value },
  IntToPtr { value: Value },
  PtrToInt { value: Value, ty: Type },
  Call { callee: FuncId, args: Vec<Value> },
  Ret { value: Option<Value> },
  Br { target: BlockId },
  CondBr { cond: Value, then_: BlockId, else_: BlockId },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Inst {
  pub kind: InstKind,
  /// Type of the produced value; `Void` if nothing is produced.
  pub ty: Type,
}

impl Inst {
  pub fn is_terminator(&self) -> bool {
    matches!(
      self.kind,
      InstKind::Ret { .. } | InstKind::Br { .. } | InstKind::CondBr { .. }
    )
  }

  pub fn successors(&self) -> Vec<BlockId> {
    match &self.kind {
      InstKind::Br { target } => vec![*target],
      InstKind::CondBr { then_, else_, .. } => vec![*then_, *else_],
      _ => Vec::new(),
    }
  }

  pub fn operands(&self) -> Vec<Value> {
    match &self.kind {
      InstKind::Alloca { .. } | InstKind::Br { .. } => Vec::new(),
      InstKind::Load { ptr, .. } => vec![*ptr],
      InstKind::IntToPtr { value } | InstKind::PtrToInt { value, .. } => vec![*value],
      InstKind::Store { value, ptr } => vec![*value, *ptr],
      InstKind::Add { lhs, rhs } | InstKind::ICmp { lhs, rhs, .. } => vec![*lhs, *rhs],
      InstKind::Call { args, .. } => args.clone(),
      InstKind::Ret { value } => value.iter().copied().collect(),
      InstKind::CondBr { cond, .. } => vec![*cond],
    }
  }
}
