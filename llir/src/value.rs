use crate::types::Type;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FuncId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GlobalId(pub u32);

/// A basic block within its function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BlockId(pub u32);

/// An instruction within its function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InstId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Const {
  Int { ty: Type, value: i64 },
  Null,
}

/// An immutable, typed operand handle. `Inst` and `Param` are only meaningful
/// inside the function that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Value {
  Const(Const),
  Inst(InstId),
  Param(u32),
  /// The address of a global.
  Global(GlobalId),
  /// The address of a function.
  Func(FuncId),
}

impl Value {
  pub fn int(ty: Type, value: i64) -> Value {
    Value::Const(Const::Int { ty, value })
  }

  pub fn i64(value: i64) -> Value {
    Value::int(Type::I64, value)
  }

  pub fn i32(value: i64) -> Value {
    Value::int(Type::I32, value)
  }

  pub fn null() -> Value {
    Value::Const(Const::Null)
  }

  /// Whether this value is fixed at link time, so it can initialize a global.
  pub fn is_const(&self) -> bool {
    self.const_type().is_some()
  }

  /// Type of a value that needs no function context, i.e. anything but an
  /// instruction result or parameter.
  pub fn const_type(&self) -> Option<Type> {
    match self {
      Value::Const(Const::Int { ty, .. }) => Some(*ty),
      Value::Const(Const::Null) | Value::Global(_) | Value::Func(_) => Some(Type::Ptr),
      Value::Inst(_) | Value::Param(_) => None,
    }
  }
}
