use itertools::Itertools;
use serde::Serialize;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

/// First-class IR types. Pointers are opaque.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
  Void,
  /// Integer of the given bit width.
  Int(u32),
  Ptr,
  /// `[N x i8]`, only used as the contents of string constants.
  Bytes(u64),
}

impl Type {
  pub const I1: Type = Type::Int(1);
  pub const I8: Type = Type::Int(8);
  pub const I32: Type = Type::Int(32);
  pub const I64: Type = Type::Int(64);

  pub fn is_int(self) -> bool {
    matches!(self, Type::Int(_))
  }

  /// Whether a value of this type can be an SSA operand.
  pub fn is_first_class(self) -> bool {
    matches!(self, Type::Int(_) | Type::Ptr)
  }
}

impl Display for Type {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Type::Void => write!(f, "void"),
      Type::Int(w) => write!(f, "i{w}"),
      Type::Ptr => write!(f, "ptr"),
      Type::Bytes(n) => write!(f, "[{n} x i8]"),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FnType {
  pub ret: Type,
  pub params: Vec<Type>,
  pub variadic: bool,
}

impl FnType {
  pub fn new(ret: Type, params: impl IntoIterator<Item = Type>, variadic: bool) -> FnType {
    FnType {
      ret,
      params: params.into_iter().collect(),
      variadic,
    }
  }

  /// Whether `n` actual arguments are acceptable.
  pub fn accepts_arity(&self, n: usize) -> bool {
    n == self.params.len() || (self.variadic && n > self.params.len())
  }
}

impl Display for FnType {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let mut params = self.params.iter().map(Type::to_string).collect_vec();
    if self.variadic {
      params.push("...".to_string());
    }
    write!(f, "{} ({})", self.ret, params.join(", "))
  }
}
