//! LLVM textual IR (`.ll`) with opaque pointers.

use crate::inst::InstKind;
use crate::module::Function;
use crate::module::Global;
use crate::module::Initializer;
use crate::module::Linkage;
use crate::module::Module;
use crate::types::Type;
use crate::value::Const;
use crate::value::InstId;
use crate::value::Value;
use ahash::HashMap;
use ahash::HashMapExt;
use itertools::Itertools;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Write;

fn is_plain_ident(name: &str) -> bool {
  let mut chars = name.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || matches!(c, '$' | '.' | '_' | '-') => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '$' | '.' | '_' | '-'))
}

fn escape_bytes(out: &mut String, bytes: &[u8]) {
  for &b in bytes {
    if (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\' {
      out.push(b as char);
    } else {
      // Writing to a String cannot fail.
      let _ = write!(out, "\\{b:02X}");
    }
  }
}

/// `@name`, quoted when it is not a plain identifier.
fn symbol(name: &str) -> String {
  if is_plain_ident(name) {
    format!("@{name}")
  } else {
    let mut out = String::from("@\"");
    escape_bytes(&mut out, name.as_bytes());
    out.push('"');
    out
  }
}

fn label(name: &str) -> String {
  if is_plain_ident(name) {
    name.to_string()
  } else {
    let mut out = String::from("\"");
    escape_bytes(&mut out, name.as_bytes());
    out.push('"');
    out
  }
}

fn linkage_prefix(linkage: Linkage) -> &'static str {
  match linkage {
    Linkage::External => "",
    Linkage::Internal => "internal ",
    Linkage::Private => "private ",
  }
}

struct FunctionPrinter<'a> {
  module: &'a Module,
  func: &'a Function,
  // Sequential `%tN` names for value-producing instructions, in layout order.
  names: HashMap<InstId, usize>,
}

impl<'a> FunctionPrinter<'a> {
  fn new(module: &'a Module, func: &'a Function) -> Self {
    let mut names = HashMap::new();
    for &block in func.layout() {
      for (id, inst) in func.block_insts(block) {
        if inst.ty != Type::Void {
          let next = names.len();
          names.insert(id, next);
        }
      }
    }
    FunctionPrinter {
      module,
      func,
      names,
    }
  }

  fn value(&self, value: Value) -> String {
    match value {
      Value::Const(Const::Int { value, .. }) => value.to_string(),
      Value::Const(Const::Null) => "null".to_string(),
      Value::Inst(id) => match self.names.get(&id) {
        Some(n) => format!("%t{n}"),
        None => format!("%dead{}", id.0),
      },
      Value::Param(i) => format!("%arg{i}"),
      Value::Global(g) => symbol(&self.module.global(g).name),
      Value::Func(f) => symbol(&self.module.function(f).name),
    }
  }

  fn typed(&self, value: Value) -> String {
    let ty = self.func.value_type(value).unwrap_or(Type::Void);
    format!("{ty} {}", self.value(value))
  }

  fn block_ref(&self, block: crate::value::BlockId) -> String {
    format!("label %{}", label(&self.func.block(block).name))
  }

  fn write(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let func = self.func;
    if func.is_declaration() {
      let mut params = func.ty.params.iter().map(Type::to_string).collect_vec();
      if func.ty.variadic {
        params.push("...".to_string());
      }
      return writeln!(
        f,
        "declare {} {}({})",
        func.ty.ret,
        symbol(&func.name),
        params.join(", ")
      );
    }
    let params = func
      .ty
      .params
      .iter()
      .enumerate()
      .map(|(i, ty)| format!("{ty} %arg{i}"))
      .join(", ");
    writeln!(
      f,
      "define {}{} {}({}) {{",
      linkage_prefix(func.linkage),
      func.ty.ret,
      symbol(&func.name),
      params
    )?;
    for (i, &block) in func.layout().iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      writeln!(f, "{}:", label(&func.block(block).name))?;
      for (id, inst) in func.block_insts(block) {
        write!(f, "  ")?;
        if inst.ty != Type::Void {
          write!(f, "{} = ", self.value(Value::Inst(id)))?;
        }
        match &inst.kind {
          InstKind::Alloca { ty } => write!(f, "alloca {ty}")?,
          InstKind::Load { ty, ptr } => write!(f, "load {ty}, {}", self.typed(*ptr))?,
          InstKind::Store { value, ptr } => {
            write!(f, "store {}, {}", self.typed(*value), self.typed(*ptr))?
          }
          InstKind::Add { lhs, rhs } => {
            write!(f, "add {}, {}", self.typed(*lhs), self.value(*rhs))?
          }
          InstKind::ICmp { pred, lhs, rhs } => write!(
            f,
            "icmp {} {}, {}",
            pred.as_str(),
            self.typed(*lhs),
            self.value(*rhs)
          )?,
          InstKind::IntToPtr { value } => write!(f, "inttoptr {} to ptr", self.typed(*value))?,
          InstKind::PtrToInt { value, ty } => {
            write!(f, "ptrtoint {} to {ty}", self.typed(*value))?
          }
          InstKind::Call { callee, args } => {
            let callee = self.module.function(*callee);
            // Variadic callees need the full function type spelled out.
            let ty = if callee.ty.variadic {
              callee.ty.to_string()
            } else {
              callee.ty.ret.to_string()
            };
            write!(
              f,
              "call {ty} {}({})",
              symbol(&callee.name),
              args.iter().map(|a| self.typed(*a)).join(", ")
            )?
          }
          InstKind::Ret { value: None } => write!(f, "ret void")?,
          InstKind::Ret { value: Some(v) } => write!(f, "ret {}", self.typed(*v))?,
          InstKind::Br { target } => write!(f, "br {}", self.block_ref(*target))?,
          InstKind::CondBr { cond, then_, else_ } => write!(
            f,
            "br {}, {}, {}",
            self.typed(*cond),
            self.block_ref(*then_),
            self.block_ref(*else_)
          )?,
        };
        writeln!(f)?;
      }
    }
    writeln!(f, "}}")
  }
}

fn write_global(f: &mut Formatter<'_>, module: &Module, global: &Global) -> fmt::Result {
  write!(f, "{} = ", symbol(&global.name))?;
  let Some(init) = &global.init else {
    return writeln!(f, "external global {}", global.ty);
  };
  write!(f, "{}", linkage_prefix(global.linkage))?;
  if global.unnamed_addr {
    write!(f, "unnamed_addr ")?;
  }
  let kind = if global.constant { "constant" } else { "global" };
  match init {
    Initializer::CString(bytes) => {
      let mut text = String::new();
      escape_bytes(&mut text, bytes);
      writeln!(f, "{kind} {} c\"{text}\"", global.ty)
    }
    Initializer::Value(value) => {
      let text = match value {
        Value::Const(Const::Int { value, .. }) => value.to_string(),
        Value::Global(g) => symbol(&module.global(*g).name),
        Value::Func(func) => symbol(&module.function(*func).name),
        _ => "null".to_string(),
      };
      writeln!(f, "{kind} {} {text}", global.ty)
    }
  }
}

impl Display for Module {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let mut name = String::new();
    escape_bytes(&mut name, self.name.as_bytes());
    writeln!(f, "; ModuleID = '{name}'")?;
    writeln!(f, "source_filename = \"{name}\"")?;
    let (strings, others): (Vec<_>, Vec<_>) = self
      .globals()
      .map(|(_, g)| g)
      .partition(|g| matches!(g.init, Some(Initializer::CString(_))));
    for group in [strings, others] {
      if group.is_empty() {
        continue;
      }
      writeln!(f)?;
      for global in group {
        write_global(f, self, global)?;
      }
    }
    // Definitions first, then declarations, each in creation order.
    let (defs, decls): (Vec<_>, Vec<_>) = self
      .functions()
      .map(|(_, func)| func)
      .partition(|func| !func.is_declaration());
    for func in defs {
      writeln!(f)?;
      FunctionPrinter::new(self, func).write(f)?;
    }
    if !decls.is_empty() {
      writeln!(f)?;
      for func in decls {
        FunctionPrinter::new(self, func).write(f)?;
      }
    }
    Ok(())
  }
}
