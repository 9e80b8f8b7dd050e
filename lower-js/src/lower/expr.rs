use super::reject_runtime_name;
use super::Lowerer;
use super::Meta;
use super::ARRAY_CALLEE;
use super::ARRAY_HOLE;
use crate::error::unsupported_feature;
use crate::error::LowerErrorType;
use crate::error::LowerResult;
use crate::signature::default_sig;
use crate::symbol::Lookup;
use estree_js::ast::expr::ArrayExpr;
use estree_js::ast::expr::CallExpr;
use estree_js::ast::expr::Expr;
use estree_js::ast::expr::Ident;
use estree_js::ast::expr::Lit;
use estree_js::ast::node::Node;
use llir::FnType;
use llir::FuncId;
use llir::Global;
use llir::Type;
use llir::Value;

impl<'a> Lowerer<'a> {
  /// Lowers an expression to a single `ptr` value.
  pub(crate) fn lower_expr(&mut self, expr: &Expr, meta: Meta) -> LowerResult<Value> {
    match expr {
      Expr::Array(n) => self.lower_array(n),
      Expr::Call(n) => self.lower_call(n),
      Expr::Identifier(n) => self.lower_identifier(n, meta),
      Expr::Literal(n) => Ok(self.lower_literal(n)),
      Expr::Member(n) => Err(unsupported_feature(n.loc, "member access")),
      Expr::Spread(n) => Err(unsupported_feature(n.loc, "spread elements")),
      Expr::Unsupported(n) => {
        Err(LowerErrorType::UnsupportedExpressionType(n.stx.kind.clone()).at(n.loc))
      }
    }
  }

  fn lower_array(&mut self, node: &Node<ArrayExpr>) -> LowerResult<Value> {
    let mut args = Vec::with_capacity(node.stx.elements.len() + 1);
    args.push(Value::i64(node.stx.elements.len() as i64));
    for element in node.stx.elements.iter() {
      let value = match element {
        None => self.array_hole(),
        Some(Expr::Spread(spread)) => {
          return Err(unsupported_feature(spread.loc, "spread elements"))
        }
        Some(e) => self.lower_expr(e, Meta::value())?,
      };
      args.push(value);
    }
    let callee = self
      .module
      .get_or_insert_function(ARRAY_CALLEE, FnType::new(Type::Ptr, [Type::I64], true));
    let res = self.builder().build_call(callee, args);
    Ok(self.coerce(res, Type::Ptr))
  }

  fn array_hole(&mut self) -> Value {
    let hole = match self.module.get_global(ARRAY_HOLE) {
      Some(g) => g,
      None => self.module.add_global(Global::new(ARRAY_HOLE, Type::Ptr)),
    };
    Value::Global(hole)
  }

  /// Picks the function a call by name goes to: a function of this program,
  /// else a registered external signature, else the default one.
  fn resolve_callee(&mut self, name: &str) -> FuncId {
    if let Some(&f) = self.functions.get(name) {
      return f;
    }
    let sig = self
      .options
      .signatures
      .get(name)
      .cloned()
      .unwrap_or_else(default_sig);
    self.module.get_or_insert_function(name, sig.to_fn_type())
  }

  fn lower_call(&mut self, node: &Node<CallExpr>) -> LowerResult<Value> {
    let name = match &node.stx.callee {
      Expr::Identifier(id) => id.stx.name.as_str(),
      Expr::Member(member) => return Err(unsupported_feature(member.loc, "method calls")),
      other => return Err(unsupported_feature(other.loc(), "computed callee")),
    };
    if node.stx.optional {
      return Err(unsupported_feature(node.loc, "optional calls"));
    }
    reject_runtime_name(name, node.stx.callee.loc())?;
    match self.symbols.lookup(name) {
      Lookup::Missing => {}
      _ => {
        return Err(unsupported_feature(
          node.stx.callee.loc(),
          format!("calling variable `{name}`; only functions can be called"),
        ))
      }
    }

    let mut args = Vec::with_capacity(node.stx.arguments.len());
    for arg in node.stx.arguments.iter() {
      if let Expr::Spread(spread) = arg {
        return Err(unsupported_feature(spread.loc, "spread arguments"));
      }
      args.push(self.lower_expr(arg, Meta::value())?);
    }

    let callee = self.resolve_callee(name);
    let ty = self.module.function(callee).ty.clone();
    let mut call_args = Vec::with_capacity(args.len().max(ty.params.len()));
    for (i, param) in ty.params.iter().enumerate() {
      let arg = match args.get(i) {
        Some(&arg) => self.coerce(arg, *param),
        None => Self::missing_arg(*param),
      };
      call_args.push(arg);
    }
    if ty.variadic {
      call_args.extend(args.iter().skip(ty.params.len()).copied());
    }

    let res = self.builder().build_call(callee, call_args);
    // Calls to functions without a result evaluate to undefined.
    if ty.ret == Type::Void {
      return Ok(Value::null());
    }
    Ok(self.coerce(res, Type::Ptr))
  }

  pub(crate) fn lower_identifier(&mut self, node: &Node<Ident>, meta: Meta) -> LowerResult<Value> {
    let name = node.stx.name.as_str();
    if meta.raw_name {
      return Ok(self.bind_name(name, meta.pending, node.loc)?.value);
    }
    if name == "arguments" && self.symbols.in_function() {
      return Err(unsupported_feature(node.loc, "the arguments object"));
    }
    let (storage, known) = match self.symbols.lookup(name) {
      Lookup::Found(_, sym) => (sym.storage, sym.known),
      Lookup::Enclosing => {
        return Err(unsupported_feature(
          node.loc,
          format!("closure capture of `{name}`"),
        ))
      }
      Lookup::Missing => {
        if let Some(&f) = self.functions.get(name) {
          return Ok(Value::Func(f));
        }
        return match meta.pending {
          Some(_) => Ok(self.bind_name(name, meta.pending, node.loc)?.value),
          None => Err(LowerErrorType::UndeclaredVariable(name.to_string()).at(node.loc)),
        };
      }
    };
    // Globals that functions may overwrite are always reloaded.
    let foldable =
      self.straight_line() && !self.analysis.assigned_in_functions.contains(name);
    if let (true, Some(value)) = (foldable, known) {
      return Ok(value);
    }
    Ok(self.builder().build_load(Type::Ptr, storage.address()))
  }

  /// Strings become private constants; everything else keeps its source
  /// spelling, also as a string constant.
  fn lower_literal(&mut self, node: &Node<Lit>) -> Value {
    match node.stx.as_str() {
      Some(text) => self.builder().build_global_string(text),
      None => {
        let raw = node.stx.raw_text();
        self.builder().build_global_string(&raw)
      }
    }
  }
}
