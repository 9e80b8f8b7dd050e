use super::reject_runtime_name;
use super::Lowerer;
use super::Meta;
use crate::error::unsupported_feature;
use crate::error::LowerResult;
use crate::error::LowerWarningType;
use estree_js::ast::node::Node;
use estree_js::ast::pat::Pat;
use estree_js::ast::stmt::FuncBody;
use estree_js::ast::stmt::FuncDecl;
use llir::FnType;
use llir::FuncId;
use llir::InsertPoint;
use llir::Linkage;
use llir::Type;
use llir::Value;
use tracing::debug;
use tracing::debug_span;

impl<'a> Lowerer<'a> {
  /// Adds `ptr name(ptr, ...)` with one `ptr` per declared parameter and
  /// records it as a function of this program.
  pub(crate) fn declare_function(&mut self, node: &Node<FuncDecl>) -> LowerResult<FuncId> {
    let Some(id) = &node.stx.id else {
      return Err(unsupported_feature(node.loc, "anonymous function declarations"));
    };
    let name = id.stx.name.as_str();
    if node.stx.generator {
      return Err(unsupported_feature(node.loc, "generator functions"));
    }
    if node.stx.is_async {
      return Err(unsupported_feature(node.loc, "async functions"));
    }
    if name == self.options.entry_name {
      return Err(unsupported_feature(
        id.loc,
        format!("function `{name}` clashes with the entry function"),
      ));
    }
    reject_runtime_name(name, id.loc)?;
    if self.functions.contains_key(name) {
      return Err(unsupported_feature(
        id.loc,
        format!("function `{name}` is declared more than once"),
      ));
    }
    if self.module.get_function(name).is_some() || self.module.get_global(name).is_some() {
      return Err(unsupported_feature(
        id.loc,
        format!("function `{name}` clashes with a symbol already in the module"),
      ));
    }
    let ty = FnType::new(Type::Ptr, vec![Type::Ptr; node.stx.params.len()], false);
    let func = self.module.add_function(name, ty, Linkage::External);
    self.functions.insert(name.to_string(), func);
    Ok(func)
  }

  /// Lowers a function body into its own IR function. The caller's
  /// insertion point is restored afterwards.
  pub(crate) fn lower_function(&mut self, node: &Node<FuncDecl>) -> LowerResult<()> {
    let name = node
      .stx
      .id
      .as_ref()
      .map(|id| id.stx.name.clone())
      .unwrap_or_default();
    let func = match self.functions.get(&name) {
      Some(&func) => func,
      None => self.declare_function(node)?,
    };
    let span = debug_span!("lower_function", name = name.as_str());
    let _guard = span.enter();

    let entry = self.module.function_mut(func).append_block("entry");
    let caller = self.at;
    let caller_loop_depth = self.loop_depth;
    self.at = InsertPoint { func, block: entry };
    self.loop_depth = 0;
    self.symbols.push_function(&name);

    let res = self.lower_function_body(node);

    self.symbols.pop_function();
    self.at = caller;
    self.loop_depth = caller_loop_depth;
    res?;

    let pruned = self.module.function_mut(func).remove_unreachable_blocks();
    debug!(pruned, "finished function");
    Ok(())
  }

  fn lower_function_body(&mut self, node: &Node<FuncDecl>) -> LowerResult<()> {
    for (i, param) in node.stx.params.iter().enumerate() {
      let arg = Value::Param(i as u32);
      let target = match param {
        Pat::Assignment(default) => {
          self.warn(
            LowerWarningType::IgnoredDefaultParameter(param_name(&default.stx.left)),
            default.loc,
          );
          &default.stx.left
        }
        other => other,
      };
      if let Some(Some(_)) = node.stx.defaults.get(i) {
        self.warn(
          LowerWarningType::IgnoredDefaultParameter(param_name(target)),
          target.loc(),
        );
      }
      let binding = self.lower_pat(target, Meta::binding(arg))?;
      self.symbols.mark_param(&binding.name, i as u32);
    }

    match &node.stx.body {
      FuncBody::Block(block) => {
        self.lower_stmts(&block.stx.body)?;
        if !self.builder().is_terminated() {
          self.builder().build_ret(Some(Value::null()));
        }
      }
      FuncBody::Expression(expr) => {
        let value = self.lower_expr(expr, Meta::value())?;
        self.builder().build_ret(Some(value));
      }
    }
    Ok(())
  }
}

fn param_name(pat: &Pat) -> String {
  match pat {
    Pat::Identifier(id) => id.stx.name.clone(),
    other => other.kind().to_string(),
  }
}
