use super::pat::Binding;
use super::Lowerer;
use super::Meta;
use super::FORIN_COUNT_CALLEE;
use super::FORIN_KEY_CALLEE;
use crate::error::unsupported_feature;
use crate::error::LowerErrorType;
use crate::error::LowerResult;
use crate::symbol::Lookup;
use estree_js::ast::expr::Expr;
use estree_js::ast::node::Node;
use estree_js::ast::pat::Pat;
use estree_js::ast::stmt::ForInLeft;
use estree_js::ast::stmt::ForInStmt;
use estree_js::ast::stmt::Stmt;
use estree_js::ast::stmt::VarDecl;
use estree_js::loc::Loc;
use llir::FnType;
use llir::IntPredicate;
use llir::Type;
use llir::Value;

impl<'a> Lowerer<'a> {
  /// Counted and conditional loops are not lowered.
  pub(crate) fn lower_iteration(&mut self, stmt: &Stmt) -> LowerResult<()> {
    Err(LowerErrorType::UnsupportedStatementType(stmt.kind().to_string()).at(stmt.loc()))
  }

  /// Lowers `for (k in obj) body` to a counted walk over the runtime's key
  /// list for `obj`:
  ///
  /// ```text
  ///   %n = call i64 @__js_forin_count(ptr %obj)
  ///   store i64 0, ptr %i
  ///   br label %forin.cond
  /// forin.cond:
  ///   %more = icmp slt i64 %i.cur, %n
  ///   br i1 %more, label %forin.body, label %forin.done
  /// forin.body:
  ///   %k = call ptr @__js_forin_key(ptr %obj, i64 %i.cur)
  ///   ; k = %k, then the body, then %i += 1
  ///   br label %forin.cond
  /// forin.done:
  /// ```
  pub(crate) fn lower_for_in(&mut self, node: &Node<ForInStmt>) -> LowerResult<()> {
    let target = match &node.stx.left {
      ForInLeft::Decl(decl) => self.for_in_decl_target(decl)?,
      ForInLeft::Target(Expr::Identifier(id)) => self.existing_binding(&id.stx.name, id.loc)?,
      ForInLeft::Target(Expr::Member(m)) => {
        return Err(unsupported_feature(m.loc, "member expressions as for-in targets"))
      }
      ForInLeft::Target(other) => {
        return Err(LowerErrorType::UnsupportedPatternType(other.kind().to_string()).at(other.loc()))
      }
    };
    let obj = self.lower_expr(&node.stx.right, Meta::value())?;

    let count_fn = self.module.get_or_insert_function(
      FORIN_COUNT_CALLEE,
      FnType::new(Type::I64, [Type::Ptr], false),
    );
    let key_fn = self.module.get_or_insert_function(
      FORIN_KEY_CALLEE,
      FnType::new(Type::Ptr, [Type::Ptr, Type::I64], false),
    );

    let mut b = self.builder();
    let count = b.build_call(count_fn, vec![obj]);
    let index = b.build_entry_alloca(Type::I64);
    b.build_store(Value::i64(0), index);
    let cond = b.append_block("forin.cond");
    let body = b.append_block("forin.body");
    let done = b.append_block("forin.done");
    b.build_br(cond);

    b.position_at_end(cond);
    let current = b.build_load(Type::I64, index);
    let more = b.build_icmp(IntPredicate::Slt, current, count);
    b.build_cond_br(more, body, done);

    b.position_at_end(body);
    let current = b.build_load(Type::I64, index);
    let key = b.build_call(key_fn, vec![obj, current]);
    self.at.block = body;

    self.loop_depth += 1;
    self.store(&target, key);
    let lowered = self.lower_stmt(&node.stx.body);
    self.loop_depth -= 1;
    lowered?;

    // The body may have moved the insertion point into blocks of its own.
    let mut b = self.builder();
    let current = b.build_load(Type::I64, index);
    let next = b.build_add(current, Value::i64(1));
    b.build_store(next, index);
    b.build_br(cond);
    self.at.block = done;
    Ok(())
  }

  fn for_in_decl_target(&mut self, decl: &Node<VarDecl>) -> LowerResult<Binding> {
    let [declarator] = decl.stx.declarations.as_slice() else {
      return Err(unsupported_feature(decl.loc, "for-in heads declaring more than one name"));
    };
    if declarator.stx.init.is_some() {
      return Err(unsupported_feature(declarator.loc, "for-in head initializers"));
    }
    // Redeclaring keeps the slot and its contents.
    if let Pat::Identifier(id) = &declarator.stx.id {
      if self.symbols.current(&id.stx.name).is_some() {
        return self.existing_binding(&id.stx.name, id.loc);
      }
    }
    self.lower_pat(&declarator.stx.id, Meta::binding(Value::null()))
  }

  /// A binding for a name that must already have storage.
  fn existing_binding(&mut self, name: &str, loc: Loc) -> LowerResult<Binding> {
    let (frame, storage) = match self.symbols.lookup(name) {
      Lookup::Found(frame, sym) => (frame, sym.storage),
      Lookup::Enclosing => {
        return Err(unsupported_feature(loc, format!("closure capture of `{name}`")))
      }
      Lookup::Missing => {
        return Err(LowerErrorType::UndeclaredVariable(name.to_string()).at(loc))
      }
    };
    Ok(Binding {
      name: name.to_string(),
      frame,
      storage,
      value: Value::null(),
    })
  }
}

