use super::Lowerer;
use super::Meta;
use crate::error::unsupported_feature;
use crate::error::LowerErrorType;
use crate::error::LowerResult;
use crate::error::LowerWarningType;
use estree_js::ast::expr::Expr;
use estree_js::ast::node::Node;
use estree_js::ast::pat::Pat;
use estree_js::ast::stmt::ExprStmt;
use estree_js::ast::stmt::ReturnStmt;
use estree_js::ast::stmt::Stmt;
use estree_js::ast::stmt::VarDecl;
use llir::Value;
use tracing::trace;

impl<'a> Lowerer<'a> {
  /// Lowers a statement list in order, after declaring the functions it
  /// contains so calls may precede their declarations.
  pub(crate) fn lower_stmts(&mut self, stmts: &[Stmt]) -> LowerResult<()> {
    self.hoist_functions(stmts)?;
    for stmt in stmts {
      self.lower_stmt(stmt)?;
    }
    Ok(())
  }

  fn hoist_functions(&mut self, stmts: &[Stmt]) -> LowerResult<()> {
    for stmt in stmts {
      if let Stmt::FunctionDecl(decl) = stmt {
        self.declare_function(decl)?;
      }
    }
    Ok(())
  }

  pub(crate) fn lower_stmt(&mut self, stmt: &Stmt) -> LowerResult<()> {
    trace!(kind = stmt.kind(), start = stmt.loc().0, "lowering statement");
    match stmt {
      // Nested blocks share the enclosing function's blocks and frame.
      Stmt::Block(n) => self.lower_stmts(&n.stx.body),
      Stmt::Expression(n) => self.lower_expr_stmt(n),
      Stmt::VarDecl(n) => self.lower_var_decl(n),
      Stmt::FunctionDecl(n) => self.lower_function(n),
      Stmt::ForIn(n) => self.lower_for_in(n),
      Stmt::For(_) | Stmt::While(_) | Stmt::DoWhile(_) => self.lower_iteration(stmt),
      Stmt::Return(n) => self.lower_return(n),
      Stmt::Unsupported(n) => {
        Err(LowerErrorType::UnsupportedStatementType(n.stx.kind.clone()).at(n.loc))
      }
    }
  }

  fn lower_expr_stmt(&mut self, node: &Node<ExprStmt>) -> LowerResult<()> {
    match &node.stx.expression {
      e @ Expr::Call(_) => {
        self.lower_expr(e, Meta::value())?;
        Ok(())
      }
      other => {
        Err(LowerErrorType::UnsupportedExpressionType(other.kind().to_string()).at(other.loc()))
      }
    }
  }

  /// `var`, `let` and `const` all bind in the current frame.
  pub(crate) fn lower_var_decl(&mut self, node: &Node<VarDecl>) -> LowerResult<()> {
    for decl in node.stx.declarations.iter() {
      let Some(init) = &decl.stx.init else {
        let name = match &decl.stx.id {
          Pat::Identifier(id) => id.stx.name.clone(),
          other => {
            return Err(
              LowerErrorType::UnsupportedPatternType(other.kind().to_string()).at(other.loc()),
            )
          }
        };
        self.warn(LowerWarningType::UninitializedDeclaration(name), decl.loc);
        continue;
      };
      let value = self.lower_expr(init, Meta::value())?;
      self.lower_pat(&decl.stx.id, Meta::binding(value))?;
    }
    Ok(())
  }

  fn lower_return(&mut self, node: &Node<ReturnStmt>) -> LowerResult<()> {
    if !self.symbols.in_function() {
      return Err(unsupported_feature(node.loc, "return outside of a function"));
    }
    let value = match &node.stx.argument {
      Some(arg) => self.lower_expr(arg, Meta::value())?,
      None => Value::null(),
    };
    self.builder().build_ret(Some(value));
    self.continue_in_new_block("after.ret");
    Ok(())
  }
}
