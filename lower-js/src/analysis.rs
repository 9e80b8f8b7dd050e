use crate::error::unsupported_feature;
use crate::error::LowerResult;
use ahash::HashMap;
use ahash::HashSet;
use derive_visitor::Drive;
use derive_visitor::Visitor;
use estree_js::ast::expr::Expr;
use estree_js::ast::node::Node;
use estree_js::ast::pat::Pat;
use estree_js::ast::stmt::ForInLeft;
use estree_js::ast::stmt::ForInStmt;
use estree_js::ast::stmt::FuncDecl;
use estree_js::ast::stmt::VarDeclarator;
use estree_js::ast::Program;
use estree_js::loc::Loc;

type FuncDeclNode = Node<FuncDecl>;
type VarDeclaratorNode = Node<VarDeclarator>;
type ForInStmtNode = Node<ForInStmt>;

#[derive(Default, Visitor)]
#[visitor(FuncDeclNode, VarDeclaratorNode(enter), ForInStmtNode(enter))]
struct DeclVisitor {
  // Nesting depth of function declarations; 0 is top-level code.
  depth: usize,
  globals: HashMap<String, Loc>,
  functions: Vec<(String, Loc)>,
  assigned_in_functions: HashSet<String>,
}

impl DeclVisitor {
  fn enter_func_decl_node(&mut self, node: &Node<FuncDecl>) {
    if let Some(id) = &node.stx.id {
      self.functions.push((id.stx.name.clone(), node.loc));
    }
    self.depth += 1;
  }

  fn exit_func_decl_node(&mut self, _node: &Node<FuncDecl>) {
    self.depth -= 1;
  }

  fn enter_var_declarator_node(&mut self, node: &Node<VarDeclarator>) {
    if self.depth == 0 {
      if let Pat::Identifier(id) = &node.stx.id {
        self.globals.entry(id.stx.name.clone()).or_insert(node.loc);
      }
    }
  }

  fn enter_for_in_stmt_node(&mut self, node: &Node<ForInStmt>) {
    if self.depth > 0 {
      if let ForInLeft::Target(Expr::Identifier(id)) = &node.stx.left {
        self.assigned_in_functions.insert(id.stx.name.clone());
      }
    }
  }
}

/// Declaration facts gathered before any IR is emitted.
#[derive(Debug, Default)]
pub struct DeclAnalysis {
  /// Names declared by top-level `var`/`let`/`const`, including for-in heads.
  pub globals: HashMap<String, Loc>,
  /// Names of every function declaration, nested ones included, in source
  /// order.
  pub functions: Vec<(String, Loc)>,
  /// Names used as for-in targets inside function bodies. If such a name is
  /// a global, functions can change it behind top-level code's back.
  pub assigned_in_functions: HashSet<String>,
}

impl DeclAnalysis {
  /// Fails if a function shares its name with a global variable, another
  /// function, or the entry function.
  pub fn run(program: &Node<Program>, entry_name: &str) -> LowerResult<DeclAnalysis> {
    let mut visitor = DeclVisitor::default();
    program.drive(&mut visitor);

    let mut seen = HashSet::default();
    for (name, loc) in visitor.functions.iter() {
      if name == entry_name {
        return Err(unsupported_feature(
          *loc,
          format!("function `{name}` clashes with the entry function"),
        ));
      }
      if visitor.globals.contains_key(name) {
        return Err(unsupported_feature(
          *loc,
          format!("function `{name}` shares its name with a global variable"),
        ));
      }
      if !seen.insert(name.as_str()) {
        return Err(unsupported_feature(
          *loc,
          format!("function `{name}` is declared more than once"),
        ));
      }
    }

    Ok(DeclAnalysis {
      globals: visitor.globals,
      functions: visitor.functions,
      assigned_in_functions: visitor.assigned_in_functions,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::LowerErrorType;
  use serde_json::json;

  fn program(body: serde_json::Value) -> Node<Program> {
    estree_js::program_from_value(json!({ "type": "Program", "body": body })).unwrap()
  }

  fn func(name: &str, body: serde_json::Value) -> serde_json::Value {
    json!({
      "type": "FunctionDeclaration",
      "id": { "type": "Identifier", "name": name },
      "params": [],
      "body": { "type": "BlockStatement", "body": body }
    })
  }

  fn var(name: &str) -> serde_json::Value {
    json!({
      "type": "VariableDeclaration",
      "kind": "var",
      "declarations": [{
        "type": "VariableDeclarator",
        "id": { "type": "Identifier", "name": name },
        "init": { "type": "Literal", "value": 1, "raw": "1" }
      }]
    })
  }

  #[test]
  fn collects_globals_and_functions() {
    let p = program(json!([
      var("a"),
      func("f", json!([var("local"), func("g", json!([]))])),
      { "type": "BlockStatement", "body": [var("b")] }
    ]));
    let analysis = DeclAnalysis::run(&p, "main").unwrap();
    let mut globals = analysis.globals.keys().cloned().collect::<Vec<_>>();
    globals.sort();
    assert_eq!(globals, vec!["a", "b"]);
    let functions = analysis
      .functions
      .iter()
      .map(|(n, _)| n.as_str())
      .collect::<Vec<_>>();
    assert_eq!(functions, vec!["f", "g"]);
  }

  #[test]
  fn for_in_targets_inside_functions_are_tracked() {
    let p = program(json!([func("f", json!([{
      "type": "ForInStatement",
      "left": { "type": "Identifier", "name": "k" },
      "right": { "type": "Identifier", "name": "o" },
      "body": { "type": "BlockStatement", "body": [] }
    }]))]));
    let analysis = DeclAnalysis::run(&p, "main").unwrap();
    assert!(analysis.assigned_in_functions.contains("k"));
  }

  #[test]
  fn function_sharing_a_global_name_fails() {
    let p = program(json!([func("a", json!([])), var("a")]));
    let err = DeclAnalysis::run(&p, "main").unwrap_err();
    assert!(matches!(err.typ, LowerErrorType::UnsupportedFeature(_)));
  }

  #[test]
  fn nested_function_named_like_the_entry_fails() {
    let p = program(json!([func("f", json!([func("start", json!([]))]))]));
    assert!(DeclAnalysis::run(&p, "main").is_ok());
    assert!(DeclAnalysis::run(&p, "start").is_err());
  }
}
