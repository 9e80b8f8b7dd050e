#![allow(dead_code)]

use estree_js::ast::node::Node;
use estree_js::ast::Program;
use llir::FuncId;
use llir::InstKind;
use llir::Module;
use lower_js::lower_program;
use lower_js::LowerOptions;
use lower_js::LowerOutput;
use lower_js::LowerResult;
use serde_json::json;
use serde_json::Value;

// ESTree builders. Offsets are left out unless a test checks them.

pub fn ident(name: &str) -> Value {
  json!({ "type": "Identifier", "name": name })
}

pub fn str_lit(value: &str) -> Value {
  json!({ "type": "Literal", "value": value, "raw": format!("{value:?}") })
}

pub fn num_lit(value: i64) -> Value {
  json!({ "type": "Literal", "value": value, "raw": value.to_string() })
}

pub fn call(callee: &str, args: Vec<Value>) -> Value {
  json!({ "type": "CallExpression", "callee": ident(callee), "arguments": args })
}

pub fn member(object: &str, property: &str) -> Value {
  json!({
    "type": "MemberExpression",
    "object": ident(object),
    "property": ident(property),
    "computed": false
  })
}

pub fn array(elements: Vec<Value>) -> Value {
  json!({ "type": "ArrayExpression", "elements": elements })
}

pub fn expr_stmt(expression: Value) -> Value {
  json!({ "type": "ExpressionStatement", "expression": expression })
}

pub fn call_stmt(callee: &str, args: Vec<Value>) -> Value {
  expr_stmt(call(callee, args))
}

pub fn var(name: &str, init: Option<Value>) -> Value {
  json!({
    "type": "VariableDeclaration",
    "kind": "var",
    "declarations": [{
      "type": "VariableDeclarator",
      "id": ident(name),
      "init": init
    }]
  })
}

pub fn block(body: Vec<Value>) -> Value {
  json!({ "type": "BlockStatement", "body": body })
}

pub fn ret(argument: Option<Value>) -> Value {
  json!({ "type": "ReturnStatement", "argument": argument })
}

pub fn func_with_params(name: &str, params: Vec<Value>, body: Vec<Value>) -> Value {
  json!({
    "type": "FunctionDeclaration",
    "id": ident(name),
    "params": params,
    "body": block(body),
    "generator": false,
    "async": false
  })
}

pub fn func(name: &str, params: &[&str], body: Vec<Value>) -> Value {
  func_with_params(name, params.iter().map(|p| ident(p)).collect(), body)
}

pub fn for_in_var(name: &str, right: Value, body: Vec<Value>) -> Value {
  json!({
    "type": "ForInStatement",
    "left": {
      "type": "VariableDeclaration",
      "kind": "var",
      "declarations": [{ "type": "VariableDeclarator", "id": ident(name), "init": null }]
    },
    "right": right,
    "body": block(body)
  })
}

pub fn for_in_target(target: Value, right: Value, body: Vec<Value>) -> Value {
  json!({
    "type": "ForInStatement",
    "left": target,
    "right": right,
    "body": block(body)
  })
}

pub fn program(body: Vec<Value>) -> Node<Program> {
  estree_js::program_from_value(json!({
    "type": "Program",
    "sourceType": "script",
    "body": body
  }))
  .expect("valid ESTree program")
}

pub fn lower(body: Vec<Value>) -> LowerResult<LowerOutput> {
  lower_program(&program(body), &LowerOptions::default())
}

pub fn lower_ok(body: Vec<Value>) -> LowerOutput {
  match lower(body) {
    Ok(out) => out,
    Err(err) => panic!("lowering failed: {err:?}"),
  }
}

pub fn lower_err_code(body: Vec<Value>) -> &'static str {
  match lower(body) {
    Ok(out) => panic!("expected lowering to fail, got:\n{}", out.module),
    Err(err) => err.typ.code(),
  }
}

pub fn func_id(module: &Module, name: &str) -> FuncId {
  module
    .get_function(name)
    .unwrap_or_else(|| panic!("no function @{name}"))
}

/// Instruction kinds of one block of `func`, by label.
pub fn block_kinds(module: &Module, func: &str, label: &str) -> Vec<InstKind> {
  let f = module.function(func_id(module, func));
  let block = f
    .layout()
    .iter()
    .copied()
    .find(|&b| f.block(b).name == label)
    .unwrap_or_else(|| panic!("no block {label} in @{func}"));
  f.block_insts(block).map(|(_, inst)| inst.kind.clone()).collect()
}

pub fn entry_kinds(module: &Module) -> Vec<InstKind> {
  block_kinds(module, "main", "entry")
}

pub fn block_labels(module: &Module, func: &str) -> Vec<String> {
  let f = module.function(func_id(module, func));
  f.layout().iter().map(|&b| f.block(b).name.clone()).collect()
}
