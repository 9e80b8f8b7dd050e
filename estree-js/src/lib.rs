//! ESTree syntax trees for the lowering pipeline.
//!
//! Parsing JavaScript is left to an external ESTree producer (esprima, acorn,
//! espree, ...). This crate models the subset of node kinds downstream passes
//! understand as closed sum types; every other node kind is preserved as an
//! `Unsupported` node carrying its ESTree `type`, so rejecting it is the
//! consumer's decision rather than the loader's.

pub mod ast;
pub mod error;
pub mod loc;

use ast::node::node_type;
use ast::node::Node;
use ast::Program;
use error::LoadError;
use error::LoadResult;
use loc::Loc;
use serde::Deserialize;
use serde_json::Value;

/// Decodes an ESTree `Program` from its JSON serialization.
pub fn parse_program_json(json: &str) -> LoadResult<Node<Program>> {
  let value: Value = serde_json::from_str(json).map_err(LoadError::from_json)?;
  program_from_value(value)
}

/// Decodes an ESTree `Program` from an already-parsed JSON value.
pub fn program_from_value(value: Value) -> LoadResult<Node<Program>> {
  match node_type(&value) {
    Some("Program") => {}
    other => {
      return Err(LoadError::NotAProgram {
        found: other.map(str::to_string),
        loc: Loc::from_estree(&value),
      })
    }
  }
  Node::<Program>::deserialize(value).map_err(LoadError::from_json)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::stmt::Stmt;

  #[test]
  fn decodes_a_program() {
    let program = parse_program_json(
      r#"{
        "type": "Program",
        "sourceType": "script",
        "range": [0, 9],
        "body": [{
          "type": "ExpressionStatement",
          "range": [0, 9],
          "expression": {
            "type": "CallExpression",
            "callee": { "type": "Identifier", "name": "print" },
            "arguments": []
          }
        }]
      }"#,
    )
    .unwrap();
    assert_eq!(program.loc, Loc(0, 9));
    assert_eq!(program.stx.source_type.as_deref(), Some("script"));
    assert!(matches!(program.stx.body[0], Stmt::Expression(_)));
  }

  #[test]
  fn rejects_non_program_roots() {
    let err = parse_program_json(r#"{ "type": "Identifier", "name": "x" }"#).unwrap_err();
    assert!(matches!(
      err,
      LoadError::NotAProgram { found: Some(ref kind), .. } if kind == "Identifier"
    ));
  }

  #[test]
  fn rejects_invalid_json() {
    let err = parse_program_json("{").unwrap_err();
    assert!(matches!(err, LoadError::Json { .. }));
  }
}
