use estree_js::ast::expr::Expr;
use estree_js::ast::pat::Pat;
use estree_js::ast::stmt::FuncBody;
use estree_js::ast::stmt::Stmt;
use estree_js::error::LoadError;
use estree_js::loc::Loc;
use estree_js::parse_program_json;

// `function f(a, b = 1) { return a; }\nf([, "x"]);` as acorn prints it.
const ACORN: &str = r#"{
  "type": "Program",
  "start": 0,
  "end": 47,
  "sourceType": "script",
  "body": [
    {
      "type": "FunctionDeclaration",
      "start": 0,
      "end": 35,
      "id": { "type": "Identifier", "start": 9, "end": 10, "name": "f" },
      "expression": false,
      "generator": false,
      "async": false,
      "params": [
        { "type": "Identifier", "start": 11, "end": 12, "name": "a" },
        {
          "type": "AssignmentPattern",
          "start": 14,
          "end": 19,
          "left": { "type": "Identifier", "start": 14, "end": 15, "name": "b" },
          "right": { "type": "Literal", "start": 18, "end": 19, "value": 1, "raw": "1" }
        }
      ],
      "body": {
        "type": "BlockStatement",
        "start": 21,
        "end": 35,
        "body": [
          {
            "type": "ReturnStatement",
            "start": 23,
            "end": 32,
            "argument": { "type": "Identifier", "start": 30, "end": 31, "name": "a" }
          }
        ]
      }
    },
    {
      "type": "ExpressionStatement",
      "start": 36,
      "end": 47,
      "expression": {
        "type": "CallExpression",
        "start": 36,
        "end": 46,
        "callee": { "type": "Identifier", "start": 36, "end": 37, "name": "f" },
        "arguments": [
          {
            "type": "ArrayExpression",
            "start": 38,
            "end": 45,
            "elements": [
              null,
              { "type": "Literal", "start": 41, "end": 44, "value": "x", "raw": "\"x\"" }
            ]
          }
        ],
        "optional": false
      }
    }
  ]
}"#;

#[test]
fn loads_acorn_output() {
  let program = parse_program_json(ACORN).unwrap();
  assert_eq!(program.loc, Loc(0, 47));
  assert_eq!(program.stx.body.len(), 2);

  let Stmt::FunctionDecl(f) = &program.stx.body[0] else {
    panic!("expected a function declaration");
  };
  assert_eq!(f.stx.id.as_ref().unwrap().stx.name, "f");
  assert!(matches!(f.stx.params[1], Pat::Assignment(_)));
  let FuncBody::Block(body) = &f.stx.body else {
    panic!("expected a block body");
  };
  assert_eq!(body.stx.body[0].loc(), Loc(23, 32));

  let Stmt::Expression(call) = &program.stx.body[1] else {
    panic!("expected an expression statement");
  };
  let Expr::Call(call) = &call.stx.expression else {
    panic!("expected a call");
  };
  let Expr::Array(arr) = &call.stx.arguments[0] else {
    panic!("expected an array argument");
  };
  assert!(arr.stx.elements[0].is_none());
  assert_eq!(arr.stx.elements[1].as_ref().unwrap().loc(), Loc(41, 44));
}

#[test]
fn unknown_node_kinds_survive_loading() {
  let program = parse_program_json(
    r#"{
      "type": "Program",
      "body": [
        {
          "type": "ClassDeclaration",
          "id": null,
          "superClass": null,
          "body": { "type": "ClassBody", "body": [] }
        },
        { "type": "ExpressionStatement", "expression": { "type": "ThisExpression" } }
      ]
    }"#,
  )
  .unwrap();
  assert_eq!(program.stx.body[0].kind(), "ClassDeclaration");
  let Stmt::Expression(stmt) = &program.stx.body[1] else {
    panic!("expected an expression statement");
  };
  assert_eq!(stmt.stx.expression.kind(), "ThisExpression");
}

#[test]
fn known_kinds_with_bad_fields_fail_to_load() {
  let err = parse_program_json(
    r#"{ "type": "Program", "body": [{ "type": "ReturnStatement", "argument": 5 }] }"#,
  )
  .unwrap_err();
  assert!(matches!(err, LoadError::Json { .. }));
  assert_eq!(err.code(), "INPUT0001");
}
