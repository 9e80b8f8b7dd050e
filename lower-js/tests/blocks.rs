#[path = "common/mod.rs"]
mod common;

use common::*;
use llir::InstKind;
use llir::Value;
use lower_js::symbol::Storage;

#[test]
fn nested_blocks_lower_in_place() {
  // { var x = "hi"; g(); function g() { print(x) } } print(x);
  let out = lower_ok(vec![
    block(vec![
      var("x", Some(str_lit("hi"))),
      call_stmt("g", vec![]),
      func("g", &[], vec![call_stmt("print", vec![ident("x")])]),
    ]),
    call_stmt("print", vec![ident("x")]),
  ]);
  let m = &out.module;
  assert_eq!(block_labels(m, "main"), vec!["entry"]);

  let hi = Value::Global(m.get_global(".str").unwrap());
  assert_eq!(entry_kinds(m), vec![
    InstKind::Call {
      callee: func_id(m, "g"),
      args: vec![],
    },
    InstKind::Call {
      callee: func_id(m, "print"),
      args: vec![hi],
    },
    InstKind::Ret {
      value: Some(Value::i32(0)),
    },
  ]);
  assert!(matches!(
    out.symbols[0].get("x").unwrap().storage,
    Storage::Global { .. }
  ));
}

#[test]
fn blocks_inside_functions_share_the_function_frame() {
  let out = lower_ok(vec![func("f", &[], vec![
    block(vec![var("y", Some(str_lit("a")))]),
    ret(Some(ident("y"))),
  ])]);
  let m = &out.module;
  assert_eq!(block_labels(m, "f"), vec!["entry"]);
  let frame = &out.symbols[1];
  assert_eq!(frame.function.as_deref(), Some("f"));
  assert!(matches!(
    frame.get("y").unwrap().storage,
    Storage::Local { .. }
  ));
  assert!(out.symbols[0].get("y").is_none());
}
