#[path = "common/mod.rs"]
mod common;

use common::*;
use llir::FnType;
use llir::InstKind;
use llir::Type;
use llir::Value;
use lower_js::lower_program;
use lower_js::FnSig;
use lower_js::LowerOptions;
use lower_js::SigType;
use lower_js::SignatureRegistry;

fn options() -> LowerOptions {
  LowerOptions::default().with_signatures(
    SignatureRegistry::new()
      .with("puts", FnSig::new(SigType::I32, [SigType::Ptr], false))
      .with("sleep", FnSig::new(SigType::Void, [SigType::I64], false))
      .with("now", FnSig::new(SigType::I64, [], false)),
  )
}

#[test]
fn registered_signatures_are_used() {
  let out = lower_program(
    &program(vec![call_stmt("puts", vec![str_lit("hi")])]),
    &options(),
  )
  .unwrap();
  let m = &out.module;
  let puts = m.function(func_id(m, "puts"));
  assert_eq!(puts.ty, FnType::new(Type::I32, [Type::Ptr], false));
  assert!(m.to_string().contains("%t0 = call i32 @puts(ptr @.str)"));
}

#[test]
fn integer_results_and_parameters_are_converted() {
  let out = lower_program(
    &program(vec![
      var("t", Some(call("now", vec![]))),
      call_stmt("sleep", vec![ident("t")]),
    ]),
    &options(),
  )
  .unwrap();
  let m = &out.module;
  let kinds = entry_kinds(m);
  assert!(matches!(kinds[0], InstKind::Call { .. }));
  assert!(matches!(kinds[1], InstKind::IntToPtr { .. }));
  assert!(matches!(kinds[2], InstKind::Store { .. }));
  assert!(matches!(kinds[3], InstKind::Load { .. }));
  assert!(matches!(kinds[4], InstKind::PtrToInt { ty, .. } if ty == Type::I64));
  assert!(matches!(kinds[5], InstKind::Call { .. }));
  llir::verify(m).unwrap();
}

#[test]
fn missing_integer_arguments_are_zero() {
  let out = lower_program(&program(vec![call_stmt("sleep", vec![])]), &options()).unwrap();
  let m = &out.module;
  assert!(matches!(
    &entry_kinds(m)[0],
    InstKind::Call { args, .. } if args == &vec![Value::i64(0)]
  ));
}

#[test]
fn unregistered_names_use_the_default() {
  let out = lower_ok(vec![call_stmt("log", vec![str_lit("a"), str_lit("b")])]);
  let text = out.module.to_string();
  assert!(text.contains("call void (ptr, ...) @log(ptr @.str, ptr @.str.1)"), "{text}");
  assert!(text.contains("declare void @log(ptr, ...)"), "{text}");
}

#[test]
fn program_functions_shadow_registered_ones() {
  let out = lower_program(
    &program(vec![
      func("puts", &["s"], vec![]),
      call_stmt("puts", vec![str_lit("x")]),
    ]),
    &options(),
  )
  .unwrap();
  let m = &out.module;
  let puts = m.function(func_id(m, "puts"));
  assert_eq!(puts.ty, FnType::new(Type::Ptr, [Type::Ptr], false));
}
