use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

#[test]
fn writes_the_module_and_reports_warnings() {
  let dir = tempdir().unwrap();
  let out = dir.path().join("nested").join("app.ll");
  Command::cargo_bin("lower-js")
    .unwrap()
    .arg("--input")
    .arg(fixture("hello.json"))
    .arg("--output")
    .arg(&out)
    .assert()
    .success()
    .stderr(contains("warning[LOWER1002]"));

  let ir = fs::read_to_string(&out).unwrap();
  assert!(ir.starts_with("; ModuleID = 'app'\n"), "{ir}");
  assert!(ir.contains("@x = global ptr @.str"), "{ir}");
  assert!(ir.contains("call void (ptr, ...) @print(ptr @.str)"), "{ir}");
  assert!(ir.contains("ret i32 0"), "{ir}");
}

#[test]
fn reads_stdin_and_defaults_to_build_dir() {
  let dir = tempdir().unwrap();
  let json = fs::read_to_string(fixture("hello.json")).unwrap();
  Command::cargo_bin("lower-js")
    .unwrap()
    .current_dir(dir.path())
    .args(["--module-name", "hello"])
    .write_stdin(json)
    .assert()
    .success();

  let ir = fs::read_to_string(dir.path().join("build").join("app.ll")).unwrap();
  assert!(ir.contains("source_filename = \"hello\""), "{ir}");
}

#[test]
fn lowering_errors_fail_without_output() {
  let dir = tempdir().unwrap();
  let out = dir.path().join("app.ll");
  Command::cargo_bin("lower-js")
    .unwrap()
    .arg("--input")
    .arg(fixture("undeclared.json"))
    .arg("--source")
    .arg(fixture("undeclared.js"))
    .arg("--output")
    .arg(&out)
    .assert()
    .failure()
    .stderr(contains("error[LOWER0005]: use of undeclared variable `nope`"))
    .stderr(contains("undeclared.js:1:7"));
  assert!(!out.exists());
}

#[test]
fn malformed_input_is_reported() {
  let dir = tempdir().unwrap();
  Command::cargo_bin("lower-js")
    .unwrap()
    .current_dir(dir.path())
    .write_stdin(r#"{ "type": "Identifier", "name": "x" }"#)
    .assert()
    .failure()
    .stderr(contains("INPUT0002"));
}

#[test]
fn signature_file_and_symbol_dump() {
  let dir = tempdir().unwrap();
  let out = dir.path().join("app.ll");
  let symbols = dir.path().join("symbols.json");
  Command::cargo_bin("lower-js")
    .unwrap()
    .arg("--input")
    .arg(fixture("puts.json"))
    .arg("--signatures")
    .arg(fixture("signatures.json"))
    .arg("--output")
    .arg(&out)
    .arg("--emit-symbols")
    .arg(&symbols)
    .assert()
    .success();

  let ir = fs::read_to_string(&out).unwrap();
  assert!(ir.contains("call i32 @puts(ptr @.str)"), "{ir}");
  assert!(ir.contains("declare i32 @puts(ptr)"), "{ir}");

  let dump = fs::read_to_string(&symbols).unwrap();
  assert!(dump.contains("\"frames\""), "{dump}");
  assert!(dump.contains("\"kind\": \"global\""), "{dump}");
}

#[test]
fn warnings_are_reported_in_source_order() {
  let dir = tempdir().unwrap();
  let json = r#"{
    "type": "Program",
    "body": [
      {
        "type": "FunctionDeclaration",
        "range": [0, 22],
        "id": { "type": "Identifier", "name": "f", "range": [9, 10] },
        "params": [{
          "type": "AssignmentPattern",
          "range": [11, 18],
          "left": { "type": "Identifier", "name": "a", "range": [11, 12] },
          "right": { "type": "Literal", "value": "d", "raw": "\"d\"", "range": [15, 18] }
        }],
        "body": { "type": "BlockStatement", "range": [20, 22], "body": [] }
      },
      {
        "type": "VariableDeclaration",
        "kind": "var",
        "range": [23, 29],
        "declarations": [{
          "type": "VariableDeclarator",
          "range": [27, 28],
          "id": { "type": "Identifier", "name": "y", "range": [27, 28] },
          "init": null
        }]
      }
    ]
  }"#;
  let assert = Command::cargo_bin("lower-js")
    .unwrap()
    .current_dir(dir.path())
    .write_stdin(json)
    .assert()
    .success();
  let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
  let first = stderr.find("warning[LOWER1001]").unwrap();
  let second = stderr.find("warning[LOWER1002]").unwrap();
  assert!(first < second, "{stderr}");
}
