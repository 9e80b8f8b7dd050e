pub mod expr;
pub mod node;
pub mod pat;
pub mod stmt;

use derive_visitor::{Drive, DriveMut};
use serde::Deserialize;
use stmt::Stmt;

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct Program {
  pub body: Vec<Stmt>,
  // "script" or "module"; older producers omit it.
  #[drive(skip)]
  #[serde(default, rename = "sourceType")]
  pub source_type: Option<String>,
}
