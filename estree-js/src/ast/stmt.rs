use super::expr::Expr;
use super::expr::Ident;
use super::node::decode;
use super::node::require_node_type;
use super::node::unsupported;
use super::node::Node;
use super::node::UnsupportedNode;
use super::pat::Pat;
use crate::loc::Loc;
use derive_more::derive::{From, TryInto};
use derive_visitor::{Drive, DriveMut};
use serde::Deserialize;
use serde::Deserializer;
use serde_json::Value;

// We must wrap each variant with Node<T> as otherwise we won't be able to visit Node<T> instead of just T.
#[derive(Debug, Drive, DriveMut, From, TryInto)]
pub enum Stmt {
  Block(Node<BlockStmt>),
  DoWhile(Node<DoWhileStmt>),
  Expression(Node<ExprStmt>),
  For(Node<ForStmt>),
  ForIn(Node<ForInStmt>),
  FunctionDecl(Node<FuncDecl>),
  Return(Node<ReturnStmt>),
  VarDecl(Node<VarDecl>),
  While(Node<WhileStmt>),
  Unsupported(Node<UnsupportedNode>),
}

impl Stmt {
  /// The ESTree `type` of this statement.
  pub fn kind(&self) -> &str {
    match self {
      Stmt::Block(_) => "BlockStatement",
      Stmt::DoWhile(_) => "DoWhileStatement",
      Stmt::Expression(_) => "ExpressionStatement",
      Stmt::For(_) => "ForStatement",
      Stmt::ForIn(_) => "ForInStatement",
      Stmt::FunctionDecl(_) => "FunctionDeclaration",
      Stmt::Return(_) => "ReturnStatement",
      Stmt::VarDecl(_) => "VariableDeclaration",
      Stmt::While(_) => "WhileStatement",
      Stmt::Unsupported(n) => &n.stx.kind,
    }
  }

  pub fn loc(&self) -> Loc {
    match self {
      Stmt::Block(n) => n.loc,
      Stmt::DoWhile(n) => n.loc,
      Stmt::Expression(n) => n.loc,
      Stmt::For(n) => n.loc,
      Stmt::ForIn(n) => n.loc,
      Stmt::FunctionDecl(n) => n.loc,
      Stmt::Return(n) => n.loc,
      Stmt::VarDecl(n) => n.loc,
      Stmt::While(n) => n.loc,
      Stmt::Unsupported(n) => n.loc,
    }
  }
}

impl<'de> Deserialize<'de> for Stmt {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let kind = require_node_type::<D::Error>(&value)?;
    Ok(match kind.as_str() {
      "BlockStatement" => Stmt::Block(decode::<_, D::Error>(value)?),
      "DoWhileStatement" => Stmt::DoWhile(decode::<_, D::Error>(value)?),
      "ExpressionStatement" => Stmt::Expression(decode::<_, D::Error>(value)?),
      "ForStatement" => Stmt::For(decode::<_, D::Error>(value)?),
      "ForInStatement" => Stmt::ForIn(decode::<_, D::Error>(value)?),
      "FunctionDeclaration" => Stmt::FunctionDecl(decode::<_, D::Error>(value)?),
      "ReturnStatement" => Stmt::Return(decode::<_, D::Error>(value)?),
      "VariableDeclaration" => Stmt::VarDecl(decode::<_, D::Error>(value)?),
      "WhileStatement" => Stmt::While(decode::<_, D::Error>(value)?),
      _ => Stmt::Unsupported(unsupported(kind, &value)),
    })
  }
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct BlockStmt {
  pub body: Vec<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct DoWhileStmt {
  pub body: Stmt,
  pub test: Expr,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct ExprStmt {
  pub expression: Expr,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct ForStmt {
  pub init: Option<ForInit>,
  pub test: Option<Expr>,
  pub update: Option<Expr>,
  pub body: Stmt,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct ForInStmt {
  pub left: ForInLeft,
  pub right: Expr,
  pub body: Stmt,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct WhileStmt {
  pub test: Expr,
  pub body: Stmt,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct ReturnStmt {
  pub argument: Option<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarDeclKind {
  Var,
  Let,
  Const,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct VarDecl {
  #[drive(skip)]
  pub kind: VarDeclKind,
  pub declarations: Vec<Node<VarDeclarator>>,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct VarDeclarator {
  pub id: Pat,
  pub init: Option<Expr>,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct FuncDecl {
  // Only absent for `export default function () {}`.
  pub id: Option<Node<Ident>>,
  pub params: Vec<Pat>,
  pub body: FuncBody,
  // Pre-ES6 esprima reported default values in a parallel array instead of
  // as `AssignmentPattern` params.
  #[serde(default)]
  pub defaults: Vec<Option<Expr>>,
  #[drive(skip)]
  #[serde(default)]
  pub generator: bool,
  #[drive(skip)]
  #[serde(default, rename = "async")]
  pub is_async: bool,
}

#[derive(Debug, Drive, DriveMut, From, TryInto)]
pub enum FuncBody {
  Block(Node<BlockStmt>),
  Expression(Expr),
}

impl<'de> Deserialize<'de> for FuncBody {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match require_node_type::<D::Error>(&value)?.as_str() {
      "BlockStatement" => FuncBody::Block(decode::<_, D::Error>(value)?),
      _ => FuncBody::Expression(decode::<_, D::Error>(value)?),
    })
  }
}

#[derive(Debug, Drive, DriveMut, From, TryInto)]
pub enum ForInLeft {
  Decl(Node<VarDecl>),
  Target(Expr),
}

impl<'de> Deserialize<'de> for ForInLeft {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match require_node_type::<D::Error>(&value)?.as_str() {
      "VariableDeclaration" => ForInLeft::Decl(decode::<_, D::Error>(value)?),
      _ => ForInLeft::Target(decode::<_, D::Error>(value)?),
    })
  }
}

#[derive(Debug, Drive, DriveMut, From, TryInto)]
pub enum ForInit {
  Decl(Node<VarDecl>),
  Expression(Expr),
}

impl<'de> Deserialize<'de> for ForInit {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match require_node_type::<D::Error>(&value)?.as_str() {
      "VariableDeclaration" => ForInit::Decl(decode::<_, D::Error>(value)?),
      _ => ForInit::Expression(decode::<_, D::Error>(value)?),
    })
  }
}
