use super::expr::Expr;
use super::expr::Ident;
use super::node::decode;
use super::node::require_node_type;
use super::node::unsupported;
use super::node::Node;
use super::node::UnsupportedNode;
use crate::loc::Loc;
use derive_more::derive::{From, TryInto};
use derive_visitor::{Drive, DriveMut};
use serde::Deserialize;
use serde::Deserializer;
use serde_json::Value;

/// A binding target: declarator ids, parameters, for-in heads.
#[derive(Debug, Drive, DriveMut, From, TryInto)]
pub enum Pat {
  Identifier(Node<Ident>),
  Rest(Node<RestElement>),
  // Only meaningful as a parameter with a default value.
  Assignment(Node<AssignmentPat>),
  Unsupported(Node<UnsupportedNode>),
}

impl Pat {
  pub fn kind(&self) -> &str {
    match self {
      Pat::Identifier(_) => "Identifier",
      Pat::Rest(_) => "RestElement",
      Pat::Assignment(_) => "AssignmentPattern",
      Pat::Unsupported(n) => &n.stx.kind,
    }
  }

  pub fn loc(&self) -> Loc {
    match self {
      Pat::Identifier(n) => n.loc,
      Pat::Rest(n) => n.loc,
      Pat::Assignment(n) => n.loc,
      Pat::Unsupported(n) => n.loc,
    }
  }
}

impl<'de> Deserialize<'de> for Pat {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let kind = require_node_type::<D::Error>(&value)?;
    Ok(match kind.as_str() {
      "Identifier" => Pat::Identifier(decode::<_, D::Error>(value)?),
      "RestElement" => Pat::Rest(decode::<_, D::Error>(value)?),
      "AssignmentPattern" => Pat::Assignment(decode::<_, D::Error>(value)?),
      _ => Pat::Unsupported(unsupported(kind, &value)),
    })
  }
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct RestElement {
  pub argument: Pat,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct AssignmentPat {
  pub left: Pat,
  pub right: Expr,
}
