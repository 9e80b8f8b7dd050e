use crate::loc::Loc;
use derive_visitor::{Drive, DriveMut};
use serde::de::DeserializeOwned;
use serde::de::Error;
use serde::Deserialize;
use serde::Deserializer;
use serde_json::Value;
use std::fmt;
use std::fmt::{Debug, Formatter};

#[derive(Drive, DriveMut)]
pub struct Node<S: Drive + DriveMut> {
  // Taken from the ESTree node's own offsets; the payload never sees them.
  #[drive(skip)]
  pub loc: Loc,
  pub stx: Box<S>,
}

impl<S: Drive + DriveMut> Node<S> {
  pub fn new(loc: Loc, stx: S) -> Node<S> {
    Node {
      loc,
      stx: Box::new(stx),
    }
  }
}

impl<S: Debug + Drive + DriveMut> Debug for Node<S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    self.stx.fmt(f)
  }
}

impl<'de, S: DeserializeOwned + Drive + DriveMut> Deserialize<'de> for Node<S> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let loc = Loc::from_estree(&value);
    let kind = node_type(&value).unwrap_or("node").to_string();
    let stx = S::deserialize(value)
      .map_err(|err| D::Error::custom(format!("invalid {kind} at [{}:{}]: {err}", loc.0, loc.1)))?;
    Ok(Node::new(loc, stx))
  }
}

/// Payload of any node whose ESTree `type` is outside the modelled subset.
/// The kind is kept so consumers can reject it by name.
#[derive(Debug, Drive, DriveMut)]
pub struct UnsupportedNode {
  #[drive(skip)]
  pub kind: String,
}

pub(crate) fn node_type(value: &Value) -> Option<&str> {
  value.get("type").and_then(Value::as_str)
}

/// Reads the ESTree `type` tag of a node being decoded as a sum type.
pub(crate) fn require_node_type<E: Error>(value: &Value) -> Result<String, E> {
  match node_type(value) {
    Some(kind) => Ok(kind.to_string()),
    None => Err(E::custom(format!(
      "expected an ESTree node with a string `type`, found {}",
      abbreviate(value)
    ))),
  }
}

pub(crate) fn decode<T: DeserializeOwned, E: Error>(value: Value) -> Result<T, E> {
  T::deserialize(value).map_err(E::custom)
}

pub(crate) fn unsupported(kind: String, value: &Value) -> Node<UnsupportedNode> {
  Node::new(Loc::from_estree(value), UnsupportedNode { kind })
}

fn abbreviate(value: &Value) -> String {
  let mut text = value.to_string();
  if text.len() > 40 {
    let mut cut = 40;
    while !text.is_char_boundary(cut) {
      cut -= 1;
    }
    text.truncate(cut);
    text.push_str("...");
  }
  text
}
