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

// Every variant wraps a Node<T> so visitors can see the node and its location.
#[derive(Debug, Drive, DriveMut, From, TryInto)]
pub enum Expr {
  Array(Node<ArrayExpr>),
  Call(Node<CallExpr>),
  Identifier(Node<Ident>),
  Literal(Node<Lit>),
  Member(Node<MemberExpr>),
  // Only valid inside array literals and argument lists, but ESTree puts it
  // wherever an expression can go there.
  Spread(Node<SpreadElement>),
  Unsupported(Node<UnsupportedNode>),
}

impl Expr {
  /// The ESTree `type` of this expression.
  pub fn kind(&self) -> &str {
    match self {
      Expr::Array(_) => "ArrayExpression",
      Expr::Call(_) => "CallExpression",
      Expr::Identifier(_) => "Identifier",
      Expr::Literal(_) => "Literal",
      Expr::Member(_) => "MemberExpression",
      Expr::Spread(_) => "SpreadElement",
      Expr::Unsupported(n) => &n.stx.kind,
    }
  }

  pub fn loc(&self) -> Loc {
    match self {
      Expr::Array(n) => n.loc,
      Expr::Call(n) => n.loc,
      Expr::Identifier(n) => n.loc,
      Expr::Literal(n) => n.loc,
      Expr::Member(n) => n.loc,
      Expr::Spread(n) => n.loc,
      Expr::Unsupported(n) => n.loc,
    }
  }
}

impl<'de> Deserialize<'de> for Expr {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let kind = require_node_type::<D::Error>(&value)?;
    Ok(match kind.as_str() {
      "ArrayExpression" => Expr::Array(decode::<_, D::Error>(value)?),
      "CallExpression" => Expr::Call(decode::<_, D::Error>(value)?),
      "Identifier" => Expr::Identifier(decode::<_, D::Error>(value)?),
      "Literal" => Expr::Literal(decode::<_, D::Error>(value)?),
      "MemberExpression" => Expr::Member(decode::<_, D::Error>(value)?),
      "SpreadElement" => Expr::Spread(decode::<_, D::Error>(value)?),
      _ => Expr::Unsupported(unsupported(kind, &value)),
    })
  }
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct ArrayExpr {
  // `None` is a hole, e.g. the middle of `[a, , b]`.
  pub elements: Vec<Option<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct CallExpr {
  pub callee: Expr,
  pub arguments: Vec<Expr>,
  #[drive(skip)]
  #[serde(default)]
  pub optional: bool,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct Ident {
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct MemberExpr {
  pub object: Expr,
  pub property: Expr,
  #[drive(skip)]
  #[serde(default)]
  pub computed: bool,
  #[drive(skip)]
  #[serde(default)]
  pub optional: bool,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct SpreadElement {
  pub argument: Expr,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LitValue {
  Null,
  Bool(bool),
  Num(f64),
  Str(String),
  // Regular expressions serialize as `{}` (or null when the producer could
  // not build them); bigints as strings alongside a `bigint` field.
  Other(Value),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RegexLit {
  pub pattern: String,
  pub flags: String,
}

#[derive(Debug, Drive, DriveMut, Deserialize)]
pub struct Lit {
  #[drive(skip)]
  pub value: LitValue,
  #[drive(skip)]
  #[serde(default)]
  pub raw: Option<String>,
  #[drive(skip)]
  #[serde(default)]
  pub regex: Option<RegexLit>,
  #[drive(skip)]
  #[serde(default)]
  pub bigint: Option<String>,
}

impl Lit {
  /// The string value, if this is a string literal.
  pub fn as_str(&self) -> Option<&str> {
    match (&self.value, &self.regex, &self.bigint) {
      (LitValue::Str(s), None, None) => Some(s),
      _ => None,
    }
  }

  /// The literal as it was written in source. Producers that drop `raw` get
  /// a canonical spelling rebuilt from the value.
  pub fn raw_text(&self) -> String {
    if let Some(raw) = &self.raw {
      return raw.clone();
    }
    if let Some(regex) = &self.regex {
      return format!("/{}/{}", regex.pattern, regex.flags);
    }
    if let Some(bigint) = &self.bigint {
      return format!("{bigint}n");
    }
    match &self.value {
      LitValue::Null => "null".to_string(),
      LitValue::Bool(v) => v.to_string(),
      LitValue::Num(v) if v.fract() == 0.0 && v.abs() < 9e15 => format!("{}", *v as i64),
      LitValue::Num(v) => v.to_string(),
      LitValue::Str(v) => Value::String(v.clone()).to_string(),
      LitValue::Other(v) => v.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::from_value;
  use serde_json::json;

  #[test]
  fn literal_kinds() {
    let s: Lit = from_value(json!({ "value": "hi", "raw": "'hi'" })).unwrap();
    assert_eq!(s.as_str(), Some("hi"));
    assert_eq!(s.raw_text(), "'hi'");

    let n: Lit = from_value(json!({ "value": 42 })).unwrap();
    assert_eq!(n.value, LitValue::Num(42.0));
    assert_eq!(n.as_str(), None);
    assert_eq!(n.raw_text(), "42");

    let b: Lit = from_value(json!({ "value": true })).unwrap();
    assert_eq!(b.raw_text(), "true");

    let null: Lit = from_value(json!({ "value": null })).unwrap();
    assert_eq!(null.value, LitValue::Null);
    assert_eq!(null.raw_text(), "null");

    let re: Lit = from_value(json!({
      "value": {},
      "regex": { "pattern": "a+", "flags": "g" }
    }))
    .unwrap();
    assert_eq!(re.as_str(), None);
    assert_eq!(re.raw_text(), "/a+/g");
  }

  #[test]
  fn unknown_expression_keeps_its_kind() {
    let expr: Expr = from_value(json!({
      "type": "BinaryExpression",
      "operator": "+",
      "range": [0, 5]
    }))
    .unwrap();
    assert_eq!(expr.kind(), "BinaryExpression");
    assert_eq!(expr.loc(), Loc(0, 5));
  }

  #[test]
  fn malformed_known_expression_is_an_error() {
    let err = from_value::<Expr>(json!({ "type": "Identifier" })).unwrap_err();
    assert!(err.to_string().contains("invalid Identifier"), "{err}");
  }

  #[test]
  fn array_holes_are_none() {
    let expr: Expr = from_value(json!({
      "type": "ArrayExpression",
      "elements": [{ "type": "Literal", "value": 1 }, null]
    }))
    .unwrap();
    let Expr::Array(arr) = expr else {
      panic!("expected array");
    };
    assert!(arr.stx.elements[0].is_some());
    assert!(arr.stx.elements[1].is_none());
  }
}
