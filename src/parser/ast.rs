//! Runiq AST and value model
//!
//! Programs and the data they produce share one representation: a [`Node`]
//! is either an atom, an ordered list, or a quoted node withheld from
//! reduction.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

/// Reserved key used for quoted nodes in the wire format
pub const QUOTE_KEY: &str = "'";

/// A program or value node
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    /// Absent value
    #[default]
    Null,
    /// Boolean literal
    Bool(bool),
    /// Numeric literal (all numbers are doubles)
    Number(f64),
    /// String literal, operator name or bare identifier
    String(String),
    /// Structured map from inline JSON
    Map(BTreeMap<String, Node>),
    /// Ordered list; a string head makes it invocable
    List(Vec<Node>),
    /// Data withheld from reduction
    Quote(Box<Node>),
}

impl Node {
    /// Wraps a node in a quote
    pub fn quote(node: Node) -> Node {
        Node::Quote(Box::new(node))
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Map(_) => "hash",
            Node::List(_) => "list",
            Node::Quote(_) => "quote",
        }
    }

    /// Check if node is null
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Check if node is a list
    pub fn is_list(&self) -> bool {
        matches!(self, Node::List(_))
    }

    /// Check if node is an empty list
    pub fn is_empty_list(&self) -> bool {
        matches!(self, Node::List(items) if items.is_empty())
    }

    /// A value needs no further reduction: any non-list, or an empty list
    pub fn is_value(&self) -> bool {
        match self {
            Node::List(items) => items.is_empty(),
            _ => true,
        }
    }

    /// Operator name of an invocable list
    pub fn head_name(&self) -> Option<&str> {
        match self {
            Node::List(items) => head_name(items),
            _ => None,
        }
    }

    /// Borrow the string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the number payload
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow list items
    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    /// Removes one level of quoting
    pub fn unquoted(self) -> Node {
        match self {
            Node::Quote(inner) => *inner,
            other => other,
        }
    }

    /// Collapses single-element lists whose only element is itself a list
    pub fn denest(self) -> Node {
        let mut node = self;
        loop {
            match node {
                Node::List(mut items) if items.len() == 1 && items[0].is_list() => {
                    node = items.pop().unwrap_or_default();
                }
                other => return other,
            }
        }
    }

    /// Structural equality where NaN equals NaN
    ///
    /// Used to detect passes that made no progress; derived `PartialEq`
    /// never considers a tree holding NaN equal to itself.
    pub fn same_structure(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Number(a), Node::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Node::List(a), Node::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_structure(y))
            }
            (Node::Map(a), Node::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_structure(vb))
            }
            (Node::Quote(a), Node::Quote(b)) => a.same_structure(b),
            (a, b) => a == b,
        }
    }

    /// Truthiness with the host-language coercion rules
    pub fn truthy(&self) -> bool {
        match self {
            Node::Null => false,
            Node::Bool(b) => *b,
            Node::Number(n) => *n != 0.0 && !n.is_nan(),
            Node::String(s) => !s.is_empty(),
            Node::Map(_) | Node::List(_) | Node::Quote(_) => true,
        }
    }

    /// Numeric coercion with the host-language rules
    pub fn to_number(&self) -> f64 {
        match self {
            Node::Null => 0.0,
            Node::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Node::Number(n) => *n,
            Node::String(s) => parse_numeric_text(s),
            Node::List(_) => parse_numeric_text(&self.to_text()),
            Node::Map(_) | Node::Quote(_) => f64::NAN,
        }
    }

    /// Text coercion with the host-language rules
    ///
    /// Lists join their elements with commas, nulls inside lists print empty.
    pub fn to_text(&self) -> String {
        match self {
            Node::Null => "null".to_string(),
            Node::Bool(b) => b.to_string(),
            Node::Number(n) => format_number(*n),
            Node::String(s) => s.clone(),
            Node::Map(_) => "[object Object]".to_string(),
            Node::List(items) => items
                .iter()
                .map(|item| match item {
                    Node::Null => String::new(),
                    other => other.to_text(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Node::Quote(_) => "[object Object]".to_string(),
        }
    }

    /// Converts to the JSON wire format
    pub fn to_json(&self) -> JsonValue {
        match self {
            Node::Null => JsonValue::Null,
            Node::Bool(b) => JsonValue::Bool(*b),
            Node::Number(n) => number_to_json(*n),
            Node::String(s) => JsonValue::String(s.clone()),
            Node::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            Node::List(items) => JsonValue::Array(items.iter().map(Node::to_json).collect()),
            Node::Quote(inner) => {
                let mut map = Map::new();
                map.insert(QUOTE_KEY.to_string(), inner.to_json());
                JsonValue::Object(map)
            }
        }
    }

    /// Builds a node from the JSON wire format
    ///
    /// A single-key object keyed by `'` decodes as a quote.
    pub fn from_json(value: JsonValue) -> Node {
        match value {
            JsonValue::Null => Node::Null,
            JsonValue::Bool(b) => Node::Bool(b),
            JsonValue::Number(n) => Node::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Node::String(s),
            JsonValue::Array(items) => Node::List(items.into_iter().map(Node::from_json).collect()),
            JsonValue::Object(mut map) => {
                if map.len() == 1 {
                    if let Some(inner) = map.remove(QUOTE_KEY) {
                        return Node::quote(Node::from_json(inner));
                    }
                }
                Node::Map(
                    map.into_iter()
                        .map(|(k, v)| (k, Node::from_json(v)))
                        .collect(),
                )
            }
        }
    }

    /// Normalizes a tree by round-tripping it through the wire format
    ///
    /// Structurally identical programs compare equal afterwards; non-finite
    /// numbers become null.
    pub fn canonicalize(self) -> Node {
        Node::from_json(self.to_json())
    }
}

/// Operator name of an invocable list
pub fn head_name(items: &[Node]) -> Option<&str> {
    items.first().and_then(Node::as_str)
}

/// A list is invocable when its first element is a string
pub fn is_invocable(items: &[Node]) -> bool {
    head_name(items).is_some()
}

/// Every list-typed argument has been reduced to an empty list
pub fn is_call_ready(items: &[Node]) -> bool {
    items.iter().skip(1).all(|arg| match arg {
        Node::List(inner) => inner.is_empty(),
        _ => true,
    })
}

/// Renders a list the way [`Node`]'s `Display` renders `Node::List`
pub fn render_list(items: &[Node]) -> String {
    JsonValue::Array(items.iter().map(Node::to_json).collect()).to_string()
}

/// Formats a number the way the host language prints it
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

fn number_to_json(n: f64) -> JsonValue {
    if !n.is_finite() {
        return JsonValue::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return JsonValue::Number(Number::from(n as i64));
    }
    Number::from_f64(n)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

fn parse_numeric_text(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let lower = trimmed.to_ascii_lowercase();
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            return i64::from_str_radix(digits, radix)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if lower.contains("inf") || lower.contains("nan") => f64::NAN,
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(Node::from_json)
    }
}

impl From<JsonValue> for Node {
    fn from(value: JsonValue) -> Self {
        Node::from_json(value)
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Node::Number(n)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Number(n as f64)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::List(items)
    }
}
