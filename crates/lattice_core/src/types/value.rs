//! Values stored at lattice nodes.
//!
//! Node data is a string-keyed map whose values are either numeric or
//! arbitrary. The same [`Value`] type travels through formula calls, so a
//! whole node map can be handed to a formula as a single argument.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mutable per-node data: key to value.
pub type NodeData = BTreeMap<String, Value>;

/// A numeric or arbitrary value.
///
/// Serialises untagged, so `Value::Number(100.0)` is `100.0` in JSON and a
/// `Value::Map` is a plain object.
///
/// # Examples
///
/// ```
/// use lattice_core::types::Value;
///
/// let spot = Value::from(100.0);
/// assert_eq!(spot.as_number(), Some(100.0));
///
/// let node = Value::map([("spot", 100.0), ("payoff", 0.0)]);
/// assert_eq!(node.get("spot").and_then(Value::as_number), Some(100.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value (also used to fill positional gaps).
    #[default]
    Null,
    /// Boolean flag.
    Flag(bool),
    /// Floating point number.
    Number(f64),
    /// Free text.
    Text(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested string-keyed map (the shape of node data).
    Map(NodeData),
}

impl Value {
    /// Builds a `Value::Map` from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the number if this is `Value::Number`.
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns the flag if this is `Value::Flag`.
    #[inline]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Value::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the text if this is `Value::Text`.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items if this is `Value::List`.
    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the map if this is `Value::Map`.
    #[inline]
    pub fn as_map(&self) -> Option<&NodeData> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Mutable map if this is `Value::Map`.
    #[inline]
    pub fn as_map_mut(&mut self) -> Option<&mut NodeData> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// True for `Value::Null`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Looks up `key` when this value is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Flag(_) => "flag",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Flag(b) => write!(f, "{}", b),
            Value::Number(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Flag(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<NodeData> for Value {
    fn from(m: NodeData) -> Self {
        Value::Map(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
