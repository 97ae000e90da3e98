//! Persistent JSON values for context trees
//!
//! Provides [`ContextValue`], a JSON value whose containers are persistent
//! collections from `im`. Cloning is O(1) and a copy-on-write update only
//! allocates along the changed path, so unrelated branches stay
//! reference-identical across snapshots.

use crate::path::ContextPath;
use im::{OrdMap, Vector};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Object node of a context tree
pub type ContextObject = OrdMap<String, ContextValue>;

/// Plain JSON value with structurally shared containers
///
/// Numbers compare by value, so `1` and `1.0` are equal.
#[derive(Debug, Clone, Default)]
pub enum ContextValue {
    /// JSON `null`
    #[default]
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number
    Number(Number),
    /// JSON string
    String(Arc<str>),
    /// JSON array
    Array(Vector<ContextValue>),
    /// JSON object
    Object(ContextObject),
}

impl PartialEq for ContextValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => numbers_equal(a, b),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a.ptr_eq(b) || a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b) || a == b,
            _ => false,
        }
    }
}

#[allow(clippy::float_cmp)]
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

impl ContextValue {
    /// Empty object
    #[inline]
    #[must_use]
    pub fn object() -> Self {
        Self::Object(OrdMap::new())
    }

    /// Check for `null`
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow as object
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&ContextObject> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow as array
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vector<ContextValue>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Get a direct child of an object
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Walk `path` from this node
    ///
    /// The root path returns `self`. Any missing or non-object intermediate
    /// yields `None`.
    #[must_use]
    pub fn get_path(&self, path: &ContextPath) -> Option<&ContextValue> {
        path.iter().try_fold(self, |node, segment| node.get(segment))
    }

    /// Copy-on-write deep set
    ///
    /// Returns a new tree with `value` at `path`. Intermediate objects are
    /// created as needed; a non-object intermediate is replaced by an object.
    /// Only the nodes along `path` are new; every other branch is shared with
    /// `self`.
    #[must_use]
    pub fn set_path(&self, path: &ContextPath, value: ContextValue) -> ContextValue {
        set_in(self, path.segments(), value)
    }

    /// Reference identity
    ///
    /// Containers compare by their persistent root pointer, strings by their
    /// shared allocation, scalars by value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Array(a), Self::Array(b)) => a.ptr_eq(b),
            (Self::String(a), Self::String(b)) => Arc::ptr_eq(a, b),
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            _ => false,
        }
    }

    /// Convert into a `serde_json::Value`
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.to_string()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Text used when the value is spliced into a template
    ///
    /// Strings render raw, `null` renders empty, containers render as
    /// compact JSON.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => s.to_string(),
            Self::Array(_) | Self::Object(_) => self.to_json().to_string(),
        }
    }
}

fn set_in(node: &ContextValue, segments: &[String], value: ContextValue) -> ContextValue {
    let Some((head, rest)) = segments.split_first() else {
        return value;
    };

    let map = match node {
        ContextValue::Object(map) => map.clone(),
        _ => OrdMap::new(),
    };

    let next = if rest.is_empty() {
        value
    } else {
        match map.get(head) {
            Some(child) => set_in(child, rest, value),
            None => set_in(&ContextValue::Null, rest, value),
        }
    };

    ContextValue::Object(map.update(head.clone(), next))
}

impl Display for ContextValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<Value> for ContextValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s.into()),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for ContextValue {
    fn from(value: &Value) -> Self {
        Self::from(value.clone())
    }
}

impl From<&ContextValue> for Value {
    fn from(value: &ContextValue) -> Self {
        value.to_json()
    }
}

impl From<ContextValue> for Value {
    fn from(value: ContextValue) -> Self {
        value.to_json()
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ContextValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<ContextObject> for ContextValue {
    fn from(map: ContextObject) -> Self {
        Self::Object(map)
    }
}

impl Serialize for ContextValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ContextValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}
