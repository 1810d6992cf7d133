//! The generic semi-structured tree every config is reconciled against.
//!
//! An [`Element`] is a closed tagged union of objects, arrays, scalar
//! [`Primitive`]s and `Null`. Objects keep insertion order so a tree read
//! from a file serializes back in the same shape.

mod convert;
mod value;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use value::{ContainerKind, ContainerSummary, Value};

use std::fmt;

use indexmap::IndexMap;

/// Ordered mapping used for [`Element::Object`].
pub type ObjectMap = IndexMap<String, Element>;

/// A scalar leaf value.
///
/// Equality and stringification follow the underlying scalar type:
/// `Integer(1)` and `Float(1.0)` are different primitives even though
/// they display identically.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// UTF-8 text.
    String(String),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean flag.
    Boolean(bool),
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Primitive {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Primitive {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// A node of the config tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Element {
    /// Explicit null. Treated as a leaf, and as a placeholder that writes
    /// may replace.
    #[default]
    Null,
    /// Scalar leaf.
    Primitive(Primitive),
    /// Ordered key/value container.
    Object(ObjectMap),
    /// Dense, 0-indexed sequence.
    Array(Vec<Element>),
}

impl Element {
    /// Creates an empty object.
    #[must_use]
    pub fn object() -> Self {
        Self::Object(ObjectMap::new())
    }

    /// Creates an empty array.
    #[must_use]
    pub const fn array() -> Self {
        Self::Array(Vec::new())
    }

    /// Creates an empty container of the given kind.
    #[must_use]
    pub fn empty(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Object => Self::object(),
            ContainerKind::Array => Self::array(),
        }
    }

    /// Returns the container kind, or `None` for leaves.
    #[must_use]
    pub const fn container_kind(&self) -> Option<ContainerKind> {
        match self {
            Self::Object(_) => Some(ContainerKind::Object),
            Self::Array(_) => Some(ContainerKind::Array),
            Self::Null | Self::Primitive(_) => None,
        }
    }

    /// Returns `true` for objects and arrays.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        self.container_kind().is_some()
    }

    /// Returns `true` if this node carries no data and may be replaced by a
    /// write: `Null`, an empty object, or an empty array.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Object(map) => map.is_empty(),
            Self::Array(items) => items.is_empty(),
            Self::Primitive(_) => false,
        }
    }

    /// Summarizes a container by kind and keys/size. `None` for leaves.
    #[must_use]
    pub fn summary(&self) -> Option<ContainerSummary> {
        match self {
            Self::Object(map) => Some(ContainerSummary::Object(map.keys().cloned().collect())),
            Self::Array(items) => Some(ContainerSummary::Array(items.len())),
            Self::Null | Self::Primitive(_) => None,
        }
    }

    /// Returns the object map, if this is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the array items, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the primitive, if this is a scalar leaf.
    #[must_use]
    pub const fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Self::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the string form a leaf is persisted as in flat stores.
    ///
    /// `Null` is stored as the literal `null`; containers have no stored form.
    #[must_use]
    pub fn stored_text(&self) -> Option<String> {
        match self {
            Self::Null => Some("null".to_string()),
            Self::Primitive(p) => Some(p.to_string()),
            Self::Object(_) | Self::Array(_) => None,
        }
    }

    /// Rebuilds a leaf from its stored string form.
    ///
    /// Stored rows carry no type information. When `template` is a scalar
    /// (typically the node found at the same path in the current value),
    /// the text is parsed as that scalar's kind. Otherwise, or if that parse
    /// fails, the kind is inferred: `null`, boolean, integer, float, then
    /// string.
    #[must_use]
    pub fn from_stored(text: Option<&str>, template: Option<&Self>) -> Self {
        let Some(text) = text else {
            return Self::Null;
        };

        let typed = match template {
            Some(Self::Primitive(Primitive::String(_))) => Some(Primitive::from(text)),
            Some(Self::Primitive(Primitive::Integer(_))) => {
                text.parse().ok().map(Primitive::Integer)
            }
            Some(Self::Primitive(Primitive::Float(_))) => text.parse().ok().map(Primitive::Float),
            Some(Self::Primitive(Primitive::Boolean(_))) => {
                text.parse().ok().map(Primitive::Boolean)
            }
            _ => None,
        };

        typed.map_or_else(|| infer_stored(text), Self::Primitive)
    }
}

fn infer_stored(text: &str) -> Element {
    if text == "null" {
        return Element::Null;
    }
    if let Ok(b) = text.parse::<bool>() {
        return Element::Primitive(Primitive::Boolean(b));
    }
    if let Ok(i) = text.parse::<i64>() {
        return Element::Primitive(Primitive::Integer(i));
    }
    // Require a digit so words like "inf" or "NaN" stay strings.
    if text.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(x) = text.parse::<f64>() {
            return Element::Primitive(Primitive::Float(x));
        }
    }
    Element::Primitive(Primitive::from(text))
}

impl From<Primitive> for Element {
    fn from(value: Primitive) -> Self {
        Self::Primitive(value)
    }
}

impl From<ObjectMap> for Element {
    fn from(value: ObjectMap) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<Self>> for Element {
    fn from(value: Vec<Self>) -> Self {
        Self::Array(value)
    }
}
