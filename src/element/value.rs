//! Leaf-style read results and write inputs.

use std::fmt;

use super::{Element, Primitive};

/// The two container shapes of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Keyed, ordered container.
    Object,
    /// Indexed container.
    Array,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => f.write_str("object"),
            Self::Array => f.write_str("array"),
        }
    }
}

/// Descriptor returned in place of a container's content when a leaf-style
/// read lands on an object or array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerSummary {
    /// An object and its keys in insertion order.
    Object(Vec<String>),
    /// An array and its length.
    Array(usize),
}

impl ContainerSummary {
    /// Returns the summarized container's kind.
    #[must_use]
    pub const fn kind(&self) -> ContainerKind {
        match self {
            Self::Object(_) => ContainerKind::Object,
            Self::Array(_) => ContainerKind::Array,
        }
    }
}

/// A leaf-style view of a tree node.
///
/// Returned by path reads and accepted by path writes, so whatever a read
/// returned can be written back, container leaves included. Absence is
/// expressed as `Option<Value>::None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An explicit null leaf.
    Null,
    /// A scalar leaf.
    Leaf(Primitive),
    /// A container, summarized.
    Container(ContainerSummary),
}

impl Value {
    /// Returns the primitive, if this is a scalar leaf.
    #[must_use]
    pub const fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Self::Leaf(p) => Some(p),
            _ => None,
        }
    }

    /// Builds the node a write of this value creates: the scalar itself, or
    /// an empty container of the summarized kind.
    #[must_use]
    pub fn to_element(&self) -> Element {
        match self {
            Self::Null => Element::Null,
            Self::Leaf(p) => Element::Primitive(p.clone()),
            Self::Container(summary) => Element::empty(summary.kind()),
        }
    }

    /// Views a node as a leaf-style value. Containers are summarized only
    /// when `summarize_containers` is set.
    #[must_use]
    pub fn of(element: &Element, summarize_containers: bool) -> Option<Self> {
        match element {
            Element::Null => Some(Self::Null),
            Element::Primitive(p) => Some(Self::Leaf(p.clone())),
            Element::Object(_) | Element::Array(_) if summarize_containers => {
                element.summary().map(Self::Container)
            }
            Element::Object(_) | Element::Array(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Leaf(p) => write!(f, "{p}"),
            Self::Container(ContainerSummary::Object(keys)) => {
                write!(f, "object{{{}}}", keys.join(", "))
            }
            Self::Container(ContainerSummary::Array(len)) => write!(f, "array[{len}]"),
        }
    }
}

impl From<Primitive> for Value {
    fn from(value: Primitive) -> Self {
        Self::Leaf(value)
    }
}

impl From<ContainerSummary> for Value {
    fn from(value: ContainerSummary) -> Self {
        Self::Container(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Leaf(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Leaf(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Leaf(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Leaf(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Leaf(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Leaf(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Leaf(value.into())
    }
}
