//! Object mapping between caller-defined types and [`Element`] trees.
//!
//! Serialization goes through `serde_json::Value`, so any `Serialize` type
//! works and object field order follows declaration order. Deserialization
//! reads the tree directly and accepts text for numbers and flags, which is
//! how flat stores hand leaves back.

mod de;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ConfigError;
use crate::element::Element;

/// Converts a typed value into a tree.
///
/// # Errors
///
/// Returns [`ConfigError::Mapping`] if `value` fails to serialize (e.g. a map
/// with non-string keys).
pub fn to_element<T: Serialize>(value: &T) -> Result<Element, ConfigError> {
    serde_json::to_value(value)
        .map(Element::from)
        .map_err(ConfigError::Mapping)
}

/// Converts a tree into a typed value.
///
/// A string leaf is parsed when `T` wants a number or a boolean at that
/// spot, and the text `null` reads as `None`.
///
/// # Errors
///
/// Returns [`ConfigError::Mapping`] if the tree does not fit `T`.
pub fn from_element<T: DeserializeOwned>(element: Element) -> Result<T, ConfigError> {
    T::deserialize(de::ElementDeserializer(element)).map_err(ConfigError::Mapping)
}
