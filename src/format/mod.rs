//! Byte-level serialization formats for file-backed configs.
//!
//! A [`Parser`] converts raw file bytes to and from an [`Element`] tree and
//! supplies the blank template written for a brand-new file.

mod json;
mod toml;
mod yaml;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use json::JsonParser;
pub use toml::TomlParser;
pub use yaml::YamlParser;

use thiserror::Error;

use crate::element::Element;

/// Error type for format conversions.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The input is not valid UTF-8.
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// JSON syntax or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML syntax error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] ::toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] ::toml::ser::Error),

    /// YAML syntax or serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document root is not an object.
    #[error("Document root must be an object, found {found}")]
    NotAnObject {
        /// Description of what was found instead
        found: &'static str,
    },
}

/// Converts between raw bytes and an element tree.
///
/// Implementations must accept whatever they emit, including the output of
/// [`empty_bytes`](Parser::empty_bytes).
pub trait Parser: Send + Sync {
    /// Parses bytes into a tree.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the bytes are not a valid document.
    fn to_element(&self, bytes: &[u8]) -> Result<Element, FormatError>;

    /// Serializes a tree into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the tree cannot be expressed in the format.
    fn to_bytes(&self, element: &Element) -> Result<Vec<u8>, FormatError>;

    /// Returns the template for a brand-new file: an empty document.
    fn empty_bytes(&self) -> Vec<u8>;
}

/// Parses bytes and requires an object root.
///
/// Blank input (only whitespace) yields an empty object.
pub(crate) fn parse_object(parser: &dyn Parser, bytes: &[u8]) -> Result<Element, FormatError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Element::object());
    }
    match parser.to_element(bytes)? {
        element @ Element::Object(_) => Ok(element),
        Element::Array(_) => Err(FormatError::NotAnObject { found: "array" }),
        Element::Primitive(_) => Err(FormatError::NotAnObject { found: "primitive" }),
        Element::Null => Err(FormatError::NotAnObject { found: "null" }),
    }
}
