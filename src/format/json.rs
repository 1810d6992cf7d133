//! JSON format.

use crate::element::Element;

use super::{FormatError, Parser};

/// JSON documents via `serde_json`.
///
/// Output is pretty-printed unless built with [`JsonParser::compact`].
#[derive(Debug, Clone, Copy)]
pub struct JsonParser {
    pretty: bool,
}

impl JsonParser {
    /// Creates a parser that pretty-prints its output.
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Creates a parser that writes single-line output.
    #[must_use]
    pub const fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for JsonParser {
    fn to_element(&self, bytes: &[u8]) -> Result<Element, FormatError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        Ok(Element::from(value))
    }

    fn to_bytes(&self, element: &Element) -> Result<Vec<u8>, FormatError> {
        let mut bytes = if self.pretty {
            serde_json::to_vec_pretty(element)?
        } else {
            serde_json::to_vec(element)?
        };
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn empty_bytes(&self) -> Vec<u8> {
        b"{}\n".to_vec()
    }
}
