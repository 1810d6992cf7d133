//! YAML format.

use crate::element::Element;

use super::{FormatError, Parser};

/// YAML documents via `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl Parser for YamlParser {
    fn to_element(&self, bytes: &[u8]) -> Result<Element, FormatError> {
        let value: serde_json::Value = serde_yaml::from_slice(bytes)?;
        Ok(Element::from(value))
    }

    fn to_bytes(&self, element: &Element) -> Result<Vec<u8>, FormatError> {
        Ok(serde_yaml::to_string(element)?.into_bytes())
    }

    fn empty_bytes(&self) -> Vec<u8> {
        b"{}\n".to_vec()
    }
}
