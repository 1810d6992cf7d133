//! TOML format.

use toml::{Table, Value as TomlValue};

use crate::element::{Element, ObjectMap, Primitive};

use super::{FormatError, Parser};

/// TOML documents via the `toml` crate.
///
/// TOML has no null: null leaves are dropped on output, and datetimes are
/// read as strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlParser;

impl Parser for TomlParser {
    fn to_element(&self, bytes: &[u8]) -> Result<Element, FormatError> {
        let text = std::str::from_utf8(bytes)?;
        let table: Table = toml::from_str(text)?;
        Ok(from_table(table))
    }

    fn to_bytes(&self, element: &Element) -> Result<Vec<u8>, FormatError> {
        let Element::Object(map) = element else {
            return Err(FormatError::NotAnObject {
                found: if element.is_container() { "array" } else { "leaf" },
            });
        };
        Ok(toml::to_string(&to_table(map))?.into_bytes())
    }

    fn empty_bytes(&self) -> Vec<u8> {
        Vec::new()
    }
}

fn from_table(table: Table) -> Element {
    Element::Object(
        table
            .into_iter()
            .map(|(k, v)| (k, from_toml(v)))
            .collect::<ObjectMap>(),
    )
}

fn from_toml(value: TomlValue) -> Element {
    match value {
        TomlValue::String(s) => Element::Primitive(Primitive::String(s)),
        TomlValue::Integer(i) => Element::Primitive(Primitive::Integer(i)),
        TomlValue::Float(x) => Element::Primitive(Primitive::Float(x)),
        TomlValue::Boolean(b) => Element::Primitive(Primitive::Boolean(b)),
        TomlValue::Datetime(dt) => Element::Primitive(Primitive::String(dt.to_string())),
        TomlValue::Array(items) => Element::Array(items.into_iter().map(from_toml).collect()),
        TomlValue::Table(table) => from_table(table),
    }
}

fn to_table(map: &ObjectMap) -> Table {
    map.iter()
        .filter_map(|(k, v)| to_toml(v).map(|v| (k.clone(), v)))
        .collect()
}

fn to_toml(element: &Element) -> Option<TomlValue> {
    match element {
        Element::Null => None,
        Element::Primitive(Primitive::String(s)) => Some(TomlValue::String(s.clone())),
        Element::Primitive(Primitive::Integer(i)) => Some(TomlValue::Integer(*i)),
        Element::Primitive(Primitive::Float(x)) => Some(TomlValue::Float(*x)),
        Element::Primitive(Primitive::Boolean(b)) => Some(TomlValue::Boolean(*b)),
        Element::Array(items) => Some(TomlValue::Array(
            items.iter().filter_map(to_toml).collect(),
        )),
        Element::Object(map) => Some(TomlValue::Table(to_table(map))),
    }
}
