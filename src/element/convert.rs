//! Conversions between [`Element`] and `serde` data.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value as JsonValue};

use super::{Element, ObjectMap, Primitive};

impl From<JsonValue> for Element {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Primitive(Primitive::Boolean(b)),
            JsonValue::Number(n) => Self::Primitive(number_to_primitive(&n)),
            JsonValue::String(s) => Self::Primitive(Primitive::String(s)),
            JsonValue::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            JsonValue::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect::<ObjectMap>(),
            ),
        }
    }
}

/// Integers that do not fit `i64` fall back to floats.
#[allow(clippy::cast_precision_loss)]
fn number_to_primitive(n: &Number) -> Primitive {
    if let Some(i) = n.as_i64() {
        Primitive::Integer(i)
    } else if let Some(u) = n.as_u64() {
        Primitive::Float(u as f64)
    } else {
        Primitive::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

impl From<&Element> for JsonValue {
    fn from(element: &Element) -> Self {
        match element {
            Element::Null => Self::Null,
            Element::Primitive(Primitive::String(s)) => Self::String(s.clone()),
            Element::Primitive(Primitive::Integer(i)) => Self::Number((*i).into()),
            // JSON has no NaN/infinity.
            Element::Primitive(Primitive::Float(x)) => {
                Number::from_f64(*x).map_or(Self::Null, Self::Number)
            }
            Element::Primitive(Primitive::Boolean(b)) => Self::Bool(*b),
            Element::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            Element::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect::<Map<String, Self>>(),
            ),
        }
    }
}

impl From<Element> for JsonValue {
    fn from(element: Element) -> Self {
        Self::from(&element)
    }
}

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Primitive(p) => p.serialize(serializer),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}
