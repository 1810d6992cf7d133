//! Deserializing typed values straight from an [`Element`] tree.
//!
//! Flat stores keep every leaf as text, so a tree rebuilt from them may hold
//! a string where the target type wants a number or a flag. The deserializer
//! parses such strings on demand: the target type decides the scalar kind,
//! not the text.

use serde::Deserializer;
use serde::de::value::{MapDeserializer, SeqDeserializer, StringDeserializer};
use serde::de::{
    DeserializeSeed, EnumAccess, Error as _, IntoDeserializer, Unexpected, VariantAccess, Visitor,
};
use serde::forward_to_deserialize_any;
use serde_json::Error;

use crate::element::{Element, Primitive};

/// Text a stored `null` leaf is written as.
const NULL_TEXT: &str = "null";

/// Owned [`Element`] as a serde [`Deserializer`].
pub(crate) struct ElementDeserializer(pub Element);

impl<'de> IntoDeserializer<'de, Error> for ElementDeserializer {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

fn parse_integer<'de, V: Visitor<'de>>(text: &str, visitor: V) -> Result<V::Value, Error> {
    if let Ok(i) = text.parse::<i64>() {
        visitor.visit_i64(i)
    } else if let Ok(u) = text.parse::<u64>() {
        visitor.visit_u64(u)
    } else {
        Err(Error::invalid_value(Unexpected::Str(text), &visitor))
    }
}

fn parse_float<'de, V: Visitor<'de>>(text: &str, visitor: V) -> Result<V::Value, Error> {
    match text.parse::<f64>() {
        Ok(x) => visitor.visit_f64(x),
        Err(_) => Err(Error::invalid_value(Unexpected::Str(text), &visitor)),
    }
}

fn parse_bool<'de, V: Visitor<'de>>(text: &str, visitor: V) -> Result<V::Value, Error> {
    match text.parse::<bool>() {
        Ok(b) => visitor.visit_bool(b),
        Err(_) => Err(Error::invalid_value(Unexpected::Str(text), &visitor)),
    }
}

const fn is_null(element: &Element) -> bool {
    matches!(element, Element::Null)
}

fn is_null_text(element: &Element) -> bool {
    matches!(element, Element::Primitive(Primitive::String(s)) if s == NULL_TEXT)
}

macro_rules! from_text {
    ($parse:ident => $($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
            match self.0 {
                Element::Primitive(Primitive::String(text)) => $parse(&text, visitor),
                other => ElementDeserializer(other).deserialize_any(visitor),
            }
        }
    )*};
}

impl<'de> Deserializer<'de> for ElementDeserializer {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Element::Null => visitor.visit_unit(),
            Element::Primitive(Primitive::String(s)) => visitor.visit_string(s),
            Element::Primitive(Primitive::Integer(i)) => visitor.visit_i64(i),
            Element::Primitive(Primitive::Float(x)) => visitor.visit_f64(x),
            Element::Primitive(Primitive::Boolean(b)) => visitor.visit_bool(b),
            Element::Array(items) => {
                let mut seq = SeqDeserializer::<_, Error>::new(items.into_iter().map(Self));
                let value = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(value)
            }
            Element::Object(map) => {
                // keys go through the element deserializer too, so numeric
                // map keys parse like any other stored text
                let entries = map.into_iter().map(|(key, value)| {
                    (Self(Element::Primitive(Primitive::String(key))), Self(value))
                });
                let mut access = MapDeserializer::<_, Error>::new(entries);
                let value = visitor.visit_map(&mut access)?;
                access.end()?;
                Ok(value)
            }
        }
    }

    from_text!(parse_integer => deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64);
    from_text!(parse_float => deserialize_f32 deserialize_f64);
    from_text!(parse_bool => deserialize_bool);

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        if is_null(&self.0) || is_null_text(&self.0) {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        if is_null(&self.0) || is_null_text(&self.0) {
            visitor.visit_unit()
        } else {
            self.deserialize_any(visitor)
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        match self.0 {
            Element::Primitive(Primitive::String(variant)) => {
                let variant: StringDeserializer<Error> = variant.into_deserializer();
                visitor.visit_enum(variant)
            }
            Element::Object(map) if map.len() == 1 => {
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((variant, value)) => {
                        visitor.visit_enum(EnumDeserializer { variant, value })
                    }
                    None => Err(Error::invalid_length(0, &"a map with a single key")),
                }
            }
            Element::Object(map) => {
                Err(Error::invalid_length(map.len(), &"a map with a single key"))
            }
            other => Err(Error::invalid_type(unexpected(&other), &"an enum")),
        }
    }

    forward_to_deserialize_any! {
        i128 u128 char str string bytes byte_buf seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

fn unexpected(element: &Element) -> Unexpected<'_> {
    match element {
        Element::Null => Unexpected::Unit,
        Element::Primitive(Primitive::String(s)) => Unexpected::Str(s),
        Element::Primitive(Primitive::Integer(i)) => Unexpected::Signed(*i),
        Element::Primitive(Primitive::Float(x)) => Unexpected::Float(*x),
        Element::Primitive(Primitive::Boolean(b)) => Unexpected::Bool(*b),
        Element::Array(_) => Unexpected::Seq,
        Element::Object(_) => Unexpected::Map,
    }
}

/// Externally tagged enum: `{ "Variant": content }`.
struct EnumDeserializer {
    variant: String,
    value: Element,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = ElementDeserializer;

    fn variant_seed<S: DeserializeSeed<'de>>(
        self,
        seed: S,
    ) -> Result<(S::Value, ElementDeserializer), Error> {
        let variant: StringDeserializer<Error> = self.variant.into_deserializer();
        let tag = seed.deserialize(variant)?;
        Ok((tag, ElementDeserializer(self.value)))
    }
}

impl<'de> VariantAccess<'de> for ElementDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Error> {
        if is_null(&self.0) || is_null_text(&self.0) {
            Ok(())
        } else {
            Err(Error::invalid_type(unexpected(&self.0), &"a unit variant"))
        }
    }

    fn newtype_variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<S::Value, Error> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_any(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.deserialize_any(visitor)
    }
}
