//! Serde deserialization out of [`Tag`] trees.
//!
//! [`TagDeserializer`] hands each variant to the visitor at its exact width, so
//! serde's own range checks decide whether a Short fits an `i8` field. Typed
//! arrays are presented as sequences of their elements, UByteArray also as
//! bytes.
//!
//! ```rust
//! use bso::{from_str, from_tag};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Chunk { x: i32, z: i32, heights: Vec<u8> }
//!
//! let tag = from_str("{x: 3s, z: -1b, heights: [UB; 64ub, 65ub]}").unwrap();
//! let chunk: Chunk = from_tag(tag).unwrap();
//! assert_eq!(chunk, Chunk { x: 3, z: -1, heights: vec![64, 65] });
//! ```

use crate::{Error, Result, Tag, TagMap};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{de, forward_to_deserialize_any};

/// Deserializer reading from an owned [`Tag`].
pub struct TagDeserializer {
    tag: Tag,
}

impl TagDeserializer {
    #[must_use]
    pub fn new(tag: Tag) -> Self {
        TagDeserializer { tag }
    }
}

fn seq_of<T: Into<Tag>>(values: Vec<T>) -> SeqDeserializer {
    SeqDeserializer::new(values.into_iter().map(Into::into).collect())
}

impl<'de> de::Deserializer<'de> for TagDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.tag {
            Tag::Null => visitor.visit_unit(),
            Tag::Bool(b) => visitor.visit_bool(b),
            Tag::Byte(v) => visitor.visit_i8(v),
            Tag::UByte(v) => visitor.visit_u8(v),
            Tag::Short(v) => visitor.visit_i16(v),
            Tag::UShort(v) => visitor.visit_u16(v),
            Tag::Int(v) => visitor.visit_i32(v),
            Tag::UInt(v) => visitor.visit_u32(v),
            Tag::Long(v) => visitor.visit_i64(v),
            Tag::ULong(v) => visitor.visit_u64(v),
            Tag::Float(v) => visitor.visit_f32(v),
            Tag::Double(v) => visitor.visit_f64(v),
            Tag::String(s) => visitor.visit_string(s),
            Tag::Map(map) => visitor.visit_map(MapDeserializer::new(map)),
            Tag::List(list) => visitor.visit_seq(SeqDeserializer::new(list.into_vec())),
            Tag::ByteArray(v) => visitor.visit_seq(seq_of(v)),
            Tag::UByteArray(v) => visitor.visit_seq(seq_of(v)),
            Tag::ShortArray(v) => visitor.visit_seq(seq_of(v)),
            Tag::UShortArray(v) => visitor.visit_seq(seq_of(v)),
            Tag::IntArray(v) => visitor.visit_seq(seq_of(v)),
            Tag::UIntArray(v) => visitor.visit_seq(seq_of(v)),
            Tag::LongArray(v) => visitor.visit_seq(seq_of(v)),
            Tag::ULongArray(v) => visitor.visit_seq(seq_of(v)),
            Tag::FloatArray(v) => visitor.visit_seq(seq_of(v)),
            Tag::DoubleArray(v) => visitor.visit_seq(seq_of(v)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.tag {
            Tag::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.tag {
            Tag::UByteArray(v) => visitor.visit_byte_buf(v),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.tag {
            Tag::String(s) => visitor.visit_enum(s.into_deserializer()),
            Tag::Map(map) => {
                let mut entries = map.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, value))
                    }
                    _ => Err(Error::custom("expected a map with a single variant key")),
                }
            }
            other => Err(Error::custom(format!(
                "expected an enum variant, found {}",
                other.kind_name()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        unit unit_struct seq tuple tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Tag>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Tag>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(tag) => seed.deserialize(TagDeserializer::new(tag)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Tag>,
    value: Option<Tag>,
}

impl MapDeserializer {
    fn new(map: TagMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(TagDeserializer::new(Tag::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(TagDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Tag,
}

impl EnumDeserializer {
    fn new(variant: String, value: Tag) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(TagDeserializer::new(Tag::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Tag,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Tag::Null => Ok(()),
            _ => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(TagDeserializer::new(self.value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Tag::List(list) => visitor.visit_seq(SeqDeserializer::new(list.into_vec())),
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Tag::Map(map) => visitor.visit_map(MapDeserializer::new(map)),
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}

/// Deserializes a value of type `T` from a [`Tag`].
///
/// # Errors
///
/// Fails when the tag's shape does not match `T` or a number does not fit the
/// target field.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_tag<T: DeserializeOwned>(tag: Tag) -> Result<T> {
    T::deserialize(TagDeserializer::new(tag))
}
