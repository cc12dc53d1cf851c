//! Serde serialization into [`Tag`] trees.
//!
//! [`TagSerializer`] maps the serde data model onto tag variants at their exact
//! width: an `i16` field becomes a Short, a `u32` field a UInt, `&[u8]` bytes a
//! UByteArray. Sequences become Lists and are type-checked like
//! [`Tag::list`](crate::Tag::list), so a sequence mixing variants fails.
//!
//! ```rust
//! use bso::{to_tag, Tag};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Player { name: String, hp: i16, pos: Vec<f64> }
//!
//! let player = Player { name: "Alex".into(), hp: 20, pos: vec![0.5, 64.0] };
//! let tag = to_tag(&player).unwrap();
//! assert_eq!(tag.get("hp"), Some(&Tag::Short(20)));
//! assert_eq!(bso::to_string(&tag), "{name:\"Alex\",hp:20s,pos:[0.5d,64.0d]}");
//! ```
//!
//! Enum variants with data become a single-entry map keyed by the variant
//! name; unit variants become their name as a String.

use crate::value::ArrayKind;
use crate::{Error, Result, Tag, TagList, TagMap};
use serde::{ser, Serialize};

/// Serializer producing a [`Tag`].
pub struct TagSerializer;

pub struct SerializeList {
    list: TagList,
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    map: TagMap,
    current_key: Option<String>,
    variant: Option<&'static str>,
}

impl ser::Serializer for TagSerializer {
    type Ok = Tag;
    type Error = Error;

    type SerializeSeq = SerializeList;
    type SerializeTuple = SerializeList;
    type SerializeTupleStruct = SerializeList;
    type SerializeTupleVariant = SerializeList;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Tag> {
        Ok(Tag::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Tag> {
        Ok(Tag::Byte(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Tag> {
        Ok(Tag::Short(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Tag> {
        Ok(Tag::Int(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Tag> {
        Ok(Tag::Long(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Tag> {
        Tag::long(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Tag> {
        Ok(Tag::UByte(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Tag> {
        Ok(Tag::UShort(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Tag> {
        Ok(Tag::UInt(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Tag> {
        Ok(Tag::ULong(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Tag> {
        u64::try_from(v)
            .map(Tag::ULong)
            .map_err(|_| Error::range("ULong", u64::MIN, u64::MAX, v))
    }

    fn serialize_f32(self, v: f32) -> Result<Tag> {
        Ok(Tag::Float(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Tag> {
        Ok(Tag::Double(v))
    }

    fn serialize_char(self, v: char) -> Result<Tag> {
        Ok(Tag::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Tag> {
        Tag::string(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Tag> {
        Ok(Tag::UByteArray(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Tag> {
        Ok(Tag::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Tag>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Tag> {
        Ok(Tag::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Tag> {
        Ok(Tag::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Tag> {
        Tag::string(variant)
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Tag>
    where
        T: ?Sized + Serialize,
    {
        let inner = value.serialize(self)?;
        match (ArrayKind::from_token(name), inner) {
            (Some(kind), Tag::List(list)) => kind.collect(list.into_vec()),
            (_, inner) => Ok(inner),
        }
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Tag>
    where
        T: ?Sized + Serialize,
    {
        wrap_variant(variant, to_tag(value)?)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<SerializeList> {
        Ok(SerializeList::new(None))
    }

    fn serialize_tuple(self, _len: usize) -> Result<SerializeList> {
        Ok(SerializeList::new(None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<SerializeList> {
        Ok(SerializeList::new(None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeList> {
        Ok(SerializeList::new(Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(variant)))
    }
}

fn wrap_variant(variant: &str, value: Tag) -> Result<Tag> {
    let mut map = TagMap::with_capacity(1);
    map.try_insert(variant.to_string(), value)?;
    Ok(Tag::Map(map))
}

impl SerializeList {
    fn new(variant: Option<&'static str>) -> Self {
        SerializeList {
            list: TagList::empty(),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.list.push(to_tag(value)?)
    }

    fn finish(self) -> Result<Tag> {
        let tag = Tag::List(self.list);
        match self.variant {
            Some(variant) => wrap_variant(variant, tag),
            None => Ok(tag),
        }
    }
}

impl ser::SerializeSeq for SerializeList {
    type Ok = Tag;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Tag> {
        self.finish()
    }
}

impl ser::SerializeTuple for SerializeList {
    type Ok = Tag;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Tag> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SerializeList {
    type Ok = Tag;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Tag> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SerializeList {
    type Ok = Tag;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Tag> {
        self.finish()
    }
}

impl SerializeMap {
    fn new(variant: Option<&'static str>) -> Self {
        SerializeMap {
            map: TagMap::new(),
            current_key: None,
            variant,
        }
    }

    fn finish(self) -> Result<Tag> {
        let tag = Tag::Map(self.map);
        match self.variant {
            Some(variant) => wrap_variant(variant, tag),
            None => Ok(tag),
        }
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Tag;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_tag(key)? {
            Tag::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            other => Err(Error::unsupported_type(&format!(
                "map key of type {}",
                other.kind_name()
            ))),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.try_insert(key, to_tag(value)?)
    }

    fn end(self) -> Result<Tag> {
        self.finish()
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Tag;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.try_insert(key.to_string(), to_tag(value)?)
    }

    fn end(self) -> Result<Tag> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Tag;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.try_insert(key.to_string(), to_tag(value)?)
    }

    fn end(self) -> Result<Tag> {
        self.finish()
    }
}

/// Converts any `Serialize` value into a [`Tag`].
///
/// # Errors
///
/// Fails when a sequence mixes variants, a map key is not a string, a string
/// is longer than 65535 bytes, or a key repeats.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_tag<T: Serialize + ?Sized>(value: &T) -> Result<Tag> {
    value.serialize(TagSerializer)
}
