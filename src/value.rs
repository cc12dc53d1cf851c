//! The tag model: every value a BSO document can hold.
//!
//! [`Tag`] is a closed enum. Signedness and the boolean sub-variant of Byte are
//! separate Rust variants, while [`TagType`] names the sixteen type codes of the
//! binary format that those variants collapse onto.
//!
//! ## Creating Values
//!
//! Variants can be built directly when the Rust type already guarantees the
//! range, or through the checked constructors which validate an arbitrary
//! integer against the variant's bounds:
//!
//! ```rust
//! use bso::{Error, Tag};
//!
//! let exact = Tag::Short(-5);
//! let checked = Tag::short(-5).unwrap();
//! assert_eq!(exact, checked);
//!
//! assert!(matches!(Tag::byte(300), Err(Error::Range { .. })));
//! assert!(Tag::string("x".repeat(65_536)).is_err());
//! ```
//!
//! ## Maps with Auto-Boxing
//!
//! [`Tag::map`] accepts convenience scalars through [`IntoTag`]: integers
//! become `Int`, floats become `Double`, text becomes `String` and booleans
//! become `Bool`.
//!
//! ```rust
//! use bso::{IntoTag, Tag};
//!
//! let tag = Tag::map([("name", "Steve".into_tag()?), ("level", 7.into_tag()?)])?;
//! assert_eq!(tag.get("level"), Some(&Tag::Int(7)));
//! # Ok::<(), bso::Error>(())
//! ```

use crate::{Error, Result, TagList, TagMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Maximum length of a string in UTF-8 bytes.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// One of the sixteen type codes carried in the low nibble of a descriptor byte.
///
/// # Examples
///
/// ```rust
/// use bso::TagType;
///
/// assert_eq!(TagType::from_code(0x0C).unwrap(), TagType::IntArray);
/// assert_eq!(TagType::IntArray.to_string(), "IntArray");
/// assert!(TagType::from_code(0x1C).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagType {
    Null = 0x0,
    Byte = 0x1,
    Short = 0x2,
    Int = 0x3,
    Long = 0x4,
    Float = 0x5,
    Double = 0x6,
    String = 0x7,
    Map = 0x8,
    List = 0x9,
    ByteArray = 0xA,
    ShortArray = 0xB,
    IntArray = 0xC,
    LongArray = 0xD,
    FloatArray = 0xE,
    DoubleArray = 0xF,
}

impl TagType {
    /// Returns the 4-bit type code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Looks up the type for a 4-bit code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] when `code` does not fit in the low nibble.
    pub fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0x0 => TagType::Null,
            0x1 => TagType::Byte,
            0x2 => TagType::Short,
            0x3 => TagType::Int,
            0x4 => TagType::Long,
            0x5 => TagType::Float,
            0x6 => TagType::Double,
            0x7 => TagType::String,
            0x8 => TagType::Map,
            0x9 => TagType::List,
            0xA => TagType::ByteArray,
            0xB => TagType::ShortArray,
            0xC => TagType::IntArray,
            0xD => TagType::LongArray,
            0xE => TagType::FloatArray,
            0xF => TagType::DoubleArray,
            other => return Err(Error::UnknownType(other)),
        })
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TagType::Null => "Null",
            TagType::Byte => "Byte",
            TagType::Short => "Short",
            TagType::Int => "Int",
            TagType::Long => "Long",
            TagType::Float => "Float",
            TagType::Double => "Double",
            TagType::String => "String",
            TagType::Map => "Map",
            TagType::List => "List",
            TagType::ByteArray => "ByteArray",
            TagType::ShortArray => "ShortArray",
            TagType::IntArray => "IntArray",
            TagType::LongArray => "LongArray",
            TagType::FloatArray => "FloatArray",
            TagType::DoubleArray => "DoubleArray",
        }
    }

    /// Returns `true` for the six typed array types.
    #[must_use]
    pub const fn is_array(self) -> bool {
        self.code() >= TagType::ByteArray.code()
    }

    /// Element type of a typed array, `None` for everything else.
    #[must_use]
    pub const fn element_type(self) -> Option<TagType> {
        match self {
            TagType::ByteArray => Some(TagType::Byte),
            TagType::ShortArray => Some(TagType::Short),
            TagType::IntArray => Some(TagType::Int),
            TagType::LongArray => Some(TagType::Long),
            TagType::FloatArray => Some(TagType::Float),
            TagType::DoubleArray => Some(TagType::Double),
            _ => None,
        }
    }
}

impl TryFrom<u8> for TagType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        TagType::from_code(code)
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single BSO value.
///
/// A tag tree is a strict tree: every container owns its children.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Tag {
    #[default]
    Null,
    Bool(bool),
    Byte(i8),
    UByte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    /// UTF-8 text of at most [`MAX_STRING_LEN`] bytes.
    ///
    /// Building the variant directly skips that check; [`Tag::string`] is the
    /// checked path. An over-long string fails later, when it is encoded or
    /// when its rendered text is parsed back.
    String(String),
    Map(TagMap),
    List(TagList),
    ByteArray(Vec<i8>),
    UByteArray(Vec<u8>),
    ShortArray(Vec<i16>),
    UShortArray(Vec<u16>),
    IntArray(Vec<i32>),
    UIntArray(Vec<u32>),
    LongArray(Vec<i64>),
    ULongArray(Vec<u64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
}

macro_rules! checked_constructor {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $variant:ident, $kind:literal) => {
        $(#[$doc])*
        ///
        /// # Errors
        ///
        /// Returns [`Error::Range`] when the value does not fit.
        pub fn $name(value: impl Into<i128>) -> Result<Tag> {
            let value = value.into();
            <$ty>::try_from(value)
                .map(Tag::$variant)
                .map_err(|_| Error::range($kind, <$ty>::MIN, <$ty>::MAX, value))
        }
    };
}

impl Tag {
    checked_constructor!(
        /// Creates a signed Byte, checking `-128..=127`.
        byte, i8, Byte, "Byte"
    );
    checked_constructor!(
        /// Creates an unsigned Byte, checking `0..=255`.
        ubyte, u8, UByte, "UByte"
    );
    checked_constructor!(
        /// Creates a signed Short.
        short, i16, Short, "Short"
    );
    checked_constructor!(
        /// Creates an unsigned Short.
        ushort, u16, UShort, "UShort"
    );
    checked_constructor!(
        /// Creates a signed Int.
        ///
        /// # Examples
        ///
        /// ```rust
        /// use bso::Tag;
        ///
        /// assert_eq!(Tag::int(5).unwrap(), Tag::Int(5));
        /// assert!(Tag::int(i64::from(i32::MAX) + 1).is_err());
        /// ```
        int, i32, Int, "Int"
    );
    checked_constructor!(
        /// Creates an unsigned Int.
        uint, u32, UInt, "UInt"
    );
    checked_constructor!(
        /// Creates a signed Long.
        long, i64, Long, "Long"
    );
    checked_constructor!(
        /// Creates an unsigned Long.
        ulong, u64, ULong, "ULong"
    );

    /// Creates a String, rejecting text longer than 65535 UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StringTooLong`] when the limit is exceeded.
    pub fn string(value: impl Into<String>) -> Result<Tag> {
        let value = value.into();
        check_string_len(&value)?;
        Ok(Tag::String(value))
    }

    /// Creates a Map from key/value pairs, auto-boxing convenience scalars.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate key, an over-long key or string, or an
    /// out-of-range integer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bso::{Error, Tag};
    ///
    /// let dup = Tag::map([("a", 1), ("a", 2)]);
    /// assert!(matches!(dup, Err(Error::DuplicateKey(_))));
    /// ```
    pub fn map<I, K, V>(entries: I) -> Result<Tag>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoTag,
    {
        let mut map = TagMap::new();
        for (key, value) in entries {
            map.try_insert(key.into(), value.into_tag()?)?;
        }
        Ok(Tag::Map(map))
    }

    /// Creates a List, rejecting elements of more than one type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] naming the first offending element.
    pub fn list(values: Vec<Tag>) -> Result<Tag> {
        TagList::new(values).map(Tag::List)
    }

    /// The binary type code this value is encoded with.
    #[must_use]
    pub const fn tag_type(&self) -> TagType {
        match self {
            Tag::Null => TagType::Null,
            Tag::Bool(_) | Tag::Byte(_) | Tag::UByte(_) => TagType::Byte,
            Tag::Short(_) | Tag::UShort(_) => TagType::Short,
            Tag::Int(_) | Tag::UInt(_) => TagType::Int,
            Tag::Long(_) | Tag::ULong(_) => TagType::Long,
            Tag::Float(_) => TagType::Float,
            Tag::Double(_) => TagType::Double,
            Tag::String(_) => TagType::String,
            Tag::Map(_) => TagType::Map,
            Tag::List(_) => TagType::List,
            Tag::ByteArray(_) | Tag::UByteArray(_) => TagType::ByteArray,
            Tag::ShortArray(_) | Tag::UShortArray(_) => TagType::ShortArray,
            Tag::IntArray(_) | Tag::UIntArray(_) => TagType::IntArray,
            Tag::LongArray(_) | Tag::ULongArray(_) => TagType::LongArray,
            Tag::FloatArray(_) => TagType::FloatArray,
            Tag::DoubleArray(_) => TagType::DoubleArray,
        }
    }

    /// Human-readable name including signedness, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Tag::Null => "null",
            Tag::Bool(_) => "boolean",
            Tag::Byte(_) => "byte",
            Tag::UByte(_) => "unsigned byte",
            Tag::Short(_) => "short",
            Tag::UShort(_) => "unsigned short",
            Tag::Int(_) => "int",
            Tag::UInt(_) => "unsigned int",
            Tag::Long(_) => "long",
            Tag::ULong(_) => "unsigned long",
            Tag::Float(_) => "float",
            Tag::Double(_) => "double",
            Tag::String(_) => "string",
            Tag::Map(_) => "map",
            Tag::List(_) => "list",
            Tag::ByteArray(_) => "byte array",
            Tag::UByteArray(_) => "unsigned byte array",
            Tag::ShortArray(_) => "short array",
            Tag::UShortArray(_) => "unsigned short array",
            Tag::IntArray(_) => "int array",
            Tag::UIntArray(_) => "unsigned int array",
            Tag::LongArray(_) => "long array",
            Tag::ULongArray(_) => "unsigned long array",
            Tag::FloatArray(_) => "float array",
            Tag::DoubleArray(_) => "double array",
        }
    }

    /// Returns `true` for the unsigned integer and unsigned array variants.
    #[must_use]
    pub const fn is_unsigned(&self) -> bool {
        matches!(
            self,
            Tag::UByte(_)
                | Tag::UShort(_)
                | Tag::UInt(_)
                | Tag::ULong(_)
                | Tag::UByteArray(_)
                | Tag::UShortArray(_)
                | Tag::UIntArray(_)
                | Tag::ULongArray(_)
        )
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Tag::Null)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Tag::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns any integer variant as `i64` if it fits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bso::Tag;
    ///
    /// assert_eq!(Tag::UShort(40_000).as_i64(), Some(40_000));
    /// assert_eq!(Tag::ULong(u64::MAX).as_i64(), None);
    /// assert_eq!(Tag::Double(1.0).as_i64(), None);
    /// ```
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Tag::Byte(v) => Some(v.into()),
            Tag::UByte(v) => Some(v.into()),
            Tag::Short(v) => Some(v.into()),
            Tag::UShort(v) => Some(v.into()),
            Tag::Int(v) => Some(v.into()),
            Tag::UInt(v) => Some(v.into()),
            Tag::Long(v) => Some(v),
            Tag::ULong(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Returns any non-negative integer variant as `u64`.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Tag::UByte(v) => Some(v.into()),
            Tag::UShort(v) => Some(v.into()),
            Tag::UInt(v) => Some(v.into()),
            Tag::ULong(v) => Some(v),
            _ => self.as_i64().and_then(|v| u64::try_from(v).ok()),
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Tag::Float(v) => Some(v.into()),
            Tag::Double(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&TagMap> {
        match self {
            Tag::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut TagMap> {
        match self {
            Tag::Map(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&TagList> {
        match self {
            Tag::List(list) => Some(list),
            _ => None,
        }
    }

    /// Looks up `key` when this is a Map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.as_map().and_then(|map| map.get(key))
    }
}

pub(crate) fn check_string_len(s: &str) -> Result<()> {
    if s.len() > MAX_STRING_LEN {
        return Err(Error::StringTooLong {
            len: s.len(),
            max: MAX_STRING_LEN,
        });
    }
    Ok(())
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::to_string(self))
    }
}

/// Conversion into a [`Tag`] following the auto-boxing rules of [`Tag::map`].
///
/// Integers of any width become `Int` (range checked), floats become
/// `Double`, text becomes `String`, booleans become `Bool`. Tags, maps and
/// lists pass through unchanged.
pub trait IntoTag {
    /// # Errors
    ///
    /// Fails when an integer exceeds the Int range or text is too long.
    fn into_tag(self) -> Result<Tag>;
}

impl IntoTag for Tag {
    fn into_tag(self) -> Result<Tag> {
        Ok(self)
    }
}

impl IntoTag for TagMap {
    fn into_tag(self) -> Result<Tag> {
        Ok(Tag::Map(self))
    }
}

impl IntoTag for TagList {
    fn into_tag(self) -> Result<Tag> {
        Ok(Tag::List(self))
    }
}

impl IntoTag for bool {
    fn into_tag(self) -> Result<Tag> {
        Ok(Tag::Bool(self))
    }
}

impl IntoTag for &str {
    fn into_tag(self) -> Result<Tag> {
        Tag::string(self)
    }
}

impl IntoTag for String {
    fn into_tag(self) -> Result<Tag> {
        Tag::string(self)
    }
}

macro_rules! into_tag_int {
    ($($ty:ty),*) => {
        $(
            impl IntoTag for $ty {
                fn into_tag(self) -> Result<Tag> {
                    Tag::int(self)
                }
            }
        )*
    };
}

into_tag_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl IntoTag for f32 {
    fn into_tag(self) -> Result<Tag> {
        Ok(Tag::Double(self.into()))
    }
}

impl IntoTag for f64 {
    fn into_tag(self) -> Result<Tag> {
        Ok(Tag::Double(self))
    }
}

macro_rules! from_exact {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Tag {
                fn from(value: $ty) -> Self {
                    Tag::$variant(value)
                }
            }
        )*
    };
}

// Exact-width conversions; the Rust type already guarantees the range.
from_exact!(
    bool => Bool,
    i8 => Byte,
    u8 => UByte,
    i16 => Short,
    u16 => UShort,
    i32 => Int,
    u32 => UInt,
    i64 => Long,
    u64 => ULong,
    f32 => Float,
    f64 => Double,
    TagMap => Map,
    TagList => List,
    Vec<i8> => ByteArray,
    Vec<u8> => UByteArray,
    Vec<i16> => ShortArray,
    Vec<u16> => UShortArray,
    Vec<i32> => IntArray,
    Vec<u32> => UIntArray,
    Vec<i64> => LongArray,
    Vec<u64> => ULongArray,
    Vec<f32> => FloatArray,
    Vec<f64> => DoubleArray,
);

impl TryFrom<&str> for Tag {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Tag::string(value)
    }
}

impl TryFrom<String> for Tag {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Tag::string(value)
    }
}

/// Newtype-struct names that carry typed arrays through the serde bridge.
pub(crate) mod array_token {
    pub const BYTE: &str = "$bso::ByteArray";
    pub const UBYTE: &str = "$bso::UByteArray";
    pub const SHORT: &str = "$bso::ShortArray";
    pub const USHORT: &str = "$bso::UShortArray";
    pub const INT: &str = "$bso::IntArray";
    pub const UINT: &str = "$bso::UIntArray";
    pub const LONG: &str = "$bso::LongArray";
    pub const ULONG: &str = "$bso::ULongArray";
    pub const FLOAT: &str = "$bso::FloatArray";
    pub const DOUBLE: &str = "$bso::DoubleArray";
}

/// Element type named by a typed-array header such as `[UI;`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ArrayKind {
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
}

macro_rules! collect_as {
    ($elements:expr, $variant:ident, $expected:literal) => {
        $elements
            .into_iter()
            .enumerate()
            .map(|(index, tag)| match tag {
                Tag::$variant(v) => Ok(v),
                other => Err(Error::type_mismatch(index, $expected, other.kind_name())),
            })
            .collect::<Result<Vec<_>>>()
    };
}

impl ArrayKind {
    pub(crate) fn from_header(header: &str) -> Option<Self> {
        Some(match header {
            "B" => ArrayKind::Byte,
            "UB" => ArrayKind::UByte,
            "S" => ArrayKind::Short,
            "US" => ArrayKind::UShort,
            "I" => ArrayKind::Int,
            "UI" => ArrayKind::UInt,
            "L" => ArrayKind::Long,
            "UL" => ArrayKind::ULong,
            "F" => ArrayKind::Float,
            "D" => ArrayKind::Double,
            _ => return None,
        })
    }

    /// Recognizes the newtype-struct names written by `Tag`'s `Serialize` impl.
    pub(crate) fn from_token(name: &str) -> Option<Self> {
        Some(match name {
            array_token::BYTE => ArrayKind::Byte,
            array_token::UBYTE => ArrayKind::UByte,
            array_token::SHORT => ArrayKind::Short,
            array_token::USHORT => ArrayKind::UShort,
            array_token::INT => ArrayKind::Int,
            array_token::UINT => ArrayKind::UInt,
            array_token::LONG => ArrayKind::Long,
            array_token::ULONG => ArrayKind::ULong,
            array_token::FLOAT => ArrayKind::Float,
            array_token::DOUBLE => ArrayKind::Double,
            _ => return None,
        })
    }

    /// Unwraps scalar tags into a typed array of this kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] for the first element of another variant.
    pub(crate) fn collect(self, elements: Vec<Tag>) -> Result<Tag> {
        Ok(match self {
            ArrayKind::Byte => Tag::ByteArray(collect_as!(elements, Byte, "byte")?),
            ArrayKind::UByte => Tag::UByteArray(collect_as!(elements, UByte, "unsigned byte")?),
            ArrayKind::Short => Tag::ShortArray(collect_as!(elements, Short, "short")?),
            ArrayKind::UShort => Tag::UShortArray(collect_as!(elements, UShort, "unsigned short")?),
            ArrayKind::Int => Tag::IntArray(collect_as!(elements, Int, "int")?),
            ArrayKind::UInt => Tag::UIntArray(collect_as!(elements, UInt, "unsigned int")?),
            ArrayKind::Long => Tag::LongArray(collect_as!(elements, Long, "long")?),
            ArrayKind::ULong => Tag::ULongArray(collect_as!(elements, ULong, "unsigned long")?),
            ArrayKind::Float => Tag::FloatArray(collect_as!(elements, Float, "float")?),
            ArrayKind::Double => Tag::DoubleArray(collect_as!(elements, Double, "double")?),
        })
    }
}

impl Serialize for Tag {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            Tag::Null => serializer.serialize_unit(),
            Tag::Bool(b) => serializer.serialize_bool(*b),
            Tag::Byte(v) => serializer.serialize_i8(*v),
            Tag::UByte(v) => serializer.serialize_u8(*v),
            Tag::Short(v) => serializer.serialize_i16(*v),
            Tag::UShort(v) => serializer.serialize_u16(*v),
            Tag::Int(v) => serializer.serialize_i32(*v),
            Tag::UInt(v) => serializer.serialize_u32(*v),
            Tag::Long(v) => serializer.serialize_i64(*v),
            Tag::ULong(v) => serializer.serialize_u64(*v),
            Tag::Float(v) => serializer.serialize_f32(*v),
            Tag::Double(v) => serializer.serialize_f64(*v),
            Tag::String(s) => serializer.serialize_str(s),
            Tag::Map(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    state.serialize_entry(k, v)?;
                }
                state.end()
            }
            Tag::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for element in list.iter() {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Tag::ByteArray(v) => serializer.serialize_newtype_struct(array_token::BYTE, v),
            Tag::UByteArray(v) => serializer.serialize_newtype_struct(array_token::UBYTE, v),
            Tag::ShortArray(v) => serializer.serialize_newtype_struct(array_token::SHORT, v),
            Tag::UShortArray(v) => serializer.serialize_newtype_struct(array_token::USHORT, v),
            Tag::IntArray(v) => serializer.serialize_newtype_struct(array_token::INT, v),
            Tag::UIntArray(v) => serializer.serialize_newtype_struct(array_token::UINT, v),
            Tag::LongArray(v) => serializer.serialize_newtype_struct(array_token::LONG, v),
            Tag::ULongArray(v) => serializer.serialize_newtype_struct(array_token::ULONG, v),
            Tag::FloatArray(v) => serializer.serialize_newtype_struct(array_token::FLOAT, v),
            Tag::DoubleArray(v) => serializer.serialize_newtype_struct(array_token::DOUBLE, v),
        }
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct TagVisitor;

        impl<'de> Visitor<'de> for TagVisitor {
            type Value = Tag;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid BSO value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Tag, E> {
                Ok(Tag::Bool(value))
            }

            fn visit_i8<E>(self, value: i8) -> std::result::Result<Tag, E> {
                Ok(Tag::Byte(value))
            }

            fn visit_i16<E>(self, value: i16) -> std::result::Result<Tag, E> {
                Ok(Tag::Short(value))
            }

            fn visit_i32<E>(self, value: i32) -> std::result::Result<Tag, E> {
                Ok(Tag::Int(value))
            }

            // 64-bit visits are what self-describing formats report for every
            // integer, so they follow the auto-boxing rule.
            fn visit_i64<E>(self, value: i64) -> std::result::Result<Tag, E> {
                Ok(i32::try_from(value).map_or(Tag::Long(value), Tag::Int))
            }

            fn visit_u8<E>(self, value: u8) -> std::result::Result<Tag, E> {
                Ok(Tag::UByte(value))
            }

            fn visit_u16<E>(self, value: u16) -> std::result::Result<Tag, E> {
                Ok(Tag::UShort(value))
            }

            fn visit_u32<E>(self, value: u32) -> std::result::Result<Tag, E> {
                Ok(Tag::UInt(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Tag, E> {
                if let Ok(v) = i32::try_from(value) {
                    Ok(Tag::Int(v))
                } else if let Ok(v) = i64::try_from(value) {
                    Ok(Tag::Long(v))
                } else {
                    Ok(Tag::ULong(value))
                }
            }

            fn visit_f32<E>(self, value: f32) -> std::result::Result<Tag, E> {
                Ok(Tag::Float(value))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Tag, E> {
                Ok(Tag::Double(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Tag, E>
            where
                E: de::Error,
            {
                Tag::string(value).map_err(E::custom)
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Tag, E>
            where
                E: de::Error,
            {
                Tag::string(value).map_err(E::custom)
            }

            fn visit_bytes<E>(self, value: &[u8]) -> std::result::Result<Tag, E> {
                Ok(Tag::UByteArray(value.to_vec()))
            }

            fn visit_unit<E>(self) -> std::result::Result<Tag, E> {
                Ok(Tag::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Tag, E> {
                Ok(Tag::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Tag, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Tag, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut list = TagList::empty();
                while let Some(elem) = seq.next_element()? {
                    list.push(elem).map_err(<A::Error as de::Error>::custom)?;
                }
                Ok(Tag::List(list))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Tag, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = TagMap::new();
                while let Some((key, value)) = map.next_entry::<String, Tag>()? {
                    values
                        .try_insert(key, value)
                        .map_err(<A::Error as de::Error>::custom)?;
                }
                Ok(Tag::Map(values))
            }
        }

        deserializer.deserialize_any(TagVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_constructors_accept_bounds() {
        assert_eq!(Tag::byte(-128).unwrap(), Tag::Byte(i8::MIN));
        assert_eq!(Tag::ubyte(255).unwrap(), Tag::UByte(u8::MAX));
        assert_eq!(Tag::short(i16::MAX).unwrap(), Tag::Short(i16::MAX));
        assert_eq!(Tag::uint(u32::MAX).unwrap(), Tag::UInt(u32::MAX));
        assert_eq!(Tag::long(i64::MIN).unwrap(), Tag::Long(i64::MIN));
        assert_eq!(Tag::ulong(u64::MAX).unwrap(), Tag::ULong(u64::MAX));
    }

    #[test]
    fn test_checked_constructors_reject_out_of_range() {
        let err = Tag::byte(128).unwrap_err();
        assert_eq!(err.to_string(), "Byte range is -128 to 127, value was 128");
        assert!(Tag::ubyte(-1).unwrap_err().is_range());
        assert!(Tag::short(40_000).is_err());
        assert!(Tag::int(i64::from(i32::MIN) - 1).is_err());
        assert!(Tag::ulong(-1).is_err());
    }

    #[test]
    fn test_string_length_limit() {
        assert!(Tag::string("a".repeat(MAX_STRING_LEN)).is_ok());
        let err = Tag::string("a".repeat(MAX_STRING_LEN + 1)).unwrap_err();
        assert!(matches!(
            err,
            Error::StringTooLong {
                len: 65536,
                max: 65535
            }
        ));
    }

    #[test]
    fn test_unchecked_string_variant_fails_downstream() {
        let tag = Tag::String("a".repeat(MAX_STRING_LEN + 1));
        assert!(crate::to_bytes(&tag).unwrap_err().is_range());
        assert!(crate::from_str(&crate::to_string(&tag))
            .unwrap_err()
            .is_range());
    }

    #[test]
    fn test_string_limit_counts_utf8_bytes() {
        // Three bytes per character
        let s = "\u{20ac}".repeat(21_846);
        assert!(Tag::string(s).is_err());
    }

    #[test]
    fn test_tag_type_collapses_sub_variants() {
        assert_eq!(Tag::Bool(true).tag_type(), TagType::Byte);
        assert_eq!(Tag::UByte(1).tag_type(), TagType::Byte);
        assert_eq!(Tag::UIntArray(vec![]).tag_type(), TagType::IntArray);
        assert_eq!(TagType::IntArray.element_type(), Some(TagType::Int));
        assert!(TagType::DoubleArray.is_array());
        assert!(!TagType::List.is_array());
    }

    #[test]
    fn test_tag_type_codes() {
        for code in 0..16u8 {
            assert_eq!(TagType::from_code(code).unwrap().code(), code);
        }
        assert!(matches!(TagType::from_code(0x10), Err(Error::UnknownType(0x10))));
    }

    #[test]
    fn test_map_auto_boxing() {
        let tag = Tag::map([
            ("i", 7u64.into_tag().unwrap()),
            ("d", 1.5f64.into_tag().unwrap()),
            ("s", "txt".into_tag().unwrap()),
            ("b", true.into_tag().unwrap()),
            ("t", Tag::Short(3)),
        ])
        .unwrap();
        assert_eq!(tag.get("i"), Some(&Tag::Int(7)));
        assert_eq!(tag.get("d"), Some(&Tag::Double(1.5)));
        assert_eq!(tag.get("s").and_then(Tag::as_str), Some("txt"));
        assert_eq!(tag.get("b").and_then(Tag::as_bool), Some(true));
        assert_eq!(tag.get("t"), Some(&Tag::Short(3)));
    }

    #[test]
    fn test_map_auto_boxing_range_checks() {
        let err = Tag::map([("big", u64::MAX)]).unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn test_list_constructor_reports_offender() {
        let err = Tag::list(vec![Tag::Int(1), Tag::Int(2), Tag::String("x".into())]).unwrap_err();
        match err {
            Error::TypeMismatch {
                index,
                expected,
                found,
            } => {
                assert_eq!(index, 2);
                assert_eq!(expected, "Int");
                assert_eq!(found, "String");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Tag::Byte(-3).as_i64(), Some(-3));
        assert_eq!(Tag::Byte(-3).as_u64(), None);
        assert_eq!(Tag::ULong(u64::MAX).as_u64(), Some(u64::MAX));
        assert_eq!(Tag::Float(0.5).as_f64(), Some(0.5));
        assert!(Tag::default().is_null());
        assert!(Tag::UShortArray(vec![]).is_unsigned());
        assert!(!Tag::ShortArray(vec![]).is_unsigned());
    }

    #[test]
    fn test_exact_from_conversions() {
        assert_eq!(Tag::from(5i8), Tag::Byte(5));
        assert_eq!(Tag::from(5u32), Tag::UInt(5));
        assert_eq!(Tag::from(vec![1i64, 2]), Tag::LongArray(vec![1, 2]));
        assert!(Tag::try_from("x".repeat(70_000)).is_err());
    }
}
