//! Descriptor byte layout.
//!
//! A descriptor's low nibble is the [`TagType`] code and its high nibble holds
//! qualifier bits whose meaning depends on the type:
//!
//! | Bits   | Scalars (Byte..Long)           | String            | Map, List, arrays        |
//! |--------|--------------------------------|-------------------|--------------------------|
//! | `0x30` | narrowed width                 | length prefix     | count prefix             |
//! | `0x40` | unsigned                       |                   | unsigned (integer arrays)|
//! | `0x80` |                                |                   | narrowed (integer arrays)|
//!
//! Byte additionally uses `0x50`/`0x60` for the booleans `true`/`false`, and the
//! standalone byte `0x10` is the End marker closing indefinite-length payloads.

use crate::stream::{ByteReader, ByteWriter};
use crate::{Result, TagType};
use std::io::{Read, Write};

/// End marker terminating an indefinite-length sequence.
pub const END: u8 = 0x10;

pub(crate) const TYPE_MASK: u8 = 0x0F;
pub(crate) const QUALIFIER_MASK: u8 = 0xF0;
pub(crate) const LOW_BITS: u8 = 0x30;
pub(crate) const UNSIGNED: u8 = 0x40;
pub(crate) const NARROWED: u8 = 0x80;
pub(crate) const BOOL_TRUE: u8 = 0x50;
pub(crate) const BOOL_FALSE: u8 = 0x60;

/// Byte width of a numeric payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Width {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
}

impl Width {
    #[must_use]
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Width of the type's own representation.
    #[must_use]
    pub const fn native(ty: TagType) -> Width {
        match ty {
            TagType::Short => Width::Two,
            TagType::Int | TagType::Float => Width::Four,
            TagType::Long | TagType::Double => Width::Eight,
            _ => Width::One,
        }
    }

    /// Smallest width holding a signed value.
    #[must_use]
    pub fn for_signed(value: i64) -> Width {
        if i8::try_from(value).is_ok() {
            Width::One
        } else if i16::try_from(value).is_ok() {
            Width::Two
        } else if i32::try_from(value).is_ok() {
            Width::Four
        } else {
            Width::Eight
        }
    }

    /// Smallest width holding an unsigned value.
    #[must_use]
    pub fn for_unsigned(value: u64) -> Width {
        if u8::try_from(value).is_ok() {
            Width::One
        } else if u16::try_from(value).is_ok() {
            Width::Two
        } else if u32::try_from(value).is_ok() {
            Width::Four
        } else {
            Width::Eight
        }
    }

    /// Qualifier bits selecting this width for a type whose native width is `native`.
    #[must_use]
    pub const fn qualifier(self, native: Width) -> u8 {
        if self as u8 >= native as u8 {
            return 0x00;
        }
        match self {
            Width::One => 0x30,
            Width::Two => 0x20,
            Width::Four | Width::Eight => 0x10,
        }
    }

    /// Inverse of [`Width::qualifier`]; `None` when the bits name no width
    /// narrower than `native`.
    #[must_use]
    pub fn from_qualifier(bits: u8, native: Width) -> Option<Width> {
        let width = match bits & LOW_BITS {
            0x00 => return Some(native),
            0x30 => Width::One,
            0x20 => Width::Two,
            _ => Width::Four,
        };
        (width < native).then_some(width)
    }
}

/// How a Map, List or array records its element count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthPrefix {
    One,
    Two,
    Four,
    Indefinite,
}

impl LengthPrefix {
    #[must_use]
    pub fn for_count(count: usize) -> LengthPrefix {
        if count <= usize::from(u8::MAX) {
            LengthPrefix::One
        } else if count <= usize::from(u16::MAX) {
            LengthPrefix::Two
        } else {
            LengthPrefix::Four
        }
    }

    #[must_use]
    pub const fn qualifier(self) -> u8 {
        match self {
            LengthPrefix::One => 0x20,
            LengthPrefix::Two => 0x10,
            LengthPrefix::Four => 0x00,
            LengthPrefix::Indefinite => 0x30,
        }
    }

    #[must_use]
    pub const fn from_qualifier(bits: u8) -> LengthPrefix {
        match bits & LOW_BITS {
            0x20 => LengthPrefix::One,
            0x10 => LengthPrefix::Two,
            0x00 => LengthPrefix::Four,
            _ => LengthPrefix::Indefinite,
        }
    }
}

/// How a String records its length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringPrefix {
    One,
    Two,
    /// Zero-terminated.
    Indefinite,
}

impl StringPrefix {
    #[must_use]
    pub const fn qualifier(self) -> u8 {
        match self {
            StringPrefix::Two => 0x00,
            StringPrefix::One => 0x10,
            StringPrefix::Indefinite => 0x20,
        }
    }

    #[must_use]
    pub const fn from_qualifier(bits: u8) -> Option<StringPrefix> {
        match bits {
            0x00 => Some(StringPrefix::Two),
            0x10 => Some(StringPrefix::One),
            0x20 => Some(StringPrefix::Indefinite),
            _ => None,
        }
    }
}

/// Descriptor of a numeric scalar at a given width.
#[must_use]
pub fn scalar_descriptor(ty: TagType, unsigned: bool, width: Width) -> u8 {
    let mut descriptor = ty.code() | width.qualifier(Width::native(ty));
    if unsigned {
        descriptor |= UNSIGNED;
    }
    descriptor
}

/// Element of a typed array: knows its scalar type and how to move itself
/// through the byte stream at a given width.
pub(crate) trait Element: Copy {
    const TYPE: TagType;
    const ARRAY: TagType;
    const UNSIGNED: bool;

    /// Smallest width holding this value.
    fn width(self) -> Width;

    fn write<W: Write>(self, writer: &mut ByteWriter<W>, width: Width) -> Result<()>;

    fn read<R: Read>(reader: &mut ByteReader<R>, width: Width) -> Result<Self>;
}

macro_rules! signed_element {
    ($($ty:ty => $scalar:ident, $array:ident);* $(;)?) => {
        $(
            impl Element for $ty {
                const TYPE: TagType = TagType::$scalar;
                const ARRAY: TagType = TagType::$array;
                const UNSIGNED: bool = false;

                fn width(self) -> Width {
                    Width::for_signed(self.into())
                }

                fn write<W: Write>(self, writer: &mut ByteWriter<W>, width: Width) -> Result<()> {
                    writer.write_sized(width, i64::from(self) as u64)
                }

                fn read<R: Read>(reader: &mut ByteReader<R>, width: Width) -> Result<Self> {
                    // Width never exceeds the native width, so the value fits.
                    Ok(reader.read_signed(width)? as $ty)
                }
            }
        )*
    };
}

macro_rules! unsigned_element {
    ($($ty:ty => $scalar:ident, $array:ident);* $(;)?) => {
        $(
            impl Element for $ty {
                const TYPE: TagType = TagType::$scalar;
                const ARRAY: TagType = TagType::$array;
                const UNSIGNED: bool = true;

                fn width(self) -> Width {
                    Width::for_unsigned(self.into())
                }

                fn write<W: Write>(self, writer: &mut ByteWriter<W>, width: Width) -> Result<()> {
                    writer.write_sized(width, u64::from(self))
                }

                fn read<R: Read>(reader: &mut ByteReader<R>, width: Width) -> Result<Self> {
                    Ok(reader.read_unsigned(width)? as $ty)
                }
            }
        )*
    };
}

signed_element! {
    i8 => Byte, ByteArray;
    i16 => Short, ShortArray;
    i32 => Int, IntArray;
    i64 => Long, LongArray;
}

unsigned_element! {
    u8 => Byte, ByteArray;
    u16 => Short, ShortArray;
    u32 => Int, IntArray;
    u64 => Long, LongArray;
}

impl Element for f32 {
    const TYPE: TagType = TagType::Float;
    const ARRAY: TagType = TagType::FloatArray;
    const UNSIGNED: bool = false;

    fn width(self) -> Width {
        Width::Four
    }

    fn write<W: Write>(self, writer: &mut ByteWriter<W>, _width: Width) -> Result<()> {
        writer.write_f32(self)
    }

    fn read<R: Read>(reader: &mut ByteReader<R>, _width: Width) -> Result<Self> {
        reader.read_f32()
    }
}

impl Element for f64 {
    const TYPE: TagType = TagType::Double;
    const ARRAY: TagType = TagType::DoubleArray;
    const UNSIGNED: bool = false;

    fn width(self) -> Width {
        Width::Eight
    }

    fn write<W: Write>(self, writer: &mut ByteWriter<W>, _width: Width) -> Result<()> {
        writer.write_f64(self)
    }

    fn read<R: Read>(reader: &mut ByteReader<R>, _width: Width) -> Result<Self> {
        reader.read_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_width_selection() {
        assert_eq!(Width::for_signed(100), Width::One);
        assert_eq!(Width::for_signed(-128), Width::One);
        assert_eq!(Width::for_signed(-129), Width::Two);
        assert_eq!(Width::for_signed(30_000), Width::Two);
        assert_eq!(Width::for_signed(40_000), Width::Four);
        assert_eq!(Width::for_signed(i64::from(i32::MIN)), Width::Four);
        assert_eq!(Width::for_signed(i64::MAX), Width::Eight);
    }

    #[test]
    fn test_unsigned_width_selection() {
        assert_eq!(Width::for_unsigned(255), Width::One);
        assert_eq!(Width::for_unsigned(256), Width::Two);
        assert_eq!(Width::for_unsigned(3_000_000_000), Width::Four);
        assert_eq!(Width::for_unsigned(u64::MAX), Width::Eight);
    }

    #[test]
    fn test_width_qualifiers_per_type() {
        // Int
        assert_eq!(Width::One.qualifier(Width::Four), 0x30);
        assert_eq!(Width::Two.qualifier(Width::Four), 0x20);
        assert_eq!(Width::Four.qualifier(Width::Four), 0x00);
        // Long
        assert_eq!(Width::Four.qualifier(Width::Eight), 0x10);
        // Short
        assert_eq!(Width::One.qualifier(Width::Two), 0x30);
        assert_eq!(Width::Two.qualifier(Width::Two), 0x00);
    }

    #[test]
    fn test_width_from_qualifier_rejects_undefined() {
        assert_eq!(Width::from_qualifier(0x10, Width::Eight), Some(Width::Four));
        assert_eq!(Width::from_qualifier(0x10, Width::Four), None);
        assert_eq!(Width::from_qualifier(0x20, Width::Two), None);
        assert_eq!(Width::from_qualifier(0x30, Width::One), None);
        assert_eq!(Width::from_qualifier(0x00, Width::One), Some(Width::One));
    }

    #[test]
    fn test_length_prefix_boundaries() {
        assert_eq!(LengthPrefix::for_count(0), LengthPrefix::One);
        assert_eq!(LengthPrefix::for_count(255), LengthPrefix::One);
        assert_eq!(LengthPrefix::for_count(256), LengthPrefix::Two);
        assert_eq!(LengthPrefix::for_count(65_536), LengthPrefix::Four);
        for prefix in [
            LengthPrefix::One,
            LengthPrefix::Two,
            LengthPrefix::Four,
            LengthPrefix::Indefinite,
        ] {
            assert_eq!(LengthPrefix::from_qualifier(prefix.qualifier()), prefix);
        }
    }

    #[test]
    fn test_scalar_descriptors() {
        assert_eq!(scalar_descriptor(TagType::Int, false, Width::One), 0x33);
        assert_eq!(scalar_descriptor(TagType::Int, true, Width::Four), 0x43);
        assert_eq!(scalar_descriptor(TagType::Long, false, Width::Four), 0x14);
        assert_eq!(scalar_descriptor(TagType::Byte, true, Width::One), 0x41);
        assert_eq!(scalar_descriptor(TagType::Double, false, Width::Eight), 0x06);
    }
}
