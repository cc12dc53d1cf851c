//! Binary encoding.
//!
//! [`Encoder`] writes a [`Tag`] as one descriptor byte followed by its payload,
//! recursively. Integers and integer arrays are narrowed to the smallest width
//! that holds them unless [`BinaryOptions::narrow_numbers`] is off.
//!
//! Most callers should use [`to_bytes`](crate::to_bytes) or
//! [`to_writer`](crate::to_writer):
//!
//! ```rust
//! use bso::{to_bytes, Tag};
//!
//! // Int 100 fits one byte: descriptor 0x33, payload 0x64
//! assert_eq!(to_bytes(&Tag::Int(100)).unwrap(), vec![0x33, 0x64]);
//! ```

use crate::descriptor::{
    scalar_descriptor, Element, LengthPrefix, StringPrefix, Width, BOOL_FALSE, BOOL_TRUE, END,
    NARROWED, UNSIGNED,
};
use crate::stream::ByteWriter;
use crate::value::check_string_len;
use crate::{BinaryOptions, Error, LengthMode, Result, Tag, TagType};
use std::io::Write;

/// Writes tags to an `io::Write` in the binary form.
pub struct Encoder<W> {
    writer: ByteWriter<W>,
    options: BinaryOptions,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W, options: BinaryOptions) -> Self {
        Encoder {
            writer: ByteWriter::new(writer, options.endian),
            options,
        }
    }

    /// Encodes one complete document.
    ///
    /// # Errors
    ///
    /// Fails when a string or key exceeds 65535 bytes, a collection is longer
    /// than a signed 32-bit count, or the writer fails.
    pub fn encode(&mut self, tag: &Tag) -> Result<()> {
        let descriptor = self.descriptor(tag);
        self.writer.write_u8(descriptor)?;
        self.write_payload(tag)?;
        log::debug!(
            "encoded {} as {} bytes ({:?})",
            tag.tag_type(),
            self.writer.bytes_written(),
            self.options.endian
        );
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Descriptor byte for `tag` under the current options.
    #[must_use]
    pub fn descriptor(&self, tag: &Tag) -> u8 {
        match tag {
            Tag::Null => TagType::Null.code(),
            Tag::Bool(true) => TagType::Byte.code() | BOOL_TRUE,
            Tag::Bool(false) => TagType::Byte.code() | BOOL_FALSE,
            Tag::Byte(_) => TagType::Byte.code(),
            Tag::UByte(_) => TagType::Byte.code() | UNSIGNED,
            Tag::Short(v) => self.integer_descriptor(*v),
            Tag::UShort(v) => self.integer_descriptor(*v),
            Tag::Int(v) => self.integer_descriptor(*v),
            Tag::UInt(v) => self.integer_descriptor(*v),
            Tag::Long(v) => self.integer_descriptor(*v),
            Tag::ULong(v) => self.integer_descriptor(*v),
            Tag::Float(_) => TagType::Float.code(),
            Tag::Double(_) => TagType::Double.code(),
            Tag::String(s) => TagType::String.code() | self.string_prefix(s).qualifier(),
            Tag::Map(map) => TagType::Map.code() | self.length_prefix(map.len()).qualifier(),
            Tag::List(list) => TagType::List.code() | self.length_prefix(list.len()).qualifier(),
            Tag::ByteArray(v) => self.array_descriptor(v),
            Tag::UByteArray(v) => self.array_descriptor(v),
            Tag::ShortArray(v) => self.array_descriptor(v),
            Tag::UShortArray(v) => self.array_descriptor(v),
            Tag::IntArray(v) => self.array_descriptor(v),
            Tag::UIntArray(v) => self.array_descriptor(v),
            Tag::LongArray(v) => self.array_descriptor(v),
            Tag::ULongArray(v) => self.array_descriptor(v),
            Tag::FloatArray(v) => self.array_descriptor(v),
            Tag::DoubleArray(v) => self.array_descriptor(v),
        }
    }

    fn write_payload(&mut self, tag: &Tag) -> Result<()> {
        match tag {
            Tag::Null | Tag::Bool(_) => Ok(()),
            Tag::Byte(v) => self.writer.write_i8(*v),
            Tag::UByte(v) => self.writer.write_u8(*v),
            Tag::Short(v) => self.write_integer(*v),
            Tag::UShort(v) => self.write_integer(*v),
            Tag::Int(v) => self.write_integer(*v),
            Tag::UInt(v) => self.write_integer(*v),
            Tag::Long(v) => self.write_integer(*v),
            Tag::ULong(v) => self.write_integer(*v),
            Tag::Float(v) => self.writer.write_f32(*v),
            Tag::Double(v) => self.writer.write_f64(*v),
            Tag::String(s) => self.write_string(s),
            Tag::Map(map) => {
                let indefinite = self.options.length_mode == LengthMode::Indefinite;
                if !indefinite {
                    self.write_count(map.len())?;
                }
                for (key, value) in map {
                    check_string_len(key)?;
                    let descriptor = self.descriptor(value);
                    self.writer.write_u8(descriptor)?;
                    self.writer.write_utf(key)?;
                    self.write_payload(value)?;
                }
                if indefinite {
                    self.writer.write_u8(END)?;
                }
                Ok(())
            }
            Tag::List(list) => {
                let indefinite = self.options.length_mode == LengthMode::Indefinite;
                if !indefinite {
                    self.write_count(list.len())?;
                }
                for element in list {
                    let descriptor = self.descriptor(element);
                    self.writer.write_u8(descriptor)?;
                    self.write_payload(element)?;
                }
                if indefinite {
                    self.writer.write_u8(END)?;
                }
                Ok(())
            }
            Tag::ByteArray(v) => self.write_array(v),
            Tag::UByteArray(v) => self.write_array(v),
            Tag::ShortArray(v) => self.write_array(v),
            Tag::UShortArray(v) => self.write_array(v),
            Tag::IntArray(v) => self.write_array(v),
            Tag::UIntArray(v) => self.write_array(v),
            Tag::LongArray(v) => self.write_array(v),
            Tag::ULongArray(v) => self.write_array(v),
            Tag::FloatArray(v) => self.write_array(v),
            Tag::DoubleArray(v) => self.write_array(v),
        }
    }

    fn width_of<T: Element>(&self, value: T) -> Width {
        if self.options.narrow_numbers {
            value.width()
        } else {
            Width::native(T::TYPE)
        }
    }

    fn integer_descriptor<T: Element>(&self, value: T) -> u8 {
        scalar_descriptor(T::TYPE, T::UNSIGNED, self.width_of(value))
    }

    fn write_integer<T: Element>(&mut self, value: T) -> Result<()> {
        let width = self.width_of(value);
        value.write(&mut self.writer, width)
    }

    fn string_prefix(&self, s: &str) -> StringPrefix {
        if self.options.indefinite_strings && !s.as_bytes().contains(&0) {
            StringPrefix::Indefinite
        } else if s.len() <= usize::from(u8::MAX) {
            StringPrefix::One
        } else {
            StringPrefix::Two
        }
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        check_string_len(s)?;
        match self.string_prefix(s) {
            StringPrefix::Indefinite => {
                self.writer.write_bytes(s.as_bytes())?;
                self.writer.write_u8(0)
            }
            prefix => {
                if self.options.indefinite_strings {
                    log::debug!(
                        "string of {} bytes contains NUL, writing it length-prefixed",
                        s.len()
                    );
                }
                if prefix == StringPrefix::One {
                    self.writer.write_u8(s.len() as u8)?;
                } else {
                    self.writer.write_u16(s.len() as u16)?;
                }
                self.writer.write_bytes(s.as_bytes())
            }
        }
    }

    fn length_prefix(&self, count: usize) -> LengthPrefix {
        match self.options.length_mode {
            LengthMode::Indefinite => LengthPrefix::Indefinite,
            LengthMode::Counted => LengthPrefix::for_count(count),
        }
    }

    fn write_count(&mut self, count: usize) -> Result<()> {
        match LengthPrefix::for_count(count) {
            LengthPrefix::One => self.writer.write_u8(count as u8),
            LengthPrefix::Two => self.writer.write_u16(count as u16),
            _ => {
                let count = i32::try_from(count)
                    .map_err(|_| Error::range("collection length", 0, i32::MAX, count))?;
                self.writer.write_i32(count)
            }
        }
    }

    /// Shared element width of an array: the width of its extreme value.
    fn array_width<T: Element>(&self, values: &[T]) -> Width {
        let native = Width::native(T::TYPE);
        if !self.options.narrow_numbers {
            return native;
        }
        values
            .iter()
            .map(|v| v.width())
            .max()
            .unwrap_or(native)
            .min(native)
    }

    fn array_descriptor<T: Element>(&self, values: &[T]) -> u8 {
        let mut descriptor = T::ARRAY.code() | self.length_prefix(values.len()).qualifier();
        if T::UNSIGNED {
            descriptor |= UNSIGNED;
        }
        let narrowed = self.array_width(values) < Width::native(T::TYPE);
        if narrowed && self.options.length_mode == LengthMode::Counted {
            descriptor |= NARROWED;
        }
        descriptor
    }

    fn write_array<T: Element>(&mut self, values: &[T]) -> Result<()> {
        let width = self.array_width(values);
        let element = scalar_descriptor(T::TYPE, T::UNSIGNED, width);
        match self.options.length_mode {
            LengthMode::Counted => {
                if width < Width::native(T::TYPE) {
                    self.writer.write_u8(element)?;
                }
                self.write_count(values.len())?;
                for value in values {
                    value.write(&mut self.writer, width)?;
                }
            }
            LengthMode::Indefinite => {
                for value in values {
                    self.writer.write_u8(element)?;
                    value.write(&mut self.writer, width)?;
                }
                self.writer.write_u8(END)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Endian, TagList, TagMap};

    fn encode(tag: &Tag) -> Vec<u8> {
        encode_with(tag, BinaryOptions::default())
    }

    fn encode_with(tag: &Tag, options: BinaryOptions) -> Vec<u8> {
        let mut encoder = Encoder::new(Vec::new(), options);
        encoder.encode(tag).unwrap();
        encoder.into_inner()
    }

    #[test]
    fn test_flush_and_into_inner() {
        let mut encoder = Encoder::new(Vec::new(), BinaryOptions::default());
        encoder.encode(&Tag::Bool(true)).unwrap();
        encoder.encode(&Tag::Null).unwrap();
        encoder.flush().unwrap();
        assert_eq!(encoder.into_inner(), vec![0x51, 0x00]);
    }

    #[test]
    fn test_int_width_minimality() {
        assert_eq!(encode(&Tag::Int(100)), vec![0x33, 0x64]);
        assert_eq!(encode(&Tag::Int(30_000)), vec![0x23, 0x75, 0x30]);
        assert_eq!(encode(&Tag::Int(-70_000))[0], 0x03);
        assert_eq!(
            encode(&Tag::UInt(3_000_000_000)),
            vec![0x43, 0xB2, 0xD0, 0x5E, 0x00]
        );
    }

    #[test]
    fn test_long_and_short_widths() {
        assert_eq!(encode(&Tag::Long(1))[0], 0x34);
        assert_eq!(encode(&Tag::Long(70_000)), vec![0x14, 0x00, 0x01, 0x11, 0x70]);
        assert_eq!(encode(&Tag::Long(i64::MIN)).len(), 9);
        assert_eq!(encode(&Tag::Short(5)), vec![0x32, 0x05]);
        assert_eq!(encode(&Tag::Short(300)), vec![0x02, 0x01, 0x2C]);
        assert_eq!(encode(&Tag::UShort(200)), vec![0x72, 0xC8]);
    }

    #[test]
    fn test_booleans_have_no_payload() {
        assert_eq!(encode(&Tag::Bool(true)), vec![0x51]);
        assert_eq!(encode(&Tag::Bool(false)), vec![0x61]);
        assert_eq!(encode(&Tag::UByte(255)), vec![0x41, 0xFF]);
        assert_eq!(encode(&Tag::Null), vec![0x00]);
    }

    #[test]
    fn test_narrowing_disabled() {
        let options = BinaryOptions::new().with_narrowing(false);
        assert_eq!(encode_with(&Tag::Short(5), options.clone()), vec![0x02, 0x00, 0x05]);
        assert_eq!(
            encode_with(&Tag::IntArray(vec![1]), options),
            vec![0x2C, 0x01, 0x00, 0x00, 0x00, 0x01]
        );
    }

    #[test]
    fn test_string_prefixes() {
        assert_eq!(encode(&Tag::String("hi".into())), vec![0x17, 0x02, b'h', b'i']);
        let long = "x".repeat(300);
        let bytes = encode(&Tag::String(long));
        assert_eq!(&bytes[..3], &[0x07, 0x01, 0x2C]);

        let options = BinaryOptions::new().with_indefinite_strings(true);
        assert_eq!(
            encode_with(&Tag::String("hi".into()), options.clone()),
            vec![0x27, b'h', b'i', 0x00]
        );
        // NUL inside forces a prefix
        assert_eq!(
            encode_with(&Tag::String("a\0".into()), options),
            vec![0x17, 0x02, b'a', 0x00]
        );
    }

    #[test]
    fn test_oversized_string_rejected() {
        let mut encoder = Encoder::new(Vec::new(), BinaryOptions::default());
        let err = encoder.encode(&Tag::String("x".repeat(65_536))).unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn test_int_array_narrowing() {
        assert_eq!(
            encode(&Tag::IntArray(vec![20, -10, 10])),
            vec![0xAC, 0x33, 0x03, 0x14, 0xF6, 0x0A]
        );
        assert_eq!(
            encode(&Tag::ULongArray(vec![1, 70_000])),
            vec![0xED, 0x54, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x11, 0x70]
        );
    }

    #[test]
    fn test_indefinite_array_elements_carry_descriptors() {
        let bytes = encode_with(&Tag::ShortArray(vec![1, 2]), BinaryOptions::indefinite());
        assert_eq!(bytes, vec![0x3B, 0x32, 0x01, 0x32, 0x02, 0x10]);
    }

    #[test]
    fn test_map_layout() {
        let mut map = TagMap::new();
        map.try_insert("a".into(), Tag::Byte(1)).unwrap();
        let bytes = encode(&Tag::Map(map.clone()));
        assert_eq!(bytes, vec![0x28, 0x01, 0x01, 0x00, 0x01, b'a', 0x01]);

        let bytes = encode_with(&Tag::Map(map), BinaryOptions::indefinite());
        assert_eq!(bytes, vec![0x38, 0x01, 0x00, 0x01, b'a', 0x01, 0x10]);
    }

    #[test]
    fn test_list_layout() {
        let list = TagList::new(vec![Tag::Int(1), Tag::Int(300)]).unwrap();
        assert_eq!(
            encode(&Tag::List(list)),
            vec![0x29, 0x02, 0x33, 0x01, 0x23, 0x01, 0x2C]
        );
    }

    #[test]
    fn test_little_endian() {
        let options = BinaryOptions::new().with_endian(Endian::Little);
        assert_eq!(encode_with(&Tag::Int(30_000), options), vec![0x23, 0x30, 0x75]);
    }

    #[test]
    fn test_count_prefix_widths() {
        let bytes = encode(&Tag::ByteArray(vec![0; 300]));
        assert_eq!(&bytes[..3], &[0x1A, 0x01, 0x2C]);
        let bytes = encode(&Tag::ByteArray(vec![0; 70_000]));
        assert_eq!(&bytes[..5], &[0x0A, 0x00, 0x01, 0x11, 0x70]);
    }
}
