//! Binary decoding.
//!
//! [`Decoder`] mirrors [`Encoder`](crate::Encoder): it reads a descriptor byte,
//! dispatches on its type code and qualifier bits, and rebuilds the tag tree.
//! Every qualifier combination the encoder never produces is rejected with
//! [`Error::InvalidEncoding`].
//!
//! ```rust
//! use bso::{from_slice, Tag};
//!
//! let tag = from_slice(&[0xAC, 0x33, 0x03, 0x14, 0xF6, 0x0A]).unwrap();
//! assert_eq!(tag, Tag::IntArray(vec![20, -10, 10]));
//! ```

use crate::descriptor::{
    Element, LengthPrefix, StringPrefix, Width, BOOL_FALSE, BOOL_TRUE, END, LOW_BITS, NARROWED,
    QUALIFIER_MASK, TYPE_MASK, UNSIGNED,
};
use crate::stream::ByteReader;
use crate::value::check_string_len;
use crate::{Endian, Error, Result, Tag, TagList, TagMap, TagType};
use std::io::Read;

/// Deepest container nesting accepted from untrusted input.
pub const MAX_DEPTH: usize = 256;

// Caps preallocation driven by counts read from the stream.
const PREALLOC_LIMIT: usize = 4096;

/// Reads tags in the binary form from an `io::Read`.
pub struct Decoder<R> {
    reader: ByteReader<R>,
    depth: usize,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R, endian: Endian) -> Self {
        Decoder {
            reader: ByteReader::new(reader, endian),
            depth: 0,
        }
    }

    /// Decodes one complete document.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidEncoding`] on an undefined descriptor,
    /// [`Error::Truncated`] when the input ends early, [`Error::TypeMismatch`]
    /// for a heterogeneous list and [`Error::DuplicateKey`] for a repeated key.
    pub fn decode(&mut self) -> Result<Tag> {
        let start = self.reader.position();
        let descriptor = self.reader.read_u8()?;
        let tag = self.decode_value(descriptor)?;
        log::debug!(
            "decoded {} from {} bytes ({:?})",
            tag.tag_type(),
            self.reader.position() - start,
            self.reader.endian()
        );
        Ok(tag)
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    fn decode_value(&mut self, descriptor: u8) -> Result<Tag> {
        if descriptor == END {
            return Err(Error::invalid_encoding(
                descriptor,
                "End marker where a value was expected",
            ));
        }
        let ty = TagType::from_code(descriptor & TYPE_MASK)?;
        let qualifier = descriptor & QUALIFIER_MASK;
        match ty {
            TagType::Null if qualifier == 0 => Ok(Tag::Null),
            TagType::Null => Err(Error::invalid_encoding(descriptor, "undefined Null qualifier")),
            TagType::Byte => match qualifier {
                0x00 => Ok(Tag::Byte(self.reader.read_i8()?)),
                UNSIGNED => Ok(Tag::UByte(self.reader.read_u8()?)),
                BOOL_TRUE => Ok(Tag::Bool(true)),
                BOOL_FALSE => Ok(Tag::Bool(false)),
                _ => Err(Error::invalid_encoding(descriptor, "undefined Byte qualifier")),
            },
            TagType::Short | TagType::Int | TagType::Long => self.decode_integer(descriptor, ty),
            TagType::Float | TagType::Double if qualifier != 0 => Err(Error::invalid_encoding(
                descriptor,
                "floating point values take no qualifier",
            )),
            TagType::Float => Ok(Tag::Float(self.reader.read_f32()?)),
            TagType::Double => Ok(Tag::Double(self.reader.read_f64()?)),
            TagType::String => self.decode_string(descriptor),
            TagType::Map => self.nested(descriptor, Self::decode_map),
            TagType::List => self.nested(descriptor, Self::decode_list),
            _ => self.decode_array(descriptor, ty),
        }
    }

    fn decode_integer(&mut self, descriptor: u8, ty: TagType) -> Result<Tag> {
        let qualifier = descriptor & QUALIFIER_MASK;
        if qualifier & NARROWED != 0 {
            return Err(Error::invalid_encoding(descriptor, "undefined integer qualifier"));
        }
        let width = Width::from_qualifier(qualifier, Width::native(ty))
            .ok_or_else(|| Error::invalid_encoding(descriptor, "undefined integer width"))?;
        let unsigned = qualifier & UNSIGNED != 0;
        // Widths never exceed the native width, so the casts below are lossless.
        Ok(match (ty, unsigned) {
            (TagType::Short, false) => Tag::Short(self.reader.read_signed(width)? as i16),
            (TagType::Short, true) => Tag::UShort(self.reader.read_unsigned(width)? as u16),
            (TagType::Int, false) => Tag::Int(self.reader.read_signed(width)? as i32),
            (TagType::Int, true) => Tag::UInt(self.reader.read_unsigned(width)? as u32),
            (_, false) => Tag::Long(self.reader.read_signed(width)?),
            (_, true) => Tag::ULong(self.reader.read_unsigned(width)?),
        })
    }

    fn decode_string(&mut self, descriptor: u8) -> Result<Tag> {
        let prefix = StringPrefix::from_qualifier(descriptor & QUALIFIER_MASK)
            .ok_or_else(|| Error::invalid_encoding(descriptor, "undefined String qualifier"))?;
        let bytes = match prefix {
            StringPrefix::One => {
                let len = self.reader.read_u8()?;
                self.reader.read_bytes(usize::from(len), "string")?
            }
            StringPrefix::Two => {
                let len = self.reader.read_u16()?;
                self.reader.read_bytes(usize::from(len), "string")?
            }
            StringPrefix::Indefinite => self.reader.read_until_zero("zero-terminated string")?,
        };
        let value = utf8(bytes, descriptor)?;
        check_string_len(&value)?;
        Ok(Tag::String(value))
    }

    fn nested(&mut self, descriptor: u8, f: fn(&mut Self, u8) -> Result<Tag>) -> Result<Tag> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::invalid_encoding(
                descriptor,
                "nesting exceeds the maximum depth",
            ));
        }
        self.depth += 1;
        let result = f(self, descriptor);
        self.depth -= 1;
        result
    }

    /// Element count, or `None` for an indefinite-length sequence.
    fn read_count(&mut self, descriptor: u8) -> Result<Option<usize>> {
        let count = match LengthPrefix::from_qualifier(descriptor) {
            LengthPrefix::Indefinite => return Ok(None),
            LengthPrefix::One => usize::from(self.reader.read_u8()?),
            LengthPrefix::Two => usize::from(self.reader.read_u16()?),
            LengthPrefix::Four => usize::try_from(self.reader.read_i32()?)
                .map_err(|_| Error::invalid_encoding(descriptor, "negative length"))?,
        };
        Ok(Some(count))
    }

    /// Reads the next element descriptor; `None` at the End marker of an
    /// indefinite sequence.
    fn next_descriptor(&mut self, remaining: &mut Option<usize>) -> Result<Option<u8>> {
        match remaining {
            Some(0) => Ok(None),
            Some(n) => {
                *n -= 1;
                self.reader.read_u8().map(Some)
            }
            None => match self.reader.read_u8() {
                Ok(END) => Ok(None),
                Ok(descriptor) => Ok(Some(descriptor)),
                Err(Error::Truncated { .. }) => Err(Error::truncated("End marker")),
                Err(err) => Err(err),
            },
        }
    }

    fn decode_map(&mut self, descriptor: u8) -> Result<Tag> {
        if descriptor & (UNSIGNED | NARROWED) != 0 {
            return Err(Error::invalid_encoding(descriptor, "undefined Map qualifier"));
        }
        let mut remaining = self.read_count(descriptor)?;
        log::trace!("map {:#04x}, {:?} entries", descriptor, remaining);
        let mut map = TagMap::with_capacity(remaining.unwrap_or(0).min(PREALLOC_LIMIT));
        while let Some(value_descriptor) = self.next_descriptor(&mut remaining)? {
            let key = utf8(self.reader.read_utf_bytes("map key")?, descriptor)?;
            let value = self.decode_value(value_descriptor)?;
            map.try_insert(key, value)?;
        }
        Ok(Tag::Map(map))
    }

    fn decode_list(&mut self, descriptor: u8) -> Result<Tag> {
        if descriptor & (UNSIGNED | NARROWED) != 0 {
            return Err(Error::invalid_encoding(descriptor, "undefined List qualifier"));
        }
        let mut remaining = self.read_count(descriptor)?;
        log::trace!("list {:#04x}, {:?} elements", descriptor, remaining);
        let mut list = TagList::empty();
        while let Some(element_descriptor) = self.next_descriptor(&mut remaining)? {
            let element = self.decode_value(element_descriptor)?;
            list.push(element)?;
        }
        Ok(Tag::List(list))
    }

    fn decode_array(&mut self, descriptor: u8, ty: TagType) -> Result<Tag> {
        let unsigned = descriptor & UNSIGNED != 0;
        Ok(match (ty, unsigned) {
            (TagType::ByteArray, false) => Tag::ByteArray(self.read_array(descriptor)?),
            (TagType::ByteArray, true) => Tag::UByteArray(self.read_array(descriptor)?),
            (TagType::ShortArray, false) => Tag::ShortArray(self.read_array(descriptor)?),
            (TagType::ShortArray, true) => Tag::UShortArray(self.read_array(descriptor)?),
            (TagType::IntArray, false) => Tag::IntArray(self.read_array(descriptor)?),
            (TagType::IntArray, true) => Tag::UIntArray(self.read_array(descriptor)?),
            (TagType::LongArray, false) => Tag::LongArray(self.read_array(descriptor)?),
            (TagType::LongArray, true) => Tag::ULongArray(self.read_array(descriptor)?),
            (TagType::FloatArray, false) => Tag::FloatArray(self.read_array(descriptor)?),
            (TagType::DoubleArray, false) => Tag::DoubleArray(self.read_array(descriptor)?),
            _ => {
                return Err(Error::invalid_encoding(
                    descriptor,
                    "undefined array qualifier",
                ))
            }
        })
    }

    fn read_array<T: Element>(&mut self, descriptor: u8) -> Result<Vec<T>> {
        let (width, mut remaining) = self.read_array_header::<T>(descriptor)?;
        log::trace!("array {:#04x}, {:?} elements", descriptor, remaining);

        if let Some(count) = remaining {
            let width = width.unwrap_or(Width::native(T::TYPE));
            let mut values = Vec::with_capacity(count.min(PREALLOC_LIMIT));
            for _ in 0..count {
                values.push(T::read(&mut self.reader, width)?);
            }
            return Ok(values);
        }

        let mut values = Vec::new();
        let mut shared = None;
        while let Some(element) = self.next_descriptor(&mut remaining)? {
            match shared {
                Some(first) if first != element => {
                    return Err(Error::invalid_encoding(
                        element,
                        "array elements must share one width",
                    ))
                }
                Some(_) => {}
                None => shared = Some(element),
            }
            let width = element_width::<T>(element)?;
            values.push(T::read(&mut self.reader, width)?);
        }
        Ok(values)
    }

    /// Reads the optional shared element descriptor and the count of an
    /// array; the count is `None` for an indefinite array.
    fn read_array_header<T: Element>(
        &mut self,
        descriptor: u8,
    ) -> Result<(Option<Width>, Option<usize>)> {
        let narrowed = descriptor & NARROWED != 0;
        if LengthPrefix::from_qualifier(descriptor) == LengthPrefix::Indefinite {
            if narrowed {
                return Err(Error::invalid_encoding(
                    descriptor,
                    "indefinite arrays carry per-element descriptors",
                ));
            }
            return Ok((None, None));
        }
        if narrowed && is_floating(T::TYPE) {
            return Err(Error::invalid_encoding(
                descriptor,
                "floating point arrays are never narrowed",
            ));
        }
        let width = if narrowed {
            let element = self.reader.read_u8()?;
            let width = element_width::<T>(element)?;
            if width >= Width::native(T::TYPE) {
                return Err(Error::invalid_encoding(
                    descriptor,
                    "narrowed array must use a narrower element width",
                ));
            }
            Some(width)
        } else {
            None
        };
        Ok((width, self.read_count(descriptor)?))
    }
}

/// Width selected by a typed array's element descriptor.
fn element_width<T: Element>(element: u8) -> Result<Width> {
    if element & TYPE_MASK != T::TYPE.code() {
        return Err(Error::invalid_encoding(
            element,
            "element descriptor does not match the array type",
        ));
    }
    let qualifier = element & QUALIFIER_MASK;
    if is_floating(T::TYPE) && qualifier != 0 {
        return Err(Error::invalid_encoding(
            element,
            "floating point elements take no qualifier",
        ));
    }
    if (qualifier & UNSIGNED != 0) != T::UNSIGNED || qualifier & NARROWED != 0 {
        return Err(Error::invalid_encoding(
            element,
            "element descriptor does not match the array signedness",
        ));
    }
    Width::from_qualifier(qualifier & LOW_BITS, Width::native(T::TYPE))
        .ok_or_else(|| Error::invalid_encoding(element, "undefined element width"))
}

fn is_floating(ty: TagType) -> bool {
    matches!(ty, TagType::Float | TagType::Double)
}

fn utf8(bytes: Vec<u8>, descriptor: u8) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|err| Error::invalid_encoding(descriptor, &format!("invalid UTF-8: {err}")))
}
