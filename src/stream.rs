//! Endian-aware fixed-width primitives over `io::Read` / `io::Write`.
//!
//! [`ByteWriter`] and [`ByteReader`] carry the stream's [`Endian`] so every
//! multi-byte field of a document is written and read in the same order.
//! Running out of input is reported as [`Error::Truncated`] naming what was
//! being read.
//!
//! ```rust
//! use bso::stream::{ByteReader, ByteWriter};
//! use bso::Endian;
//!
//! let mut writer = ByteWriter::new(Vec::new(), Endian::Little);
//! writer.write_u16(0x1234).unwrap();
//! let bytes = writer.into_inner();
//! assert_eq!(bytes, vec![0x34, 0x12]);
//!
//! let mut reader = ByteReader::new(&bytes[..], Endian::Little);
//! assert_eq!(reader.read_u16().unwrap(), 0x1234);
//! assert!(reader.read_u8().is_err());
//! ```

use crate::descriptor::Width;
use crate::{Endian, Error, Result};
use std::io::{self, Read, Write};

macro_rules! write_fixed {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self, value: $ty) -> Result<()> {
                match self.endian {
                    Endian::Big => self.write_bytes(&value.to_be_bytes()),
                    Endian::Little => self.write_bytes(&value.to_le_bytes()),
                }
            }
        )*
    };
}

macro_rules! read_fixed {
    ($($name:ident: $ty:ty, $len:literal, $what:literal);* $(;)?) => {
        $(
            pub fn $name(&mut self) -> Result<$ty> {
                let bytes = self.read_array::<$len>($what)?;
                Ok(match self.endian {
                    Endian::Big => <$ty>::from_be_bytes(bytes),
                    Endian::Little => <$ty>::from_le_bytes(bytes),
                })
            }
        )*
    };
}

/// Writes fixed-width fields in a single byte order.
pub struct ByteWriter<W> {
    inner: W,
    endian: Endian,
    written: usize,
}

impl<W: Write> ByteWriter<W> {
    pub fn new(inner: W, endian: Endian) -> Self {
        ByteWriter {
            inner,
            endian,
            written: 0,
        }
    }

    #[must_use]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.written
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    write_fixed! {
        write_u16: u16,
        write_i16: i16,
        write_u32: u32,
        write_i32: i32,
        write_u64: u64,
        write_i64: i64,
        write_f32: f32,
        write_f64: f64,
    }

    /// Writes the low `width` bytes of `bits`.
    ///
    /// Signed values are passed in two's complement, so truncating a value
    /// that fits the width keeps its sign.
    pub fn write_sized(&mut self, width: Width, bits: u64) -> Result<()> {
        match width {
            Width::One => self.write_u8(bits as u8),
            Width::Two => self.write_u16(bits as u16),
            Width::Four => self.write_u32(bits as u32),
            Width::Eight => self.write_u64(bits),
        }
    }

    /// Writes a string with a 2-byte length prefix (map keys).
    pub fn write_utf(&mut self, value: &str) -> Result<()> {
        let len = u16::try_from(value.len()).map_err(|_| Error::StringTooLong {
            len: value.len(),
            max: usize::from(u16::MAX),
        })?;
        self.write_u16(len)?;
        self.write_bytes(value.as_bytes())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reads fixed-width fields in a single byte order.
pub struct ByteReader<R> {
    inner: R,
    endian: Endian,
    position: usize,
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R, endian: Endian) -> Self {
        ByteReader {
            inner,
            endian,
            position: 0,
        }
    }

    #[must_use]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    fn read_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner
            .read_exact(&mut buf)
            .map_err(|err| eof_or_io(err, what))?;
        self.position += N;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>("byte")?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_be_bytes(self.read_array::<1>("byte")?))
    }

    read_fixed! {
        read_u16: u16, 2, "short";
        read_i16: i16, 2, "short";
        read_u32: u32, 4, "int";
        read_i32: i32, 4, "int";
        read_u64: u64, 8, "long";
        read_i64: i64, 8, "long";
        read_f32: f32, 4, "float";
        read_f64: f64, 8, "double";
    }

    /// Reads `width` bytes and sign-extends them.
    pub fn read_signed(&mut self, width: Width) -> Result<i64> {
        Ok(match width {
            Width::One => self.read_i8()?.into(),
            Width::Two => self.read_i16()?.into(),
            Width::Four => self.read_i32()?.into(),
            Width::Eight => self.read_i64()?,
        })
    }

    /// Reads `width` bytes and zero-extends them.
    pub fn read_unsigned(&mut self, width: Width) -> Result<u64> {
        Ok(match width {
            Width::One => self.read_u8()?.into(),
            Width::Two => self.read_u16()?.into(),
            Width::Four => self.read_u32()?.into(),
            Width::Eight => self.read_u64()?,
        })
    }

    /// Reads exactly `len` bytes without trusting `len` for preallocation.
    pub fn read_bytes(&mut self, len: usize, what: &str) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut buf)
            .map_err(|err| eof_or_io(err, what))?;
        self.position += buf.len();
        if buf.len() < len {
            return Err(Error::truncated(what));
        }
        Ok(buf)
    }

    /// Reads bytes up to and excluding a zero terminator.
    pub fn read_until_zero(&mut self, what: &str) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        loop {
            match self.read_array::<1>(what)?[0] {
                0 => return Ok(buf),
                byte => buf.push(byte),
            }
        }
    }

    /// Reads a 2-byte length followed by that many bytes.
    pub fn read_utf_bytes(&mut self, what: &str) -> Result<Vec<u8>> {
        let len = self.read_u16()?;
        self.read_bytes(usize::from(len), what)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

fn eof_or_io(err: io::Error, what: &str) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::truncated(what)
    } else {
        Error::from(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_layout() {
        let mut writer = ByteWriter::new(Vec::new(), Endian::Big);
        writer.write_i32(-2).unwrap();
        writer.write_f64(1.0).unwrap();
        assert_eq!(writer.bytes_written(), 12);
        let bytes = writer.into_inner();
        assert_eq!(&bytes[..4], &[0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(&bytes[4..], &1.0f64.to_be_bytes());
    }

    #[test]
    fn test_sized_round_trip_sign_extension() {
        let mut writer = ByteWriter::new(Vec::new(), Endian::Little);
        writer.write_sized(Width::One, (-10i64) as u64).unwrap();
        writer.write_sized(Width::Two, 0xBEEF).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes, vec![0xF6, 0xEF, 0xBE]);

        let mut reader = ByteReader::new(&bytes[..], Endian::Little);
        assert_eq!(reader.read_signed(Width::One).unwrap(), -10);
        assert_eq!(reader.read_unsigned(Width::Two).unwrap(), 0xBEEF);
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn test_truncated_fixed_field() {
        let bytes = [0x00, 0x01];
        let mut reader = ByteReader::new(&bytes[..], Endian::Big);
        let err = reader.read_i32().unwrap_err();
        assert!(matches!(err, Error::Truncated { ref expected } if expected == "int"));
    }

    #[test]
    fn test_read_bytes_short_input() {
        let bytes = [1, 2, 3];
        let mut reader = ByteReader::new(&bytes[..], Endian::Big);
        assert!(matches!(
            reader.read_bytes(usize::MAX, "string"),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_read_until_zero() {
        let bytes = b"abc\0rest";
        let mut reader = ByteReader::new(&bytes[..], Endian::Big);
        assert_eq!(reader.read_until_zero("string").unwrap(), b"abc".to_vec());
        assert_eq!(reader.position(), 4);

        let mut reader = ByteReader::new(&b"no end"[..], Endian::Big);
        assert!(reader.read_until_zero("string").is_err());
    }

    #[test]
    fn test_utf_prefix() {
        let mut writer = ByteWriter::new(Vec::new(), Endian::Big);
        writer.write_utf("hé").unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes, vec![0x00, 0x03, b'h', 0xC3, 0xA9]);
        let mut reader = ByteReader::new(&bytes[..], Endian::Big);
        assert_eq!(reader.read_utf_bytes("key").unwrap(), "hé".as_bytes());
    }
}
