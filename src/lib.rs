//! # bso
//!
//! A compact, self-describing binary tag format with a canonical text form.
//!
//! ## What is BSO?
//!
//! BSO stores a tree of typed values: signed and unsigned integers of four
//! widths, floats, strings, ordered maps, homogeneous lists and packed numeric
//! arrays. Every value starts with one descriptor byte whose low nibble names
//! the type and whose high nibble qualifies the encoding (payload width,
//! signedness, length prefix). Integers are narrowed to the smallest width that
//! holds them, so small numbers cost a single payload byte.
//!
//! ## Key Features
//!
//! - **Typed Tree**: [`Tag`] is a closed enum; lists and arrays are
//!   homogeneous by construction and maps keep insertion order
//! - **Compact Binary**: narrowed integers, 1/2/4-byte length prefixes, and
//!   optional indefinite-length containers
//! - **Canonical Text**: typed literals (`1b`, `2s`, `3L`, `[I;1,2]`) that
//!   parse back to an identical tree, with pretty and colored output
//! - **Serde Bridge**: turn any `Serialize` type into a [`Tag`] and back
//! - **Byte Order**: big-endian by default, little-endian on request
//!
//! ## Quick Start
//!
//! ```rust
//! use bso::{from_slice, from_str, to_bytes, to_string, Tag};
//!
//! let tag = Tag::map([
//!     ("name", Tag::String("Steve".into())),
//!     ("level", Tag::Short(12)),
//!     ("pos", Tag::IntArray(vec![20, -10, 10])),
//! ])
//! .unwrap();
//!
//! let bytes = to_bytes(&tag).unwrap();
//! assert_eq!(from_slice(&bytes).unwrap(), tag);
//!
//! let text = to_string(&tag);
//! assert_eq!(text, "{name:\"Steve\",level:12s,pos:[I;20,-10,10]}");
//! assert_eq!(from_str(&text).unwrap(), tag);
//! ```
//!
//! ### Rust Types through Serde
//!
//! ```rust
//! use bso::{from_tag, to_tag, Tag};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Player {
//!     name: String,
//!     health: f32,
//!     level: u16,
//! }
//!
//! let player = Player { name: "Alex".into(), health: 20.0, level: 3 };
//! let tag = to_tag(&player).unwrap();
//! assert_eq!(tag.get("level"), Some(&Tag::UShort(3)));
//!
//! let back: Player = from_tag(tag).unwrap();
//! assert_eq!(back, player);
//! ```
//!
//! ### Literal Trees with `tag!`
//!
//! ```rust
//! use bso::tag;
//!
//! let tag = tag!({ "id": 7, "tags": ["a", "b"] }).unwrap();
//! assert_eq!(bso::to_string(&tag), "{id:7,tags:[\"a\",\"b\"]}");
//! ```
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Malformed input is reported through [`Error`], never a panic
//! - Container nesting is capped at [`decode::MAX_DEPTH`] levels for both the
//!   binary and the text reader
//!
//! ## Cargo Features
//!
//! - **`gzip`**: `to_gzip_bytes` and `from_gzip_slice`, a gzip frame around
//!   the binary form

#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "gzip")]
#[cfg_attr(docsrs, doc(cfg(feature = "gzip")))]
pub mod compress;
pub mod de;
pub mod decode;
pub mod descriptor;
pub mod encode;
pub mod error;
pub mod list;
pub mod macros;
pub mod map;
pub mod options;
pub mod parse;
pub mod render;
pub mod ser;
pub mod stream;
pub mod value;

#[cfg(feature = "gzip")]
pub use compress::{
    from_gzip_slice, from_gzip_slice_with_options, to_gzip_bytes, to_gzip_bytes_with_options,
};
pub use de::{from_tag, TagDeserializer};
pub use decode::Decoder;
pub use encode::Encoder;
pub use error::{Error, Result};
pub use list::TagList;
pub use map::TagMap;
pub use options::{BinaryOptions, Endian, LengthMode, TextOptions};
pub use parse::Parser;
pub use render::Renderer;
pub use ser::{to_tag, TagSerializer};
pub use value::{IntoTag, Tag, TagType, MAX_STRING_LEN};

use std::io;

/// Encodes a tag into big-endian binary with default options.
///
/// # Examples
///
/// ```rust
/// use bso::{to_bytes, Tag};
///
/// assert_eq!(to_bytes(&Tag::Bool(true)).unwrap(), vec![0x51]);
/// assert_eq!(to_bytes(&Tag::UShort(300)).unwrap(), vec![0x42, 0x01, 0x2C]);
/// ```
///
/// # Errors
///
/// Returns an error if a string or key is longer than 65535 bytes.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_bytes(tag: &Tag) -> Result<Vec<u8>> {
    to_bytes_with_options(tag, &BinaryOptions::default())
}

/// Encodes a tag into binary with custom options.
///
/// # Examples
///
/// ```rust
/// use bso::{to_bytes_with_options, BinaryOptions, Endian, Tag};
///
/// let options = BinaryOptions::new().with_endian(Endian::Little);
/// let bytes = to_bytes_with_options(&Tag::Short(1000), &options).unwrap();
/// assert_eq!(bytes, vec![0x02, 0xE8, 0x03]);
/// ```
///
/// # Errors
///
/// Returns an error if a string or key is longer than 65535 bytes.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_bytes_with_options(tag: &Tag, options: &BinaryOptions) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(Vec::with_capacity(128), options.clone());
    encoder.encode(tag)?;
    Ok(encoder.into_inner())
}

/// Encodes a tag into a writer with default options.
///
/// # Examples
///
/// ```rust
/// use bso::{to_writer, Tag};
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Tag::Null).unwrap();
/// assert_eq!(buffer, vec![0x00]);
/// ```
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W: io::Write>(writer: W, tag: &Tag) -> Result<()> {
    to_writer_with_options(writer, tag, &BinaryOptions::default())
}

/// Encodes a tag into a writer with custom options.
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W: io::Write>(
    mut writer: W,
    tag: &Tag,
    options: &BinaryOptions,
) -> Result<()> {
    // Nothing reaches the writer unless the whole document encodes.
    let bytes = to_bytes_with_options(tag, options)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Decodes exactly one big-endian document from a byte slice.
///
/// # Examples
///
/// ```rust
/// use bso::{from_slice, Error, Tag};
///
/// assert_eq!(from_slice(&[0x33, 0x64]).unwrap(), Tag::Int(100));
/// assert!(matches!(from_slice(&[0x33, 0x64, 0x00]), Err(Error::InvalidEncoding { .. })));
/// assert!(matches!(from_slice(&[0x03, 0x00]), Err(Error::Truncated { .. })));
/// ```
///
/// # Errors
///
/// Returns an error if the bytes are not a valid document or bytes remain
/// after it.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(bytes: &[u8]) -> Result<Tag> {
    from_slice_with_options(bytes, &BinaryOptions::default())
}

/// Decodes exactly one document from a byte slice using the byte order in
/// `options`.
///
/// # Errors
///
/// Returns an error if the bytes are not a valid document or bytes remain
/// after it.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice_with_options(bytes: &[u8], options: &BinaryOptions) -> Result<Tag> {
    let mut decoder = Decoder::new(bytes, options.endian);
    let tag = decoder.decode()?;
    let consumed = decoder.position();
    if let Some(&next) = bytes.get(consumed) {
        return Err(Error::invalid_encoding(
            next,
            &format!("{} trailing bytes after document", bytes.len() - consumed),
        ));
    }
    Ok(tag)
}

/// Decodes one big-endian document from a reader.
///
/// Only the bytes of that document are consumed; anything after it stays in
/// the reader.
///
/// # Examples
///
/// ```rust
/// use bso::{from_reader, Tag};
/// use std::io::{Cursor, Read};
///
/// let mut cursor = Cursor::new(vec![0x51, 0x61]);
/// assert_eq!(from_reader(&mut cursor).unwrap(), Tag::Bool(true));
/// assert_eq!(from_reader(&mut cursor).unwrap(), Tag::Bool(false));
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the bytes are not a valid document.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R: io::Read>(reader: R) -> Result<Tag> {
    from_reader_with_options(reader, &BinaryOptions::default())
}

/// Decodes one document from a reader using the byte order in `options`.
///
/// # Errors
///
/// Returns an error if reading fails or the bytes are not a valid document.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader_with_options<R: io::Read>(reader: R, options: &BinaryOptions) -> Result<Tag> {
    Decoder::new(reader, options.endian).decode()
}

/// Renders a tag in the compact canonical text form.
///
/// # Examples
///
/// ```rust
/// use bso::{to_string, Tag};
///
/// assert_eq!(to_string(&Tag::Float(1.5)), "1.5f");
/// assert_eq!(to_string(&Tag::ByteArray(vec![1, 2])), "[B;1b,2b]");
/// ```
#[must_use]
pub fn to_string(tag: &Tag) -> String {
    to_string_with_options(tag, &TextOptions::default())
}

/// Renders a tag with newlines and two-space indentation.
///
/// # Examples
///
/// ```rust
/// use bso::{to_string_pretty, Tag};
///
/// let tag = Tag::map([("x", Tag::Int(1)), ("y", Tag::Int(2))]).unwrap();
/// assert_eq!(to_string_pretty(&tag), "{\n  x: 1,\n  y: 2\n}");
/// ```
#[must_use]
pub fn to_string_pretty(tag: &Tag) -> String {
    to_string_with_options(tag, &TextOptions::pretty())
}

/// Renders a tag with custom text options.
///
/// # Examples
///
/// ```rust
/// use bso::{to_string_with_options, Tag, TextOptions};
///
/// let tag = Tag::map([("x", Tag::Int(1))]).unwrap();
/// let options = TextOptions::pretty().with_indent(4);
/// assert_eq!(to_string_with_options(&tag, &options), "{\n    x: 1\n}");
/// ```
#[must_use]
pub fn to_string_with_options(tag: &Tag, options: &TextOptions) -> String {
    let mut renderer = Renderer::new(options.clone());
    renderer.render(tag);
    renderer.into_inner()
}

/// Parses one document from canonical text.
///
/// # Examples
///
/// ```rust
/// use bso::{from_str, Tag};
///
/// let tag = from_str("{a:1b, b:[L;1L,2L]}").unwrap();
/// assert_eq!(tag.get("b"), Some(&Tag::LongArray(vec![1, 2])));
/// ```
///
/// # Errors
///
/// Returns an error if the text is malformed, a literal is out of range, a
/// list mixes types, or a map repeats a key. Syntax errors carry line and
/// column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str) -> Result<Tag> {
    Parser::from_str(s).parse()
}
