//! Gzip framing around the binary form (`gzip` feature).
//!
//! The compressed stream is a plain gzip member whose contents are exactly one
//! binary document, so decompression happens before the first descriptor is
//! read and the codec itself is unaware of it.
//!
//! ```rust
//! use bso::{from_gzip_slice, to_gzip_bytes, Tag};
//!
//! let tag = Tag::map([("name", Tag::String("Steve".into()))]).unwrap();
//! let packed = to_gzip_bytes(&tag).unwrap();
//! assert_eq!(&packed[..2], &[0x1f, 0x8b]);
//! assert_eq!(from_gzip_slice(&packed).unwrap(), tag);
//! ```

use crate::{BinaryOptions, Encoder, Result, Tag};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Read;

/// Encodes `tag` with default options and gzips the result.
///
/// # Errors
///
/// Fails for the same reasons as [`to_bytes`](crate::to_bytes).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_gzip_bytes(tag: &Tag) -> Result<Vec<u8>> {
    to_gzip_bytes_with_options(tag, &BinaryOptions::default())
}

/// Encodes `tag` with `options` and gzips the result.
///
/// # Errors
///
/// Fails for the same reasons as [`to_bytes_with_options`](crate::to_bytes_with_options).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_gzip_bytes_with_options(tag: &Tag, options: &BinaryOptions) -> Result<Vec<u8>> {
    let gz = GzEncoder::new(Vec::new(), Compression::default());
    let mut encoder = Encoder::new(gz, options.clone());
    encoder.encode(tag)?;
    let packed = encoder.into_inner().finish()?;
    log::debug!("gzip framed document is {} bytes", packed.len());
    Ok(packed)
}

/// Inflates a gzip stream and decodes the big-endian document inside it.
///
/// # Errors
///
/// Fails with [`Error::Io`](crate::Error::Io) when the gzip framing is
/// corrupt, and otherwise for the same reasons as [`from_slice`](crate::from_slice).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_gzip_slice(bytes: &[u8]) -> Result<Tag> {
    from_gzip_slice_with_options(bytes, &BinaryOptions::default())
}

/// Inflates a gzip stream and decodes the document inside it with the byte
/// order in `options`.
///
/// # Errors
///
/// See [`from_gzip_slice`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_gzip_slice_with_options(bytes: &[u8], options: &BinaryOptions) -> Result<Tag> {
    let mut inflated = Vec::with_capacity(bytes.len() * 2);
    GzDecoder::new(bytes).read_to_end(&mut inflated)?;
    crate::from_slice_with_options(&inflated, options)
}
