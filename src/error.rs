//! Error types for BSO encoding, decoding, rendering and parsing.
//!
//! Every failure in this crate is reported through [`Error`]. The variants fall
//! into a handful of classes:
//!
//! - **Range errors**: a scalar or string exceeds the bounds of its variant
//!   ([`Error::Range`], [`Error::StringTooLong`])
//! - **Type mismatches**: a list or typed array mixes element variants
//! - **Unknown types / invalid encodings**: a descriptor byte that does not
//!   decode to a defined `(type, qualifier)` combination
//! - **Syntax errors**: malformed text, always with a position and a snippet
//! - **Truncation**: the input ran out before a promised length or terminator
//!
//! ## Examples
//!
//! ```rust
//! use bso::{from_str, Error};
//!
//! let result = from_str("{\"a\":1,}");
//! assert!(matches!(result, Err(Error::Syntax { .. })));
//!
//! if let Err(err) = result {
//!     eprintln!("Parse error: {}", err);
//! }
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors that can occur while working with BSO data.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// A numeric value lies outside the range of its variant
    #[error("{kind} range is {min} to {max}, value was {value}")]
    Range {
        kind: &'static str,
        min: String,
        max: String,
        value: String,
    },

    /// A string is longer than the format can store
    #[error("string is {len} bytes long, the maximum is {max}")]
    StringTooLong { len: usize, max: usize },

    /// A list or typed array holds elements of different variants
    #[error("type mismatch at element {index}: expected {expected}, found {found}")]
    TypeMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    /// A type code with no defined meaning
    #[error("unknown type code 0x{0:02x}")]
    UnknownType(u8),

    /// A descriptor whose qualifier bits are not valid for its type
    #[error("invalid encoding for descriptor 0x{descriptor:02x}: {msg}")]
    InvalidEncoding { descriptor: u8, msg: String },

    /// Text grammar violation
    #[error("Syntax error at line {line}, column {col} (offset {position}): {msg}\n  near: {context}")]
    Syntax {
        position: usize,
        line: usize,
        col: usize,
        msg: String,
        context: String,
    },

    /// Input exhausted before a length or terminator was satisfied
    #[error("unexpected end of input while reading {expected}")]
    Truncated { expected: String },

    /// The same key appears twice in one map
    #[error("duplicate map key {0:?}")]
    DuplicateKey(String),

    /// Unsupported type for the serde bridge
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a range error for an integer variant.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bso::Error;
    ///
    /// let err = Error::range("Byte", i8::MIN, i8::MAX, 300);
    /// assert_eq!(err.to_string(), "Byte range is -128 to 127, value was 300");
    /// ```
    pub fn range<A, B, C>(kind: &'static str, min: A, max: B, value: C) -> Self
    where
        A: fmt::Display,
        B: fmt::Display,
        C: fmt::Display,
    {
        Error::Range {
            kind,
            min: min.to_string(),
            max: max.to_string(),
            value: value.to_string(),
        }
    }

    /// Creates a syntax error at a byte offset with its line/column and a context snippet.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bso::Error;
    ///
    /// let err = Error::syntax(4, 1, 5, "trailing comma", ",}");
    /// assert!(err.to_string().contains("column 5"));
    /// ```
    pub fn syntax(position: usize, line: usize, col: usize, msg: &str, context: &str) -> Self {
        Error::Syntax {
            position,
            line,
            col,
            msg: msg.to_string(),
            context: context.to_string(),
        }
    }

    /// Creates a type mismatch error for the element at `index`.
    pub fn type_mismatch(index: usize, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            index,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an invalid encoding error for `descriptor`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bso::Error;
    ///
    /// let err = Error::invalid_encoding(0x13, "undefined integer width");
    /// assert!(err.to_string().contains("0x13"));
    /// ```
    pub fn invalid_encoding(descriptor: u8, msg: &str) -> Self {
        Error::InvalidEncoding {
            descriptor,
            msg: msg.to_string(),
        }
    }

    pub fn truncated(expected: &str) -> Self {
        Error::Truncated {
            expected: expected.to_string(),
        }
    }

    /// Creates an unsupported type error for values the serde bridge cannot express.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bso::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for the RangeError class (numeric bounds and string length).
    #[must_use]
    pub const fn is_range(&self) -> bool {
        matches!(self, Error::Range { .. } | Error::StringTooLong { .. })
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(&err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_message_names_bound() {
        let err = Error::range("Int", i32::MIN, i32::MAX, 1u64 << 40);
        let msg = err.to_string();
        assert!(msg.contains("-2147483648"));
        assert!(msg.contains("2147483647"));
        assert!(msg.contains("1099511627776"));
        assert!(err.is_range());
    }

    #[test]
    fn test_string_too_long_is_range_class() {
        let err = Error::StringTooLong {
            len: 65536,
            max: 65535,
        };
        assert!(err.is_range());
        assert!(!Error::truncated("int").is_range());
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::Other, "disk on fire");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(ref m) if m.contains("disk on fire")));
    }
}
