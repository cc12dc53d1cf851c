//! Per-call configuration for the binary and text codecs.
//!
//! - [`BinaryOptions`]: byte order, width narrowing and length mode for the binary codec
//! - [`TextOptions`]: pretty printing, indentation and ANSI color for the text form
//!
//! Nothing here is global: every entry point takes its options by value.
//!
//! ## Examples
//!
//! ```rust
//! use bso::{to_bytes_with_options, BinaryOptions, Endian, LengthMode, Tag};
//!
//! let tag = Tag::IntArray(vec![1, 2, 3]);
//!
//! let options = BinaryOptions::new()
//!     .with_endian(Endian::Little)
//!     .with_length_mode(LengthMode::Indefinite);
//! let bytes = to_bytes_with_options(&tag, &options).unwrap();
//! assert_eq!(*bytes.last().unwrap(), 0x10);
//! ```

/// Byte order used for every multi-byte field of a stream.
///
/// # Examples
///
/// ```rust
/// use bso::Endian;
///
/// assert_eq!(Endian::default(), Endian::Big);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

/// How collection lengths are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LengthMode {
    /// A count prefix using the smallest width that fits.
    #[default]
    Counted,
    /// No count; every element carries a descriptor and the sequence ends with the End marker.
    Indefinite,
}

/// Configuration for the binary encoder and decoder.
///
/// The decoder only looks at [`endian`](BinaryOptions::endian); everything else
/// is read back from the descriptor bytes.
///
/// # Examples
///
/// ```rust
/// use bso::{BinaryOptions, Endian, LengthMode};
///
/// let options = BinaryOptions::new();
/// assert_eq!(options.endian, Endian::Big);
/// assert!(options.narrow_numbers);
/// assert_eq!(options.length_mode, LengthMode::Counted);
///
/// let options = BinaryOptions::indefinite().with_indefinite_strings(true);
/// assert_eq!(options.length_mode, LengthMode::Indefinite);
/// ```
#[derive(Clone, Debug)]
pub struct BinaryOptions {
    pub endian: Endian,
    pub narrow_numbers: bool,
    pub length_mode: LengthMode,
    pub indefinite_strings: bool,
}

impl Default for BinaryOptions {
    fn default() -> Self {
        BinaryOptions {
            endian: Endian::Big,
            narrow_numbers: true,
            length_mode: LengthMode::Counted,
            indefinite_strings: false,
        }
    }
}

impl BinaryOptions {
    /// Creates default options (big-endian, narrowed numbers, counted lengths).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that write every Map, List and array with indefinite length.
    #[must_use]
    pub fn indefinite() -> Self {
        BinaryOptions {
            length_mode: LengthMode::Indefinite,
            ..Default::default()
        }
    }

    /// Sets the byte order.
    #[must_use]
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Enables or disables width narrowing of integers and integer arrays.
    ///
    /// When disabled every value is written at its native width.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bso::{to_bytes_with_options, BinaryOptions, Tag};
    ///
    /// let options = BinaryOptions::new().with_narrowing(false);
    /// let bytes = to_bytes_with_options(&Tag::Int(1), &options).unwrap();
    /// assert_eq!(bytes, vec![0x03, 0, 0, 0, 1]);
    /// ```
    #[must_use]
    pub fn with_narrowing(mut self, narrow: bool) -> Self {
        self.narrow_numbers = narrow;
        self
    }

    /// Sets how Map, List and array lengths are written.
    #[must_use]
    pub fn with_length_mode(mut self, mode: LengthMode) -> Self {
        self.length_mode = mode;
        self
    }

    /// Writes strings zero-terminated instead of length-prefixed.
    ///
    /// Strings containing a NUL character are still written with a length prefix.
    #[must_use]
    pub fn with_indefinite_strings(mut self, indefinite: bool) -> Self {
        self.indefinite_strings = indefinite;
        self
    }
}

/// Configuration for the canonical text renderer.
///
/// # Examples
///
/// ```rust
/// use bso::TextOptions;
///
/// // Compact, uncolored output
/// let options = TextOptions::new();
/// assert!(!options.pretty);
///
/// // Pretty-printed with 4-space indentation and ANSI colors
/// let options = TextOptions::pretty().with_indent(4).with_color(true);
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Debug)]
pub struct TextOptions {
    pub indent: usize,
    pub pretty: bool,
    pub color: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions {
            indent: 2,
            pretty: false,
            color: false,
        }
    }
}

impl TextOptions {
    /// Creates default options (compact, 2-space indent when pretty, no color).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for pretty-printed output with newlines and indentation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bso::TextOptions;
    ///
    /// let options = TextOptions::pretty();
    /// assert!(options.pretty);
    /// ```
    #[must_use]
    pub fn pretty() -> Self {
        TextOptions {
            pretty: true,
            ..Default::default()
        }
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// Only affects pretty-printed output.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Wraps tokens in ANSI color sequences. The parser skips them, so colored
    /// output still parses.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}
