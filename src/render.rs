//! Canonical text rendering.
//!
//! [`Renderer`] writes a [`Tag`] as typed literals that [`Parser`](crate::Parser)
//! reads back to an equal tree:
//!
//! - **Numbers** carry a suffix naming their variant (`1b`, `2s`, `3`, `4L`,
//!   `5.0f`, `6.0d`, unsigned `7ub`, `8us`, `9u`, `10uL`)
//! - **Maps** are `{key:value,...}` with bare keys where possible
//! - **Typed arrays** open with a header naming the element type (`[I;1,2]`)
//!
//! ## Usage
//!
//! ```rust
//! use bso::{to_string, to_string_pretty, Tag};
//!
//! let tag = Tag::map([("a", Tag::Byte(1)), ("b", Tag::Int(5))]).unwrap();
//! assert_eq!(to_string(&tag), "{a:1b,b:5}");
//! assert_eq!(to_string_pretty(&tag), "{\n  a: 1b,\n  b: 5\n}");
//! ```
//!
//! ## Direct Renderer Usage
//!
//! ```rust
//! use bso::{Renderer, Tag, TextOptions};
//!
//! let mut renderer = Renderer::new(TextOptions::new());
//! renderer.render(&Tag::UIntArray(vec![1, 2]));
//! assert_eq!(renderer.into_inner(), "[UI;1u,2u]");
//! ```

use crate::{Tag, TextOptions};
use std::fmt::Display;

/// ANSI SGR sequences used when [`TextOptions::color`] is set.
mod palette {
    pub const PUNCTUATION: &str = "\x1b[97m";
    pub const KEY: &str = "\x1b[36m";
    pub const STRING: &str = "\x1b[92m";
    pub const NUMBER: &str = "\x1b[33m";
    pub const KEYWORD: &str = "\x1b[35m";
    pub const RESET: &str = "\x1b[0m";
}

/// Renders tags into the canonical text form.
pub struct Renderer {
    output: String,
    options: TextOptions,
    level: usize,
}

impl Renderer {
    pub fn new(options: TextOptions) -> Self {
        Renderer {
            output: String::with_capacity(256),
            options,
            level: 0,
        }
    }

    /// Appends the text form of `tag` to the output.
    pub fn render(&mut self, tag: &Tag) {
        match tag {
            Tag::Null => self.keyword("null"),
            Tag::Bool(true) => self.keyword("true"),
            Tag::Bool(false) => self.keyword("false"),
            Tag::Byte(v) => self.number(v, "b"),
            Tag::UByte(v) => self.number(v, "ub"),
            Tag::Short(v) => self.number(v, "s"),
            Tag::UShort(v) => self.number(v, "us"),
            Tag::Int(v) => self.number(v, ""),
            Tag::UInt(v) => self.number(v, "u"),
            Tag::Long(v) => self.number(v, "L"),
            Tag::ULong(v) => self.number(v, "uL"),
            Tag::Float(v) => self.float(f64::from(*v), &format!("{v:?}"), "f"),
            Tag::Double(v) => self.float(*v, &format!("{v:?}"), "d"),
            Tag::String(s) => self.string(s, palette::STRING),
            Tag::Map(map) => self.map(map.iter()),
            Tag::List(list) => self.list(list.as_slice()),
            Tag::ByteArray(v) => self.array("B", v, "b"),
            Tag::UByteArray(v) => self.array("UB", v, "ub"),
            Tag::ShortArray(v) => self.array("S", v, "s"),
            Tag::UShortArray(v) => self.array("US", v, "us"),
            Tag::IntArray(v) => self.array("I", v, ""),
            Tag::UIntArray(v) => self.array("UI", v, "u"),
            Tag::LongArray(v) => self.array("L", v, "L"),
            Tag::ULongArray(v) => self.array("UL", v, "uL"),
            Tag::FloatArray(v) => {
                let values = v.iter().map(|f| (f64::from(*f), format!("{f:?}")));
                self.float_array("F", values, "f");
            }
            Tag::DoubleArray(v) => {
                let values = v.iter().map(|d| (*d, format!("{d:?}")));
                self.float_array("D", values, "d");
            }
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    fn token(&mut self, color: &str, text: &str) {
        if self.options.color {
            self.output.push_str(color);
            self.output.push_str(text);
            self.output.push_str(palette::RESET);
        } else {
            self.output.push_str(text);
        }
    }

    fn punct(&mut self, text: &str) {
        self.token(palette::PUNCTUATION, text);
    }

    fn keyword(&mut self, text: &str) {
        self.token(palette::KEYWORD, text);
    }

    fn number<T: Display>(&mut self, value: T, suffix: &str) {
        self.token(palette::NUMBER, &format!("{value}{suffix}"));
    }

    /// `debug` is the shortest round-tripping form of the value at its own precision.
    fn float(&mut self, value: f64, debug: &str, suffix: &str) {
        let text = if value.is_nan() {
            "NaN"
        } else if value == f64::INFINITY {
            "Infinity"
        } else if value == f64::NEG_INFINITY {
            "-Infinity"
        } else {
            debug
        };
        self.token(palette::NUMBER, &format!("{text}{suffix}"));
    }

    fn string(&mut self, s: &str, color: &str) {
        let quote = if s.contains('"') && !s.contains('\'') {
            '\''
        } else {
            '"'
        };
        let mut text = String::with_capacity(s.len() + 2);
        text.push(quote);
        for ch in s.chars() {
            match ch {
                '\\' => text.push_str("\\\\"),
                '\n' => text.push_str("\\n"),
                '\r' => text.push_str("\\r"),
                '\t' => text.push_str("\\t"),
                '\0' => text.push_str("\\0"),
                c if c == quote => {
                    text.push('\\');
                    text.push(c);
                }
                c => text.push(c),
            }
        }
        text.push(quote);
        self.token(color, &text);
    }

    fn key(&mut self, key: &str) {
        if is_bare_key(key) {
            self.token(palette::KEY, key);
        } else {
            self.string(key, palette::KEY);
        }
    }

    fn newline(&mut self) {
        self.output.push('\n');
        self.output
            .extend(std::iter::repeat(' ').take(self.level * self.options.indent));
    }

    fn separator(&mut self, multiline: bool) {
        self.punct(",");
        if multiline {
            self.newline();
        } else if self.options.pretty {
            self.output.push(' ');
        }
    }

    fn map<'t>(&mut self, entries: impl ExactSizeIterator<Item = (&'t String, &'t Tag)>) {
        self.punct("{");
        if entries.len() == 0 {
            self.punct("}");
            return;
        }
        let pretty = self.options.pretty;
        self.level += 1;
        if pretty {
            self.newline();
        }
        for (i, (key, value)) in entries.enumerate() {
            if i > 0 {
                self.separator(pretty);
            }
            self.key(key);
            self.punct(":");
            if pretty {
                self.output.push(' ');
            }
            self.render(value);
        }
        self.level -= 1;
        if pretty {
            self.newline();
        }
        self.punct("}");
    }

    fn list(&mut self, elements: &[Tag]) {
        self.punct("[");
        if elements.is_empty() {
            self.punct("]");
            return;
        }
        let multiline = self.options.pretty && elements.iter().any(is_container);
        self.level += 1;
        if multiline {
            self.newline();
        }
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                self.separator(multiline);
            }
            self.render(element);
        }
        self.level -= 1;
        if multiline {
            self.newline();
        }
        self.punct("]");
    }

    fn array_header(&mut self, header: &str, empty: bool) {
        self.punct(&format!("[{header};"));
        if self.options.pretty && !empty {
            self.output.push(' ');
        }
    }

    fn array<T: Display>(&mut self, header: &str, values: &[T], suffix: &str) {
        self.array_header(header, values.is_empty());
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.separator(false);
            }
            self.number(value, suffix);
        }
        self.punct("]");
    }

    fn float_array(
        &mut self,
        header: &str,
        values: impl ExactSizeIterator<Item = (f64, String)>,
        suffix: &str,
    ) {
        self.array_header(header, values.len() == 0);
        for (i, (value, debug)) in values.enumerate() {
            if i > 0 {
                self.separator(false);
            }
            self.float(value, &debug, suffix);
        }
        self.punct("]");
    }
}

/// Keys made only of these characters are written without quotes.
pub(crate) fn is_bare_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '+' | '.' | '-')
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(is_bare_key_char)
}

fn is_container(tag: &Tag) -> bool {
    matches!(tag, Tag::Map(_) | Tag::List(_)) || tag.tag_type().is_array()
}
