//! Canonical text parsing.
//!
//! [`Parser`] is a single-pass recursive-descent reader with one character of
//! lookahead. It accepts everything [`Renderer`](crate::Renderer) writes,
//! including pretty-printed and ANSI-colored output, and enforces the same
//! invariants as the tag constructors:
//!
//! - Out-of-range literals (`300b`, `-1ub`) fail with [`Error::Range`]
//! - Mixed lists and mismatched typed-array elements fail with [`Error::TypeMismatch`]
//! - Repeated map keys fail with [`Error::DuplicateKey`]
//! - Everything else malformed fails with [`Error::Syntax`], carrying the
//!   offset, line, column and a snippet of the input at the cursor
//!
//! ## Usage
//!
//! ```rust
//! use bso::{from_str, Tag};
//!
//! let tag = from_str("{a: 1b, list: [1, 2], arr: [L; 5L]}").unwrap();
//! assert_eq!(tag.get("a"), Some(&Tag::Byte(1)));
//! assert_eq!(tag.get("arr"), Some(&Tag::LongArray(vec![5])));
//! ```

use crate::decode::MAX_DEPTH;
use crate::render::is_bare_key_char;
use crate::value::ArrayKind;
use crate::{Error, Result, Tag, TagList, TagMap};

const CONTEXT_CHARS: usize = 24;

/// Parses the canonical text form into a [`Tag`].
pub struct Parser<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    depth: usize,
}

#[derive(Clone, Copy)]
struct Mark {
    position: usize,
    line: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        Parser {
            input,
            position: 0,
            line: 1,
            column: 1,
            depth: 0,
        }
    }

    /// Parses one complete document; only whitespace may follow it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] for grammar violations and the constructor
    /// errors ([`Error::Range`], [`Error::TypeMismatch`],
    /// [`Error::DuplicateKey`]) for well-formed text that violates an invariant.
    pub fn parse(&mut self) -> Result<Tag> {
        let tag = self.parse_element()?;
        self.skip_whitespace();
        if !self.at_end() {
            return Err(self.error("unexpected characters after the document"));
        }
        log::debug!(
            "parsed {} from {} bytes of text",
            tag.tag_type(),
            self.input.len()
        );
        Ok(tag)
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn mark(&self) -> Mark {
        Mark {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    fn error(&self, msg: &str) -> Error {
        self.error_at(self.mark(), msg)
    }

    fn error_at(&self, mark: Mark, msg: &str) -> Error {
        let context: String = self.input[mark.position..]
            .chars()
            .take(CONTEXT_CHARS)
            .collect();
        Error::syntax(mark.position, mark.line, mark.column, msg, &context)
    }

    /// Skips whitespace and ANSI CSI sequences such as `ESC[36m`.
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.next_char();
            } else if ch == '\x1b' && self.input[self.position + 1..].starts_with('[') {
                self.next_char();
                self.next_char();
                while let Some(c) = self.next_char() {
                    if ('\u{40}'..='\u{7e}').contains(&c) {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        self.skip_whitespace();
        if self.peek_char() == Some(expected) {
            self.next_char();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{expected}'")))
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let input = self.input;
        let start = self.position;
        while self.peek_char().is_some_and(&pred) {
            self.next_char();
        }
        &input[start..self.position]
    }

    fn parse_element(&mut self) -> Result<Tag> {
        self.skip_whitespace();
        match self.peek_char() {
            None => Err(self.error("unexpected end of input")),
            Some('{') => self.nested(Self::parse_map),
            Some('[') => self.nested(Self::parse_bracket),
            Some('"' | '\'') => {
                let s = self.parse_string()?;
                Tag::string(s)
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '.' => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() => {
                if self.rest().starts_with("NaN") || self.rest().starts_with("Infinity") {
                    return self.parse_number();
                }
                let mark = self.mark();
                match self.take_while(|c| c.is_ascii_alphabetic()) {
                    "null" => Ok(Tag::Null),
                    "true" => Ok(Tag::Bool(true)),
                    "false" => Ok(Tag::Bool(false)),
                    _ => Err(self.error_at(mark, "unexpected identifier")),
                }
            }
            Some(_) => Err(self.error("unexpected character")),
        }
    }

    fn nested(&mut self, f: fn(&mut Self) -> Result<Tag>) -> Result<Tag> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting exceeds the maximum depth"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn parse_string(&mut self) -> Result<String> {
        let start = self.mark();
        let quote = match self.next_char() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error_at(start, "expected string")),
        };
        let mut result = String::new();
        while let Some(ch) = self.next_char() {
            match ch {
                '\\' => match self.next_char() {
                    Some('\\') => result.push('\\'),
                    Some('"') => result.push('"'),
                    Some('\'') => result.push('\''),
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some('0') => result.push('\0'),
                    Some(other) => {
                        result.push('\\');
                        result.push(other);
                    }
                    None => break,
                },
                c if c == quote => return Ok(result),
                c => result.push(c),
            }
        }
        Err(self.error_at(start, "unterminated string"))
    }

    fn parse_map(&mut self) -> Result<Tag> {
        self.expect('{')?;
        let mut map = TagMap::new();
        self.skip_whitespace();
        if self.peek_char() == Some('}') {
            self.next_char();
            return Ok(Tag::Map(map));
        }
        loop {
            self.skip_whitespace();
            let key = match self.peek_char() {
                Some('"' | '\'') => self.parse_string()?,
                Some(c) if is_bare_key_char(c) => self.take_while(is_bare_key_char).to_string(),
                _ => return Err(self.error("expected map key")),
            };
            self.expect(':')?;
            let value = self.parse_element()?;
            map.try_insert(key, value)?;
            if !self.continue_sequence('}')? {
                return Ok(Tag::Map(map));
            }
        }
    }

    /// After an element: consumes `,` and returns `true`, or consumes `close`
    /// and returns `false`.
    fn continue_sequence(&mut self, close: char) -> Result<bool> {
        self.skip_whitespace();
        let mark = self.mark();
        match self.next_char() {
            Some(',') => {
                self.skip_whitespace();
                if self.peek_char() == Some(close) {
                    return Err(self.error_at(mark, "trailing comma"));
                }
                Ok(true)
            }
            Some(c) if c == close => Ok(false),
            Some(_) => Err(self.error_at(mark, &format!("expected ',' or '{close}'"))),
            None => Err(self.error_at(mark, &format!("unterminated sequence, expected '{close}'"))),
        }
    }

    /// Dispatches `[` to a typed array when an array header follows, else to a list.
    fn parse_bracket(&mut self) -> Result<Tag> {
        self.expect('[')?;
        self.skip_whitespace();
        if let Some((kind, len)) = self.peek_array_header() {
            for _ in 0..len {
                self.next_char();
            }
            self.expect(';')?;
            let elements = self.parse_elements()?;
            return kind.collect(elements);
        }
        let elements = self.parse_elements()?;
        TagList::new(elements).map(Tag::List)
    }

    /// Looks ahead for `B;`, `UB;` and the other array headers without
    /// consuming anything. Returns the kind and the header's length.
    fn peek_array_header(&self) -> Option<(ArrayKind, usize)> {
        let rest = self.rest();
        let len = if rest.starts_with('U') { 2 } else { 1 };
        let kind = ArrayKind::from_header(rest.get(..len)?)?;
        rest[len..]
            .trim_start()
            .starts_with(';')
            .then_some((kind, len))
    }

    /// Elements up to and including the closing `]`.
    fn parse_elements(&mut self) -> Result<Vec<Tag>> {
        let mut elements = Vec::new();
        self.skip_whitespace();
        if self.peek_char() == Some(']') {
            self.next_char();
            return Ok(elements);
        }
        loop {
            elements.push(self.parse_element()?);
            if !self.continue_sequence(']')? {
                return Ok(elements);
            }
        }
    }

    fn parse_number(&mut self) -> Result<Tag> {
        let start = self.mark();
        let negative = self.peek_char() == Some('-');
        if negative {
            self.next_char();
        }

        let mut fractional = false;
        let special = match self.peek_char() {
            Some(c) if c.is_ascii_alphabetic() => {
                let value = if self.rest().starts_with("NaN") {
                    f64::NAN
                } else if self.rest().starts_with("Infinity") {
                    if negative {
                        f64::NEG_INFINITY
                    } else {
                        f64::INFINITY
                    }
                } else {
                    return Err(self.error("expected digits"));
                };
                let len = if value.is_nan() { 3 } else { 8 };
                for _ in 0..len {
                    self.next_char();
                }
                Some(value)
            }
            _ => {
                let digits = self.take_while(|c| c.is_ascii_digit()).len();
                let mut fraction_digits = 0;
                if self.peek_char() == Some('.') {
                    self.next_char();
                    fractional = true;
                    fraction_digits = self.take_while(|c| c.is_ascii_digit()).len();
                }
                if digits + fraction_digits == 0 {
                    return Err(self.error_at(start, "expected digits"));
                }
                if matches!(self.peek_char(), Some('e' | 'E')) {
                    fractional = true;
                    self.next_char();
                    if matches!(self.peek_char(), Some('+' | '-')) {
                        self.next_char();
                    }
                    if self.take_while(|c| c.is_ascii_digit()).is_empty() {
                        return Err(self.error("expected exponent digits"));
                    }
                }
                None
            }
        };
        let text = &self.input[start.position..self.position];
        let suffix = self.take_while(|c| c.is_ascii_alphanumeric());

        if let Some(value) = special {
            return match suffix {
                "f" => Ok(Tag::Float(value as f32)),
                "d" => Ok(Tag::Double(value)),
                _ => Err(self.error_at(start, "NaN and Infinity need an 'f' or 'd' suffix")),
            };
        }

        match suffix {
            "f" => {
                let value: f32 = text
                    .parse()
                    .map_err(|_| self.error_at(start, "invalid float literal"))?;
                if value.is_infinite() {
                    return Err(Error::range("Float", f32::MIN, f32::MAX, text));
                }
                Ok(Tag::Float(value))
            }
            "d" => self.parse_double(start, text),
            "" if fractional => self.parse_double(start, text),
            _ if fractional => Err(self.error_at(
                start,
                "a fractional literal needs an 'f' or 'd' suffix",
            )),
            _ => {
                let value: i128 = text
                    .parse()
                    .map_err(|_| Error::range("integer literal", i64::MIN, u64::MAX, text))?;
                match suffix {
                    "b" => Tag::byte(value),
                    "ub" => Tag::ubyte(value),
                    "s" => Tag::short(value),
                    "us" => Tag::ushort(value),
                    "" => Tag::int(value),
                    "u" => Tag::uint(value),
                    "L" => Tag::long(value),
                    "uL" => Tag::ulong(value),
                    other => Err(self.error_at(start, &format!("unknown number suffix {other:?}"))),
                }
            }
        }
    }

    fn parse_double(&self, start: Mark, text: &str) -> Result<Tag> {
        let value: f64 = text
            .parse()
            .map_err(|_| self.error_at(start, "invalid float literal"))?;
        if value.is_infinite() {
            return Err(Error::range("Double", f64::MIN, f64::MAX, text));
        }
        Ok(Tag::Double(value))
    }
}
