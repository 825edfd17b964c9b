//! `@ByteArray(...)` literals, as written by Qt's `QSettings` in ini files.
//!
//! Each byte is written literally when it is printable, as a named escape
//! when it is one of a handful of control characters, and as a `\x` hex
//! escape otherwise. Qt reads hex escapes greedily, so a hex digit that
//! directly follows a hex escape (or `\0`) has to be escaped too.

use std::fmt::{self, Write as _};

use crate::error::{IdentityError, Result};

/// Opening token of a byte array literal.
pub const PREFIX: &str = "@ByteArray(";

/// Closing token of a byte array literal.
pub const SUFFIX: &str = ")";

/// Punctuation written literally, on top of ASCII letters and digits.
const PRINTABLE_PUNCTUATION: &[u8] = b"*+' ,;`~{}([)]:.$|/&^=-%<>!#_@?";

/// A byte sequence rendered as a `@ByteArray(...)` literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ByteArrayLiteral(String);

impl ByteArrayLiteral {
    /// Encode `bytes` into a literal.
    #[must_use]
    pub fn encode(bytes: &[u8]) -> Self {
        Self(encode(bytes))
    }

    /// Wrap existing literal text after checking that it decodes.
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        decode(&text)?;
        Ok(Self(text))
    }

    /// Decode the literal back into bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        decode(&self.0)
    }

    /// The literal text, including prefix and suffix
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the literal, returning its text
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ByteArrayLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const fn is_printable(b: u8) -> bool {
    if b.is_ascii_alphanumeric() {
        return true;
    }
    let mut i = 0;
    while i < PRINTABLE_PUNCTUATION.len() {
        if PRINTABLE_PUNCTUATION[i] == b {
            return true;
        }
        i += 1;
    }
    false
}

/// Escape letter for bytes that have a two-character named escape.
const fn named_escape(b: u8) -> Option<u8> {
    match b {
        b'\t' => Some(b't'),
        b'\r' => Some(b'r'),
        0x07 => Some(b'a'),
        0x08 => Some(b'b'),
        0x0b => Some(b'v'),
        0x0c => Some(b'f'),
        b'\n' => Some(b'n'),
        0x00 => Some(b'0'),
        b'"' => Some(b'"'),
        b'\\' => Some(b'\\'),
        _ => None,
    }
}

const fn unescape_named(letter: u8) -> Option<u8> {
    match letter {
        b't' => Some(b'\t'),
        b'r' => Some(b'\r'),
        b'a' => Some(0x07),
        b'b' => Some(0x08),
        b'v' => Some(0x0b),
        b'f' => Some(0x0c),
        b'n' => Some(b'\n'),
        b'0' => Some(0x00),
        b'"' => Some(b'"'),
        b'\\' => Some(b'\\'),
        _ => None,
    }
}

fn push_hex_escape(out: &mut String, b: u8) {
    // `{:x}` drops the leading zero nibble, giving `\xH` for small bytes.
    let _ = write!(out, "\\x{b:x}");
}

/// Encode `bytes` as a `@ByteArray(...)` literal.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(PREFIX.len() + bytes.len() * 2 + SUFFIX.len());
    out.push_str(PREFIX);

    let mut hex_before = false;
    for &b in bytes {
        hex_before = if hex_before && b.is_ascii_hexdigit() {
            push_hex_escape(&mut out, b);
            true
        } else if is_printable(b) {
            out.push(char::from(b));
            false
        } else if let Some(letter) = named_escape(b) {
            out.push('\\');
            out.push(char::from(letter));
            // `\0` followed by a digit would read as an octal run.
            b == 0
        } else {
            push_hex_escape(&mut out, b);
            true
        };
    }

    out.push_str(SUFFIX);
    out
}

fn malformed(offset: usize, reason: impl Into<String>) -> IdentityError {
    IdentityError::MalformedLiteral {
        offset: PREFIX.len() + offset,
        reason: reason.into(),
    }
}

/// Decode a `@ByteArray(...)` literal back into bytes.
///
/// Accepts both `\xH` and `\xHH` hex escapes.
pub fn decode(literal: &str) -> Result<Vec<u8>> {
    let body = literal
        .strip_prefix(PREFIX)
        .and_then(|rest| rest.strip_suffix(SUFFIX))
        .ok_or_else(|| IdentityError::MalformedLiteral {
            offset: 0,
            reason: format!("expected {PREFIX}...{SUFFIX}"),
        })?;

    let input = body.as_bytes();
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        let b = input[i];
        if b != b'\\' {
            if !is_printable(b) {
                return Err(malformed(i, format!("unescaped byte 0x{b:02x}")));
            }
            out.push(b);
            i += 1;
            continue;
        }

        let Some(&letter) = input.get(i + 1) else {
            return Err(malformed(i, "dangling backslash"));
        };

        if letter == b'x' {
            let digits = input[i + 2..]
                .iter()
                .take(2)
                .take_while(|c| c.is_ascii_hexdigit())
                .count();
            if digits == 0 {
                return Err(malformed(i, "\\x escape without hex digits"));
            }
            let value = u8::from_str_radix(&body[i + 2..i + 2 + digits], 16)
                .map_err(|e| malformed(i, e.to_string()))?;
            out.push(value);
            i += 2 + digits;
        } else {
            let value = unescape_named(letter).ok_or_else(|| {
                malformed(i, format!("unknown escape \\{}", char::from(letter)))
            })?;
            out.push(value);
            i += 2;
        }
    }

    Ok(out)
}
