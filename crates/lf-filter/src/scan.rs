//! Value-span scanning.
//!
//! Finds where a JSON value ends without decoding it. Strings are skipped with
//! backslash-escape awareness, objects and arrays by bracket depth, and every
//! other token (numbers, `true`, `false`, `null`) runs until the next
//! delimiter. Nothing here validates JSON: the scanner only needs enough
//! structure to cut a value out of the surrounding bytes.

use memchr::memchr2;

use crate::error::{MalformedReason, Result, ScanError};

/// Half-open byte range `[start, end)` into a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Span { start, end }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Borrow the bytes this span covers.
    #[inline]
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.start..self.end]
    }
}

/// JSON insignificant whitespace.
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
fn is_scalar_delimiter(b: u8) -> bool {
    matches!(b, b',' | b'}' | b']') || is_whitespace(b)
}

/// Return the first non-whitespace position at or after `pos`.
#[inline]
pub fn skip_whitespace(buf: &[u8], mut pos: usize) -> usize {
    while pos < buf.len() && is_whitespace(buf[pos]) {
        pos += 1;
    }
    pos
}

/// Scan the quoted string opening at `offset` and return the index just past
/// its closing quote.
///
/// A backslash escapes the following byte unconditionally, so `\"` and `\\`
/// never end the string.
pub fn scan_string(buf: &[u8], offset: usize) -> Result<usize> {
    debug_assert_eq!(buf.get(offset), Some(&b'"'));

    let mut pos = offset + 1;
    while let Some(rest) = buf.get(pos..) {
        let Some(i) = memchr2(b'"', b'\\', rest) else {
            break;
        };
        let at = pos + i;
        if buf[at] == b'"' {
            return Ok(at + 1);
        }
        pos = at + 2;
    }

    Err(ScanError::malformed(offset, MalformedReason::UnterminatedString))
}

/// Scan the object or array opening at `offset`.
///
/// Both bracket families share one depth counter; the scanner does not check
/// that `{` is closed by `}` rather than `]`.
fn scan_group(buf: &[u8], offset: usize) -> Result<usize> {
    let mut depth = 1usize;
    let mut pos = offset + 1;

    while pos < buf.len() {
        match buf[pos] {
            b'"' => {
                pos = scan_string(buf, pos)?;
                continue;
            }
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(pos + 1);
                }
            }
            _ => {}
        }
        pos += 1;
    }

    Err(ScanError::malformed(offset, MalformedReason::UnbalancedGroup))
}

fn scan_scalar(buf: &[u8], offset: usize) -> Result<usize> {
    let end = buf[offset..]
        .iter()
        .position(|&b| is_scalar_delimiter(b))
        .map_or(buf.len(), |i| offset + i);

    if end == offset {
        return Err(ScanError::malformed(offset, MalformedReason::EmptyScalar));
    }
    Ok(end)
}

/// Find the end of the value whose first byte is at `offset`.
///
/// `offset` must already point past any whitespace following the colon.
/// Returns the exclusive end index; the resulting span is never empty.
pub fn scan_value(buf: &[u8], offset: usize) -> Result<usize> {
    match buf.get(offset) {
        None => Err(ScanError::malformed(offset, MalformedReason::MissingValue)),
        Some(b'"') => scan_string(buf, offset),
        Some(b'{') | Some(b'[') => scan_group(buf, offset),
        Some(_) => scan_scalar(buf, offset),
    }
}

/// Like [`scan_value`], but returns the whole span.
pub fn value_span(buf: &[u8], offset: usize) -> Result<Span> {
    scan_value(buf, offset).map(|end| Span::new(offset, end))
}
