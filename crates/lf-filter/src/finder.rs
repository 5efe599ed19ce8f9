//! Key-occurrence search.
//!
//! Walks the payload string token by string token. A token whose raw content
//! equals the requested key and that is followed by a colon is a key; its value
//! is delimited with [`crate::scan`]. Matching is lexical and depth-blind, so a
//! key is reported at every nesting level it appears at.

use memchr::memchr;

use crate::error::ScanError;
use crate::scan::{scan_string, skip_whitespace, value_span, Span};

/// One `"key": value` pair found in a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// The quoted key token, quotes included.
    pub key: Span,
    /// The value, from its first to its last byte.
    pub value: Span,
}

impl Occurrence {
    /// Key token through the end of the value, formatting preserved.
    pub fn pair(&self) -> Span {
        Span::new(self.key.start, self.value.end)
    }

    /// Everything after the key token: separator whitespace, colon and value.
    pub fn tail(&self) -> Span {
        Span::new(self.key.end, self.value.end)
    }
}

/// Lazy iterator over the occurrences of one key, in document order.
///
/// Stops at the first malformed value; anything after it cannot be delimited
/// reliably. [`Occurrences::abandoned`] tells a clean end from that case.
pub struct Occurrences<'a, 'k> {
    buf: &'a [u8],
    key: &'k str,
    pos: usize,
    done: bool,
    abandoned: bool,
}

impl<'a, 'k> Occurrences<'a, 'k> {
    pub fn new(buf: &'a [u8], key: &'k str) -> Self {
        Occurrences {
            buf,
            key,
            pos: 0,
            done: false,
            abandoned: false,
        }
    }

    /// Whether the search stopped at malformed input rather than the end of
    /// the payload.
    pub fn abandoned(&self) -> bool {
        self.abandoned
    }

    fn abandon(&mut self, err: &ScanError) {
        tracing::warn!(
            target: "lf_filter::finder",
            key = self.key,
            offset = err.offset(),
            error = %err,
            "stopping key search at malformed payload"
        );
        self.done = true;
        self.abandoned = true;
    }
}

impl Iterator for Occurrences<'_, '_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        let buf = self.buf;

        while !self.done {
            // `pos` is always outside any string, so the next quote opens a token.
            let Some(i) = buf.get(self.pos..).and_then(|rest| memchr(b'"', rest)) else {
                self.done = true;
                break;
            };
            let start = self.pos + i;
            let end = match scan_string(buf, start) {
                Ok(end) => end,
                Err(err) => {
                    self.abandon(&err);
                    break;
                }
            };
            self.pos = end;

            if &buf[start + 1..end - 1] != self.key.as_bytes() {
                continue;
            }
            let colon = skip_whitespace(buf, end);
            if buf.get(colon) != Some(&b':') {
                continue;
            }

            let value_start = skip_whitespace(buf, colon + 1);
            match value_span(buf, value_start) {
                Ok(value) => {
                    // Resume inside the value so nested occurrences are found too.
                    self.pos = value.start;
                    return Some(Occurrence {
                        key: Span::new(start, end),
                        value,
                    });
                }
                Err(err) => self.abandon(&err),
            }
        }

        None
    }
}

/// Iterate over every occurrence of `key` in `buf`.
pub fn occurrences<'a, 'k>(buf: &'a [u8], key: &'k str) -> Occurrences<'a, 'k> {
    Occurrences::new(buf, key)
}

/// Collect every occurrence of `key` in `buf`, in document order.
pub fn find_all(buf: &[u8], key: &str) -> Vec<Occurrence> {
    occurrences(buf, key).collect()
}
