//! Field value masking.
//!
//! Replaces the value of every configured field, at any depth, with a fixed
//! placeholder. All other bytes are copied through untouched.

use std::borrow::Cow;

use crate::config::FieldConfig;
use crate::finder::occurrences;
use crate::scan::Span;
use crate::PayloadFilter;

/// Placeholder written in place of a masked value.
pub const TRIMMED_PLACEHOLDER: &str = "\"TRIMMED_CONTENT\"";

/// Replacement for everything between a masked key and the end of its value.
const MASKED_TAIL: &[u8] = b": \"TRIMMED_CONTENT\"";

/// Masks configured field values in log payloads.
#[derive(Debug, Clone, Default)]
pub struct Trimmer {
    config: FieldConfig,
}

impl Trimmer {
    pub fn new(config: impl Into<FieldConfig>) -> Self {
        Self {
            config: config.into(),
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Mask the fields configured for `handler` in `payload`.
    ///
    /// Each masked pair is rewritten as `"key": "TRIMMED_CONTENT"`. When a
    /// masked value contains another masked key, only the outer value is
    /// replaced. Unknown handlers and empty field lists leave the payload
    /// unchanged.
    pub fn trim<'a>(&self, handler: &str, payload: &'a [u8]) -> Cow<'a, [u8]> {
        if payload.is_empty() {
            return Cow::Borrowed(payload);
        }

        let fields = match self.config.fields_for(handler) {
            Some(fields) if !fields.is_empty() => fields,
            _ => return Cow::Borrowed(payload),
        };

        let mut tails: Vec<Span> = fields
            .iter()
            .flat_map(|field| occurrences(payload, field))
            .map(|occurrence| occurrence.tail())
            .collect();
        if tails.is_empty() {
            return Cow::Borrowed(payload);
        }
        tails.sort_unstable();

        let mut out = Vec::with_capacity(payload.len());
        let mut cursor = 0usize;
        for tail in tails {
            if tail.start < cursor {
                continue;
            }
            out.extend_from_slice(&payload[cursor..tail.start]);
            out.extend_from_slice(MASKED_TAIL);
            cursor = tail.end;
        }
        out.extend_from_slice(&payload[cursor..]);

        Cow::Owned(out)
    }
}

impl PayloadFilter for Trimmer {
    fn apply<'a>(&self, handler: &str, payload: &'a [u8]) -> Cow<'a, [u8]> {
        self.trim(handler, payload)
    }

    fn config(&self) -> &FieldConfig {
        &self.config
    }
}
