//! Field-allowlist extraction.
//!
//! Keeps only the configured fields of a payload. The result is a new object
//! holding each matching `"key": value` pair exactly as it was written in the
//! source, ordered by the configured field order first and document order
//! second.

use std::borrow::Cow;

use crate::config::FieldConfig;
use crate::finder::occurrences;
use crate::PayloadFilter;

/// Extracts allow-listed fields from log payloads.
#[derive(Debug, Clone, Default)]
pub struct Shortener {
    config: FieldConfig,
}

impl Shortener {
    pub fn new(config: impl Into<FieldConfig>) -> Self {
        Self {
            config: config.into(),
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Reduce `payload` to the fields configured for `handler`.
    ///
    /// - empty payload: empty output
    /// - unknown handler: payload unchanged
    /// - handler with no fields: empty output
    /// - no configured field present in a well-formed payload: payload
    ///   unchanged
    /// - malformed payload: the fragments found before the scan gave up,
    ///   `{}` when there are none
    pub fn shorten<'a>(&self, handler: &str, payload: &'a [u8]) -> Cow<'a, [u8]> {
        if payload.is_empty() {
            return Cow::Borrowed(payload);
        }

        let Some(fields) = self.config.fields_for(handler) else {
            return Cow::Borrowed(payload);
        };
        if fields.is_empty() {
            return Cow::Borrowed(&[]);
        }

        let mut out = Vec::with_capacity(payload.len());
        out.push(b'{');

        let mut found = 0usize;
        let mut malformed = false;
        for field in fields {
            let mut iter = occurrences(payload, field);
            for occurrence in iter.by_ref() {
                if found > 0 {
                    out.extend_from_slice(b", ");
                }
                out.extend_from_slice(occurrence.pair().slice(payload));
                found += 1;
            }
            malformed |= iter.abandoned();
        }

        // A payload that could not be scanned is never passed through whole.
        if found == 0 && !malformed {
            return Cow::Borrowed(payload);
        }

        out.push(b'}');
        Cow::Owned(out)
    }
}

impl PayloadFilter for Shortener {
    fn apply<'a>(&self, handler: &str, payload: &'a [u8]) -> Cow<'a, [u8]> {
        self.shorten(handler, payload)
    }

    fn config(&self) -> &FieldConfig {
        &self.config
    }
}
