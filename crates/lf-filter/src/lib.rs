//! Field extraction and redaction for structured log payloads.
//!
//! Log middleware serializes a request or message body once and then decides,
//! per handler, how much of it to keep. This crate does that on the raw bytes:
//! no JSON tree is built and untouched bytes are copied as-is.
//!
//! # Key Features
//!
//! - **Extraction** ([`Shortener`]): keep only an allow-listed set of fields.
//! - **Redaction** ([`Trimmer`]): mask an allow-listed set of field values with
//!   `"TRIMMED_CONTENT"`.
//! - **Depth-blind matching**: a field is found at every nesting level.
//! - **Never fails**: malformed payloads degrade to dropping (extraction) or
//!   keeping (redaction) the affected field, with a `warn` event.
//!
//! # Example
//!
//! ```
//! use lf_filter::{FieldConfig, Shortener, Trimmer};
//!
//! let config = FieldConfig::new([("orders.create", vec!["id", "token"])]);
//! let payload = br#"{"id": 7, "token": "s3cr3t", "items": [1, 2]}"#;
//!
//! let shortener = Shortener::new(config.clone());
//! assert_eq!(
//!     shortener.shorten("Orders.Create", payload).as_ref(),
//!     br#"{"id": 7, "token": "s3cr3t"}"#
//! );
//!
//! let trimmer = Trimmer::new(config);
//! assert_eq!(
//!     trimmer.trim("orders.create", payload).as_ref(),
//!     br#"{"id": "TRIMMED_CONTENT", "token": "TRIMMED_CONTENT", "items": [1, 2]}"#
//! );
//! ```

pub mod config;
pub mod error;
pub mod finder;
pub mod scan;
pub mod shortener;
pub mod trimmer;

use std::borrow::Cow;

pub use config::{normalize_handler, FieldConfig};
pub use error::{MalformedReason, Result, ScanError};
pub use finder::{find_all, occurrences, Occurrence, Occurrences};
pub use scan::{scan_value, Span};
pub use shortener::Shortener;
pub use trimmer::{Trimmer, TRIMMED_PLACEHOLDER};

/// A per-handler payload transformation.
///
/// Implementations are pure: the same handler and payload always produce the
/// same bytes, and a shared reference can be used from many threads.
pub trait PayloadFilter: Send + Sync {
    /// Transform `payload` according to the policy configured for `handler`.
    fn apply<'a>(&self, handler: &str, payload: &'a [u8]) -> Cow<'a, [u8]>;

    /// The field lists this filter was built with.
    fn config(&self) -> &FieldConfig;
}
