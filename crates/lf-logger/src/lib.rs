//! Structured logger with per-handler payload extraction and redaction.
//!
//! Wraps `tracing` with:
//! - a JSONL layer that stamps every record with `service.name` and the
//!   current request context
//! - a payload policy per handler: shorten to `logged_fields`, otherwise mask
//!   `trimmed_fields` (see [`lf_filter`])
//! - explicit construction: [`Logger::new`] returns the logger and a
//!   [`FlushGuard`]; no global subscriber is installed
//!
//! # Usage
//!
//! ```
//! use lf_logger::{Logger, LoggerConfig};
//!
//! let config = LoggerConfig::default()
//!     .with_service("orders")
//!     .with_logged_fields("orders.Create", ["id"]);
//! let (logger, _guard) = Logger::with_writer(config, std::io::sink()).unwrap();
//!
//! assert_eq!(logger.payload("orders.create", br#"{"id": 1, "x": 2}"#), r#"{"id": 1}"#);
//! logger.grpc_request("orders.OrderService", "orders.Create", None, br#"{"id": 1}"#);
//! ```

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod keys;
pub mod layer;
pub mod logger;

pub use config::{LogFormat, LogLevel, LoggerConfig, DEFAULT_SERVICE_NAME};
pub use error::{ConfigError, Result};
pub use layer::JsonlLayer;
pub use logger::{FlushGuard, Logger, SharedWriter};
