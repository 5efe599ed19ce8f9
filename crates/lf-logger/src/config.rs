//! Logger configuration.
//!
//! Supports configuration via:
//! - JSON or TOML files (`LoggerConfig::load`)
//! - Environment variables (LF_LOG, LF_LOG_FORMAT, RUST_LOG)
//! - Builder methods for programmatic setup

use std::collections::{HashMap, HashSet};
use std::path::Path;

use lf_filter::{normalize_handler, FieldConfig, Shortener, Trimmer};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Service name used when none is configured.
pub const DEFAULT_SERVICE_NAME: &str = "system";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console format.
    Human,
    /// Machine-parseable JSON lines (default).
    #[default]
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "console" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" | "structured" | "machine" => Ok(LogFormat::Jsonl),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Log level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose.
    Trace,
    /// Debug information.
    Debug,
    /// Standard operational info (default).
    #[default]
    Info,
    /// Warnings only.
    Warn,
    /// Errors only.
    Error,
    /// Completely silent.
    Off,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "none" | "quiet" => Ok(LogLevel::Off),
            _ => Err(format!("unknown log level: {}", s)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Off => write!(f, "off"),
        }
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
            LogLevel::Off => tracing_subscriber::filter::LevelFilter::OFF,
        }
    }
}

/// Fully resolved logger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Service name attached to every record as `service.name`.
    #[serde(default = "default_service")]
    pub service: String,

    /// Minimum log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Whether records carry a timestamp.
    #[serde(default = "default_true")]
    pub timestamps: bool,

    /// Extra `EnvFilter` directives, e.g. `lf_filter=error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Handler -> fields kept when logging its payload.
    #[serde(default)]
    pub logged_fields: HashMap<String, Vec<String>>,

    /// Handler -> fields masked when logging its payload.
    ///
    /// Ignored for handlers that also appear in `logged_fields`: those
    /// payloads are shortened, never trimmed. See
    /// [`LoggerConfig::shadowed_trimmed_handlers`].
    #[serde(default)]
    pub trimmed_fields: HashMap<String, Vec<String>>,
}

fn default_service() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            service: default_service(),
            level: LogLevel::default(),
            format: LogFormat::default(),
            timestamps: true,
            filter: None,
            logged_fields: HashMap::new(),
            trimmed_fields: HashMap::new(),
        }
    }
}

impl LoggerConfig {
    /// Load a config file, picking the parser from the extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides.
    ///
    /// LF_LOG sets the level, LF_LOG_FORMAT the format, and RUST_LOG replaces
    /// the extra filter directives. Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("LF_LOG") {
            if let Ok(level) = val.parse::<LogLevel>() {
                self.level = level;
            }
        }
        if let Ok(val) = std::env::var("LF_LOG_FORMAT") {
            if let Ok(format) = val.parse::<LogFormat>() {
                self.format = format;
            }
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            if !val.trim().is_empty() {
                self.filter = Some(val);
            }
        }
        self
    }

    /// Service name, falling back to [`DEFAULT_SERVICE_NAME`] when blank.
    pub fn service_name(&self) -> &str {
        if self.service.trim().is_empty() {
            DEFAULT_SERVICE_NAME
        } else {
            &self.service
        }
    }

    /// Check that handler names are unambiguous and field names non-empty.
    pub fn validate(&self) -> Result<()> {
        validate_field_map("logged_fields", &self.logged_fields)?;
        validate_field_map("trimmed_fields", &self.trimmed_fields)?;
        Ok(())
    }

    /// Handlers listed in both sections, lower-cased and sorted. Their
    /// `trimmed_fields` entries never take effect.
    pub fn shadowed_trimmed_handlers(&self) -> Vec<String> {
        let logged: HashSet<String> = self
            .logged_fields
            .keys()
            .map(|h| normalize_handler(h))
            .collect();
        let mut shadowed: Vec<String> = self
            .trimmed_fields
            .keys()
            .map(|h| normalize_handler(h))
            .filter(|h| logged.contains(h))
            .collect();
        shadowed.sort();
        shadowed.dedup();
        shadowed
    }

    pub fn shortener(&self) -> Shortener {
        Shortener::new(FieldConfig::from(self.logged_fields.clone()))
    }

    pub fn trimmer(&self) -> Trimmer {
        Trimmer::new(FieldConfig::from(self.trimmed_fields.clone()))
    }

    /// Set the service name.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Set log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable timestamps.
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// Keep only `fields` when logging payloads of `handler`.
    pub fn with_logged_fields<I, S>(mut self, handler: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.logged_fields
            .insert(handler.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    /// Mask `fields` when logging payloads of `handler`.
    pub fn with_trimmed_fields<I, S>(mut self, handler: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trimmed_fields
            .insert(handler.into(), fields.into_iter().map(Into::into).collect());
        self
    }
}

fn validate_field_map(section: &str, map: &HashMap<String, Vec<String>>) -> Result<()> {
    let mut seen = HashSet::new();
    let mut handlers: Vec<&String> = map.keys().collect();
    handlers.sort();

    for handler in handlers {
        if !seen.insert(normalize_handler(handler)) {
            return Err(ConfigError::Invalid(format!(
                "{}: handler '{}' differs from another handler only by case",
                section, handler
            )));
        }
        if map[handler].iter().any(|field| field.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "{}: handler '{}' lists an empty field name",
                section, handler
            )));
        }
    }
    Ok(())
}
