//! Logger wrapper with per-handler payload policy.
//!
//! A [`Logger`] owns its own `tracing::Dispatch`; nothing is installed
//! globally. Events emitted inside [`Logger::in_scope`] (including the
//! engine's own warnings) go to the logger's writer.
//!
//! Payload policy: a handler listed under `logged_fields` has its payload
//! shortened to those fields; every other payload goes through the trimmer,
//! which masks the `trimmed_fields` of known handlers and leaves the rest
//! untouched.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use lf_filter::{PayloadFilter, Shortener, Trimmer};
use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggerConfig};
use crate::error::Result;
use crate::layer::JsonlLayer;

/// Writer shared between the subscriber and the [`FlushGuard`].
#[derive(Clone)]
pub struct SharedWriter {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl SharedWriter {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        SharedWriter {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, Box<dyn Write + Send>>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("log writer poisoned"))
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.lock()?.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Flushes the logger's writer when dropped.
///
/// Hold it for the lifetime of the process (or test); dropping it early only
/// forces a flush, the logger keeps working.
#[must_use = "dropping the guard flushes immediately"]
pub struct FlushGuard {
    writer: SharedWriter,
}

impl FlushGuard {
    /// Flush buffered output now.
    pub fn flush(&self) -> io::Result<()> {
        self.writer.clone().flush()
    }
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl std::fmt::Debug for FlushGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushGuard").finish_non_exhaustive()
    }
}

/// Structured logger bound to one service.
pub struct Logger {
    dispatch: Dispatch,
    service: String,
    shortener: Shortener,
    trimmer: Trimmer,
}

impl Logger {
    /// Build a logger writing to stderr.
    pub fn new(config: LoggerConfig) -> Result<(Logger, FlushGuard)> {
        Self::with_writer(config, io::stderr())
    }

    /// Build a logger writing to `writer`.
    pub fn with_writer<W>(config: LoggerConfig, writer: W) -> Result<(Logger, FlushGuard)>
    where
        W: Write + Send + 'static,
    {
        config.validate()?;

        let writer = SharedWriter::new(writer);
        let service = config.service_name().to_string();
        let dispatch = build_dispatch(&config, &service, writer.clone());

        let logger = Logger {
            dispatch,
            service,
            shortener: config.shortener(),
            trimmer: config.trimmer(),
        };
        logger.in_scope(|| {
            for handler in config.shadowed_trimmed_handlers() {
                tracing::warn!(
                    target: "lf_logger::config",
                    handler = handler.as_str(),
                    "handler has logged_fields; its trimmed_fields are ignored"
                );
            }
        });
        Ok((logger, FlushGuard { writer }))
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn service_name(&self) -> &str {
        &self.service
    }

    /// Run `f` with this logger as the default dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Run `f` inside a span carrying the request id and handler name.
    pub fn in_request<T>(&self, request_id: &str, handler: &str, f: impl FnOnce() -> T) -> T {
        self.in_scope(|| {
            let span = tracing::info_span!("request", request_id = %request_id, handler = %handler);
            span.in_scope(f)
        })
    }

    /// Filter that applies to `handler`'s payloads.
    ///
    /// `logged_fields` take precedence: a handler configured in both sections
    /// is shortened.
    pub fn filter_for(&self, handler: &str) -> &dyn PayloadFilter {
        if self.shortener.config().contains_handler(handler) {
            &self.shortener
        } else {
            &self.trimmer
        }
    }

    /// Render `body` for logging under `handler`.
    pub fn payload(&self, handler: &str, body: &[u8]) -> String {
        self.in_scope(|| {
            let filtered = self.filter_for(handler).apply(handler, body);
            String::from_utf8_lossy(&filtered).into_owned()
        })
    }

    /// Log an incoming gRPC call. `method` doubles as the handler name.
    pub fn grpc_request(
        &self,
        service: &str,
        method: &str,
        deadline: Option<DateTime<Utc>>,
        body: &[u8],
    ) {
        let payload = self.payload(method, body);
        let start_time = Utc::now().to_rfc3339();
        let deadline = deadline.map(|d| d.to_rfc3339());
        self.in_scope(|| {
            tracing::info!(
                target: "lf_logger::grpc",
                {
                    grpc.service = service,
                    grpc.method = method,
                    grpc.request.start_time = start_time.as_str(),
                    grpc.request.deadline = deadline.as_deref(),
                    grpc.request.body = payload.as_str(),
                },
                "grpc request"
            );
        });
    }

    /// Log the response of a gRPC call.
    pub fn grpc_response(&self, method: &str, body: &[u8]) {
        let payload = self.payload(method, body);
        self.in_scope(|| {
            tracing::info!(
                target: "lf_logger::grpc",
                {
                    grpc.method = method,
                    grpc.request.response = payload.as_str(),
                },
                "grpc response"
            );
        });
    }

    /// Log a consumed message. `routing_key` doubles as the handler name.
    pub fn rmq_message(
        &self,
        connection_name: &str,
        server_name: &str,
        exchange: &str,
        routing_key: &str,
        body: &[u8],
    ) {
        let payload = self.payload(routing_key, body);
        let start_time = Utc::now().to_rfc3339();
        self.in_scope(|| {
            tracing::info!(
                target: "lf_logger::rmq",
                {
                    rmq.connection_name = connection_name,
                    rmq.server_name = server_name,
                    rmq.exchange = exchange,
                    rmq.routing_key = routing_key,
                    rmq.handler.start_time = start_time.as_str(),
                    rmq.msg.body = payload.as_str(),
                },
                "rmq message"
            );
        });
    }

    /// Log a message handler that panicked.
    pub fn rmq_handler_panicked(&self, routing_key: &str, panic_msg: &str) {
        self.in_scope(|| {
            tracing::error!(
                target: "lf_logger::rmq",
                {
                    rmq.routing_key = routing_key,
                    rmq.handler.panic_msg = panic_msg,
                },
                "rmq handler panicked"
            );
        });
    }

    /// Log a watcher start. `name` doubles as the handler name.
    pub fn watcher_started(&self, name: &str, params: &[u8]) {
        let params = self.payload(name, params);
        self.in_scope(|| {
            tracing::info!(
                target: "lf_logger::watcher",
                {
                    watcher.name = name,
                    watcher.params = params.as_str(),
                },
                "watcher started"
            );
        });
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("service", &self.service)
            .field("shortener", &self.shortener)
            .field("trimmer", &self.trimmer)
            .finish_non_exhaustive()
    }
}

fn build_filter(config: &LoggerConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from(config.level).into())
        .parse_lossy(config.filter.as_deref().unwrap_or_default())
}

fn build_dispatch(config: &LoggerConfig, service: &str, writer: SharedWriter) -> Dispatch {
    let filter = build_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false);
            if config.timestamps {
                Dispatch::new(registry.with(fmt_layer))
            } else {
                Dispatch::new(registry.with(fmt_layer.without_time()))
            }
        }
        LogFormat::Jsonl => {
            let layer = JsonlLayer::new(writer, service).with_timestamps(config.timestamps);
            Dispatch::new(registry.with(layer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use crate::keys;
    use serde_json::Value;

    #[derive(Clone, Default)]
    struct Capture {
        buf: Arc<Mutex<Vec<u8>>>,
        flushes: Arc<Mutex<usize>>,
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
        }

        fn records(&self) -> Vec<Value> {
            self.text()
                .lines()
                .map(|line| serde_json::from_str(line).expect("valid JSON line"))
                .collect()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buf.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            *self.flushes.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn config() -> LoggerConfig {
        LoggerConfig::default()
            .with_service("orders")
            .with_timestamps(false)
            .with_logged_fields("orders.Create", ["id", "amount"])
            .with_trimmed_fields("orders.Update", ["card"])
    }

    fn logger(config: LoggerConfig) -> (Logger, FlushGuard, Capture) {
        let capture = Capture::default();
        let (logger, guard) = Logger::with_writer(config, capture.clone()).unwrap();
        (logger, guard, capture)
    }

    #[test]
    fn test_payload_policy() {
        let (logger, _guard, _) = logger(config());
        let body = br#"{"id": 7, "card": "4111", "amount": 10}"#;

        assert_eq!(logger.payload("ORDERS.create", body), r#"{"id": 7, "amount": 10}"#);
        assert_eq!(
            logger.payload("orders.update", body),
            r#"{"id": 7, "card": "TRIMMED_CONTENT", "amount": 10}"#
        );
        assert_eq!(logger.payload("orders.delete", body), String::from_utf8_lossy(body));
    }

    #[test]
    fn test_logged_fields_shadow_trimmed_fields() {
        let config = config().with_trimmed_fields("ORDERS.CREATE", ["id"]);
        let (logger, _guard, capture) = logger(config);

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["level"], "warn");
        assert_eq!(records[0]["target"], "lf_logger::config");
        assert_eq!(records[0]["handler"], "orders.create");

        assert_eq!(
            logger.payload("orders.create", br#"{"id": 7, "card": "4111"}"#),
            r#"{"id": 7}"#
        );
    }

    #[test]
    fn test_payload_empty_body() {
        let (logger, _guard, _) = logger(config());
        assert_eq!(logger.payload("orders.Create", b""), "");
    }

    #[test]
    fn test_events_stay_in_scope() {
        let (logger, _guard, capture) = logger(config());
        logger.in_scope(|| tracing::info!("inside"));
        tracing::info!("outside");

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["message"], "inside");
        assert_eq!(records[0][keys::SERVICE_NAME], "orders");
    }

    #[test]
    fn test_default_service_name() {
        let (logger, _guard, capture) = logger(LoggerConfig::default().with_timestamps(false));
        assert_eq!(logger.service_name(), "system");
        logger.in_scope(|| tracing::info!("hello"));
        assert_eq!(capture.records()[0][keys::SERVICE_NAME], "system");
    }

    #[test]
    fn test_grpc_request_fields() {
        let (logger, _guard, capture) = logger(config());
        let deadline = Utc::now();
        logger.in_request("req-9", "orders.Create", || {
            logger.grpc_request(
                "orders.OrderService",
                "orders.Create",
                Some(deadline),
                br#"{"id": 1, "note": "x"}"#,
            );
        });

        let record = &capture.records()[0];
        assert_eq!(record["message"], "grpc request");
        assert_eq!(record[keys::REQUEST_ID], "req-9");
        assert_eq!(record[keys::HANDLER], "orders.Create");
        assert_eq!(record[keys::GRPC_SERVICE], "orders.OrderService");
        assert_eq!(record[keys::GRPC_METHOD], "orders.Create");
        assert_eq!(record[keys::GRPC_REQUEST_BODY], r#"{"id": 1}"#);
        assert_eq!(record[keys::GRPC_REQUEST_DEADLINE], deadline.to_rfc3339());
        assert!(record[keys::GRPC_REQUEST_START_TIME].is_string());
    }

    #[test]
    fn test_grpc_request_without_deadline() {
        let (logger, _guard, capture) = logger(config());
        logger.grpc_request("svc", "other", None, b"{}");
        let record = &capture.records()[0];
        assert!(record.get(keys::GRPC_REQUEST_DEADLINE).is_none());
        assert_eq!(record[keys::GRPC_REQUEST_BODY], "{}");
    }

    #[test]
    fn test_grpc_response_is_trimmed() {
        let (logger, _guard, capture) = logger(config());
        logger.grpc_response("orders.Update", br#"{"card": "4111", "ok": true}"#);
        let record = &capture.records()[0];
        assert_eq!(
            record[keys::GRPC_REQUEST_RESPONSE],
            r#"{"card": "TRIMMED_CONTENT", "ok": true}"#
        );
    }

    #[test]
    fn test_rmq_events() {
        let (logger, _guard, capture) = logger(config());
        logger.rmq_message("conn-1", "rabbit-a", "orders", "orders.Create", br#"{"amount": 5}"#);
        logger.rmq_handler_panicked("orders.Create", "index out of bounds");

        let records = capture.records();
        assert_eq!(records[0][keys::RMQ_CONNECTION_NAME], "conn-1");
        assert_eq!(records[0][keys::RMQ_SERVER_NAME], "rabbit-a");
        assert_eq!(records[0][keys::RMQ_EXCHANGE], "orders");
        assert_eq!(records[0][keys::RMQ_ROUTING_KEY], "orders.Create");
        assert_eq!(records[0][keys::RMQ_MSG_BODY], r#"{"amount": 5}"#);
        assert!(records[0][keys::RMQ_HANDLER_START_TIME].is_string());

        assert_eq!(records[1]["level"], "error");
        assert_eq!(records[1][keys::RMQ_HANDLER_PANIC_MSG], "index out of bounds");
    }

    #[test]
    fn test_watcher_started() {
        let config = config().with_trimmed_fields("cleanup", ["password"]);
        let (logger, _guard, capture) = logger(config);
        logger.watcher_started("cleanup", br#"{"every": "1m", "password": "x"}"#);

        let record = &capture.records()[0];
        assert_eq!(record[keys::WATCHER_NAME], "cleanup");
        assert_eq!(
            record[keys::WATCHER_PARAMS],
            r#"{"every": "1m", "password": "TRIMMED_CONTENT"}"#
        );
    }

    #[test]
    fn test_level_filter() {
        let (logger, _guard, capture) = logger(config().with_level(LogLevel::Warn));
        logger.in_scope(|| {
            tracing::info!("dropped");
            tracing::warn!("kept");
        });
        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["message"], "kept");
    }

    #[test]
    fn test_filter_directives() {
        let mut config = config().with_level(LogLevel::Error);
        config.filter = Some("lf_logger::grpc=info".to_string());
        let (logger, _guard, capture) = logger(config);
        logger.grpc_response("x", b"{}");
        logger.in_scope(|| tracing::info!(target: "elsewhere", "dropped"));
        assert_eq!(capture.records().len(), 1);
    }

    #[test]
    fn test_malformed_payload_warning_is_captured() {
        let (logger, _guard, capture) = logger(config());
        let body = br#"{"card": "4111", "id": "unterminated"#;
        assert_eq!(logger.payload("orders.Create", body), "{}");

        let records = capture.records();
        assert!(records
            .iter()
            .any(|r| r["level"] == "warn" && r["target"] == "lf_filter::finder"));
    }

    #[test]
    fn test_human_format() {
        let (logger, _guard, capture) = logger(config().with_format(LogFormat::Human));
        logger.watcher_started("tick", b"{}");
        let text = capture.text();
        assert!(text.contains("watcher started"));
        assert!(text.contains("watcher.name=\"tick\"") || text.contains("watcher.name=tick"));
    }

    #[test]
    fn test_flush_guard_flushes_on_drop() {
        let (logger, guard, capture) = logger(config());
        logger.in_scope(|| tracing::info!("bye"));
        guard.flush().unwrap();
        assert_eq!(*capture.flushes.lock().unwrap(), 1);
        drop(guard);
        assert_eq!(*capture.flushes.lock().unwrap(), 2);
    }

    /// Records every `write` call as its own chunk.
    #[derive(Clone, Default)]
    struct Chunks(Arc<Mutex<Vec<Vec<u8>>>>);

    impl Write for Chunks {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().push(buf.to_vec());
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_each_record_is_one_write() {
        let chunks = Chunks::default();
        let (logger, _guard) = Logger::with_writer(config(), chunks.clone()).unwrap();
        let logger = Arc::new(logger);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let logger = Arc::clone(&logger);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        logger.watcher_started("tick", format!(r#"{{"n": {}}}"#, i).as_bytes());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let chunks = chunks.0.lock().unwrap();
        assert_eq!(chunks.len(), 40);
        for chunk in chunks.iter() {
            assert_eq!(chunk.last(), Some(&b'\n'));
            assert!(serde_json::from_slice::<Value>(chunk).is_ok());
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = config().with_logged_fields("ORDERS.CREATE", ["x"]);
        assert!(Logger::with_writer(config, io::sink()).is_err());
    }
}
