//! Custom tracing layer for JSONL output.
//!
//! Writes one JSON object per event. Every record carries the service name;
//! request context recorded on enclosing spans (`request_id`, `handler`) is
//! copied onto each event, and event fields are flattened to the top level.

use std::io::Write;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::config::LogLevel;
use crate::keys;

/// Request context stored on spans.
#[derive(Debug, Clone, Default)]
struct SpanContext {
    request_id: Option<String>,
    handler: Option<String>,
}

/// Collects event fields into a JSON map.
struct JsonFieldVisitor {
    fields: Map<String, Value>,
    message: Option<String>,
}

impl JsonFieldVisitor {
    fn new() -> Self {
        JsonFieldVisitor {
            fields: Map::new(),
            message: None,
        }
    }

    fn insert(&mut self, field: &tracing::field::Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else if !keys::RESERVED.contains(&field.name()) {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl tracing::field::Visit for JsonFieldVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.insert(field, Value::String(format!("{:?}", value)));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.insert(field, Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.insert(field, Value::Number(value.into()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.insert(field, Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }
}

/// Extracts request context from span attributes.
struct SpanContextVisitor {
    context: SpanContext,
}

impl tracing::field::Visit for SpanContextVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            keys::REQUEST_ID => self.context.request_id = Some(value.to_string()),
            keys::HANDLER => self.context.handler = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            keys::REQUEST_ID => self.context.request_id = Some(format!("{:?}", value)),
            keys::HANDLER => self.context.handler = Some(format!("{:?}", value)),
            _ => {}
        }
    }
}

/// JSONL tracing layer.
///
/// Each record is handed to a fresh writer from `make_writer` in a single
/// `write_all`, so a writer that locks per call keeps lines whole.
pub struct JsonlLayer<W> {
    make_writer: W,
    service: String,
    timestamps: bool,
}

impl<W> JsonlLayer<W>
where
    W: for<'w> MakeWriter<'w>,
{
    /// Create a layer writing through `make_writer` on behalf of `service`.
    pub fn new(make_writer: W, service: impl Into<String>) -> Self {
        JsonlLayer {
            make_writer,
            service: service.into(),
            timestamps: true,
        }
    }

    /// Include or omit the `ts` field.
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = SpanContextVisitor {
            context: SpanContext::default(),
        };
        attrs.record(&mut visitor);

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(visitor.context);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let ts = Utc::now();

        // Innermost span wins.
        let mut request_id = None;
        let mut handler = None;
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                if let Some(span_ctx) = span.extensions().get::<SpanContext>() {
                    if request_id.is_none() {
                        request_id.clone_from(&span_ctx.request_id);
                    }
                    if handler.is_none() {
                        handler.clone_from(&span_ctx.handler);
                    }
                }
            }
        }

        let mut visitor = JsonFieldVisitor::new();
        event.record(&mut visitor);

        let level = LogLevel::from(*event.metadata().level());
        let mut obj = Map::new();

        if self.timestamps {
            obj.insert("ts".to_string(), serde_json::json!(ts.to_rfc3339()));
        }
        obj.insert("level".to_string(), serde_json::json!(level));
        obj.insert(
            "target".to_string(),
            serde_json::json!(event.metadata().target()),
        );
        obj.insert(keys::SERVICE_NAME.to_string(), serde_json::json!(self.service));

        if let Some(msg) = visitor.message {
            obj.insert("message".to_string(), serde_json::json!(msg));
        }
        if let Some(id) = request_id {
            obj.insert(keys::REQUEST_ID.to_string(), serde_json::json!(id));
        }
        if let Some(h) = handler {
            obj.insert(keys::HANDLER.to_string(), serde_json::json!(h));
        }

        for (key, value) in visitor.fields {
            obj.entry(key).or_insert(value);
        }

        let mut line = serde_json::to_string(&Value::Object(obj)).unwrap_or_default();
        line.push('\n');
        let _ = self.make_writer.make_writer().write_all(line.as_bytes());
    }
}
