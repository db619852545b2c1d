//! Tracing layer feeding a host's log events into a message collector.
//!
//! Collectors are single-threaded, so the layer never touches one directly:
//! it sends [`CapturedEvent`]s over a channel and the collector's owner drains
//! them with `MessagesCollector::ingest`.

use crate::model::{Context, Value};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::mpsc::Sender;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer};

/// One tracing event, flattened for ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedEvent {
    /// Severity the event was emitted at.
    pub level: Level,
    /// The event's formatted message (empty when the event has none).
    pub message: String,
    /// Every other field, usable as `{placeholder}` context.
    pub fields: Context,
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
}

/// `tracing_subscriber` layer that forwards events over a channel.
///
/// Sending never blocks. Events are dropped silently once the receiver is gone.
#[derive(Debug, Clone)]
pub struct CaptureLayer {
    sender: Sender<CapturedEvent>,
}

impl CaptureLayer {
    /// Layer sending every event to `sender`.
    pub fn new(sender: Sender<CapturedEvent>) -> Self {
        Self { sender }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
            timestamp: Utc::now(),
        };

        // Receiver dropped: the host stopped collecting.
        let _ = self.sender.send(captured);
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Context,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::Float(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::Int(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        let value = i64::try_from(value).map_or(Value::Float(value as f64), Value::Int);
        self.insert(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, Value::from(value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.insert(field, Value::Str(format!("{value:?}")));
        }
    }
}
