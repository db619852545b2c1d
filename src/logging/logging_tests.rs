//! Tests for the capture layer.

use super::*;
use crate::collector::MessagesCollector;
use crate::model::Value;
use std::sync::mpsc;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

/// Run `f` with a capture layer installed for the current thread.
fn with_capture(f: impl FnOnce()) -> mpsc::Receiver<CapturedEvent> {
    let (tx, rx) = mpsc::channel();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer::new(tx));
    tracing::subscriber::with_default(subscriber, f);
    rx
}

#[test]
fn on_event_sends_level_and_message() {
    // WHEN a tracing ERROR event is emitted
    let rx = with_capture(|| tracing::error!("test error message"));

    // THEN a CapturedEvent is received with ERROR level
    let event = rx.try_recv().expect("should receive event from channel");
    assert_eq!(event.level, Level::ERROR);
    assert_eq!(event.message, "test error message");
    assert!(event.fields.is_empty());
}

#[test]
fn on_event_handles_dropped_receiver_gracefully() {
    let (tx, rx) = mpsc::channel();
    drop(rx);

    let subscriber = tracing_subscriber::registry().with(CaptureLayer::new(tx));
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("this should not panic");
    });
}

#[test]
fn on_event_captures_timestamp() {
    let before = chrono::Utc::now();
    let rx = with_capture(|| tracing::warn!("timestamped message"));
    let after = chrono::Utc::now();

    let event = rx.try_recv().expect("should receive event");
    assert!(event.timestamp >= before);
    assert!(event.timestamp <= after);
}

#[test]
fn on_event_formats_message_arguments() {
    let rx = with_capture(|| tracing::info!("value: {}, count: {}", 42, 7));

    let event = rx.try_recv().expect("should receive event");
    assert_eq!(event.message, "value: 42, count: 7");
}

#[test]
fn on_event_records_typed_fields() {
    let rx = with_capture(|| {
        tracing::info!(user = "ada", attempts = 3, ok = true, ratio = 0.5, "login");
    });

    let event = rx.try_recv().expect("should receive event");
    assert_eq!(event.message, "login");
    assert_eq!(event.fields.get("user"), Some(&Value::from("ada")));
    assert_eq!(event.fields.get("attempts"), Some(&Value::Int(3)));
    assert_eq!(event.fields.get("ok"), Some(&Value::Bool(true)));
    assert_eq!(event.fields.get("ratio"), Some(&Value::Float(0.5)));
}

#[test]
fn debug_fields_are_captured_as_strings() {
    let rx = with_capture(|| {
        let ids = vec![1, 2];
        tracing::debug!(ids = ?ids, "batch");
    });

    let event = rx.try_recv().expect("should receive event");
    assert_eq!(event.fields.get("ids"), Some(&Value::from("[1, 2]")));
}

#[test]
fn events_arrive_in_order_and_ingest_into_collector() {
    // GIVEN events emitted through the layer, one with a placeholder
    let rx = with_capture(|| {
        tracing::info!(user = "ada", "hello {{user}}");
        tracing::warn!("second");
        tracing::error!("third");
    });

    // WHEN a collector ingests them
    let mut messages = MessagesCollector::with_plain_formatter("messages");
    let ingested = messages.ingest(&rx).expect("ingest succeeds");

    // THEN records keep order, labels are lower-case levels, fields interpolate
    assert_eq!(ingested, 3);
    let records = messages.own_messages();
    let summary: Vec<(&str, &str)> = records.iter().map(|r| (r.label(), r.text())).collect();
    assert_eq!(
        summary,
        vec![("info", "hello ada"), ("warn", "second"), ("error", "third")]
    );
}
