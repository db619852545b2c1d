//! Integration tests for message aggregation across collectors.
//!
//! Exercises the public API only: a host builds one collector per component,
//! registers some as peers of others, and reads the merged view.

use std::cell::RefCell;
use std::rc::Rc;
use tracebar::collector::messages::SharedSource;
use tracebar::collector::{DataCollector, ManualClock, MessagesCollector};
use tracebar::format::PlainFormatter;
use tracebar::model::{Context, Value};

fn collector(name: &str, clock: &Rc<ManualClock>) -> Rc<RefCell<MessagesCollector>> {
    Rc::new(RefCell::new(
        MessagesCollector::builder(name, PlainFormatter::new())
            .clock(clock.clone())
            .build(),
    ))
}

fn texts(collector: &MessagesCollector) -> Vec<String> {
    collector
        .messages()
        .expect("read succeeds")
        .iter()
        .map(|r| r.text().to_string())
        .collect()
}

#[test]
fn messages_from_peers_interleave_by_time() {
    // GIVEN a request collector and a database collector sharing a clock
    let clock = Rc::new(ManualClock::at_seconds(100));
    let request = collector("messages", &clock);
    let database = collector("db", &clock);
    let peer: SharedSource = database.clone();
    request.borrow_mut().aggregate(peer);

    // WHEN both log while time advances
    request.borrow_mut().add_message("request start").unwrap();
    clock.set_seconds(101);
    database.borrow_mut().add_message("SELECT 1").unwrap();
    clock.set_seconds(102);
    request.borrow_mut().add_message("rendering").unwrap();
    clock.set_seconds(103);
    database.borrow_mut().add_message("COMMIT").unwrap();

    // THEN the merged read is time ordered
    assert_eq!(
        texts(&request.borrow()),
        vec!["request start", "SELECT 1", "rendering", "COMMIT"]
    );

    // AND peer records are stamped with the peer's name
    let merged = request.borrow().messages().unwrap();
    assert_eq!(merged[0].source_collector(), None);
    assert_eq!(merged[1].source_collector(), Some("db"));
}

#[test]
fn merged_payload_serializes_for_the_renderer() {
    let clock = Rc::new(ManualClock::at_seconds(5));
    let request = collector("messages", &clock);
    let cache = collector("cache", &clock);
    let peer: SharedSource = cache.clone();
    request.borrow_mut().aggregate(peer);

    let mut context = Context::new();
    context.insert("key".to_string(), Value::from("user:1"));
    cache.borrow_mut().log("debug", "miss {key}", &context).unwrap();

    let payload = request.borrow().collect().unwrap();

    assert_eq!(payload["count"], serde_json::json!(1));
    assert_eq!(
        payload["messages"][0],
        serde_json::json!({
            "text": "miss user:1",
            "is_plain_string": true,
            "label": "debug",
            "timestamp": 5.0,
            "source_collector": "cache",
        })
    );
}

#[test]
fn three_level_chain_reports_direct_peer_name() {
    // GIVEN top <- middle <- leaf
    let clock = Rc::new(ManualClock::at_seconds(0));
    let top = collector("top", &clock);
    let middle = collector("middle", &clock);
    let leaf = collector("leaf", &clock);
    let leaf_peer: SharedSource = leaf.clone();
    middle.borrow_mut().aggregate(leaf_peer);
    let middle_peer: SharedSource = middle.clone();
    top.borrow_mut().aggregate(middle_peer);

    leaf.borrow_mut().add_message("deep").unwrap();

    // THEN top sees the leaf's record re-stamped by its direct peer
    let merged = top.borrow().messages().unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].source_collector(), Some("middle"));
}

#[test]
fn clearing_a_peer_is_visible_through_aggregation() {
    let clock = Rc::new(ManualClock::at_seconds(0));
    let request = collector("messages", &clock);
    let worker = collector("worker", &clock);
    let peer: SharedSource = worker.clone();
    request.borrow_mut().aggregate(peer);

    worker.borrow_mut().add_message("queued").unwrap();
    assert_eq!(texts(&request.borrow()), vec!["queued"]);

    worker.borrow_mut().clear();
    assert!(texts(&request.borrow()).is_empty());
}
