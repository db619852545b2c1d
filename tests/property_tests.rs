//! Property-based tests for collector invariants.
//!
//! Tests validate:
//! 1. Own messages keep call order
//! 2. Merged reads are time sorted and lose nothing
//! 3. Interpolation leaves brace-free messages untouched

use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use tracebar::collector::messages::SharedSource;
use tracebar::collector::{interpolate, ManualClock, MessagesCollector};
use tracebar::format::PlainFormatter;
use tracebar::model::{Context, Value};

fn collector(name: &str, clock: &Rc<ManualClock>) -> MessagesCollector {
    MessagesCollector::builder(name, PlainFormatter::new())
        .clock(clock.clone())
        .build()
}

// ===== Property 1: Call Order =====

proptest! {
    #[test]
    fn own_messages_keep_call_order(texts in prop::collection::vec("[a-z]{0,8}", 0..20)) {
        let clock = Rc::new(ManualClock::at_seconds(0));
        let mut messages = collector("messages", &clock);
        for text in &texts {
            messages.add_message(text.as_str()).unwrap();
        }

        let stored: Vec<String> = messages
            .messages()
            .unwrap()
            .iter()
            .map(|r| r.text().to_string())
            .collect();
        prop_assert_eq!(stored, texts);
    }
}

// ===== Property 2: Merged Reads =====

proptest! {
    #[test]
    fn merged_read_is_sorted_and_complete(
        own in prop::collection::vec(0i64..50, 0..15),
        peer in prop::collection::vec(0i64..50, 0..15),
    ) {
        let clock = Rc::new(ManualClock::at_seconds(0));
        let mut top = collector("top", &clock);
        let other = Rc::new(RefCell::new(collector("peer", &clock)));
        let shared: SharedSource = other.clone();
        top.aggregate(shared);

        for secs in &own {
            clock.set_seconds(*secs);
            top.add_message(format!("own {secs}")).unwrap();
        }
        for secs in &peer {
            clock.set_seconds(*secs);
            other.borrow_mut().add_message(format!("peer {secs}")).unwrap();
        }

        let merged = top.messages().unwrap();
        prop_assert_eq!(merged.len(), own.len() + peer.len());
        prop_assert!(merged.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
    }
}

// ===== Property 3: Interpolation =====

proptest! {
    #[test]
    fn interpolation_without_braces_is_identity(message in "[^{}]*", value in any::<i64>()) {
        let mut context = Context::new();
        context.insert("key".to_string(), Value::Int(value));
        prop_assert_eq!(interpolate(&message, &context), message);
    }

    #[test]
    fn interpolation_with_empty_context_is_identity(message in ".*") {
        prop_assert_eq!(interpolate(&message, &Context::new()), message);
    }
}
