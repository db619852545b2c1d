//! Collectors: per-request capture units.
//!
//! - [`MessagesCollector`] stores log messages and merges peer collectors on read.
//! - [`ExceptionsCollector`] stores captured errors with source context.
//!
//! Collectors are single-threaded: peers are shared through
//! `Rc<RefCell<_>>` and read without locking.

use crate::format::Asset;
use crate::model::{CollectError, MessageRecord};
use std::rc::Rc;
use tracing::warn;

pub mod clock;
pub mod exceptions;
pub mod interpolate;
pub mod link;
pub mod messages;
pub mod source_excerpt;
pub mod throwable;

pub use clock::{Clock, ManualClock, SystemClock};
pub use exceptions::{ExceptionsCollector, ExceptionsCollectorBuilder, ExceptionsPayload};
pub use interpolate::interpolate;
pub use link::{DebugLinkBuilder, EditorLink};
pub use messages::{MessagesCollector, MessagesCollectorBuilder, MessagesPayload};
pub use throwable::{ErrorReport, Throwable};

/// A named capture unit the rendering layer can pull a payload from.
pub trait DataCollector {
    /// Key under which the payload is published.
    fn name(&self) -> &str;

    /// Serializable payload for the rendering layer.
    fn collect(&self) -> Result<serde_json::Value, CollectError>;

    /// Assets the payload needs to render. Empty unless rich rendering is on.
    fn assets(&self) -> Vec<Asset> {
        Vec::new()
    }
}

/// Anything that can be aggregated into a [`MessagesCollector`].
pub trait MessageSource {
    /// Name stamped on records read through aggregation.
    fn name(&self) -> &str;

    /// Current messages, in this source's own merged order.
    fn messages(&self) -> Result<Vec<MessageRecord>, CollectError>;
}

/// Shared handle to a clock, so several collectors can observe the same time source.
pub type SharedClock = Rc<dyn Clock>;

/// Collect every collector into one `{name: payload}` object.
///
/// # Errors
///
/// Fails with [`CollectError::DuplicateName`] when two collectors share a name,
/// and with the first collector error otherwise.
pub fn collect_all(collectors: &[&dyn DataCollector]) -> Result<serde_json::Value, CollectError> {
    let mut payloads = serde_json::Map::new();
    for collector in collectors {
        let name = collector.name();
        if payloads.contains_key(name) {
            warn!(name, "two collectors share a name");
            return Err(CollectError::DuplicateName {
                name: name.to_string(),
            });
        }
        payloads.insert(name.to_string(), collector.collect()?);
    }
    Ok(serde_json::Value::Object(payloads))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    #[test]
    fn collect_all_keys_payloads_by_collector_name() {
        let mut messages = MessagesCollector::with_plain_formatter("log");
        messages.add_message(Value::from(1)).unwrap();
        let exceptions = ExceptionsCollector::new("errors");

        let all = collect_all(&[&messages, &exceptions]).unwrap();

        assert_eq!(all["log"]["count"], serde_json::json!(1));
        assert_eq!(all["log"]["messages"][0]["text"], serde_json::json!("1"));
        assert_eq!(all["errors"]["count"], serde_json::json!(0));
    }

    #[test]
    fn collect_all_rejects_shared_names() {
        let messages = MessagesCollector::with_plain_formatter("debug");
        let exceptions = ExceptionsCollector::new("debug");

        let err = collect_all(&[&messages, &exceptions]).unwrap_err();

        assert!(matches!(err, CollectError::DuplicateName { ref name } if name == "debug"));
    }
}
