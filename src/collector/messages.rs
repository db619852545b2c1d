//! Message collector: ordered message capture with peer aggregation.
//!
//! # Read contract
//!
//! [`MessagesCollector::messages`] returns this collector's own records followed by
//! every peer's current records (stamped with the peer's name), stably sorted by
//! timestamp. Peers are re-read on every call, so the merged view is live.
//! Records with equal timestamps keep concatenation order: own records first,
//! then peers in aggregation order.

use crate::collector::interpolate::interpolate;
use crate::collector::{DataCollector, MessageSource, SharedClock, SystemClock};
use crate::format::{Asset, PlainFormatter, RichValueRenderer, ValueFormatter};
use crate::logging::CapturedEvent;
use crate::model::{CollectError, Context, LogPayload, MessageRecord, DEFAULT_LABEL};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use tracing::debug;

/// Payload handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagesPayload {
    /// Number of records in `messages`.
    pub count: usize,
    /// Merged records, sorted by timestamp.
    pub messages: Vec<MessageRecord>,
}

/// Shared handle to an aggregated peer.
pub type SharedSource = Rc<RefCell<dyn MessageSource>>;

// ===== Builder =====

/// Builder for [`MessagesCollector`].
///
/// Rich rendering is decided here and cannot change once records exist.
pub struct MessagesCollectorBuilder {
    name: String,
    formatter: Box<dyn ValueFormatter>,
    renderer: Option<Box<dyn RichValueRenderer>>,
    clock: SharedClock,
}

impl MessagesCollectorBuilder {
    /// Enable rich rendering of non-string values.
    pub fn rich_renderer(mut self, renderer: impl RichValueRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Time source for record timestamps. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Finish building. The rich flag is fixed from here on.
    pub fn build(self) -> MessagesCollector {
        MessagesCollector {
            name: self.name,
            formatter: self.formatter,
            renderer: self.renderer,
            clock: self.clock,
            own: Vec::new(),
            peers: Vec::new(),
        }
    }
}

// ===== MessagesCollector =====

/// Collects messages for one request and merges peer collectors on read.
pub struct MessagesCollector {
    name: String,
    formatter: Box<dyn ValueFormatter>,
    renderer: Option<Box<dyn RichValueRenderer>>,
    clock: SharedClock,
    own: Vec<MessageRecord>,
    peers: Vec<SharedSource>,
}

impl MessagesCollector {
    /// Start building a collector with the given formatter.
    pub fn builder(
        name: impl Into<String>,
        formatter: impl ValueFormatter + 'static,
    ) -> MessagesCollectorBuilder {
        MessagesCollectorBuilder {
            name: name.into(),
            formatter: Box::new(formatter),
            renderer: None,
            clock: Rc::new(SystemClock),
        }
    }

    /// Collector using [`PlainFormatter`], the system clock and no rich rendering.
    pub fn with_plain_formatter(name: impl Into<String>) -> Self {
        Self::builder(name, PlainFormatter::new()).build()
    }

    /// Name stamped on this collector's records when it is read as a peer.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when non-string values are also rendered richly.
    pub fn is_rich(&self) -> bool {
        self.renderer.is_some()
    }

    /// Append a message under `label`, stamped with the collector's clock.
    ///
    /// Strings are stored verbatim. Other values go through the formatter (and the
    /// rich renderer when enabled); a failure in either propagates and nothing is stored.
    pub fn append(
        &mut self,
        payload: impl Into<LogPayload>,
        label: &str,
    ) -> Result<&MessageRecord, CollectError> {
        let timestamp = self.clock.now();
        self.append_at(payload.into(), label, timestamp)
    }

    /// Append with an explicit creation time, for records created before they reach us.
    fn append_at(
        &mut self,
        payload: LogPayload,
        label: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<&MessageRecord, CollectError> {
        let record = match payload {
            LogPayload::Text(text) => MessageRecord::plain(text, label, timestamp),
            LogPayload::Structured(value) => {
                let text = self
                    .formatter
                    .format(&value)
                    .map_err(|source| CollectError::Formatter { source })?;
                let rich_html = match &self.renderer {
                    Some(renderer) => Some(
                        renderer
                            .render(&value)
                            .map_err(|source| CollectError::Renderer { source })?,
                    ),
                    None => None,
                };
                MessageRecord::formatted(text, rich_html, label, timestamp)
            }
        };

        debug!(collector = %self.name, label, "message captured");
        let index = self.own.len();
        self.own.push(record);
        Ok(&self.own[index])
    }

    /// Append a message with the default `"info"` label.
    pub fn add_message(
        &mut self,
        payload: impl Into<LogPayload>,
    ) -> Result<&MessageRecord, CollectError> {
        self.append(payload, DEFAULT_LABEL)
    }

    /// Structured logging entry point.
    ///
    /// String messages have their `{placeholders}` filled from `context` first;
    /// structured messages bypass interpolation. Every level is accepted.
    pub fn log(
        &mut self,
        level: &str,
        message: impl Into<LogPayload>,
        context: &Context,
    ) -> Result<&MessageRecord, CollectError> {
        self.append(interpolate_payload(message.into(), context), level)
    }

    /// Log every event currently pending on `events`, without blocking.
    ///
    /// Records keep the time each event was emitted, not the time it was drained.
    /// Returns the number of events ingested.
    pub fn ingest(&mut self, events: &Receiver<CapturedEvent>) -> Result<usize, CollectError> {
        let mut ingested = 0;
        while let Ok(event) = events.try_recv() {
            let level = event.level.as_str().to_ascii_lowercase();
            let payload = interpolate_payload(LogPayload::Text(event.message), &event.fields);
            self.append_at(payload, &level, event.timestamp)?;
            ingested += 1;
        }
        Ok(ingested)
    }

    /// Register a peer whose records appear in this collector's reads.
    ///
    /// Registering the same peer twice yields its records twice.
    pub fn aggregate(&mut self, peer: SharedSource) {
        self.peers.push(peer);
    }

    /// Number of registered peers.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// This collector's own records, in append order.
    pub fn own_messages(&self) -> &[MessageRecord] {
        &self.own
    }

    /// Own records plus every peer's, stably sorted by timestamp.
    pub fn messages(&self) -> Result<Vec<MessageRecord>, CollectError> {
        let mut merged = self.own.clone();

        for (index, peer) in self.peers.iter().enumerate() {
            let peer = peer
                .try_borrow()
                .map_err(|_| CollectError::PeerBusy { index })?;
            let name = peer.name().to_string();
            merged.extend(
                peer.messages()?
                    .into_iter()
                    .map(|record| record.from_peer(&name)),
            );
        }

        merged.sort_by_key(MessageRecord::timestamp);
        Ok(merged)
    }

    /// Remove this collector's own records. Peers are untouched.
    pub fn clear(&mut self) {
        self.own.clear();
    }

    /// Count and merged records, ready for the rendering layer.
    pub fn payload(&self) -> Result<MessagesPayload, CollectError> {
        let messages = self.messages()?;
        Ok(MessagesPayload {
            count: messages.len(),
            messages,
        })
    }
}

fn interpolate_payload(payload: LogPayload, context: &Context) -> LogPayload {
    match payload {
        LogPayload::Text(text) => LogPayload::Text(interpolate(&text, context)),
        structured => structured,
    }
}

impl MessageSource for MessagesCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn messages(&self) -> Result<Vec<MessageRecord>, CollectError> {
        MessagesCollector::messages(self)
    }
}

impl DataCollector for MessagesCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self) -> Result<serde_json::Value, CollectError> {
        Ok(serde_json::to_value(self.payload()?)?)
    }

    fn assets(&self) -> Vec<Asset> {
        self.renderer
            .as_ref()
            .map(|r| r.required_assets())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for MessagesCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagesCollector")
            .field("name", &self.name)
            .field("rich", &self.is_rich())
            .field("own", &self.own.len())
            .field("peers", &self.peers.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
