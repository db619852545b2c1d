//! tracebar
//!
//! Data-collection core of an in-process debug toolbar. Collectors capture log
//! messages and errors during one request and normalize them into records a
//! rendering layer can display.
//!
//! - [`collector::MessagesCollector`]: ordered messages, peer aggregation, `{placeholder}` logging
//! - [`collector::ExceptionsCollector`]: captured errors with source excerpts and cause chains
//! - [`format`]: the formatter/renderer contracts collectors are built with

pub mod collector;
pub mod config;
pub mod format;
pub mod input;
pub mod logging;
pub mod model;
pub mod parser;
