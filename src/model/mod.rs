//! Domain model types (pure).
//!
//! All types in this module are plain data; collectors build them,
//! the rendering layer reads them.

pub mod error;
pub mod exception;
pub mod message;
pub mod value;

// Re-export for convenience
pub use error::{CollectError, FormatError, InputError, ParseError};
pub use exception::{ExceptionRecord, Frame};
pub use message::{LogPayload, MessageRecord, DEFAULT_LABEL};
pub use value::{Context, ObjectValue, Value};
