//! Centralized error types for decoding records and change events.

use thiserror::Error;

/// Failures turning raw feed or store data into domain models.
///
/// These are always per-document faults: callers log them with the offending
/// payload and move on, they never tear down a stream.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed event: {0}")]
    Malformed(String),

    #[error("event is missing required field: {0}")]
    MissingField(&'static str),

    #[error("unknown operation type: {0}")]
    UnknownOperation(String),

    #[error("unsupported value for field '{field}': {value}")]
    UnsupportedValue { field: String, value: String },

    #[error("record id is not representable as a string: {0}")]
    BadId(String),
}
