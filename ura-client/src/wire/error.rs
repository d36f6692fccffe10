//! Wire decoding errors.

use super::value::WireType;

/// Error decoding one line of the wire protocol.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The line is not valid JSON, or not a JSON array.
    #[error("invalid JSON line: {message}")]
    InvalidJson { message: String },

    /// The line is not valid UTF-8.
    #[error("invalid UTF-8 in line: {message}")]
    InvalidUtf8 { message: String },

    /// A line exceeded the maximum accepted length before its terminator.
    #[error("line longer than {limit} bytes")]
    LineTooLong { limit: usize },

    /// The record has fewer fields than its type requires.
    #[error("malformed {record} record: expected at least {expected} fields, found {actual}")]
    MalformedRecord {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A field has the wrong wire type.
    #[error("field {field} ({name}) not of expected type {expected}, found {actual}")]
    FieldTypeMismatch {
        field: usize,
        name: &'static str,
        expected: &'static str,
        actual: WireType,
    },

    /// A coerced field value lies outside its domain range.
    #[error("field {field} ({name}) value {value} out of range {min}..={max}")]
    FieldRangeError {
        field: usize,
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}
