//! URA wire protocol.
//!
//! Every response line is a JSON array whose first element identifies the
//! record type:
//!
//! | code | record  | minimum fields |
//! |------|---------|----------------|
//! | 0    | stop    | 7              |
//! | 1    | trip    | 16             |
//! | 2    | message | 11             |
//! | 4    | version | 2              |
//!
//! Other codes are reserved for record types this client does not know and
//! are skipped.

mod decode;
mod error;
mod value;

pub use decode::{
    MESSAGE_FIELDS, Record, RecordKind, STOP_FIELDS, TRIP_FIELDS, VERSION_FIELDS, decode,
};
pub use error::DecodeError;
pub use value::{WireType, WireValue, parse_line};
