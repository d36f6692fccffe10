//! Domain types for URA feeds.
//!
//! These are immutable value types built once from a decoded wire record.
//! Invariants that the wire format guarantees (such as the direction range)
//! are enforced at construction, so consumers can trust any value they
//! receive.

mod message;
mod stop;
mod trip;

pub use message::{DEFAULT_PRIORITY, Message, MessageType};
pub use stop::{Stop, StopState};
pub use trip::{Direction, InvalidDirection, Trip};
