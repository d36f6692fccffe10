//! Streaming trip predictions.
//!
//! ```text
//! LineTransport ──lines──▶ LineSubscriber ──Trip──▶ ConsumerRegistry ──▶ consumers
//!                               │
//!                         SchemaResolver
//! ```
//!
//! [`AsyncTripReader`] owns the read task and its lifecycle.

#[cfg(test)]
mod fixtures;
pub mod mock;
mod reader;
mod registry;
mod subscriber;
mod transport;
mod version;

pub use mock::{MockFeed, MockTransport};
pub use reader::{AsyncTripReader, CLOSE_GRACE_PERIOD};
pub use registry::{Consumer, ConsumerRegistry};
pub use transport::{
    HttpTransport, LineStream, LineTransport, MAX_LINE_LENGTH, split_lines, split_lines_with_limit,
};
pub use version::SchemaResolver;
