//! Client for URA real-time public transport APIs.
//!
//! URA servers answer with line-delimited JSON arrays describing stops, trip
//! predictions and flex messages. [`UraClient`] runs one-shot queries against
//! the instant endpoint; [`AsyncTripReader`] follows the stream endpoint and
//! fans trip predictions out to registered consumers.

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod query;
pub mod stream;
pub mod wire;

pub use client::UraClient;
pub use config::ClientConfig;
pub use domain::{Direction, Message, MessageType, Stop, StopState, Trip};
pub use error::{Result, UraError};
pub use query::Query;
pub use stream::AsyncTripReader;
