//! Consumer registration and fan-out.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::domain::Trip;

/// Callback invoked for every decoded trip.
///
/// Callbacks run on the read task. They should return quickly: the next line
/// is not read until every consumer has seen the current trip.
pub type Consumer = Arc<dyn Fn(&Trip) + Send + Sync>;

/// Append-only list of consumers, shared between the caller and the read task.
#[derive(Clone, Default)]
pub struct ConsumerRegistry {
    consumers: Arc<RwLock<Vec<Consumer>>>,
}

impl ConsumerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer. It sees trips decoded from now on.
    pub fn push(&self, consumer: Consumer) {
        self.consumers.write().push(consumer);
    }

    pub fn len(&self) -> usize {
        self.consumers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.read().is_empty()
    }

    /// Current consumers, in registration order.
    pub fn snapshot(&self) -> Vec<Consumer> {
        self.consumers.read().clone()
    }

    /// Deliver `trip` to every consumer in registration order.
    ///
    /// The lock is released before any callback runs, so a callback may
    /// register further consumers; those only see later trips. A panicking
    /// consumer is logged and skipped. Returns the number of consumers that
    /// completed normally.
    pub fn dispatch(&self, trip: &Trip) -> usize {
        let consumers = self.snapshot();
        let mut delivered = 0;

        for (index, consumer) in consumers.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| consumer(trip))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    warn!(
                        consumer = index,
                        trip_id = %trip.id,
                        panic = panic_message(payload.as_ref()),
                        "consumer panicked"
                    );
                }
            }
        }

        delivered
    }
}

impl std::fmt::Debug for ConsumerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerRegistry")
            .field("consumers", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
