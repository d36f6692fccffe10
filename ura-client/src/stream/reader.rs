//! Asynchronous trip reader.
//!
//! A reader owns at most one session at a time. `open()` spawns a read task
//! that connects, decodes lines and fans trips out to the registered
//! consumers; `close()` cancels it cooperatively and aborts it if it has not
//! stopped within [`CLOSE_GRACE_PERIOD`].

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::domain::Trip;
use crate::error::{Result, UraError};

use super::registry::{Consumer, ConsumerRegistry};
use super::subscriber::{LineSubscriber, SessionSummary, cancelled};
use super::transport::{LineStream, LineTransport};

/// How long `close()` waits for the read task before aborting it.
pub const CLOSE_GRACE_PERIOD: Duration = Duration::from_secs(1);

struct Session {
    cancel: watch::Sender<bool>,
    /// Closed when the read task ends, whichever way it ends.
    done: watch::Receiver<()>,
    handle: JoinHandle<Result<SessionSummary>>,
}

/// Streams trip predictions to registered consumers.
///
/// Consumers may be added at any time and see trips decoded after they were
/// added. Errors from a session are reported by [`close`](Self::close) or
/// [`join`](Self::join), never to consumers.
///
/// # Examples
///
/// ```no_run
/// use ura_client::{AsyncTripReader, ClientConfig, Query, UraClient};
///
/// # async fn run() -> ura_client::Result<()> {
/// let client = UraClient::new(ClientConfig::new("http://ivu.aseag.de"))?;
/// let reader = client.trip_reader(&Query::new().for_stops(["100000"]))?;
///
/// reader.add_consumer(|trip| println!("{} to {}", trip.line_name, trip.destination_name));
/// reader.open()?;
///
/// tokio::time::sleep(std::time::Duration::from_secs(60)).await;
/// reader.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct AsyncTripReader {
    transport: Arc<dyn LineTransport>,
    consumers: ConsumerRegistry,
    session: Mutex<Option<Session>>,
}

impl AsyncTripReader {
    /// A reader over `transport` with no consumers.
    pub fn new(transport: impl LineTransport) -> Self {
        Self::with_consumers(transport, std::iter::empty())
    }

    /// A reader with an initial set of consumers.
    pub fn with_consumers<I>(transport: impl LineTransport, consumers: I) -> Self
    where
        I: IntoIterator<Item = Consumer>,
    {
        let registry = ConsumerRegistry::new();
        for consumer in consumers {
            registry.push(consumer);
        }

        Self {
            transport: Arc::new(transport),
            consumers: registry,
            session: Mutex::new(None),
        }
    }

    /// Register a consumer. Safe to call while a session is running.
    pub fn add_consumer<F>(&self, consumer: F)
    where
        F: Fn(&Trip) + Send + Sync + 'static,
    {
        self.consumers.push(Arc::new(consumer));
        debug!(consumers = self.consumers.len(), "consumer added");
    }

    /// Number of registered consumers.
    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    /// Start a session.
    ///
    /// Returns as soon as the read task is spawned. Fails with
    /// [`UraError::AlreadyOpen`] if a session exists, including one that
    /// ended on its own but has not been closed or joined yet. Must be called
    /// from within a Tokio runtime.
    pub fn open(&self) -> Result<()> {
        let mut session = self.session.lock();
        if session.is_some() {
            return Err(UraError::AlreadyOpen);
        }

        let runtime = Handle::try_current()
            .map_err(|e| UraError::Configuration(format!("open() needs a Tokio runtime: {e}")))?;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (done_tx, done_rx) = watch::channel(());
        let connect = self.transport.connect();
        let subscriber = LineSubscriber::new(self.consumers.clone());

        let handle = runtime.spawn(async move {
            let _done = done_tx;
            run_session(connect, subscriber, cancel_rx).await
        });

        *session = Some(Session {
            cancel: cancel_tx,
            done: done_rx,
            handle,
        });

        info!(consumers = self.consumers.len(), "trip reader opened");
        Ok(())
    }

    /// True between `open()` and the matching `close()` or `join()`.
    pub fn is_open(&self) -> bool {
        self.session.lock().is_some()
    }

    /// True if a session exists and its read task has ended.
    pub fn is_finished(&self) -> bool {
        self.session
            .lock()
            .as_ref()
            .is_some_and(|session| session.handle.is_finished())
    }

    /// Stop the current session.
    ///
    /// Does nothing if no session exists. Otherwise requests cancellation and
    /// waits up to [`CLOSE_GRACE_PERIOD`] for the read task, then aborts it.
    /// Returns the error that ended the session, if it failed before
    /// cancellation was requested.
    pub async fn close(&self) -> Result<()> {
        let session = self.session.lock().take();
        let Some(Session {
            cancel, mut handle, ..
        }) = session
        else {
            return Ok(());
        };

        // The task may already have ended and dropped its receiver.
        let _ = cancel.send(true);

        match tokio::time::timeout(CLOSE_GRACE_PERIOD, &mut handle).await {
            Ok(joined) => finish(joined),
            Err(_) => {
                warn!(
                    grace_ms = CLOSE_GRACE_PERIOD.as_millis() as u64,
                    "read task did not stop in time, aborting"
                );
                handle.abort();
                Ok(())
            }
        }
    }

    /// Wait for the current session to end on its own, then release it.
    ///
    /// Returns immediately with `Ok(())` if no session exists.
    pub async fn join(&self) -> Result<()> {
        let done = self
            .session
            .lock()
            .as_ref()
            .map(|session| session.done.clone());
        let Some(mut done) = done else {
            return Ok(());
        };

        // Nothing is ever sent; this resolves when the task drops the sender.
        let _ = done.changed().await;
        self.close().await
    }
}

async fn run_session(
    connect: BoxFuture<'static, Result<LineStream>>,
    subscriber: LineSubscriber,
    mut cancel: watch::Receiver<bool>,
) -> Result<SessionSummary> {
    let lines = tokio::select! {
        biased;
        _ = cancelled(&mut cancel) => {
            debug!("cancelled while connecting");
            return Ok(SessionSummary::default());
        }
        lines = connect => lines?,
    };

    subscriber.run(lines, cancel).await
}

fn finish(joined: std::result::Result<Result<SessionSummary>, JoinError>) -> Result<()> {
    match joined {
        Ok(Ok(summary)) => {
            info!(
                trips = summary.trips,
                version = summary.version.as_deref().unwrap_or("unknown"),
                "trip reader closed"
            );
            Ok(())
        }
        Ok(Err(e)) => {
            warn!(error = %e, "trip reader session failed");
            Err(e)
        }
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => Err(UraError::TaskFailed(e.to_string())),
    }
}

impl Drop for AsyncTripReader {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.handle.abort();
        }
    }
}

impl std::fmt::Debug for AsyncTripReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncTripReader")
            .field("consumers", &self.consumers.len())
            .field("open", &self.is_open())
            .finish()
    }
}
