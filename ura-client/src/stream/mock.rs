//! In-memory transport for testing without a URA server.
//!
//! Sessions are queued up front and handed out one per `connect`, so a
//! single mock can back several sequential reader sessions.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::channel::mpsc;
use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Result, UraError};

use super::transport::{LineStream, LineTransport};

/// Mock transport that serves queued line streams.
#[derive(Default)]
pub struct MockTransport {
    sessions: Mutex<VecDeque<LineStream>>,
    connects: AtomicUsize,
}

/// Push side of a session queued with [`MockTransport::with_feed`].
///
/// Dropping the feed ends the stream.
#[derive(Debug, Clone)]
pub struct MockFeed {
    tx: mpsc::UnboundedSender<Result<String>>,
}

impl MockFeed {
    /// Send one line. Returns false if the session has gone away.
    pub fn send_line(&self, line: impl Into<String>) -> bool {
        self.tx.unbounded_send(Ok(line.into())).is_ok()
    }

    /// Fail the session with `error`.
    pub fn fail(&self, error: UraError) -> bool {
        self.tx.unbounded_send(Err(error)).is_ok()
    }
}

impl MockTransport {
    /// A transport with no sessions queued. Connecting fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a session that yields `lines` and then ends.
    pub fn with_lines<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<Result<String>> = lines.into_iter().map(|l| Ok(l.into())).collect();
        self.with_session(stream::iter(lines).boxed())
    }

    /// Queue a session that yields `lines` and then fails with `error`.
    pub fn with_failure<I, S>(self, lines: I, error: UraError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut items: Vec<Result<String>> = lines.into_iter().map(|l| Ok(l.into())).collect();
        items.push(Err(error));
        self.with_session(stream::iter(items).boxed())
    }

    /// Queue a session that never yields and never ends.
    pub fn with_pending(self) -> Self {
        self.with_session(stream::pending::<Result<String>>().boxed())
    }

    /// Queue a session fed by hand through the returned [`MockFeed`].
    pub fn with_feed(self) -> (Self, MockFeed) {
        let (tx, rx) = mpsc::unbounded();
        (self.with_session(rx.boxed()), MockFeed { tx })
    }

    /// Queue an arbitrary line stream.
    pub fn with_session(self, lines: LineStream) -> Self {
        self.sessions.lock().push_back(lines);
        self
    }

    /// Number of connection attempts so far.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of sessions still queued.
    pub fn remaining(&self) -> usize {
        self.sessions.lock().len()
    }
}

impl LineTransport for MockTransport {
    fn connect(&self) -> BoxFuture<'static, Result<LineStream>> {
        let attempt = self.connects.fetch_add(1, Ordering::SeqCst) + 1;
        let session = self.sessions.lock().pop_front();
        debug!(attempt, queued = session.is_some(), "mock connect");

        future::ready(session.ok_or_else(|| UraError::Api {
            status: 503,
            message: "no mock session queued".to_string(),
        }))
        .boxed()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("remaining", &self.remaining())
            .field("connects", &self.connects())
            .finish()
    }
}
