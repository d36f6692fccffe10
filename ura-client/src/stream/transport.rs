//! Line transports.
//!
//! A transport turns a connection attempt into a stream of text lines. The
//! reader only ever pulls the next line after it has finished with the
//! previous one, and the line splitter only pulls the next body chunk when no
//! complete line is buffered, so a slow consumer throttles the socket instead
//! of growing a buffer.

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::Url;
use tracing::debug;

use crate::error::{Result, UraError};
use crate::wire::DecodeError;

/// A stream of lines, without their terminators.
pub type LineStream = BoxStream<'static, Result<String>>;

/// Source of line streams.
///
/// Each call to `connect` starts a fresh session.
pub trait LineTransport: Send + Sync + 'static {
    fn connect(&self) -> BoxFuture<'static, Result<LineStream>>;
}

impl<T: LineTransport + ?Sized> LineTransport for std::sync::Arc<T> {
    fn connect(&self) -> BoxFuture<'static, Result<LineStream>> {
        (**self).connect()
    }
}

/// Streams lines from an HTTP GET response body.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    url: Url,
}

impl HttpTransport {
    pub fn new(http: reqwest::Client, url: Url) -> Self {
        Self { http, url }
    }

    /// The URL requested on each connect.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl LineTransport for HttpTransport {
    fn connect(&self) -> BoxFuture<'static, Result<LineStream>> {
        let http = self.http.clone();
        let url = self.url.clone();

        Box::pin(async move {
            debug!(%url, "connecting to stream");

            let response = http.get(url).send().await?;
            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(UraError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            debug!(status = status.as_u16(), "stream connected");
            Ok(split_lines(response.bytes_stream()))
        })
    }
}

/// Longest line accepted from a stream, terminator excluded.
pub const MAX_LINE_LENGTH: usize = 1024 * 1024;

struct Splitter<S> {
    chunks: std::pin::Pin<Box<S>>,
    buffer: Vec<u8>,
    /// Bytes of `buffer` already known to contain no newline.
    scanned: usize,
    max_line: usize,
    finished: bool,
}

impl<S> Splitter<S> {
    fn fail(&mut self, error: UraError) -> Result<String> {
        self.finished = true;
        self.buffer.clear();
        self.scanned = 0;
        Err(error)
    }

    fn too_long(&mut self) -> Result<String> {
        let limit = self.max_line;
        self.fail(UraError::Decode(DecodeError::LineTooLong { limit }))
    }
}

/// Split a stream of byte chunks into lines of at most [`MAX_LINE_LENGTH`]
/// bytes.
///
/// Accepts `\n` and `\r\n` terminators. A final unterminated line is emitted
/// at end of input. After an error the stream ends.
pub fn split_lines<S, B, E>(chunks: S) -> LineStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<UraError> + Send + 'static,
{
    split_lines_with_limit(chunks, MAX_LINE_LENGTH)
}

/// Like [`split_lines`], with a custom maximum line length.
///
/// A line longer than `max_line` fails the stream with
/// [`DecodeError::LineTooLong`]. Buffered input never grows much beyond
/// `max_line` plus one chunk.
pub fn split_lines_with_limit<S, B, E>(chunks: S, max_line: usize) -> LineStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<UraError> + Send + 'static,
{
    let splitter = Splitter {
        chunks: Box::pin(chunks),
        buffer: Vec::new(),
        scanned: 0,
        max_line,
        finished: false,
    };

    stream::unfold(splitter, |mut state| async move {
        loop {
            let unscanned = &state.buffer[state.scanned..];
            if let Some(pos) = unscanned.iter().position(|&b| b == b'\n') {
                let end = state.scanned + pos;
                let mut line: Vec<u8> = state.buffer.drain(..=end).collect();
                state.scanned = 0;
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                if line.len() > state.max_line {
                    let err = state.too_long();
                    return Some((err, state));
                }
                return Some((into_line(line), state));
            }
            state.scanned = state.buffer.len();

            // Allow one extra byte for a `\r` whose `\n` is still to come.
            if state.buffer.len() > state.max_line + 1 {
                let err = state.too_long();
                return Some((err, state));
            }

            if state.finished {
                if state.buffer.is_empty() {
                    return None;
                }
                state.scanned = 0;
                let mut line = std::mem::take(&mut state.buffer);
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                if line.len() > state.max_line {
                    let err = state.too_long();
                    return Some((err, state));
                }
                return Some((into_line(line), state));
            }

            match state.chunks.next().await {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    let err = state.fail(e.into());
                    return Some((err, state));
                }
                None => state.finished = true,
            }
        }
    })
    .boxed()
}

fn into_line(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        UraError::Decode(DecodeError::InvalidUtf8 {
            message: e.to_string(),
        })
    })
}
