//! Client configuration.

use std::time::Duration;

use reqwest::Url;

use crate::error::{Result, UraError};

/// Default path of the instant (one-shot) endpoint.
pub const DEFAULT_INSTANT_PATH: &str = "/interfaces/ura/instant_V1";

/// Default path of the stream endpoint.
pub const DEFAULT_STREAM_PATH: &str = "/interfaces/ura/stream_V1";

/// Configuration for [`UraClient`](crate::UraClient).
///
/// Only the base URL is required. Timeouts are unset by default: the stream
/// endpoint keeps its response open indefinitely, so a blanket request
/// timeout would cut every stream short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL with scheme, without trailing slash.
    pub base_url: String,
    /// Path of the instant endpoint.
    pub instant_path: String,
    /// Path of the stream endpoint.
    pub stream_path: String,
    /// Timeout for establishing the TCP/TLS connection.
    pub connect_timeout: Option<Duration>,
    /// Timeout for each read from the response body.
    pub read_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a config for the given base URL with default paths.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            instant_path: DEFAULT_INSTANT_PATH.to_string(),
            stream_path: DEFAULT_STREAM_PATH.to_string(),
            connect_timeout: None,
            read_timeout: None,
        }
    }

    /// Set a custom instant endpoint path.
    pub fn with_instant_path(mut self, path: impl Into<String>) -> Self {
        self.instant_path = path.into();
        self
    }

    /// Set a custom stream endpoint path.
    pub fn with_stream_path(mut self, path: impl Into<String>) -> Self {
        self.stream_path = path.into();
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the per-read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Full URL of the instant endpoint.
    pub fn instant_url(&self) -> Result<Url> {
        self.endpoint(&self.instant_path)
    }

    /// Full URL of the stream endpoint.
    pub fn stream_url(&self) -> Result<Url> {
        self.endpoint(&self.stream_path)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let url = Url::parse(&raw)
            .map_err(|e| UraError::Configuration(format!("invalid URL {raw:?}: {e}")))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(UraError::Configuration(format!(
                "unsupported scheme {other:?} in {raw:?}"
            ))),
        }
    }

    /// Build the HTTP client for this configuration.
    pub(crate) fn build_http(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = self.read_timeout {
            builder = builder.read_timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| UraError::Configuration(format!("failed to build HTTP client: {e}")))
    }
}
