//! URA HTTP client.
//!
//! One-shot queries go to the instant endpoint and return buffered results.
//! Live predictions come from the stream endpoint through an
//! [`AsyncTripReader`].

use reqwest::Url;
use tracing::debug;

use crate::config::ClientConfig;
use crate::domain::{Message, Stop, Trip};
use crate::error::{Result, UraError};
use crate::query::{MESSAGE_RETURN_LIST, Query, STOP_RETURN_LIST, TRIP_RETURN_LIST};
use crate::stream::{AsyncTripReader, HttpTransport, SchemaResolver};
use crate::wire::{Record, RecordKind, decode, parse_line};

/// URA API client.
#[derive(Debug, Clone)]
pub struct UraClient {
    http: reqwest::Client,
    instant_url: Url,
    stream_url: Url,
}

impl UraClient {
    /// Create a client. Fails if the configured URLs are invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let instant_url = config.instant_url()?;
        let stream_url = config.stream_url()?;
        let http = config.build_http()?;

        Ok(Self {
            http,
            instant_url,
            stream_url,
        })
    }

    /// Get stops matching `query`.
    pub async fn get_stops(&self, query: &Query) -> Result<Vec<Stop>> {
        let body = self.fetch(query, STOP_RETURN_LIST).await?;
        collect_records(&body, RecordKind::Stop, query.limit(), |record| match record {
            Record::Stop(stop) => Some(stop),
            _ => None,
        })
    }

    /// Get current trip predictions matching `query`.
    pub async fn get_trips(&self, query: &Query) -> Result<Vec<Trip>> {
        let body = self.fetch(query, TRIP_RETURN_LIST).await?;
        collect_records(&body, RecordKind::Trip, query.limit(), |record| match record {
            Record::Trip(trip) => Some(trip),
            _ => None,
        })
    }

    /// Get flex messages matching `query`.
    pub async fn get_messages(&self, query: &Query) -> Result<Vec<Message>> {
        let body = self.fetch(query, MESSAGE_RETURN_LIST).await?;
        collect_records(&body, RecordKind::Message, query.limit(), |record| match record {
            Record::Message(message) => Some(message),
            _ => None,
        })
    }

    /// Create an unopened reader streaming trips that match `query`.
    ///
    /// The query's limit does not apply to streams.
    pub fn trip_reader(&self, query: &Query) -> Result<AsyncTripReader> {
        let mut url = self.stream_url.clone();
        query.apply(&mut url, TRIP_RETURN_LIST);
        Ok(AsyncTripReader::new(HttpTransport::new(self.http.clone(), url)))
    }

    async fn fetch(&self, query: &Query, return_list: &[&str]) -> Result<String> {
        let mut url = self.instant_url.clone();
        query.apply(&mut url, return_list);
        debug!(%url, "instant request");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UraError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }
}

/// Decode the records of one kind from an instant response body.
///
/// Version markers are tracked and passed to later decodes. Records of other
/// kinds are skipped without validation. Reading stops once `limit` records
/// have been collected.
fn collect_records<T>(
    body: &str,
    kind: RecordKind,
    limit: Option<usize>,
    pick: impl Fn(Record) -> Option<T>,
) -> Result<Vec<T>> {
    let mut resolver = SchemaResolver::new();
    let mut records = Vec::new();

    for line in body.lines() {
        if limit.is_some_and(|limit| records.len() >= limit) {
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields = parse_line(line)?;
        let found = RecordKind::of(&fields);
        if found != Some(kind) && found != Some(RecordKind::Version) {
            continue;
        }

        match decode(&fields, resolver.current())? {
            Some(Record::Version(version)) => resolver.observe(version),
            Some(record) => records.extend(pick(record)),
            None => {}
        }
    }

    debug!(count = records.len(), ?kind, "instant response decoded");
    Ok(records)
}
