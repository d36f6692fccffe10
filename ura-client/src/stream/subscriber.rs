//! Pull-based line consumption for one stream session.

use futures::StreamExt;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::error::Result;
use crate::wire::{Record, RecordKind, decode, parse_line};

use super::registry::ConsumerRegistry;
use super::transport::LineStream;
use super::version::SchemaResolver;

/// What a finished session saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SessionSummary {
    /// Trips decoded and dispatched.
    pub trips: u64,
    /// Last schema version announced.
    pub version: Option<String>,
}

/// Decodes lines one at a time and fans trips out to the registry.
pub(crate) struct LineSubscriber {
    consumers: ConsumerRegistry,
    resolver: SchemaResolver,
    trips: u64,
}

impl LineSubscriber {
    /// A subscriber with a fresh schema resolver.
    pub(crate) fn new(consumers: ConsumerRegistry) -> Self {
        Self {
            consumers,
            resolver: SchemaResolver::new(),
            trips: 0,
        }
    }

    /// Consume `lines` until end of stream, a fatal error or cancellation.
    ///
    /// The next line is only requested after the previous one has been
    /// decoded and delivered.
    pub(crate) async fn run(
        mut self,
        mut lines: LineStream,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<SessionSummary> {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => {
                    debug!(trips = self.trips, "read cancelled");
                    break;
                }
                next = lines.next() => next,
            };

            match next {
                Some(Ok(line)) => self.handle_line(&line)?,
                Some(Err(e)) => return Err(e),
                None => {
                    debug!(trips = self.trips, "end of stream");
                    break;
                }
            }
        }

        Ok(self.finish())
    }

    /// Decode one line and act on it.
    ///
    /// Only trip and version records are decoded. Stops, messages and
    /// unknown record types are skipped without validation.
    pub(crate) fn handle_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        let fields = parse_line(line)?;
        match RecordKind::of(&fields) {
            Some(RecordKind::Trip | RecordKind::Version) => {}
            Some(kind) => {
                debug!(?kind, "ignoring record on stream");
                return Ok(());
            }
            None => {
                trace!(line, "skipping unrecognised record");
                return Ok(());
            }
        }

        match decode(&fields, self.resolver.current())? {
            Some(Record::Version(version)) => {
                debug!(%version, "schema version announced");
                self.resolver.observe(version);
            }
            Some(Record::Trip(trip)) => {
                self.trips += 1;
                trace!(trip_id = %trip.id, line = %trip.line_name, "trip decoded");
                self.consumers.dispatch(&trip);
            }
            _ => {}
        }

        Ok(())
    }

    fn finish(self) -> SessionSummary {
        SessionSummary {
            trips: self.trips,
            version: self.resolver.into_current(),
        }
    }
}

/// Resolves once cancellation is requested or the requesting side is gone.
pub(crate) async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let _ = cancel.wait_for(|requested| *requested).await;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::stream;
    use parking_lot::Mutex;

    use super::*;
    use crate::domain::Trip;
    use crate::error::UraError;
    use crate::stream::fixtures::{MESSAGE_LINE, STOP_LINE, VERSION_LINE, trip_line};
    use crate::wire::DecodeError;

    fn recording() -> (ConsumerRegistry, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = ConsumerRegistry::new();
        let log = Arc::clone(&seen);
        registry.push(Arc::new(move |trip: &Trip| log.lock().push(trip.id.clone())));
        (registry, seen)
    }

    fn lines(lines: Vec<String>) -> LineStream {
        stream::iter(lines.into_iter().map(Ok)).boxed()
    }

    #[test]
    fn version_is_tracked_and_not_dispatched() {
        let (registry, seen) = recording();
        let mut subscriber = LineSubscriber::new(registry);

        subscriber.handle_line(VERSION_LINE).unwrap();
        assert_eq!(subscriber.resolver.current(), Some("2.0"));
        assert!(seen.lock().is_empty());

        subscriber.handle_line(&trip_line("27000158")).unwrap();
        assert_eq!(*seen.lock(), vec!["27000158"]);
        assert_eq!(subscriber.finish().trips, 1);
    }

    #[test]
    fn stops_messages_and_unknown_records_are_skipped() {
        let (registry, seen) = recording();
        let mut subscriber = LineSubscriber::new(registry);

        subscriber.handle_line(STOP_LINE).unwrap();
        subscriber.handle_line(MESSAGE_LINE).unwrap();
        subscriber.handle_line(r#"[3,"future record type"]"#).unwrap();
        // Not validated on the stream path, even though it is truncated.
        subscriber.handle_line(r#"[0,"Bushof"]"#).unwrap();
        subscriber.handle_line("   ").unwrap();

        assert!(seen.lock().is_empty());
    }

    #[test]
    fn malformed_trip_is_fatal() {
        let (registry, _) = recording();
        let mut subscriber = LineSubscriber::new(registry);

        let err = subscriber.handle_line(r#"[1,"Bushof","100000"]"#).unwrap_err();
        assert!(matches!(
            err,
            UraError::Decode(DecodeError::MalformedRecord {
                record: "trip",
                expected: 16,
                actual: 3,
            })
        ));
    }

    #[test]
    fn invalid_json_is_fatal() {
        let (registry, _) = recording();
        let mut subscriber = LineSubscriber::new(registry);

        assert!(matches!(
            subscriber.handle_line("[1,\"Bushof\""),
            Err(UraError::Decode(DecodeError::InvalidJson { .. }))
        ));
    }

    #[tokio::test]
    async fn run_consumes_until_end_of_stream() {
        let (registry, seen) = recording();
        let (_cancel_tx, cancel_rx) = watch::channel(false);

        let summary = LineSubscriber::new(registry)
            .run(
                lines(vec![
                    VERSION_LINE.to_string(),
                    trip_line("a"),
                    String::new(),
                    trip_line("b"),
                ]),
                cancel_rx,
            )
            .await
            .unwrap();

        assert_eq!(
            summary,
            SessionSummary {
                trips: 2,
                version: Some("2.0".to_string()),
            }
        );
        assert_eq!(*seen.lock(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn run_stops_at_first_bad_line() {
        let (registry, seen) = recording();
        let (_cancel_tx, cancel_rx) = watch::channel(false);

        let result = LineSubscriber::new(registry)
            .run(
                lines(vec![trip_line("a"), "[1,".to_string(), trip_line("b")]),
                cancel_rx,
            )
            .await;

        assert!(matches!(result, Err(UraError::Decode(_))));
        assert_eq!(*seen.lock(), vec!["a"]);
    }

    #[tokio::test]
    async fn run_returns_transport_errors() {
        let (registry, _) = recording();
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let lines: LineStream = stream::iter(vec![
            Ok(trip_line("a")),
            Err(UraError::Api {
                status: 502,
                message: "Bad Gateway".into(),
            }),
        ])
        .boxed();

        let result = LineSubscriber::new(registry).run(lines, cancel_rx).await;
        assert!(matches!(result, Err(UraError::Api { status: 502, .. })));
    }

    #[tokio::test]
    async fn run_honours_cancellation() {
        let (registry, seen) = recording();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        cancel_tx.send(true).unwrap();

        let summary = LineSubscriber::new(registry)
            .run(stream::pending::<Result<String>>().boxed(), cancel_rx)
            .await
            .unwrap();

        assert_eq!(summary, SessionSummary::default());
        assert!(seen.lock().is_empty());
    }
}
