//! End-to-end tests against an in-process URA server.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::extract::{Query as Params, State};
use axum::http::StatusCode;
use axum::routing::get;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpListener;

use ura_client::{ClientConfig, Query, Trip, UraClient, UraError};

const INSTANT_BODY: &str = concat!(
    "[4,\"1.0\",1489568040000]\r\n",
    "[0,\"Bushof\",\"100000\",\"H.1\",0,50.7775,6.0883]\r\n",
    "[1,\"Bushof\",\"100000\",\"H.1\",0,50.7775,6.0883,4,\"33\",\"33\",1,\"Vaals Busstation\",\"Vaals\",247,\"27000158\",1489568040000]\r\n",
    "[1,\"Bushof\",\"100000\",\"H.1\",0,50.7775,6.0883,5,\"45\",\"45\",2,\"Uniklinik\",\"Uniklinik\",null,\"27000159\",1489568100000]\r\n",
    "[2,\"Bushof\",\"100000\",\"H.1\",0,50.7775,6.0883,\"5c8f1e2a\",0,3,\"Stop closed due to roadworks\"]\r\n",
);

fn trip_line(trip_id: &str) -> String {
    format!(
        "[1,\"Bushof\",\"100000\",\"H.1\",0,50.7775,6.0883,4,\"33\",\"33\",1,\"Vaals Busstation\",\"Vaals\",247,\"{trip_id}\",1489568040000]\n"
    )
}

#[derive(Clone, Default)]
struct Recorded {
    params: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn instant(State(recorded): State<Recorded>, Params(params): Params<HashMap<String, String>>) -> &'static str {
    recorded.params.lock().push(params);
    INSTANT_BODY
}

async fn stream_finite() -> Body {
    let mut lines = vec!["[4,\"2.0\"]\n".to_string()];
    lines.extend((1..=3).map(|i| trip_line(&format!("live-{i}"))));
    Body::from_stream(stream::iter(lines.into_iter().map(Ok::<_, Infallible>)))
}

async fn stream_open() -> Body {
    let first = stream::iter(vec![Ok::<_, Infallible>(trip_line("first"))]);
    Body::from_stream(first.chain(stream::pending()))
}

async fn unavailable() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance")
}

async fn serve() -> (SocketAddr, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/interfaces/ura/instant_V1", get(instant))
        .route("/interfaces/ura/stream_V1", get(stream_finite))
        .route("/open/stream", get(stream_open))
        .route("/down/instant", get(unavailable))
        .with_state(recorded.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (addr, recorded)
}

fn client(addr: SocketAddr) -> UraClient {
    UraClient::new(ClientConfig::new(format!("http://{addr}"))).unwrap()
}

fn recording() -> (Arc<Mutex<Vec<String>>>, impl Fn(&Trip) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    (seen, move |trip: &Trip| log.lock().push(trip.id.clone()))
}

#[tokio::test]
async fn instant_trips_with_filters() {
    let (addr, recorded) = serve().await;
    let query = Query::new().for_stops(["100000"]).for_lines(["33", "45"]);

    let trips = client(addr).get_trips(&query).await.unwrap();

    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0].line_name, "33");
    assert_eq!(trips[0].vehicle_id.as_deref(), Some("247"));
    assert_eq!(trips[1].direction.code(), 2);
    assert_eq!(trips[1].vehicle_id, None);

    let params = recorded.params.lock();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0]["StopID"], "100000");
    assert_eq!(params[0]["LineID"], "33,45");
    assert!(params[0]["ReturnList"].contains("EstimatedTime"));
}

#[tokio::test]
async fn instant_stops_messages_and_limit() {
    let (addr, _) = serve().await;
    let client = client(addr);

    let stops = client.get_stops(&Query::new()).await.unwrap();
    assert_eq!(stops.len(), 1);
    assert_eq!(stops[0].display_name(), "Bushof (H.1)");

    let messages = client.get_messages(&Query::new()).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].priority, 3);

    let trips = client.get_trips(&Query::new().with_limit(1)).await.unwrap();
    assert_eq!(trips.len(), 1);
}

#[tokio::test]
async fn instant_error_status() {
    let (addr, _) = serve().await;
    let config = ClientConfig::new(format!("http://{addr}")).with_instant_path("/down/instant");
    let client = UraClient::new(config).unwrap();

    let err = client.get_trips(&Query::new()).await.unwrap_err();
    assert!(matches!(
        err,
        UraError::Api { status: 503, ref message } if message == "maintenance"
    ));
    assert!(err.is_transport());
}

#[tokio::test]
async fn stream_delivers_all_trips() {
    let (addr, _) = serve().await;
    let reader = client(addr).trip_reader(&Query::new()).unwrap();
    let (seen, consumer) = recording();
    reader.add_consumer(consumer);

    reader.open().unwrap();
    tokio::time::timeout(Duration::from_secs(5), reader.join())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(*seen.lock(), vec!["live-1", "live-2", "live-3"]);
}

#[tokio::test]
async fn stream_not_found_is_reported() {
    let (addr, _) = serve().await;
    let config = ClientConfig::new(format!("http://{addr}")).with_stream_path("/missing");
    let reader = UraClient::new(config).unwrap().trip_reader(&Query::new()).unwrap();

    reader.open().unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), reader.join())
        .await
        .unwrap();

    assert!(matches!(result, Err(UraError::Api { status: 404, .. })));
}

#[tokio::test]
async fn close_stops_an_open_stream() {
    let (addr, _) = serve().await;
    let config = ClientConfig::new(format!("http://{addr}")).with_stream_path("/open/stream");
    let reader = UraClient::new(config).unwrap().trip_reader(&Query::new()).unwrap();
    let (seen, consumer) = recording();
    reader.add_consumer(consumer);

    reader.open().unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while seen.lock().is_empty() {
        assert!(Instant::now() < deadline, "no trip received");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let started = Instant::now();
    reader.close().await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!reader.is_open());
    assert_eq!(*seen.lock(), vec!["first"]);
}
