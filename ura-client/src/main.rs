use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ura_client::{AsyncTripReader, ClientConfig, Query, Result, Trip, UraClient, UraError};

/// Read a comma separated list from the environment.
fn env_list(name: &str) -> Vec<String> {
    std::env::var(name)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn config_from_env() -> Result<ClientConfig> {
    let base_url = std::env::var("URA_BASE_URL")
        .map_err(|_| UraError::Configuration("URA_BASE_URL is not set".to_string()))?;

    let mut config = ClientConfig::new(base_url);
    if let Ok(path) = std::env::var("URA_STREAM_PATH") {
        config = config.with_stream_path(path);
    }
    Ok(config)
}

fn log_trip(trip: &Trip) {
    info!(
        stop = %trip.stop.display_name(),
        line = %trip.line_name,
        destination = %trip.destination_name,
        eta = ?trip.estimated_at(),
        "trip"
    );

    match serde_json::to_string(trip) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!(error = %e, "failed to serialize trip"),
    }
}

async fn run(reader: &AsyncTripReader) -> Result<()> {
    reader.add_consumer(log_trip);
    reader.open()?;

    tokio::select! {
        result = reader.join() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, closing stream");
            reader.close().await
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = config_from_env()?;
    let query = Query::new()
        .for_stops(env_list("URA_STOPS"))
        .for_lines(env_list("URA_LINES"));

    let client = UraClient::new(config)?;
    let reader = client.trip_reader(&query)?;

    info!(stops = ?env_list("URA_STOPS"), lines = ?env_list("URA_LINES"), "streaming trips");

    let result = run(&reader).await;
    if let Err(e) = &result {
        error!(error = %e, "stream failed");
    }
    result
}
