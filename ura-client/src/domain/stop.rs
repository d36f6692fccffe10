//! Stop point types.

use std::fmt;

use serde::Serialize;

/// Operational state of a stop point.
///
/// Feeds send a small integer code. The documented codes map to named
/// variants; anything else is preserved as [`StopState::Other`] so that a
/// new server-side state does not break decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StopState {
    Open,
    TemporarilyClosed,
    Closed,
    Suspended,
    Other(i32),
}

impl StopState {
    /// Map a wire code to a state.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => StopState::Open,
            1 => StopState::TemporarilyClosed,
            2 => StopState::Closed,
            3 => StopState::Suspended,
            other => StopState::Other(other),
        }
    }

    /// The wire code for this state.
    pub fn code(&self) -> i32 {
        match self {
            StopState::Open => 0,
            StopState::TemporarilyClosed => 1,
            StopState::Closed => 2,
            StopState::Suspended => 3,
            StopState::Other(code) => *code,
        }
    }

    /// Returns true if predictions at this stop should be trusted.
    pub fn is_open(&self) -> bool {
        matches!(self, StopState::Open)
    }
}

impl fmt::Display for StopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopState::Open => f.write_str("open"),
            StopState::TemporarilyClosed => f.write_str("temporarily closed"),
            StopState::Closed => f.write_str("closed"),
            StopState::Suspended => f.write_str("suspended"),
            StopState::Other(code) => write!(f, "state {code}"),
        }
    }
}

/// A stop point as reported by the feed.
///
/// Every [`Trip`](super::Trip) and [`Message`](super::Message) carries its own
/// copy of the stop it was observed at. Two trips at the same stop hold equal
/// but independent `Stop` values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    /// Stop identifier (`StopID`).
    pub id: String,

    /// Display name (`StopPointName`).
    pub name: String,

    /// Platform or bay label (`StopPointIndicator`). Not every stop has one.
    pub indicator: Option<String>,

    /// Operational state (`StopPointState`).
    pub state: StopState,

    /// WGS84 latitude.
    pub latitude: f64,

    /// WGS84 longitude.
    pub longitude: f64,
}

impl Stop {
    /// Name with the indicator appended, e.g. "Elisenbrunnen (H.1)".
    pub fn display_name(&self) -> String {
        match &self.indicator {
            Some(indicator) if !indicator.is_empty() => format!("{} ({})", self.name, indicator),
            _ => self.name.clone(),
        }
    }
}
