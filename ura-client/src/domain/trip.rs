//! Trip predictions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Stop;

/// Error returned when a direction code is outside `0..=2`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("direction {0} out of range 0..=2")]
pub struct InvalidDirection(pub i64);

/// Direction of travel along a line.
///
/// URA uses `1` and `2` for the two directions of a route and `0` where the
/// direction is unknown. This type guarantees that any `Direction` is one of
/// those three codes.
///
/// # Examples
///
/// ```
/// use ura_client::domain::Direction;
///
/// assert_eq!(Direction::new(2).unwrap().code(), 2);
/// assert!(Direction::new(3).is_err());
/// assert!(Direction::new(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Direction(u8);

impl Direction {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 2;

    /// Validate a direction code.
    pub fn new(code: i64) -> Result<Self, InvalidDirection> {
        if (Self::MIN..=Self::MAX).contains(&code) {
            Ok(Direction(code as u8))
        } else {
            Err(InvalidDirection(code))
        }
    }

    /// The numeric code.
    pub fn code(&self) -> i32 {
        i32::from(self.0)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single arrival prediction of a vehicle at a stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    /// The stop this prediction applies to.
    pub stop: Stop,

    /// Sequence number of this visit along the trip (`VisitNumber`).
    pub visit_id: i32,

    /// Internal line identifier (`LineID`).
    pub line_id: String,

    /// Public line name (`LineName`).
    pub line_name: String,

    /// Direction of travel (`DirectionID`).
    pub direction: Direction,

    /// Destination name (`DestinationName`).
    pub destination_name: String,

    /// Abbreviated destination as shown on signs (`DestinationText`).
    pub destination_text: String,

    /// Vehicle identifier (`VehicleID`). Some feeds omit it.
    pub vehicle_id: Option<String>,

    /// Trip identifier (`TripID`).
    pub id: String,

    /// Predicted arrival, Unix epoch milliseconds (`EstimatedTime`).
    pub estimated_time: i64,
}

impl Trip {
    /// The predicted arrival as a UTC timestamp.
    ///
    /// Returns `None` if the millisecond value is outside chrono's range.
    pub fn estimated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.estimated_time)
    }
}
