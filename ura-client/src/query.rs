//! Request filters.
//!
//! A [`Query`] selects which records the server returns. Filters with
//! multiple values are OR-ed by the server; different filters are AND-ed.

use reqwest::Url;

use crate::domain::Direction;

/// `ReturnList` field names for stop records.
pub const STOP_RETURN_LIST: &[&str] = &[
    "StopPointName",
    "StopID",
    "StopPointIndicator",
    "StopPointState",
    "Latitude",
    "Longitude",
];

/// `ReturnList` field names for trip records.
pub const TRIP_RETURN_LIST: &[&str] = &[
    "StopPointName",
    "StopID",
    "StopPointIndicator",
    "StopPointState",
    "Latitude",
    "Longitude",
    "VisitNumber",
    "LineID",
    "LineName",
    "DirectionID",
    "DestinationName",
    "DestinationText",
    "VehicleID",
    "TripID",
    "EstimatedTime",
];

/// `ReturnList` field names for message records.
pub const MESSAGE_RETURN_LIST: &[&str] = &[
    "StopPointName",
    "StopID",
    "StopPointIndicator",
    "StopPointState",
    "Latitude",
    "Longitude",
    "MessageUUID",
    "MessageType",
    "MessagePriority",
    "MessageText",
];

/// Area filter: everything within `radius` metres of a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: u32,
}

/// Filters for instant and stream requests.
///
/// # Examples
///
/// ```
/// use ura_client::Query;
///
/// let query = Query::new()
///     .for_stops(["100000", "100001"])
///     .for_lines(["33"])
///     .with_limit(10);
///
/// assert_eq!(query.limit(), Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    stop_ids: Vec<String>,
    stop_names: Vec<String>,
    line_ids: Vec<String>,
    line_names: Vec<String>,
    direction: Option<Direction>,
    destination_names: Vec<String>,
    towards: Vec<String>,
    circle: Option<Circle>,
    limit: Option<usize>,
}

fn collect<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl Query {
    /// An unfiltered query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given stop IDs.
    pub fn for_stops<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_ids = collect(ids);
        self
    }

    /// Restrict to stops with the given names.
    pub fn for_stop_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_names = collect(names);
        self
    }

    /// Restrict to the given line IDs.
    pub fn for_lines<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.line_ids = collect(ids);
        self
    }

    /// Restrict to the given public line names.
    pub fn for_line_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.line_names = collect(names);
        self
    }

    /// Restrict to one direction of travel.
    pub fn for_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Restrict to trips with the given destination names.
    pub fn for_destination_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.destination_names = collect(names);
        self
    }

    /// Restrict to trips heading towards the given places.
    pub fn towards<I, S>(mut self, places: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.towards = collect(places);
        self
    }

    /// Restrict to stops within `radius` metres of a point.
    pub fn within(mut self, latitude: f64, longitude: f64, radius: u32) -> Self {
        self.circle = Some(Circle {
            latitude,
            longitude,
            radius,
        });
        self
    }

    /// Return at most `limit` records from instant requests.
    ///
    /// Applied client-side; streams are unbounded and ignore it.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The result limit, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Append `ReturnList` and all filters to `url`.
    pub(crate) fn apply(&self, url: &mut Url, return_list: &[&str]) {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("ReturnList", &return_list.join(","));

        let lists = [
            ("StopID", &self.stop_ids),
            ("StopPointName", &self.stop_names),
            ("LineID", &self.line_ids),
            ("LineName", &self.line_names),
            ("DestinationName", &self.destination_names),
            ("Towards", &self.towards),
        ];
        for (name, values) in lists {
            if !values.is_empty() {
                pairs.append_pair(name, &values.join(","));
            }
        }

        if let Some(direction) = self.direction {
            pairs.append_pair("DirectionID", &direction.code().to_string());
        }
        if let Some(circle) = self.circle {
            pairs.append_pair(
                "Circle",
                &format!("{},{},{}", circle.latitude, circle.longitude, circle.radius),
            );
        }
    }
}
