//! Decoding wire records into domain types.
//!
//! Records are positional: the first element selects the record type, the
//! remaining elements are read by index. Most fields must have exactly the
//! expected wire type. A few fields accept several encodings because servers
//! disagree on them:
//!
//! - `DirectionID` arrives as integer, long or numeric string.
//! - `VehicleID` arrives as string, integer, long or null.
//! - `TripID` arrives as string, integer or long.
//!
//! Fields beyond a record's minimum count are ignored so that richer
//! `ReturnList`s from newer servers still decode.

use crate::domain::{Direction, Message, MessageType, Stop, StopState, Trip};

use super::error::DecodeError;
use super::value::WireValue;

/// Minimum number of fields in a stop record.
pub const STOP_FIELDS: usize = 7;

/// Minimum number of fields in a trip record.
pub const TRIP_FIELDS: usize = 16;

/// Minimum number of fields in a message record.
pub const MESSAGE_FIELDS: usize = 11;

/// Minimum number of fields in a version record.
pub const VERSION_FIELDS: usize = 2;

/// Record type, as selected by the leading discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Stop,
    Trip,
    Message,
    Version,
}

impl RecordKind {
    /// Map a discriminator to a record kind. Unknown codes return `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(RecordKind::Stop),
            1 => Some(RecordKind::Trip),
            2 => Some(RecordKind::Message),
            4 => Some(RecordKind::Version),
            _ => None,
        }
    }

    /// The discriminator for this kind.
    pub fn code(&self) -> i32 {
        match self {
            RecordKind::Stop => 0,
            RecordKind::Trip => 1,
            RecordKind::Message => 2,
            RecordKind::Version => 4,
        }
    }

    /// Kind of a raw record, or `None` if it is empty or unrecognised.
    pub fn of(fields: &[WireValue]) -> Option<Self> {
        match fields.first() {
            Some(WireValue::Int(code)) => Self::from_code(*code),
            _ => None,
        }
    }

    /// Minimum field count, discriminator included.
    pub fn min_fields(&self) -> usize {
        match self {
            RecordKind::Stop => STOP_FIELDS,
            RecordKind::Trip => TRIP_FIELDS,
            RecordKind::Message => MESSAGE_FIELDS,
            RecordKind::Version => VERSION_FIELDS,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            RecordKind::Stop => "stop",
            RecordKind::Trip => "trip",
            RecordKind::Message => "message",
            RecordKind::Version => "version",
        }
    }
}

/// A decoded wire record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Stop(Stop),
    Trip(Trip),
    Message(Message),
    /// Schema version announcement. Never forwarded to consumers.
    Version(String),
}

/// Decode one raw record.
///
/// `version` is the latest schema version announced on the same stream, if
/// any. Returns `Ok(None)` for empty records and unknown discriminators.
pub fn decode(fields: &[WireValue], version: Option<&str>) -> Result<Option<Record>, DecodeError> {
    let Some(kind) = RecordKind::of(fields) else {
        return Ok(None);
    };

    let fields = Fields::new(kind, fields)?;

    let record = match kind {
        RecordKind::Stop => Record::Stop(decode_stop(&fields)?),
        RecordKind::Trip => Record::Trip(decode_trip(&fields, version)?),
        RecordKind::Message => Record::Message(decode_message(&fields, version)?),
        RecordKind::Version => Record::Version(fields.version(VERSION)?),
    };

    Ok(Some(record))
}

/// Position and `ReturnList` name of a field.
#[derive(Debug, Clone, Copy)]
struct Field {
    index: usize,
    name: &'static str,
}

const fn field(index: usize, name: &'static str) -> Field {
    Field { index, name }
}

const STOP_NAME: Field = field(1, "StopPointName");
const STOP_ID: Field = field(2, "StopID");
const STOP_INDICATOR: Field = field(3, "StopPointIndicator");
const STOP_STATE: Field = field(4, "StopPointState");
const STOP_LATITUDE: Field = field(5, "Latitude");
const STOP_LONGITUDE: Field = field(6, "Longitude");

const TRIP_VISIT_ID: Field = field(7, "VisitNumber");
const TRIP_LINE_ID: Field = field(8, "LineID");
const TRIP_LINE_NAME: Field = field(9, "LineName");
const TRIP_DIRECTION: Field = field(10, "DirectionID");
const TRIP_DESTINATION_NAME: Field = field(11, "DestinationName");
const TRIP_DESTINATION_TEXT: Field = field(12, "DestinationText");
const TRIP_VEHICLE_ID: Field = field(13, "VehicleID");
const TRIP_ID: Field = field(14, "TripID");
const TRIP_ESTIMATED_TIME: Field = field(15, "EstimatedTime");

const MESSAGE_UUID: Field = field(7, "MessageUUID");
const MESSAGE_TYPE: Field = field(8, "MessageType");
const MESSAGE_PRIORITY: Field = field(9, "MessagePriority");
const MESSAGE_TEXT: Field = field(10, "MessageText");

const VERSION: Field = field(1, "URAVersion");

fn decode_stop(fields: &Fields<'_>) -> Result<Stop, DecodeError> {
    Ok(Stop {
        name: fields.string(STOP_NAME)?,
        id: fields.string(STOP_ID)?,
        indicator: fields.optional_string(STOP_INDICATOR)?,
        state: StopState::from_code(fields.int(STOP_STATE)?),
        latitude: fields.float(STOP_LATITUDE)?,
        longitude: fields.float(STOP_LONGITUDE)?,
    })
}

// The version hint is not consulted yet; every known schema version shares
// the same trip layout.
fn decode_trip(fields: &Fields<'_>, _version: Option<&str>) -> Result<Trip, DecodeError> {
    Ok(Trip {
        stop: decode_stop(fields)?,
        visit_id: fields.int(TRIP_VISIT_ID)?,
        line_id: fields.string(TRIP_LINE_ID)?,
        line_name: fields.string(TRIP_LINE_NAME)?,
        direction: fields.direction(TRIP_DIRECTION)?,
        destination_name: fields.string(TRIP_DESTINATION_NAME)?,
        destination_text: fields.string(TRIP_DESTINATION_TEXT)?,
        vehicle_id: fields.optional_integral_string(TRIP_VEHICLE_ID)?,
        id: fields.integral_string(TRIP_ID)?,
        estimated_time: fields.long(TRIP_ESTIMATED_TIME)?,
    })
}

fn decode_message(fields: &Fields<'_>, _version: Option<&str>) -> Result<Message, DecodeError> {
    Ok(Message {
        stop: decode_stop(fields)?,
        uuid: fields.string(MESSAGE_UUID)?,
        message_type: MessageType::from_code(fields.int(MESSAGE_TYPE)?),
        priority: fields.int(MESSAGE_PRIORITY)?,
        text: fields.string(MESSAGE_TEXT)?,
    })
}

/// A raw record whose length has been checked against its kind.
struct Fields<'a> {
    raw: &'a [WireValue],
}

impl<'a> Fields<'a> {
    fn new(kind: RecordKind, raw: &'a [WireValue]) -> Result<Self, DecodeError> {
        let expected = kind.min_fields();
        if raw.len() < expected {
            return Err(DecodeError::MalformedRecord {
                record: kind.name(),
                expected,
                actual: raw.len(),
            });
        }
        Ok(Self { raw })
    }

    fn get(&self, field: Field) -> &'a WireValue {
        // Every field index is below the minimum count checked in `new`.
        &self.raw[field.index]
    }

    fn mismatch(&self, field: Field, expected: &'static str) -> DecodeError {
        DecodeError::FieldTypeMismatch {
            field: field.index,
            name: field.name,
            expected,
            actual: self.get(field).wire_type(),
        }
    }

    fn string(&self, field: Field) -> Result<String, DecodeError> {
        match self.get(field) {
            WireValue::Str(s) => Ok(s.clone()),
            _ => Err(self.mismatch(field, "string")),
        }
    }

    fn optional_string(&self, field: Field) -> Result<Option<String>, DecodeError> {
        match self.get(field) {
            WireValue::Str(s) => Ok(Some(s.clone())),
            WireValue::Null => Ok(None),
            _ => Err(self.mismatch(field, "string or null")),
        }
    }

    fn int(&self, field: Field) -> Result<i32, DecodeError> {
        match self.get(field) {
            WireValue::Int(i) => Ok(*i),
            _ => Err(self.mismatch(field, "integer")),
        }
    }

    fn long(&self, field: Field) -> Result<i64, DecodeError> {
        match self.get(field) {
            WireValue::Int(i) => Ok(i64::from(*i)),
            WireValue::Long(l) => Ok(*l),
            _ => Err(self.mismatch(field, "long")),
        }
    }

    fn float(&self, field: Field) -> Result<f64, DecodeError> {
        match self.get(field) {
            WireValue::Float(f) => Ok(*f),
            _ => Err(self.mismatch(field, "float")),
        }
    }

    fn integral_string(&self, field: Field) -> Result<String, DecodeError> {
        match self.get(field) {
            WireValue::Str(s) => Ok(s.clone()),
            WireValue::Int(i) => Ok(i.to_string()),
            WireValue::Long(l) => Ok(l.to_string()),
            _ => Err(self.mismatch(field, "string, integer or long")),
        }
    }

    fn optional_integral_string(&self, field: Field) -> Result<Option<String>, DecodeError> {
        match self.get(field) {
            WireValue::Null => Ok(None),
            WireValue::Str(s) => Ok(Some(s.clone())),
            WireValue::Int(i) => Ok(Some(i.to_string())),
            WireValue::Long(l) => Ok(Some(l.to_string())),
            _ => Err(self.mismatch(field, "string, integer, long or null")),
        }
    }

    fn direction(&self, field: Field) -> Result<Direction, DecodeError> {
        const EXPECTED: &str = "integer, long or numeric string";

        let code = match self.get(field) {
            WireValue::Int(i) => i64::from(*i),
            WireValue::Long(l) => *l,
            WireValue::Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| self.mismatch(field, EXPECTED))?,
            _ => return Err(self.mismatch(field, EXPECTED)),
        };

        Direction::new(code).map_err(|_| DecodeError::FieldRangeError {
            field: field.index,
            name: field.name,
            value: code,
            min: Direction::MIN,
            max: Direction::MAX,
        })
    }

    fn version(&self, field: Field) -> Result<String, DecodeError> {
        match self.get(field) {
            WireValue::Str(s) => Ok(s.clone()),
            WireValue::Int(i) => Ok(i.to_string()),
            WireValue::Long(l) => Ok(l.to_string()),
            WireValue::Float(f) => Ok(format!("{f:?}")),
            _ => Err(self.mismatch(field, "string or number")),
        }
    }
}
