//! Untyped wire values.
//!
//! A wire record is a JSON array of mixed scalars. We parse each line into a
//! `Vec<WireValue>` first and only then interpret fields by position, so the
//! decoder can report exactly which field had which unexpected type.

use std::fmt;

use serde_json::Value;

use super::error::DecodeError;

/// One element of a wire record.
///
/// Integers are split by magnitude: values that fit in 32 bits are `Int`,
/// larger ones are `Long`. Feeds rely on this distinction, e.g. epoch
/// millisecond timestamps always arrive as `Long`.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f64),
    Str(String),
    /// Nested arrays, objects and integers beyond `i64`.
    Other,
}

/// The kind of a [`WireValue`], used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Null,
    Bool,
    Int,
    Long,
    Float,
    Str,
    Other,
}

impl WireValue {
    pub fn wire_type(&self) -> WireType {
        match self {
            WireValue::Null => WireType::Null,
            WireValue::Bool(_) => WireType::Bool,
            WireValue::Int(_) => WireType::Int,
            WireValue::Long(_) => WireType::Long,
            WireValue::Float(_) => WireType::Float,
            WireValue::Str(_) => WireType::Str,
            WireValue::Other => WireType::Other,
        }
    }
}

impl WireType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireType::Null => "null",
            WireType::Bool => "boolean",
            WireType::Int => "integer",
            WireType::Long => "long",
            WireType::Float => "float",
            WireType::Str => "string",
            WireType::Other => "other",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Value> for WireValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => WireValue::Null,
            Value::Bool(b) => WireValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    match i32::try_from(i) {
                        Ok(small) => WireValue::Int(small),
                        Err(_) => WireValue::Long(i),
                    }
                } else if n.is_u64() {
                    WireValue::Other
                } else {
                    n.as_f64().map(WireValue::Float).unwrap_or(WireValue::Other)
                }
            }
            Value::String(s) => WireValue::Str(s),
            Value::Array(_) | Value::Object(_) => WireValue::Other,
        }
    }
}

/// Parse one line into its wire values.
///
/// A literal `null` line yields an empty record, which callers skip like any
/// other unrecognised record.
pub fn parse_line(line: &str) -> Result<Vec<WireValue>, DecodeError> {
    let value: Value = serde_json::from_str(line).map_err(|e| DecodeError::InvalidJson {
        message: e.to_string(),
    })?;

    match value {
        Value::Array(items) => Ok(items.into_iter().map(WireValue::from).collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(DecodeError::InvalidJson {
            message: format!(
                "expected array, found {}",
                WireValue::from(other).wire_type()
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_split_by_magnitude() {
        let values = parse_line("[0, 2147483647, 2147483648, -2147483649, 1489568040000]").unwrap();
        assert_eq!(
            values,
            vec![
                WireValue::Int(0),
                WireValue::Int(i32::MAX),
                WireValue::Long(2_147_483_648),
                WireValue::Long(-2_147_483_649),
                WireValue::Long(1_489_568_040_000),
            ]
        );
    }

    #[test]
    fn scalars_map_to_kinds() {
        let values = parse_line(r#"["Bushof", null, 50.77, true, [1], {"a": 1}]"#).unwrap();
        let kinds: Vec<WireType> = values.iter().map(WireValue::wire_type).collect();
        assert_eq!(
            kinds,
            vec![
                WireType::Str,
                WireType::Null,
                WireType::Float,
                WireType::Bool,
                WireType::Other,
                WireType::Other,
            ]
        );
    }

    #[test]
    fn decimal_point_makes_float() {
        assert_eq!(parse_line("[2.0]").unwrap(), vec![WireValue::Float(2.0)]);
    }

    #[test]
    fn huge_unsigned_is_other() {
        assert_eq!(
            parse_line("[18446744073709551615]").unwrap(),
            vec![WireValue::Other]
        );
    }

    #[test]
    fn null_line_is_empty_record() {
        assert!(parse_line("null").unwrap().is_empty());
        assert!(parse_line("[]").unwrap().is_empty());
    }

    #[test]
    fn non_array_is_rejected() {
        let err = parse_line(r#"{"type": 1}"#).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidJson {
                message: "expected array, found other".to_string()
            }
        );
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(
            parse_line("[1, \"unterminated"),
            Err(DecodeError::InvalidJson { .. })
        ));
    }
}
