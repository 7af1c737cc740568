//! Serde helpers for backend timestamp strings
//!
//! The analysis backend emits task timestamps as naive local time in the
//! form `2025-11-03 14:30:45` rather than RFC 3339. These modules plug into
//! `#[serde(with = ...)]` on `NaiveDateTime` fields (required and optional
//! forms).

use chrono::NaiveDateTime;

/// Wire format used by the backend for task timestamps
pub const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a backend timestamp string
pub fn parse(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, WIRE_FORMAT)
}

/// Format a timestamp in the backend's wire form
pub fn format(t: &NaiveDateTime) -> String {
    t.format(WIRE_FORMAT).to_string()
}

/// `#[serde(with = "timefmt::wire")]` for required timestamp fields
pub mod wire {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format(t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse(&s).map_err(de::Error::custom)
    }
}

/// `#[serde(with = "timefmt::wire_opt")]` for optional timestamp fields
pub mod wire_opt {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        t: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => serializer.serialize_some(&super::format(t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        match s {
            Some(s) => super::parse(&s).map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_parse_wire_format() {
        let t = parse("2025-11-03 14:30:45").unwrap();
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2025, 11, 3).unwrap());
        assert_eq!(t.hour(), 14);
        assert_eq!(t.second(), 45);
    }

    #[test]
    fn test_format_round_trip() {
        let t = parse("2024-01-09 00:05:00").unwrap();
        assert_eq!(format(&t), "2024-01-09 00:05:00");
    }

    #[test]
    fn test_parse_rejects_rfc3339() {
        assert!(parse("2025-11-03T14:30:45Z").is_err());
    }

    #[test]
    fn test_optional_field_absent() {
        #[derive(serde::Deserialize)]
        struct Row {
            #[serde(default, with = "wire_opt")]
            end_time: Option<chrono::NaiveDateTime>,
        }

        let row: Row = serde_json::from_str("{}").unwrap();
        assert!(row.end_time.is_none());

        let row: Row = serde_json::from_str(r#"{"end_time": "2025-11-03 14:30:45"}"#).unwrap();
        assert!(row.end_time.is_some());
    }
}
