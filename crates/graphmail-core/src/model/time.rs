//! Timestamp handling at the command boundary and on the Graph wire.
//!
//! Values crossing the command surface use `YYYY-MM-DD HH:MM:SS`. All
//! timestamps are normalized to UTC and carried as naive date-times.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{Error, Result};

/// Boundary timestamp format (24-hour, zero-padded).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used for OData datetime literals.
const ODATA_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Formats a timestamp for the command boundary.
#[must_use]
pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a boundary timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, the ISO `T` separator, RFC 3339 with an
/// offset (converted to UTC), and a bare `YYYY-MM-DD` (midnight).
///
/// # Errors
///
/// Returns `Error::InvalidInput` if none of the formats match.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT) {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc).naive_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(Error::InvalidInput(format!(
        "unrecognized timestamp '{trimmed}', expected YYYY-MM-DD HH:MM:SS"
    )))
}

/// Returns true if the input is a bare date without a time component.
#[must_use]
pub fn is_date_only(input: &str) -> bool {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").is_ok()
}

/// Parses a datetime as returned by Graph.
///
/// Messages carry RFC 3339 (`2024-01-15T09:30:00Z`); events carry a naive
/// value with fractional seconds (`2024-01-15T09:30:00.0000000`) whose zone
/// is requested as UTC.
#[must_use]
pub fn parse_graph_datetime(input: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc).naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f").ok())
}

/// Formats a datetime as an OData literal (`2024-01-15T09:30:00Z`).
#[must_use]
pub fn odata_datetime(value: &NaiveDateTime) -> String {
    value.format(ODATA_FORMAT).to_string()
}

/// Formats a datetime for a Graph `dateTimeTimeZone` value.
#[must_use]
pub fn graph_local_datetime(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Serde adapter for the boundary timestamp format.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes as `YYYY-MM-DD HH:MM:SS`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    /// Deserializes any format accepted by [`super::parse_timestamp`].
    ///
    /// # Errors
    ///
    /// Returns a deserializer error for unrecognized input.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn test_format_is_zero_padded_24h() {
        assert_eq!(
            format_timestamp(&dt("2024-03-05 07:08:09")),
            "2024-03-05 07:08:09"
        );
        assert_eq!(
            format_timestamp(&dt("2024-12-31 23:59:59")),
            "2024-12-31 23:59:59"
        );
    }

    #[test]
    fn test_parse_accepted_forms() {
        let expected = dt("2024-01-15 09:30:00");
        assert_eq!(parse_timestamp("2024-01-15 09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-15T09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-15T10:30:00+01:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-01-15").unwrap(),
            dt("2024-01-15 00:00:00")
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_timestamp("next tuesday"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_is_date_only() {
        assert!(is_date_only("2024-01-15"));
        assert!(!is_date_only("2024-01-15 00:00:00"));
    }

    #[test]
    fn test_parse_graph_datetime() {
        assert_eq!(
            parse_graph_datetime("2024-01-15T09:30:00Z"),
            Some(dt("2024-01-15 09:30:00"))
        );
        assert_eq!(
            parse_graph_datetime("2024-01-15T09:30:00.0000000"),
            Some(dt("2024-01-15 09:30:00"))
        );
        assert_eq!(parse_graph_datetime("not a date"), None);
    }

    #[test]
    fn test_odata_literal() {
        assert_eq!(
            odata_datetime(&dt("2024-01-15 09:30:00")),
            "2024-01-15T09:30:00Z"
        );
        assert_eq!(
            graph_local_datetime(&dt("2024-01-15 09:30:00")),
            "2024-01-15T09:30:00"
        );
    }
}
