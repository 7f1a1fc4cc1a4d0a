//! Operation records as returned by the upstream row store.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One vehicle operation record.
///
/// Only `car_cc`, `operation_no`, `operation_date` and `total_distance` take
/// part in filtering and aggregation; the remaining fields pass through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DtakoRow {
    pub id: String,
    pub operation_no: String,
    pub car_cc: String,
    #[serde(default)]
    pub driver_cd: String,
    pub operation_date: String,
    #[serde(default)]
    pub total_distance: f64,

    // pass-through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_used: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_date: Option<String>,
}

impl DtakoRow {
    /// Calendar date of the operation, or `None` when the stored value is malformed.
    pub fn operation_day(&self) -> Option<NaiveDate> {
        parse_row_date(&self.operation_date)
    }
}

/// Parses an in-row date and truncates it to its calendar date.
///
/// Accepts RFC 3339 timestamps (the date is taken in the timestamp's own
/// offset), naive `YYYY-MM-DDTHH:MM:SS` timestamps and bare `YYYY-MM-DD`.
pub fn parse_row_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parses a caller-supplied `YYYY-MM-DD` boundary.
pub fn parse_boundary_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse_row_date("2024-01-05"), Some(expected));
        assert_eq!(parse_row_date("2024-01-05T08:30:00Z"), Some(expected));
        assert_eq!(parse_row_date("2024-01-05T23:30:00+09:00"), Some(expected));
        assert_eq!(parse_row_date("2024-01-05T08:30:00"), Some(expected));
    }

    #[test]
    fn test_parse_row_date_keeps_offset_local_day() {
        // 2024-01-05T15:30Z in UTC
        assert_eq!(
            parse_row_date("2024-01-06T00:30:00+09:00"),
            NaiveDate::from_ymd_opt(2024, 1, 6)
        );
    }

    #[test]
    fn test_parse_row_date_rejects_garbage() {
        assert_eq!(parse_row_date(""), None);
        assert_eq!(parse_row_date("05/01/2024"), None);
        assert_eq!(parse_row_date("2024-13-01"), None);
    }

    #[test]
    fn test_deserialize_with_missing_optional_fields() {
        let json = r#"{"id":"r1","operation_no":"op-1","car_cc":"A","operation_date":"2024-01-05"}"#;
        let row: DtakoRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.car_cc, "A");
        assert_eq!(row.total_distance, 0.0);
        assert!(row.fuel_used.is_none());
    }

    #[test]
    fn test_boundary_date_is_strict() {
        assert!(parse_boundary_date("2024-02-29").is_ok());
        assert!(parse_boundary_date("2024-02-30").is_err());
        assert!(parse_boundary_date("2024-01-05T00:00:00Z").is_err());
    }
}
