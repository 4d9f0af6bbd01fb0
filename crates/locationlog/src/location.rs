//! Core location types for locationlog.
//!
//! This module defines the record persisted by the store and the payload
//! accepted by the create endpoint.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A single persisted GPS reading.
///
/// `id` and `timestamp` are assigned by the store at insertion and never
/// change afterwards. Serializes to
/// `{"ID": .., "Latitude": .., "Longitude": .., "Timestamp": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Store-assigned identity, strictly increasing with insertion order.
    #[serde(rename = "ID")]
    pub id: i64,

    /// Latitude in degrees. Not range checked.
    #[serde(rename = "Latitude")]
    pub latitude: f64,

    /// Longitude in degrees. Not range checked.
    #[serde(rename = "Longitude")]
    pub longitude: f64,

    /// When the store accepted this record.
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Coordinates submitted by a client.
///
/// Field names match case-insensitively, so `Latitude`, `latitude` and
/// `LATITUDE` are the same field. A missing or `null` field stays `0.0`,
/// and when a field repeats the last value wins. Unknown fields, including
/// any client-supplied identity or timestamp, are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NewLocation {
    /// Latitude in degrees.
    pub latitude: f64,

    /// Longitude in degrees.
    pub longitude: f64,
}

impl<'de> Deserialize<'de> for NewLocation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NewLocationVisitor)
    }
}

struct NewLocationVisitor;

impl<'de> Visitor<'de> for NewLocationVisitor {
    type Value = NewLocation;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an object with Latitude and Longitude")
    }

    // A bare `null` body decodes to the zero location.
    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(NewLocation::default())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut location = NewLocation::default();

        while let Some(key) = map.next_key::<String>()? {
            let slot = if key.eq_ignore_ascii_case("latitude") {
                &mut location.latitude
            } else if key.eq_ignore_ascii_case("longitude") {
                &mut location.longitude
            } else {
                map.next_value::<IgnoredAny>()?;
                continue;
            };

            if let Some(value) = map.next_value::<Option<f64>>()? {
                *slot = value;
            }
        }

        Ok(location)
    }
}

impl NewLocation {
    /// Create a new location payload.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_with_wire_names() {
        let record = LocationRecord {
            id: 7,
            latitude: 13.7563,
            longitude: 100.5018,
            timestamp: Utc::now(),
        };
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();

        assert_eq!(json["ID"], 7);
        assert_eq!(json["Latitude"], 13.7563);
        assert_eq!(json["Longitude"], 100.5018);
        let ts = json["Timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn test_new_location_accepts_pascal_case() {
        let loc: NewLocation =
            serde_json::from_str(r#"{"Latitude": 13.7563, "Longitude": 100.5018}"#).unwrap();
        assert_eq!(loc, NewLocation::new(13.7563, 100.5018));
    }

    #[test]
    fn test_new_location_accepts_lowercase() {
        let loc: NewLocation =
            serde_json::from_str(r#"{"latitude": -33.8688, "longitude": 151.2093}"#).unwrap();
        assert_eq!(loc, NewLocation::new(-33.8688, 151.2093));
    }

    #[test]
    fn test_new_location_ignores_identity_and_unknown_fields() {
        let loc: NewLocation = serde_json::from_str(
            r#"{"ID": 99, "Timestamp": "2020-01-01T00:00:00Z", "Latitude": 1.5, "Longitude": 2.5, "accuracy": 10}"#,
        )
        .unwrap();
        assert_eq!(loc, NewLocation::new(1.5, 2.5));
    }

    #[test]
    fn test_new_location_matches_field_names_in_any_case() {
        let loc: NewLocation =
            serde_json::from_str(r#"{"LATITUDE": 1.5, "lOnGiTuDe": 2.5}"#).unwrap();
        assert_eq!(loc, NewLocation::new(1.5, 2.5));
    }

    #[test]
    fn test_new_location_missing_fields_are_zero() {
        let loc: NewLocation = serde_json::from_str(r#"{"Latitude": 1.0}"#).unwrap();
        assert_eq!(loc, NewLocation::new(1.0, 0.0));

        let loc: NewLocation = serde_json::from_str("{}").unwrap();
        assert_eq!(loc, NewLocation::default());
    }

    #[test]
    fn test_new_location_null_leaves_zero() {
        let loc: NewLocation =
            serde_json::from_str(r#"{"Latitude": null, "Longitude": 4.0}"#).unwrap();
        assert_eq!(loc, NewLocation::new(0.0, 4.0));

        let loc: NewLocation = serde_json::from_str("null").unwrap();
        assert_eq!(loc, NewLocation::default());
    }

    #[test]
    fn test_new_location_last_duplicate_wins() {
        let loc: NewLocation =
            serde_json::from_str(r#"{"Latitude": 1.0, "latitude": 2.0, "Longitude": 3.0}"#)
                .unwrap();
        assert_eq!(loc, NewLocation::new(2.0, 3.0));
    }

    #[test]
    fn test_new_location_rejects_non_object() {
        assert!(serde_json::from_str::<NewLocation>("[1.0, 2.0]").is_err());
        assert!(serde_json::from_str::<NewLocation>("42").is_err());
        assert!(serde_json::from_str::<NewLocation>(r#""north""#).is_err());
    }

    #[test]
    fn test_new_location_rejects_non_numeric() {
        let result = serde_json::from_str::<NewLocation>(r#"{"Latitude": "north", "Longitude": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let record = LocationRecord {
            id: 1,
            latitude: -0.0001,
            longitude: 179.9999,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: LocationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
