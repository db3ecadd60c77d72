//! Device location domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Last-known location of a device.
///
/// Exactly one current value per device; every accepted update overwrites
/// the previous one (last-write-wins). No history is retained here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceLocation {
    pub device_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub last_updated: DateTime<Utc>,
}

/// Request payload for a location update.
///
/// Coordinates are optional at the wire level so that a missing field is
/// reported as a validation error rather than a deserialization failure,
/// matching the contract that a location without both coordinates is
/// rejected before storage.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Owning user, when known. Enables geofence re-evaluation after the
    /// update; omitting it skips the evaluation hook.
    pub user_id: Option<String>,
}

impl UpdateLocationRequest {
    /// Extracts validated coordinates, rejecting absent or out-of-range
    /// values.
    pub fn coordinates(&self) -> Result<(f64, f64), String> {
        let latitude = self
            .latitude
            .ok_or_else(|| "Latitude and longitude are required".to_string())?;
        let longitude = self
            .longitude
            .ok_or_else(|| "Latitude and longitude are required".to_string())?;

        shared::validation::validate_latitude(latitude)
            .map_err(|e| e.message.map(|m| m.to_string()).unwrap_or_default())?;
        shared::validation::validate_longitude(longitude)
            .map_err(|e| e.message.map(|m| m.to_string()).unwrap_or_default())?;

        Ok((latitude, longitude))
    }
}

/// Response for location reads. `location` is null when the device has
/// never reported a position; callers treat absence as a first-class
/// outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponse {
    pub location: Option<DeviceLocation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_present() {
        let request = UpdateLocationRequest {
            latitude: Some(37.0),
            longitude: Some(-122.0),
            user_id: None,
        };
        assert_eq!(request.coordinates().unwrap(), (37.0, -122.0));
    }

    #[test]
    fn test_coordinates_missing_latitude() {
        let request = UpdateLocationRequest {
            latitude: None,
            longitude: Some(-122.0),
            user_id: None,
        };
        let err = request.coordinates().unwrap_err();
        assert_eq!(err, "Latitude and longitude are required");
    }

    #[test]
    fn test_coordinates_missing_longitude() {
        let request = UpdateLocationRequest {
            latitude: Some(37.0),
            longitude: None,
            user_id: None,
        };
        assert!(request.coordinates().is_err());
    }

    #[test]
    fn test_coordinates_out_of_range() {
        let request = UpdateLocationRequest {
            latitude: Some(95.0),
            longitude: Some(-122.0),
            user_id: None,
        };
        assert!(request.coordinates().is_err());

        let request = UpdateLocationRequest {
            latitude: Some(37.0),
            longitude: Some(181.0),
            user_id: None,
        };
        assert!(request.coordinates().is_err());
    }

    #[test]
    fn test_location_response_null_location() {
        let response = LocationResponse { location: None };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"location":null}"#);
    }
}
