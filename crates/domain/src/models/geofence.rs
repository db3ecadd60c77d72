//! Geofence domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Sentinel device id used when a geofence is not bound to a specific device.
pub const DEFAULT_DEVICE_ID: &str = "default";

/// A circular zone (center + radius) owned by a user, evaluated for
/// containment of a device location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geofence {
    pub id: Uuid,
    pub user_id: String,
    pub device_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Default device id for new geofences.
fn default_device_id() -> String {
    DEFAULT_DEVICE_ID.to_string()
}

/// Default active status for new geofences.
fn default_active() -> bool {
    true
}

/// Request payload for creating a geofence.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGeofenceRequest {
    #[validate(length(min = 1, max = 100, message = "User id must be 1-100 characters"))]
    pub user_id: String,

    #[serde(default = "default_device_id")]
    #[validate(length(min = 1, max = 100, message = "Device id must be 1-100 characters"))]
    pub device_id: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    #[serde(rename = "radius")]
    #[validate(custom(function = "shared::validation::validate_radius"))]
    pub radius_meters: f64,

    #[serde(default = "default_active")]
    pub active: bool,
}

/// Query parameters for listing geofences.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGeofencesQuery {
    pub device_id: Option<String>,
}

/// Request payload for evaluating a probe location against a user's fences.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateGeofencesRequest {
    #[validate(length(min = 1, max = 100, message = "User id must be 1-100 characters"))]
    pub user_id: String,

    #[serde(default = "default_device_id")]
    pub device_id: String,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,
}

/// Containment verdict for one fence against one probe point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceEvaluation {
    pub geofence: Geofence,
    pub is_inside: bool,
}

/// Response for listing geofences.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGeofencesResponse {
    pub geofences: Vec<Geofence>,
    pub total: usize,
}

/// Response for geofence evaluation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateGeofencesResponse {
    pub results: Vec<GeofenceEvaluation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn valid_request() -> CreateGeofenceRequest {
        CreateGeofenceRequest {
            user_id: "user-1".to_string(),
            device_id: DEFAULT_DEVICE_ID.to_string(),
            name: "Home".to_string(),
            latitude: 37.7749,
            longitude: -122.4194,
            radius_meters: 100.0,
            active: true,
        }
    }

    #[test]
    fn test_create_geofence_request_deserialization_defaults() {
        let json = r#"{
            "userId": "user-1",
            "name": "Home",
            "latitude": 37.7749,
            "longitude": -122.4194,
            "radius": 100.0
        }"#;

        let request: CreateGeofenceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.user_id, "user-1");
        assert_eq!(request.device_id, DEFAULT_DEVICE_ID);
        assert_eq!(request.radius_meters, 100.0);
        assert!(request.active);
    }

    #[test]
    fn test_create_geofence_request_valid() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_create_geofence_request_rejects_bad_latitude() {
        let mut request = valid_request();
        request.latitude = 91.0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_geofence_request_rejects_bad_longitude() {
        let mut request = valid_request();
        request.longitude = -181.0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_geofence_request_rejects_non_positive_radius() {
        let mut request = valid_request();
        request.radius_meters = 0.0;
        assert!(request.validate().is_err());
        request.radius_meters = -5.0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_geofence_serialization_camel_case() {
        let fence = Geofence {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            device_id: DEFAULT_DEVICE_ID.to_string(),
            name: "Office".to_string(),
            latitude: 40.7128,
            longitude: -74.0060,
            radius_meters: 250.0,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&fence).unwrap();
        assert!(json.contains("\"userId\":\"user-1\""));
        assert!(json.contains("\"radiusMeters\":250"));
        assert!(json.contains("\"deviceId\":\"default\""));
    }

    #[test]
    fn test_evaluate_request_default_device() {
        let json = r#"{"userId": "user-1", "latitude": 1.0, "longitude": 2.0}"#;
        let request: EvaluateGeofencesRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.device_id, DEFAULT_DEVICE_ID);
    }
}
