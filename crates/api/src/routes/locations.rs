//! Device location endpoint handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_geofence_transition;
use domain::models::location::{LocationResponse, UpdateLocationRequest};
use domain::models::DeviceLocation;

/// Response for a successful location update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationResponse {
    pub status: String,
    pub location: DeviceLocation,
}

/// Update a device's last-known location (last-write-wins).
///
/// POST /api/v1/devices/:device_id/location
pub async fn update_location(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(request): Json<UpdateLocationRequest>,
) -> Result<Json<UpdateLocationResponse>, ApiError> {
    let (latitude, longitude) = request.coordinates().map_err(ApiError::Validation)?;

    let (location, previous) = state.locations.update(&device_id, latitude, longitude).await;

    info!(
        device_id = %device_id,
        latitude = latitude,
        longitude = longitude,
        "Location updated"
    );

    // Re-evaluate the owner's fences in the background when the update
    // names one. Failures here never fail the update.
    if let Some(user_id) = request.user_id {
        spawn_transition_check(state, user_id, device_id, previous, location.clone());
    }

    Ok(Json(UpdateLocationResponse {
        status: "location updated".to_string(),
        location,
    }))
}

/// Current last-known location; null when the device has never reported.
///
/// GET /api/v1/devices/:device_id/location
pub async fn current_location(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Json<LocationResponse> {
    let location = state.locations.current(&device_id).await;
    Json(LocationResponse { location })
}

/// Detects entered/exited transitions between the previous and new
/// location against the user's active fences, in a spawned task.
fn spawn_transition_check(
    state: AppState,
    user_id: String,
    device_id: String,
    previous: Option<DeviceLocation>,
    current: DeviceLocation,
) {
    tokio::spawn(async move {
        let before = match &previous {
            Some(prev) => {
                state
                    .geofences
                    .evaluate(&user_id, prev.latitude, prev.longitude)
                    .await
            }
            None => Vec::new(),
        };
        let after = state
            .geofences
            .evaluate(&user_id, current.latitude, current.longitude)
            .await;

        for result in &after {
            let was_inside = before
                .iter()
                .find(|b| b.geofence.id == result.geofence.id)
                .map(|b| b.is_inside);

            match (was_inside, result.is_inside) {
                (Some(false) | None, true) => {
                    record_geofence_transition("entered");
                    info!(
                        device_id = %device_id,
                        geofence_id = %result.geofence.id,
                        geofence = %result.geofence.name,
                        "Device entered geofence"
                    );
                }
                (Some(true), false) => {
                    record_geofence_transition("exited");
                    warn!(
                        device_id = %device_id,
                        geofence_id = %result.geofence.id,
                        geofence = %result.geofence.name,
                        "Device exited geofence"
                    );
                }
                _ => {}
            }
        }
    });
}
