//! Geofence endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::geofence::{
    CreateGeofenceRequest, EvaluateGeofencesRequest, EvaluateGeofencesResponse, Geofence,
    ListGeofencesQuery, ListGeofencesResponse,
};

/// Create a new geofence.
///
/// POST /api/v1/geofences
pub async fn create_geofence(
    State(state): State<AppState>,
    Json(request): Json<CreateGeofenceRequest>,
) -> Result<(StatusCode, Json<Geofence>), ApiError> {
    request.validate()?;

    // Soft cap; two racing creates may both pass, which is acceptable
    // for a limit that is not a security boundary.
    let max = state.config.limits.max_geofences_per_user;
    let count = state.geofences.count_by_user(&request.user_id).await;
    if count >= max {
        return Err(ApiError::Conflict(format!(
            "User has reached maximum geofence limit ({max})"
        )));
    }

    let fence = state
        .geofences
        .create(
            &request.user_id,
            &request.device_id,
            &request.name,
            request.latitude,
            request.longitude,
            request.radius_meters,
            request.active,
        )
        .await;

    info!(
        geofence_id = %fence.id,
        user_id = %fence.user_id,
        device_id = %fence.device_id,
        name = %fence.name,
        "Geofence created"
    );

    Ok((StatusCode::CREATED, Json(fence)))
}

/// List a user's geofences, optionally filtered by device.
///
/// GET /api/v1/geofences/:user_id?deviceId=<id>
pub async fn list_geofences(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListGeofencesQuery>,
) -> Result<Json<ListGeofencesResponse>, ApiError> {
    let geofences = state
        .geofences
        .list(&user_id, query.device_id.as_deref())
        .await;
    let total = geofences.len();

    Ok(Json(ListGeofencesResponse { geofences, total }))
}

/// Delete a geofence, scoped to the owning user.
///
/// DELETE /api/v1/geofences/:user_id/:geofence_id
pub async fn delete_geofence(
    State(state): State<AppState>,
    Path((user_id, geofence_id)): Path<(String, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.geofences.delete(&user_id, geofence_id).await {
        return Err(ApiError::NotFound("Geofence not found".to_string()));
    }

    info!(geofence_id = %geofence_id, user_id = %user_id, "Geofence deleted");
    Ok(Json(json!({ "success": true })))
}

/// Evaluate a probe location against every active fence of a user.
///
/// POST /api/v1/geofences/evaluate
pub async fn evaluate_geofences(
    State(state): State<AppState>,
    Json(request): Json<EvaluateGeofencesRequest>,
) -> Result<Json<EvaluateGeofencesResponse>, ApiError> {
    request.validate()?;

    let results = state
        .geofences
        .evaluate(&request.user_id, request.latitude, request.longitude)
        .await;

    info!(
        user_id = %request.user_id,
        device_id = %request.device_id,
        fences = results.len(),
        inside = results.iter().filter(|r| r.is_inside).count(),
        "Geofences evaluated"
    );

    Ok(Json(EvaluateGeofencesResponse { results }))
}
