//! Child-lock endpoint handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::safe_apps::{ActivateChildLockRequest, SetSafeAppsRequest};
use domain::models::SafeAppAllowList;

/// Fetch the allow-list for a (user, device) pair.
///
/// GET /api/v1/childlock/safeapps/:user_id/:device_id
pub async fn get_safe_apps(
    State(state): State<AppState>,
    Path((user_id, device_id)): Path<(String, String)>,
) -> Result<Json<SafeAppAllowList>, ApiError> {
    state
        .safe_apps
        .get(&user_id, &device_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No safe app list for this device".to_string()))
}

/// Replace the allow-list for a (user, device) pair.
///
/// POST /api/v1/childlock/safeapps
pub async fn set_safe_apps(
    State(state): State<AppState>,
    Json(request): Json<SetSafeAppsRequest>,
) -> Result<Json<SafeAppAllowList>, ApiError> {
    request.validate()?;

    let list = state
        .safe_apps
        .set(&request.user_id, &request.device_id, request.allowed_apps)
        .await;

    info!(
        user_id = %list.user_id,
        device_id = %list.device_id,
        apps = list.allowed_apps.len(),
        "Safe app list updated"
    );

    Ok(Json(list))
}

/// Activate the child lock. The backend acknowledges; the device
/// enforces the allow-list (absence of a list means default-deny).
///
/// POST /api/v1/childlock/lock
pub async fn activate_lock(
    State(_state): State<AppState>,
    Json(request): Json<ActivateChildLockRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    request.validate()?;

    info!(
        user_id = %request.user_id,
        device_id = request.device_id.as_deref().unwrap_or("default"),
        "Child lock activated"
    );

    Ok(Json(json!({ "success": true })))
}
