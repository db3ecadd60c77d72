//! Anti-theft command endpoint handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::{CommandState, DeviceCommandState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRequest {
    pub pin: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WipeRequest {
    pub confirmation_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub message: String,
    pub state: CommandState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WipeRequestResponse {
    pub message: String,
    pub state: CommandState,
    /// Returned exactly once; only its digest is stored.
    pub confirmation_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaySoundResponse {
    pub message: String,
    pub acknowledged: bool,
}

fn command_response(message: &str, state: &DeviceCommandState) -> CommandResponse {
    CommandResponse {
        message: message.to_string(),
        state: state.state,
    }
}

/// Lock the device. The pin is opaque; only presence is required here.
///
/// POST /api/v1/devices/:device_id/lock
pub async fn lock(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(request): Json<LockRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let pin = request.pin.unwrap_or_default();
    let new_state = state.device_control.lock(&device_id, &pin).await?;
    Ok(Json(command_response("Device locked successfully", &new_state)))
}

/// Wipe the device, gated on the confirmation code.
///
/// POST /api/v1/devices/:device_id/wipe
pub async fn wipe(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(request): Json<WipeRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let code = request
        .confirmation_code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation("Confirmation code is required".to_string()))?;

    let new_state = state.device_control.wipe(&device_id, &code).await?;
    Ok(Json(command_response("Device wiped successfully", &new_state)))
}

/// Remote wipe: distinct entry point for the theft-report flow, same
/// guard and resulting state as wipe.
///
/// POST /api/v1/devices/:device_id/remote-wipe
pub async fn remote_wipe(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(request): Json<WipeRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let code = request
        .confirmation_code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation("Confirmation code is required".to_string()))?;

    let new_state = state.device_control.remote_wipe(&device_id, &code).await?;
    Ok(Json(command_response("Remote wipe initiated", &new_state)))
}

/// Request a wipe: issues a fresh confirmation code for a later confirm.
///
/// POST /api/v1/devices/:device_id/wipe-request
pub async fn request_wipe(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<WipeRequestResponse>, ApiError> {
    let (new_state, code) = state.device_control.request_wipe(&device_id).await?;
    Ok(Json(WipeRequestResponse {
        message: "Wipe requested; confirm with the issued code".to_string(),
        state: new_state.state,
        confirmation_code: code,
    }))
}

/// Trigger the audible alarm. State is unchanged; reports whether the
/// device acknowledged.
///
/// POST /api/v1/devices/:device_id/play-sound
pub async fn play_sound(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<PlaySoundResponse>, ApiError> {
    let acknowledged = state.device_control.play_sound(&device_id).await?;
    Ok(Json(PlaySoundResponse {
        message: if acknowledged {
            "Alarm sound played successfully".to_string()
        } else {
            "Alarm sound sent, device did not acknowledge".to_string()
        },
        acknowledged,
    }))
}

/// Current command state; Unlocked for devices never commanded.
///
/// GET /api/v1/devices/:device_id/state
pub async fn current_state(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Json<DeviceCommandState> {
    Json(state.device_control.current_state(&device_id).await)
}
