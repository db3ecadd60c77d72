//! SOS alert endpoint handler.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_sos_dispatch;
use domain::models::Contact;
use domain::services::dispatch::DispatchReport;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendSosRequest {
    #[validate(length(min = 1, message = "At least one contact is required"))]
    #[validate(nested)]
    pub contacts: Vec<Contact>,

    #[validate(length(min = 1, message = "Message must not be empty"))]
    pub message: String,
}

/// Fan the SOS message out to every contact. The call succeeds even when
/// every dispatch fails; the aggregate report carries the detail.
///
/// POST /api/v1/sos
pub async fn send_sos(
    State(state): State<AppState>,
    Json(request): Json<SendSosRequest>,
) -> Result<Json<DispatchReport>, ApiError> {
    request.validate()?;

    let limits = &state.config.limits;
    if request.contacts.len() > limits.max_sos_contacts {
        return Err(ApiError::Validation(format!(
            "At most {} contacts per SOS",
            limits.max_sos_contacts
        )));
    }
    if request.message.len() > limits.max_message_length {
        return Err(ApiError::Validation(format!(
            "Message must be at most {} characters",
            limits.max_message_length
        )));
    }

    let report = state.sos.send_sos(&request.contacts, &request.message).await;
    record_sos_dispatch(report.delivered, report.failed, report.skipped);

    if report.has_failures() {
        warn!(
            delivered = report.delivered,
            failed = report.failed,
            skipped = report.skipped,
            "SOS dispatch completed with failures"
        );
    } else {
        info!(
            delivered = report.delivered,
            skipped = report.skipped,
            "SOS dispatch completed"
        );
    }

    Ok(Json(report))
}
