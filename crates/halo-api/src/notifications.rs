use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, info, warn};

use halo_relay::SendOutcome;
use halo_types::api::{AlertReceipt, SendAlertRequest, SendNotificationRequest};

use crate::auth::{AppState, required};
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// POST /api/notify/send: queue a notification for a recipient.
///
/// Unauthenticated: devices post here by email alone. A send that repeats a
/// pending (sender, type) pair still returns 200.
pub async fn send_notification(
    State(state): State<AppState>,
    payload: Result<Json<SendNotificationRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;

    let kind = required(req.notification_type)
        .ok_or_else(|| ApiError::validation("Missing notification_type"))?;
    let recipient = required(req.recipient_email).unwrap_or_default();
    let sender = required(req.sender_email).unwrap_or_default();

    match state.mailbox.send(&recipient, &sender, &kind).await? {
        SendOutcome::Queued => info!("Queued {} from {} for {}", kind, sender, recipient),
        SendOutcome::Duplicate => {
            warn!("Skipped duplicate {} from {} for {}", kind, sender, recipient)
        }
    }

    Ok(StatusCode::OK)
}

/// GET /api/notifications/check: pop the caller's oldest notification,
/// or `{}` when nothing is pending.
pub async fn check_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    match state.mailbox.poll(&user.email).await {
        Some(notification) => {
            debug!("Delivering {} to {}", notification.kind, user.email);
            Json(notification).into_response()
        }
        None => Json(json!({})).into_response(),
    }
}

/// POST /api/alert/send: accepted and echoed back. There is no push
/// transport behind it yet.
pub async fn send_alert(
    payload: Result<Json<SendAlertRequest>, JsonRejection>,
) -> Result<Json<AlertReceipt>, ApiError> {
    let Json(req) = payload?;

    let (Some(recipient_email), Some(sender_email), Some(alert_type)) = (
        required(req.recipient_email),
        required(req.sender_email),
        required(req.alert_type),
    ) else {
        return Err(ApiError::validation(
            "Missing recipient_email, sender_email or alert_type",
        ));
    };

    info!(
        "Alert {} from {} for {} received (no push transport configured)",
        alert_type, sender_email, recipient_email
    );

    Ok(Json(AlertReceipt {
        status: "received".into(),
        recipient_email,
        sender_email,
        alert_type,
    }))
}
