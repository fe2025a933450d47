use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::debug;

use halo_types::api::{MessageResponse, MonitorCurrentResponse, MonitorDataRequest};

use crate::auth::AppState;
use crate::error::ApiError;

/// PUT /api/monitor/data: the room sensor reports its latest sample.
pub async fn put_data(
    State(state): State<AppState>,
    payload: Result<Json<MonitorDataRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;

    let (Some(temperature), Some(humidity)) = (req.temperature, req.humidity) else {
        return Err(ApiError::validation("Missing temperature or humidity"));
    };

    let reading = state.monitor.report(temperature, humidity).await;
    debug!(
        "Monitor reading: {:.2}C {:.2}% at {}",
        reading.temperature, reading.humidity, reading.timestamp
    );

    Ok(Json(MessageResponse::new("Monitoring data updated")))
}

/// GET /api/monitor/current
pub async fn current(State(state): State<AppState>) -> Json<MonitorCurrentResponse> {
    Json(state.monitor.current().await.into())
}

/// GET /api/monitor/up: liveness probe used by the sensor before reporting.
pub async fn up() -> StatusCode {
    StatusCode::OK
}

pub async fn index() -> &'static str {
    "Halo API server is running"
}
