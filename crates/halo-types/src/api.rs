use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{MonitorReading, Role};

// -- JWT Claims --

/// JWT claims. `sub` is the decimal user id; `iat`/`exp` are unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// -- Auth --

// Request fields are optional so a missing field is reported as 400 by the
// handler instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: Option<Role>,
    pub partner: Option<String>,
    pub token: String,
}

// -- Users --

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `role` distinguishes an absent key (outer `None`) from an explicit
/// `null` (`Some(None)`), which clears the role like `"none"` does.
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    #[serde(default, deserialize_with = "present")]
    pub role: Option<Option<String>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct LinkGuardianRequest {
    pub guardian_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianSummary {
    pub name: String,
    pub email: String,
}

// -- Notifications --

#[derive(Debug, Deserialize)]
pub struct SendNotificationRequest {
    pub recipient_email: Option<String>,
    pub sender_email: Option<String>,
    pub notification_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendAlertRequest {
    pub recipient_email: Option<String>,
    pub sender_email: Option<String>,
    pub alert_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AlertReceipt {
    pub status: String,
    pub recipient_email: String,
    pub sender_email: String,
    pub alert_type: String,
}

// -- Monitor --

#[derive(Debug, Deserialize)]
pub struct MonitorDataRequest {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// Current monitor state; every field is null until the first report.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MonitorCurrentResponse {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub timestamp: Option<String>,
}

impl From<Option<MonitorReading>> for MonitorCurrentResponse {
    fn from(reading: Option<MonitorReading>) -> Self {
        match reading {
            Some(r) => Self {
                temperature: Some(r.temperature),
                humidity: Some(r.humidity),
                timestamp: Some(format_timestamp(r.timestamp)),
            },
            None => Self::default(),
        }
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
