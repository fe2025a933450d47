use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{error, info, warn};

use halo_db::Database;
use halo_relay::{Mailbox, MonitorSlot};
use halo_types::api::{LoginRequest, LoginResponse};

use crate::error::ApiError;
use crate::password;
use crate::token::TokenService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
    pub mailbox: Mailbox,
    pub monitor: MonitorSlot,
}

impl AppStateInner {
    pub fn new(db: Database, tokens: TokenService) -> AppState {
        Arc::new(Self {
            db,
            tokens,
            mailbox: Mailbox::new(),
            monitor: MonitorSlot::new(),
        })
    }
}

/// Run a blocking store call off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> halo_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Store("internal error".into())
        })?
        .map_err(ApiError::from)
}

/// Password hashing and verification also run on the blocking pool.
pub(crate) async fn run_hash<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Store("internal error".into())
    })
}

/// Trimmed value of an optional request field, `None` if absent or blank.
pub(crate) fn required(field: Option<String>) -> Option<String> {
    field.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;

    let password = req.password.filter(|p| !p.is_empty());
    let (Some(email), Some(password)) = (required(req.email), password) else {
        return Err(ApiError::validation("Missing email or password"));
    };

    let lookup = email.clone();
    let user = run_db(&state, move |db| db.get_user_by_email(&lookup))
        .await?
        .ok_or_else(|| {
            warn!("Login for unknown account {}", email);
            ApiError::InvalidCredentials
        })?;

    let stored_hash = user.password_hash.clone();
    let matches = run_hash(move || password::verify_password(&stored_hash, &password)).await?;
    if !matches {
        warn!("Failed login for {}", user.email);
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id)?;
    info!("{} ({}) logged in", user.email, user.id);

    Ok(Json(LoginResponse {
        user_id: user.id.to_string(),
        email: user.email,
        name: user.name,
        role: user.role,
        partner: user.partner_email,
        token,
    }))
}
