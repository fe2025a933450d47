use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::{TypedHeaderRejection, TypedHeaderRejectionReason},
};
use tracing::warn;

use halo_db::models::UserRow;
use halo_types::models::Role;

use crate::auth::{AppState, run_db};
use crate::error::ApiError;
use crate::token::TokenError;

/// The caller resolved from a verified token, handed to protected handlers
/// as a request extension.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
    pub partner: Option<String>,
}

impl From<UserRow> for AuthUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            partner: row.partner_email,
        }
    }
}

/// Verify the bearer token and resolve the account it names.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Response {
    match authenticate(&state, bearer).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => {
            warn!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
            e.into_response()
        }
    }
}

async fn authenticate(
    state: &AppState,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
) -> Result<AuthUser, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|rejection| {
        match rejection.reason() {
            TypedHeaderRejectionReason::Missing => TokenError::Missing,
            _ => TokenError::Malformed,
        }
    })?;

    let user_id = state.tokens.verify(bearer.token())?;

    // A token outlives account deletion, so the subject must still exist.
    let user = run_db(state, move |db| db.get_user_by_id(user_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    Ok(user.into())
}
