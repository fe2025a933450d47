use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::info;

use halo_db::DbError;
use halo_db::models::ProfileUpdate;
use halo_db::pairing::RoleChange;
use halo_types::api::{
    ChangeRoleRequest, GuardianSummary, LinkGuardianRequest, MessageResponse,
    UpdateProfileRequest,
};
use halo_types::models::{Role, User};

use crate::auth::{AppState, required, run_db, run_hash};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::password;

/// PUT /api/user/profile: change any of name, email, password.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(req) = payload?;

    if req.name.is_none() && req.email.is_none() && req.password.is_none() {
        return Err(ApiError::validation(
            "At least one of name, email or password is required",
        ));
    }

    let name = req
        .name
        .map(|name| {
            required(Some(name)).ok_or_else(|| ApiError::validation("Name cannot be empty"))
        })
        .transpose()?;
    let email = match req.email {
        Some(email) => {
            let email = email.trim().to_string();
            if !email.contains('@') {
                return Err(ApiError::validation("Invalid email address"));
            }
            Some(email)
        }
        None => None,
    };
    let password_hash = match req.password {
        Some(password) if password.is_empty() => {
            return Err(ApiError::validation("Password cannot be empty"));
        }
        Some(password) => Some(run_hash(move || password::hash_password(&password)).await??),
        None => None,
    };

    let update = ProfileUpdate {
        name,
        email,
        password_hash,
    };
    let id = user.id;
    let updated = run_db(&state, move |db| db.update_profile(id, &update)).await?;

    Ok(Json(updated.to_user()))
}

/// PUT /api/user/type: set the role to guardian, protege or none.
pub async fn change_role(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ChangeRoleRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(req) = payload?;

    let raw = req.role.ok_or_else(|| ApiError::validation("Missing role"))?;
    let role = Role::parse_optional(raw.as_deref())
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let id = user.id;
    let (change, row) = run_db(&state, move |db| {
        let change = db.change_role(id, role)?;
        let row = db.get_user_by_id(id)?.ok_or(DbError::UserNotFound)?;
        Ok((change, row))
    })
    .await?;

    match change {
        RoleChange::Unchanged => info!("{} already has role {:?}", user.email, role),
        RoleChange::Changed {
            previous,
            unlinked: Some(partner),
        } => info!(
            "{} changed role {:?} -> {:?} and was unlinked from {}",
            user.email, previous, role, partner
        ),
        RoleChange::Changed {
            previous,
            unlinked: None,
        } => info!("{} changed role {:?} -> {:?}", user.email, previous, role),
    }

    Ok(Json(row.to_user()))
}

/// POST /api/user/link/guardian: pair the calling protege with a guardian.
pub async fn link_guardian(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<LinkGuardianRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;

    let guardian_email =
        required(req.guardian_email).ok_or_else(|| ApiError::validation("Missing guardian_email"))?;

    let protege_email = user.email.clone();
    let target = guardian_email.clone();
    run_db(&state, move |db| db.link_users(&protege_email, &target)).await?;

    Ok(Json(MessageResponse::new(format!(
        "Successfully linked with guardian {}",
        guardian_email
    ))))
}

/// POST /api/user/unlink: remove the caller's pairing, if any.
pub async fn unlink(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = user.email.clone();
    let former = run_db(&state, move |db| db.unlink_user(&email)).await?;

    let message = match former {
        Some(partner) => format!("Successfully unlinked from {}", partner),
        None => "No link to remove".to_string(),
    };
    Ok(Json(MessageResponse::new(message)))
}

/// GET /api/guardians/available: unpaired guardians by name.
pub async fn available_guardians(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Vec<GuardianSummary>>, ApiError> {
    let rows = run_db(&state, |db| db.available_guardians()).await?;

    Ok(Json(
        rows.into_iter()
            .map(|g| GuardianSummary {
                name: g.name,
                email: g.email,
            })
            .collect(),
    ))
}
