use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{monitor, notifications, users};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(monitor::index))
        .route("/api/auth/login", post(auth::login))
        .route("/api/notify/send", post(notifications::send_notification))
        .route("/api/alert/send", post(notifications::send_alert))
        .route("/api/monitor/data", put(monitor::put_data))
        .route("/api/monitor/current", get(monitor::current))
        .route("/api/monitor/up", get(monitor::up));

    let protected_routes = Router::new()
        .route("/api/user/profile", put(users::update_profile))
        .route("/api/user/type", put(users::change_role))
        .route("/api/user/link/guardian", post(users::link_guardian))
        .route("/api/user/unlink", post(users::unlink))
        .route("/api/guardians/available", get(users::available_guardians))
        .route("/api/notifications/check", get(notifications::check_notifications))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
