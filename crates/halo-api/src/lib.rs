pub mod auth;
pub mod error;
pub mod middleware;
pub mod monitor;
pub mod notifications;
pub mod password;
pub mod routes;
pub mod seed;
pub mod token;
pub mod users;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;
pub use routes::router;
pub use token::{TokenError, TokenService};
