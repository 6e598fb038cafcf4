//! Route definitions for authentication endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /auth/login -> login
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/auth/login", post(auth::login))
}
