pub mod auth;
pub mod health;
pub mod readings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                        login (public)
///
/// /sensors/{kind}/readings           paginated history (auth required)
/// /sensors/{kind}/readings/current   latest reading (auth required)
/// /sensors/{kind}/live               live subscription WebSocket (auth required)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(readings::router())
}
