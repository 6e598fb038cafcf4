//! Route definitions for the telemetry query and live surfaces.

use axum::routing::get;
use axum::Router;

use crate::handlers::readings;
use crate::state::AppState;
use crate::ws::handler::live_handler;

/// Routes mounted at `/sensors`.
///
/// All routes require authentication (enforced by handler extractors).
///
/// ```text
/// GET /sensors/{kind}/readings          -> list_readings
/// GET /sensors/{kind}/readings/current  -> current_reading
/// GET /sensors/{kind}/live              -> live subscription (WebSocket)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sensors/{kind}/readings", get(readings::list_readings))
        .route(
            "/sensors/{kind}/readings/current",
            get(readings::current_reading),
        )
        .route("/sensors/{kind}/live", get(live_handler))
}
