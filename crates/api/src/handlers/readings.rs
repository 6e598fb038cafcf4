//! Handlers for the paginated reading-history endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;

use sensord_core::{Reading, SensorKind};
use sensord_store::{paginate, Direction, Page, PageArgs};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /sensors/{kind}/readings
///
/// Cursor-paginated history for one sensor kind. `?first=&after=` pages
/// forward, `?last=&before=` pages backward; no arguments means the first
/// page at the default size.
pub async fn list_readings(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<String>,
    Query(args): Query<PageArgs>,
) -> AppResult<Json<DataResponse<Page>>> {
    let kind: SensorKind = kind.parse()?;

    tracing::debug!(username = %user.username, kind = %kind, "Readings page requested");
    let page = paginate(&state.store, kind, &args)?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /sensors/{kind}/readings/current
///
/// The most recent reading for one sensor kind, or `null` before the first
/// successful sample.
pub async fn current_reading(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(kind): Path<String>,
) -> AppResult<Json<DataResponse<Option<Reading>>>> {
    let kind: SensorKind = kind.parse()?;

    let latest = state
        .store
        .query_range(kind, None, 1, Direction::Backward)?
        .pop();
    Ok(Json(DataResponse { data: latest }))
}
