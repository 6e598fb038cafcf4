//! Handlers for authentication endpoints.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use sensord_core::CoreError;

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response payload for a successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// POST /auth/login
///
/// Validate the configured device account credentials and issue an access
/// token. Invalid credentials yield a 401 with no detail about which part
/// was wrong.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let auth = &state.config.auth;
    if request.username != auth.username || request.password != auth.password {
        tracing::warn!(username = %request.username, "Rejected login attempt");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid credentials".into(),
        )));
    }

    let access_token = generate_access_token(&request.username, "user", &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("token generation failed: {e}")))?;

    tracing::info!(username = %request.username, "Login succeeded");
    Ok(Json(DataResponse {
        data: LoginResponse {
            access_token,
            token_type: "Bearer",
            expires_in: state.config.jwt.access_token_expiry_mins * 60,
        },
    }))
}
