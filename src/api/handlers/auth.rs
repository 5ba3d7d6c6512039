//! Login, logout and identity

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Extension, Json};
use tracing::{info, warn};

use super::{fail, ms, ApiFailure, AppState};
use crate::api::middleware::AuthUser;
use crate::api::types::{ApiResponse, LoginData, LoginRequest, UserDto};
use crate::models::errors::AppError;

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginData>>, ApiFailure> {
    let start = Instant::now();

    let user = match state.store.find_user_by_email(&req.email) {
        Some(user) => user,
        None => {
            state.metrics.record_auth_failure();
            warn!("Login failed for unknown email");
            return Err(fail(AppError::invalid_credentials(), start));
        }
    };

    if !user.password.verify(&req.password) {
        state.metrics.record_auth_failure();
        warn!(user_id = user.id, "Login failed: wrong password");
        return Err(fail(AppError::invalid_credentials(), start));
    }

    if !user.is_active() {
        state.metrics.record_auth_failure();
        return Err(fail(AppError::account_inactive(), start));
    }

    let token = state.sessions.issue(user.id, user.role);
    info!(user_id = user.id, role = user.role.as_str(), "✅ Login");

    let profile = state.store.instructor_profile_for(user.id);
    let data = LoginData {
        token,
        user: UserDto::from_account(&user, profile),
    };

    Ok(Json(ApiResponse::success(data, ms(start))))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Json<ApiResponse<()>> {
    let start = Instant::now();
    state.sessions.revoke(&auth.token);
    info!(user_id = auth.user_id, "👋 Logout");
    Json(ApiResponse::success((), ms(start)))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiFailure> {
    let start = Instant::now();

    let user = state
        .store
        .users
        .get(auth.user_id)
        .ok_or_else(|| fail(AppError::not_found("User", auth.user_id), start))?;
    let profile = state.store.instructor_profile_for(user.id);

    Ok(Json(ApiResponse::success(
        UserDto::from_account(&user, profile),
        ms(start),
    )))
}
