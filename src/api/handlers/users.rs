//! Staff account management (manager only)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use super::{fail, ms, require_role, ApiFailure, AppState};
use crate::api::middleware::AuthUser;
use crate::api::types::{ApiResponse, ResetPasswordData, UserDto};
use crate::core::validators::is_valid_email;
use crate::models::errors::AppError;
use crate::models::types::Role;
use crate::store::users::{NewUser, UserPatch};

const MANAGERS: &[Role] = &[Role::Manager];

fn dto(state: &AppState, user: &crate::models::types::UserAccount) -> UserDto {
    UserDto::from_account(user, state.store.instructor_profile_for(user.id))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, MANAGERS, start)?;

    let users: Vec<UserDto> = state
        .store
        .users
        .list()
        .iter()
        .map(|u| dto(&state, u))
        .collect();

    Ok(Json(ApiResponse::success(users, ms(start))))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiFailure> {
    let start = Instant::now();
    require_role(&auth, MANAGERS, start)?;

    if !is_valid_email(&req.email) {
        return Err(fail(AppError::invalid_email(&req.email), start));
    }

    let user = state.store.create_user(req).map_err(|e| fail(e, start))?;
    info!(user_id = user.id, role = user.role.as_str(), "👤 User created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(dto(&state, &user), ms(start))),
    ))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<UserDto>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, MANAGERS, start)?;

    let user = state
        .store
        .users
        .get(id)
        .ok_or_else(|| fail(AppError::not_found("User", id), start))?;

    Ok(Json(ApiResponse::success(dto(&state, &user), ms(start))))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<ApiResponse<UserDto>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, MANAGERS, start)?;

    if let Some(email) = &patch.email {
        if !is_valid_email(email) {
            return Err(fail(AppError::invalid_email(email), start));
        }
    }

    let user = state.store.update_user(id, patch).map_err(|e| fail(e, start))?;
    Ok(Json(ApiResponse::success(dto(&state, &user), ms(start))))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, MANAGERS, start)?;

    state.store.delete_user(id).map_err(|e| fail(e, start))?;
    state.sessions.revoke_user(id);
    info!(user_id = id, "🗑️ User deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Rotate the password to a generated one and return it in plaintext,
/// exactly once. Existing sessions stay valid.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<ResetPasswordData>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, MANAGERS, start)?;

    let password = state.store.reset_user_password(id).map_err(|e| fail(e, start))?;
    info!(user_id = id, "🔑 Password reset");

    Ok(Json(ApiResponse::success(
        ResetPasswordData { password },
        ms(start),
    )))
}

pub async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<UserDto>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, MANAGERS, start)?;

    let user = state.store.deactivate_user(id).map_err(|e| fail(e, start))?;
    // Inactive accounts lose their live sessions immediately
    state.sessions.revoke_user(id);

    Ok(Json(ApiResponse::success(dto(&state, &user), ms(start))))
}
