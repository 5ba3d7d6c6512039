//! Plan management (manager; listing open to all roles)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::{fail, ms, require_role, ApiFailure, AppState};
use crate::api::middleware::AuthUser;
use crate::api::types::ApiResponse;
use crate::models::errors::AppError;
use crate::models::types::{Plan, Role};
use crate::store::plans::{NewPlan, PlanPatch};

const MANAGERS: &[Role] = &[Role::Manager];

pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<NewPlan>,
) -> Result<(StatusCode, Json<ApiResponse<Plan>>), ApiFailure> {
    let start = Instant::now();
    require_role(&auth, MANAGERS, start)?;

    let plan = state.store.create_plan(req).map_err(|e| fail(e, start))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(plan, ms(start))),
    ))
}

pub async fn get_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Plan>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, MANAGERS, start)?;

    let plan = state
        .store
        .plans
        .get(id)
        .ok_or_else(|| fail(AppError::not_found("Plan", id), start))?;

    Ok(Json(ApiResponse::success(plan, ms(start))))
}

pub async fn update_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(patch): Json<PlanPatch>,
) -> Result<Json<ApiResponse<Plan>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, MANAGERS, start)?;

    let plan = state.store.update_plan(id, patch).map_err(|e| fail(e, start))?;
    Ok(Json(ApiResponse::success(plan, ms(start))))
}

pub async fn delete_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, MANAGERS, start)?;

    state.store.delete_plan(id).map_err(|e| fail(e, start))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Active plans, visible to every authenticated role (the front desk needs
/// them to enroll members)
pub async fn list_available_plans(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<Plan>>> {
    let start = Instant::now();
    Json(ApiResponse::success(state.store.active_plans(), ms(start)))
}
