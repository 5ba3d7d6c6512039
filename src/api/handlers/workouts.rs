//! Workout sheet management (manager, instructor)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use super::{fail, ms, require_role, ApiFailure, AppState};
use crate::api::middleware::AuthUser;
use crate::api::types::{ApiResponse, WorkoutListQuery};
use crate::models::errors::AppError;
use crate::models::types::{Role, Workout};
use crate::store::workouts::{NewWorkout, WorkoutPatch};

const TRAINERS: &[Role] = &[Role::Manager, Role::Instructor];

pub async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<WorkoutListQuery>,
) -> Result<Json<ApiResponse<Vec<Workout>>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, TRAINERS, start)?;

    let rows = state
        .store
        .search_workouts(query.member_id, query.instructor_id);

    Ok(Json(ApiResponse::success(rows, ms(start))))
}

pub async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<NewWorkout>,
) -> Result<(StatusCode, Json<ApiResponse<Workout>>), ApiFailure> {
    let start = Instant::now();
    require_role(&auth, TRAINERS, start)?;

    let workout = state.store.create_workout(req).map_err(|e| fail(e, start))?;
    info!(workout_id = workout.id, member_id = workout.member_id, "📋 Workout created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(workout, ms(start))),
    ))
}

pub async fn get_workout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Workout>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, TRAINERS, start)?;

    let workout = state
        .store
        .workouts
        .get(id)
        .ok_or_else(|| fail(AppError::not_found("Workout", id), start))?;

    Ok(Json(ApiResponse::success(workout, ms(start))))
}

pub async fn update_workout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(patch): Json<WorkoutPatch>,
) -> Result<Json<ApiResponse<Workout>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, TRAINERS, start)?;

    let workout = state.store.update_workout(id, patch).map_err(|e| fail(e, start))?;
    Ok(Json(ApiResponse::success(workout, ms(start))))
}

pub async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, TRAINERS, start)?;

    state.store.delete_workout(id).map_err(|e| fail(e, start))?;
    Ok(StatusCode::NO_CONTENT)
}
