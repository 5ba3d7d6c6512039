//! Class schedule, enrollment and attendance (manager, instructor)

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
use crate::api::types::{ApiResponse, AttendanceRequest, EnrollRequest};
use crate::models::errors::AppError;
use crate::models::types::{Attendance, ClassGroup, Enrollment, Role};
use crate::store::classes::{ClassPatch, NewClass};

const TRAINERS: &[Role] = &[Role::Manager, Role::Instructor];

pub async fn list_classes(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<ClassGroup>>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, TRAINERS, start)?;

    Ok(Json(ApiResponse::success(state.store.classes.list(), ms(start))))
}

pub async fn create_class(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<NewClass>,
) -> Result<(StatusCode, Json<ApiResponse<ClassGroup>>), ApiFailure> {
    let start = Instant::now();
    require_role(&auth, TRAINERS, start)?;

    let class = state.store.create_class(req).map_err(|e| fail(e, start))?;
    info!(class_id = class.id, "📅 Class created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(class, ms(start))),
    ))
}

pub async fn get_class(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<ClassGroup>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, TRAINERS, start)?;

    let class = state
        .store
        .classes
        .get(id)
        .ok_or_else(|| fail(AppError::not_found("Class", id), start))?;

    Ok(Json(ApiResponse::success(class, ms(start))))
}

pub async fn update_class(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(patch): Json<ClassPatch>,
) -> Result<Json<ApiResponse<ClassGroup>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, TRAINERS, start)?;

    let class = state.store.update_class(id, patch).map_err(|e| fail(e, start))?;
    Ok(Json(ApiResponse::success(class, ms(start))))
}

pub async fn delete_class(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, TRAINERS, start)?;

    state.store.delete_class(id).map_err(|e| fail(e, start))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Put a member into a class, holding the capacity invariant
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(req): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Enrollment>>), ApiFailure> {
    let start = Instant::now();
    require_role(&auth, TRAINERS, start)?;

    let enrollment = state
        .store
        .enroll_member(id, req.member_id)
        .map_err(|e| fail(e, start))?;
    info!(class_id = id, member_id = req.member_id, "✅ Enrolled");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(enrollment, ms(start))),
    ))
}

pub async fn cancel_enrollment(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((class_id, enrollment_id)): Path<(u64, u64)>,
) -> Result<Json<ApiResponse<Enrollment>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, TRAINERS, start)?;

    // The enrollment must belong to the class in the path
    let enrollment = state
        .store
        .enrollments
        .get(enrollment_id)
        .filter(|e| e.class_id == class_id)
        .ok_or_else(|| fail(AppError::not_found("Enrollment", enrollment_id), start))?;

    let cancelled = state
        .store
        .cancel_enrollment(enrollment.id)
        .map_err(|e| fail(e, start))?;

    Ok(Json(ApiResponse::success(cancelled, ms(start))))
}

pub async fn record_attendance(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(req): Json<AttendanceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Attendance>>), ApiFailure> {
    let start = Instant::now();
    require_role(&auth, TRAINERS, start)?;

    let row = state
        .store
        .record_attendance(id, req.member_id, req.kind)
        .map_err(|e| fail(e, start))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(row, ms(start))),
    ))
}
