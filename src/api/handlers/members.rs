//! Member management (manager, receptionist)

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
use crate::api::types::{ApiResponse, MemberListQuery};
use crate::core::{
    cpf,
    validators::{format_phone, is_valid_email},
};
use crate::models::errors::AppError;
use crate::models::types::{Member, Role};
use crate::store::members::{MemberPatch, NewMember};
use crate::utils::pagination::{paginate, Page, PageQuery};

const FRONT_DESK: &[Role] = &[Role::Manager, Role::Receptionist];

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<MemberListQuery>,
) -> Result<Json<ApiResponse<Page<Member>>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, FRONT_DESK, start)?;

    let rows = state
        .store
        .search_members(query.status, query.name.as_deref());
    let page = paginate(
        rows,
        PageQuery {
            page: query.page,
            per_page: query.per_page,
        },
    );

    Ok(Json(ApiResponse::success(page, ms(start))))
}

pub async fn create_member(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(mut req): Json<NewMember>,
) -> Result<(StatusCode, Json<ApiResponse<Member>>), ApiFailure> {
    let start = Instant::now();
    require_role(&auth, FRONT_DESK, start)?;

    if !cpf::is_valid(&req.cpf) {
        return Err(fail(AppError::invalid_cpf(&req.cpf), start));
    }
    if !is_valid_email(&req.email) {
        return Err(fail(AppError::invalid_email(&req.email), start));
    }

    // Store canonical display forms regardless of how they arrived
    req.cpf = cpf::format(&req.cpf);
    req.phone = req.phone.map(|p| format_phone(&p));

    let member = state.store.create_member(req).map_err(|e| fail(e, start))?;
    info!(member_id = member.id, "🏋️ Member enrolled");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(member, ms(start))),
    ))
}

pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Member>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, FRONT_DESK, start)?;

    let member = state
        .store
        .members
        .get(id)
        .ok_or_else(|| fail(AppError::not_found("Member", id), start))?;

    Ok(Json(ApiResponse::success(member, ms(start))))
}

pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(mut patch): Json<MemberPatch>,
) -> Result<Json<ApiResponse<Member>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, FRONT_DESK, start)?;

    if let Some(raw) = &patch.cpf {
        if !cpf::is_valid(raw) {
            return Err(fail(AppError::invalid_cpf(raw), start));
        }
        patch.cpf = Some(cpf::format(raw));
    }
    if let Some(email) = &patch.email {
        if !is_valid_email(email) {
            return Err(fail(AppError::invalid_email(email), start));
        }
    }
    patch.phone = patch.phone.map(|p| format_phone(&p));

    let member = state.store.update_member(id, patch).map_err(|e| fail(e, start))?;
    Ok(Json(ApiResponse::success(member, ms(start))))
}

pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, FRONT_DESK, start)?;

    state.store.delete_member(id).map_err(|e| fail(e, start))?;
    info!(member_id = id, "🗑️ Member deleted");

    Ok(StatusCode::NO_CONTENT)
}
