//! Payment management (manager, receptionist)

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
use crate::api::types::{ApiResponse, PaymentListQuery};
use crate::models::errors::AppError;
use crate::models::types::{Payment, Role};
use crate::store::payments::{NewPayment, PaymentPatch};

const FRONT_DESK: &[Role] = &[Role::Manager, Role::Receptionist];

pub async fn list_payments(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<PaymentListQuery>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, FRONT_DESK, start)?;

    let rows = state.store.search_payments(
        query.member_id,
        query.status,
        query.reference_month.as_deref(),
    );

    Ok(Json(ApiResponse::success(rows, ms(start))))
}

pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<NewPayment>,
) -> Result<(StatusCode, Json<ApiResponse<Payment>>), ApiFailure> {
    let start = Instant::now();
    require_role(&auth, FRONT_DESK, start)?;

    let payment = state.store.create_payment(req).map_err(|e| fail(e, start))?;
    info!(payment_id = payment.id, member_id = payment.member_id, "💰 Payment created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(payment, ms(start))),
    ))
}

pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Payment>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, FRONT_DESK, start)?;

    let payment = state
        .store
        .payments
        .get(id)
        .ok_or_else(|| fail(AppError::not_found("Payment", id), start))?;

    Ok(Json(ApiResponse::success(payment, ms(start))))
}

pub async fn update_payment(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(patch): Json<PaymentPatch>,
) -> Result<Json<ApiResponse<Payment>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, FRONT_DESK, start)?;

    let payment = state.store.update_payment(id, patch).map_err(|e| fail(e, start))?;
    Ok(Json(ApiResponse::success(payment, ms(start))))
}

/// Mark a payment as paid, stamping the settlement time
pub async fn settle_payment(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Payment>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, FRONT_DESK, start)?;

    let payment = state
        .store
        .settle_payment(id, chrono::Utc::now())
        .map_err(|e| fail(e, start))?;
    info!(payment_id = id, "✅ Payment settled");

    Ok(Json(ApiResponse::success(payment, ms(start))))
}

pub async fn delete_payment(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, FRONT_DESK, start)?;

    state.store.delete_payment(id).map_err(|e| fail(e, start))?;
    Ok(StatusCode::NO_CONTENT)
}
