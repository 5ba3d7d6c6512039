//! API request handlers

pub mod auth;
pub mod classes;
pub mod dashboard;
pub mod members;
pub mod payments;
pub mod plans;
pub mod users;
pub mod workouts;

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use super::middleware::AuthUser;
use super::types::{ApiError, ApiResponse, HealthData};
use crate::models::config::AppConfig;
use crate::models::errors::AppError;
use crate::models::types::Role;
use crate::store::{SessionStore, Store};
use crate::utils::metrics::MetricsCollector;

/// Shared application state
pub struct AppState {
    pub store: Store,
    pub sessions: SessionStore,
    pub metrics: MetricsCollector,
    pub config: AppConfig,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            store: Store::new(),
            sessions: SessionStore::with_ttl(config.session_ttl),
            metrics: MetricsCollector::new(),
            config,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Error half of every handler result
pub type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

pub(crate) fn ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Map a domain error onto the HTTP envelope
pub(crate) fn fail(err: AppError, start: Instant) -> ApiFailure {
    let status = StatusCode::from_u16(err.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(ApiError::from(&err), ms(start))),
    )
}

/// Reject callers whose role is not in `allowed`
pub(crate) fn require_role(
    auth: &AuthUser,
    allowed: &[Role],
    start: Instant,
) -> Result<(), ApiFailure> {
    if allowed.contains(&auth.role) {
        Ok(())
    } else {
        Err(fail(AppError::forbidden(auth.role.as_str()), start))
    }
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, ms(start)))
}
