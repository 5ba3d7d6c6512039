//! Dashboard metrics (manager) and service stats

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Extension, Json};

use super::{ms, require_role, ApiFailure, AppState};
use crate::api::middleware::AuthUser;
use crate::api::types::{ApiResponse, StatsData};
use crate::core::dashboard::{dashboard_metrics, DashboardMetrics};
use crate::models::types::Role;

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<DashboardMetrics>>, ApiFailure> {
    let start = Instant::now();
    require_role(&auth, &[Role::Manager], start)?;

    let metrics = dashboard_metrics(&state.store, chrono::Utc::now());
    Ok(Json(ApiResponse::success(metrics, ms(start))))
}

/// Operational counters, open to any authenticated role
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();

    let data = StatsData {
        metrics: state.metrics.snapshot(),
        active_sessions: state.sessions.active_count(),
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(data, ms(start)))
}
