//! API request/response types

use serde::{Deserialize, Serialize};

use crate::models::errors::AppError;
use crate::models::types::*;
use crate::utils::metrics::MetricsSnapshot;

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Serialized error payload
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            details: err.source.as_ref().map(|s| s.to_string()),
        }
    }
}

impl ApiError {
    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "API_RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }
}

// ============================================
// Auth
// ============================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: UserDto,
}

/// Account view without the credential. The write-only password never
/// leaves the domain type.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_profile: Option<InstructorProfile>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserDto {
    pub fn from_account(user: &UserAccount, profile: Option<InstructorProfile>) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            status: user.status,
            photo_url: user.photo_url.clone(),
            instructor_profile: profile,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordData {
    /// Generated plaintext, shown exactly once
    pub password: String,
}

// ============================================
// List filters
// ============================================

#[derive(Debug, Default, Deserialize)]
pub struct MemberListQuery {
    #[serde(default)]
    pub status: Option<MemberStatus>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentListQuery {
    #[serde(default)]
    pub member_id: Option<u64>,
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    #[serde(default)]
    pub reference_month: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkoutListQuery {
    #[serde(default)]
    pub member_id: Option<u64>,
    #[serde(default)]
    pub instructor_id: Option<u64>,
}

fn default_page() -> usize {
    1
}
fn default_per_page() -> usize {
    crate::utils::pagination::DEFAULT_PER_PAGE
}

// ============================================
// Enrollment / attendance bodies
// ============================================

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub member_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    pub member_id: u64,
    pub kind: AttendanceKind,
}

// ============================================
// Health / stats
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
    pub active_sessions: usize,
    pub uptime_seconds: u64,
    pub api_version: String,
}
