//! API middleware (auth, rate limiting, request logging)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use dashmap::DashMap;
use tracing::{info, warn};

use super::handlers::AppState;
use super::types::{ApiError, ApiResponse};
use crate::models::types::Role;

/// Authenticated caller, injected into request extensions by
/// [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub role: Role,
    pub token: String,
}

/// Rate limiter configuration
pub struct RateLimitConfig {
    /// Requests per window
    pub requests_per_window: u32,
    /// Window duration
    pub window_duration: Duration,
}

impl RateLimitConfig {
    /// `GYMFLOW_RATE_LIMIT_REQUESTS` / `GYMFLOW_RATE_LIMIT_WINDOW_SECS`,
    /// defaulting to 100 requests per minute
    pub fn from_env() -> Self {
        let load = |key: &str, default: u64| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        Self {
            requests_per_window: load("GYMFLOW_RATE_LIMIT_REQUESTS", 100) as u32,
            window_duration: Duration::from_secs(load("GYMFLOW_RATE_LIMIT_WINDOW_SECS", 60)),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 100,
            window_duration: Duration::from_secs(60),
        }
    }
}

/// In-memory fixed-window rate limiter, keyed by bearer token or client IP
pub struct RateLimiter {
    requests: DashMap<String, (u32, Instant)>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            requests: DashMap::new(),
            config,
        }
    }

    /// Check if a request is allowed; returns (allowed, remaining, reset_seconds)
    pub fn check(&self, key: &str) -> (bool, u32, u64) {
        let now = Instant::now();

        let mut entry = self.requests.entry(key.to_string()).or_insert((0, now));

        // Reset window if expired
        if now.duration_since(entry.1) > self.config.window_duration {
            entry.0 = 0;
            entry.1 = now;
        }

        let remaining = self.config.requests_per_window.saturating_sub(entry.0);
        let reset_secs = self
            .config
            .window_duration
            .saturating_sub(now.duration_since(entry.1))
            .as_secs();

        if entry.0 >= self.config.requests_per_window {
            return (false, 0, reset_secs);
        }

        entry.0 += 1;
        (true, remaining - 1, reset_secs)
    }

    /// Drop stale windows (called by the cleanup task)
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.requests.retain(|_, (_, timestamp)| {
            now.duration_since(*timestamp) < self.config.window_duration * 2
        });
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

lazy_static::lazy_static! {
    pub static ref RATE_LIMITER: Arc<RateLimiter> =
        Arc::new(RateLimiter::new(RateLimitConfig::from_env()));
}

/// Background sweep of rate-limiter windows and expired sessions
pub fn start_cleanup_task(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            RATE_LIMITER.cleanup();
            state.sessions.cleanup_expired();
        }
    });
}

fn is_public(method: &Method, path: &str) -> bool {
    matches!(path, "/health" | "/api/health")
        || (*method == Method::POST && path == "/api/login")
}

fn envelope_error(status: StatusCode, error: ApiError) -> (StatusCode, Json<ApiResponse<()>>) {
    (status, Json(ApiResponse::error(error, 0.0)))
}

/// Bearer-token authentication middleware
///
/// Public routes pass through; everything else needs a live session.
/// The resolved [`AuthUser`] lands in request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<()>>)> {
    if is_public(request.method(), request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => {
            state.metrics.record_auth_failure();
            let err = crate::models::errors::AppError::missing_token();
            return Err(envelope_error(StatusCode::UNAUTHORIZED, ApiError::from(&err)));
        }
    };

    match state.sessions.get(token) {
        Some(session) => {
            request.extensions_mut().insert(AuthUser {
                user_id: session.user_id,
                role: session.role,
                token: token.to_string(),
            });
            Ok(next.run(request).await)
        }
        None => {
            state.metrics.record_auth_failure();
            warn!("Rejected request with unknown or expired token");
            let err = crate::models::errors::AppError::session_expired();
            Err(envelope_error(StatusCode::UNAUTHORIZED, ApiError::from(&err)))
        }
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<()>>)> {
    // Health checks are never limited
    if matches!(request.uri().path(), "/health" | "/api/health") {
        return Ok(next.run(request).await);
    }

    // Key on the bearer token, falling back to forwarded client IP
    let rate_key = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| {
            headers
                .get("X-Forwarded-For")
                .or_else(|| headers.get("x-real-ip"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string()
        });

    let (allowed, remaining, reset) = RATE_LIMITER.check(&rate_key);

    if !allowed {
        warn!(key = %rate_key, "Rate limit exceeded");
        return Err(envelope_error(
            StatusCode::TOO_MANY_REQUESTS,
            ApiError::rate_limited(reset),
        ));
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Remaining", remaining.into());
    headers.insert("X-RateLimit-Reset", reset.into());

    Ok(response)
}

/// Request logging middleware; also feeds the metrics collector
pub async fn logging_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();
    state
        .metrics
        .record_request(status.as_u16(), latency.as_millis() as u64);

    info!(
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = %latency.as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_window() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_window: 3,
            window_duration: Duration::from_secs(60),
        });

        for expected_remaining in [2, 1, 0] {
            let (allowed, remaining, _) = limiter.check("key");
            assert!(allowed);
            assert_eq!(remaining, expected_remaining);
        }
        let (allowed, _, _) = limiter.check("key");
        assert!(!allowed);

        // Other keys are unaffected
        let (allowed, _, _) = limiter.check("other");
        assert!(allowed);
    }

    #[test]
    fn test_public_paths() {
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::GET, "/api/health"));
        assert!(is_public(&Method::POST, "/api/login"));
        assert!(!is_public(&Method::GET, "/api/login"));
        assert!(!is_public(&Method::GET, "/api/members"));
    }
}
