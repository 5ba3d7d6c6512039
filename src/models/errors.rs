//! Centralized error handling
//!
//! Every failure carries a unique error code for logging and monitoring.
//! Error codes follow the pattern CATEGORY_SPECIFIC_ERROR:
//! - AUTH_xxx: authentication/authorization errors
//! - VAL_xxx: input validation errors
//! - STORE_xxx: persistence errors
//! - API_xxx: request-level errors
//! - CFG_xxx: configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Auth Errors
    // ============================================
    /// Unknown email or wrong password
    AuthInvalidCredentials,
    /// No bearer token on a protected route
    AuthMissingToken,
    /// Token unknown or past its TTL
    AuthSessionExpired,
    /// Authenticated but role not allowed
    AuthForbidden,
    /// Account is inactive
    AuthAccountInactive,

    // ============================================
    // Validation Errors
    // ============================================
    /// CPF failed checksum or shape validation
    ValidationInvalidCpf,
    /// Email failed syntax validation
    ValidationInvalidEmail,
    /// Time not in strict HH:MM form
    ValidationInvalidTime,
    /// Reference month not in YYYY-MM form
    ValidationInvalidMonth,
    /// Numeric field out of range (negative price, weekday > 6, ...)
    ValidationOutOfRange,

    // ============================================
    // Store Errors
    // ============================================
    /// Row not found by id
    StoreNotFound,
    /// Unique email already registered
    StoreDuplicateEmail,
    /// Unique CPF already registered
    StoreDuplicateCpf,
    /// Class already at capacity
    StoreClassFull,
    /// Row still referenced by another table
    StoreRowInUse,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,

    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// String representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthInvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            Self::AuthMissingToken => "AUTH_MISSING_TOKEN",
            Self::AuthSessionExpired => "AUTH_SESSION_EXPIRED",
            Self::AuthForbidden => "AUTH_FORBIDDEN",
            Self::AuthAccountInactive => "AUTH_ACCOUNT_INACTIVE",

            Self::ValidationInvalidCpf => "VAL_INVALID_CPF",
            Self::ValidationInvalidEmail => "VAL_INVALID_EMAIL",
            Self::ValidationInvalidTime => "VAL_INVALID_TIME",
            Self::ValidationInvalidMonth => "VAL_INVALID_MONTH",
            Self::ValidationOutOfRange => "VAL_OUT_OF_RANGE",

            Self::StoreNotFound => "STORE_NOT_FOUND",
            Self::StoreDuplicateEmail => "STORE_DUPLICATE_EMAIL",
            Self::StoreDuplicateCpf => "STORE_DUPLICATE_CPF",
            Self::StoreClassFull => "STORE_CLASS_FULL",
            Self::StoreRowInUse => "STORE_ROW_IN_USE",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// HTTP status for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest
            | Self::ValidationInvalidCpf
            | Self::ValidationInvalidEmail
            | Self::ValidationInvalidTime
            | Self::ValidationInvalidMonth
            | Self::ValidationOutOfRange
            | Self::ConfigInvalidValue => 400,
            Self::AuthInvalidCredentials
            | Self::AuthMissingToken
            | Self::AuthSessionExpired => 401,
            Self::AuthForbidden | Self::AuthAccountInactive => 403,
            Self::StoreNotFound => 404,
            Self::StoreDuplicateEmail
            | Self::StoreDuplicateCpf
            | Self::StoreClassFull
            | Self::StoreRowInUse => 409,
            Self::ApiRateLimited => 429,
            _ => 500,
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::AuthInvalidCredentials, "Invalid email or password")
    }

    pub fn missing_token() -> Self {
        Self::new(ErrorCode::AuthMissingToken, "Missing bearer token")
    }

    pub fn session_expired() -> Self {
        Self::new(ErrorCode::AuthSessionExpired, "Session expired or unknown")
    }

    pub fn forbidden(role: &str) -> Self {
        Self::new(
            ErrorCode::AuthForbidden,
            format!("Role {} is not allowed on this route", role),
        )
    }

    pub fn account_inactive() -> Self {
        Self::new(ErrorCode::AuthAccountInactive, "Account is inactive")
    }

    pub fn invalid_cpf(input: &str) -> Self {
        Self::new(
            ErrorCode::ValidationInvalidCpf,
            format!("Invalid CPF: {}", input),
        )
    }

    pub fn invalid_email(input: &str) -> Self {
        Self::new(
            ErrorCode::ValidationInvalidEmail,
            format!("Invalid email: {}", input),
        )
    }

    pub fn invalid_time(input: &str) -> Self {
        Self::new(
            ErrorCode::ValidationInvalidTime,
            format!("Invalid time (expected HH:MM): {}", input),
        )
    }

    pub fn invalid_month(input: &str) -> Self {
        Self::new(
            ErrorCode::ValidationInvalidMonth,
            format!("Invalid reference month (expected YYYY-MM): {}", input),
        )
    }

    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationOutOfRange, msg)
    }

    pub fn not_found(what: &str, id: u64) -> Self {
        Self::new(
            ErrorCode::StoreNotFound,
            format!("{} {} not found", what, id),
        )
    }

    pub fn duplicate_email(email: &str) -> Self {
        Self::new(
            ErrorCode::StoreDuplicateEmail,
            format!("Email already registered: {}", email),
        )
    }

    pub fn duplicate_cpf(cpf: &str) -> Self {
        Self::new(
            ErrorCode::StoreDuplicateCpf,
            format!("CPF already registered: {}", cpf),
        )
    }

    pub fn class_full(class_id: u64) -> Self {
        Self::new(
            ErrorCode::StoreClassFull,
            format!("Class {} is at capacity", class_id),
        )
    }

    pub fn row_in_use(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreRowInUse, msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ApiBadRequest, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::invalid_cpf("123");
        assert_eq!(err.code, ErrorCode::ValidationInvalidCpf);
        assert_eq!(err.code_str(), "VAL_INVALID_CPF");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ValidationInvalidCpf.http_status(), 400);
        assert_eq!(ErrorCode::AuthMissingToken.http_status(), 401);
        assert_eq!(ErrorCode::AuthForbidden.http_status(), 403);
        assert_eq!(ErrorCode::StoreNotFound.http_status(), 404);
        assert_eq!(ErrorCode::StoreDuplicateCpf.http_status(), 409);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::Unknown.http_status(), 500);
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::class_full(7);
        assert_eq!(format!("{}", err), "[STORE_CLASS_FULL] Class 7 is at capacity");
    }
}
