//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so operators can tell a
//! misconfigured deployment apart from a flaky upstream provider.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - ADDR_xxx: Input validation errors
//! - API_xxx: Request admission errors
//! - CFG_xxx: Configuration errors
//! - UPSTREAM_xxx: Chain-data provider errors

use std::fmt;
use std::time::Duration;

/// Maximum length of any message exposed at the service boundary
pub const MAX_ERROR_MESSAGE_LEN: usize = 200;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message (already truncated)
    pub message: String,
    /// Time until the caller may retry (rate limiting only)
    pub retry_after: Option<Duration>,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: truncate_message(message.into()),
            retry_after: None,
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(code, message)
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// Retry hint in whole milliseconds, if any
    pub fn retry_after_ms(&self) -> Option<u64> {
        self.retry_after.map(|d| d.as_millis() as u64)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Address is not `0x` followed by 40 hex digits
    InvalidAddress,
    /// Client exceeded its request window
    RateLimited,
    /// Upstream API key not configured
    MissingCredentials,
    /// Upstream unreachable, timed out, non-2xx, or unparseable
    UpstreamFailure,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAddress => "ADDR_INVALID",
            Self::RateLimited => "API_RATE_LIMITED",
            Self::MissingCredentials => "CFG_MISSING_CREDENTIALS",
            Self::UpstreamFailure => "UPSTREAM_FAILURE",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidAddress => 400,
            Self::RateLimited => 429,
            Self::MissingCredentials => 503,
            Self::UpstreamFailure => 502,
        }
    }

    /// Whether the caller may usefully retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::UpstreamFailure)
    }
}

/// Cut a message down to `MAX_ERROR_MESSAGE_LEN` characters on a char boundary
fn truncate_message(message: String) -> String {
    if message.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return message;
    }
    let mut cut: String = message.chars().take(MAX_ERROR_MESSAGE_LEN - 3).collect();
    cut.push_str("...");
    cut
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Malformed wallet address
    pub fn invalid_address(raw: &str) -> Self {
        Self::new(
            ErrorCode::InvalidAddress,
            format!("Invalid address '{}': expected 0x followed by 40 hex digits", raw),
        )
    }

    /// Client window exhausted
    pub fn rate_limited(retry_after: Duration) -> Self {
        let mut err = Self::new(
            ErrorCode::RateLimited,
            format!("Rate limit exceeded. Retry after {}ms", retry_after.as_millis()),
        );
        err.retry_after = Some(retry_after);
        err
    }

    /// Missing upstream API key
    pub fn missing_credentials(key_name: &str) -> Self {
        Self::new(
            ErrorCode::MissingCredentials,
            format!("Upstream API key not configured: {}", key_name),
        )
    }

    /// Upstream provider failure
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamFailure, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

/// Request URLs carry the explorer API key, so the URL is stripped
/// before anything reaches the message or the source chain
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let message = if err.is_timeout() {
            "Upstream request timed out".to_string()
        } else if err.is_connect() {
            "Upstream connection failed".to_string()
        } else {
            format!("Upstream request failed: {}", err)
        };
        Self::with_source(ErrorCode::UpstreamFailure, message, err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::UpstreamFailure, "Upstream returned malformed JSON", err)
    }
}
