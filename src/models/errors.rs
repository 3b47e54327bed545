//! Centralized Error Handling Module
//!
//! Every failure carries a unique code so logs and API responses can be
//! correlated. Codes follow the pattern CATEGORY_SPECIFIC_ERROR:
//! - SCAN_xxx: scan-level outcomes surfaced to callers
//! - COLLECTOR_xxx: collaborator failures (never leave the provider boundary)
//! - CFG_xxx: configuration errors
//! - API_xxx: HTTP surface errors

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

    /// Get error code as string (for logging)
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
    // Scan Errors
    // ============================================
    /// Query matched neither an address nor a known protocol
    ScanUnresolved,
    /// Query is empty or malformed
    ScanInvalidQuery,
    /// Scan exceeded its deadline
    ScanTimeout,

    // ============================================
    // Collector Errors
    // ============================================
    /// Upstream returned a non-success status
    CollectorHttp,
    /// Upstream request timed out or could not connect
    CollectorTimeout,
    /// Upstream rate limited us (HTTP 429)
    CollectorRateLimited,
    /// Upstream body could not be decoded
    CollectorInvalidResponse,
    /// Upstream has no record for the identifier (HTTP 404)
    CollectorNotFound,

    // ============================================
    // Configuration Errors
    // ============================================
    ConfigInvalidValue,
    /// Scoring weights negative or not summing to 1.0
    ConfigInvalidWeights,

    // ============================================
    // API Errors
    // ============================================
    ApiBadRequest,
    ApiRateLimited,
    ApiInternalError,

    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScanUnresolved => "SCAN_UNRESOLVED",
            Self::ScanInvalidQuery => "SCAN_INVALID_QUERY",
            Self::ScanTimeout => "SCAN_TIMEOUT",

            Self::CollectorHttp => "COLLECTOR_HTTP",
            Self::CollectorTimeout => "COLLECTOR_TIMEOUT",
            Self::CollectorRateLimited => "COLLECTOR_RATE_LIMITED",
            Self::CollectorInvalidResponse => "COLLECTOR_INVALID_RESPONSE",
            Self::CollectorNotFound => "COLLECTOR_NOT_FOUND",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ConfigInvalidWeights => "CFG_INVALID_WEIGHTS",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::ScanInvalidQuery | Self::ConfigInvalidValue => 400,
            Self::ScanUnresolved => 404,
            Self::ApiRateLimited | Self::CollectorRateLimited => 429,
            Self::ScanTimeout => 504,
            _ => 500,
        }
    }

    /// Check if a collector call is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CollectorTimeout | Self::CollectorRateLimited | Self::CollectorHttp
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    pub fn unresolved(query: &str) -> Self {
        Self::new(
            ErrorCode::ScanUnresolved,
            format!("Could not resolve protocol: {}", query),
        )
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ScanInvalidQuery, msg)
    }

    pub fn scan_timeout(secs: u64) -> Self {
        Self::new(
            ErrorCode::ScanTimeout,
            format!("Scan exceeded {}s deadline", secs),
        )
    }

    pub fn collector_http(status: u16, url: &str) -> Self {
        let code = if status == 429 {
            ErrorCode::CollectorRateLimited
        } else {
            ErrorCode::CollectorHttp
        };
        Self::new(code, format!("HTTP {} from {}", status, url))
    }

    /// Non-retryable upstream status; 404 gets its own code
    pub fn collector_rejected(status: u16, url: &str) -> Self {
        let code = if status == 404 {
            ErrorCode::CollectorNotFound
        } else {
            ErrorCode::CollectorInvalidResponse
        };
        Self::new(code, format!("HTTP {} from {}", status, url))
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CollectorInvalidResponse, msg)
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    pub fn invalid_weights(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidWeights, msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

/// Application Result type
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

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::new(ErrorCode::CollectorTimeout, err.to_string())
        } else if err.is_decode() {
            Self::new(ErrorCode::CollectorInvalidResponse, err.to_string())
        } else {
            Self::new(ErrorCode::CollectorHttp, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::CollectorInvalidResponse, "JSON parse error", err)
    }
}
