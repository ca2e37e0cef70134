//! Error types module
//!
//! All errors that reach the HTTP layer are unified under [`AppError`]. Each variant
//! self-describes its response characteristics through [`ErrorMetadata`], so the API
//! crate can render them without matching on variants.
//!
//! The `Database` variant carries a `sqlx::Error` when the `sqlx` feature is enabled and
//! a plain message otherwise.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for bad input that still reached an external tool
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PUBLISH_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Metadata persistence failed: {0}")]
    Persistence(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Staging failed: {0}")]
    Staging(String),

    #[error("Failed to launch {tool}: {message}")]
    ExternalToolLaunch { tool: &'static str, message: String },

    #[error("{tool} exited unsuccessfully: {message}")]
    ExternalToolExit { tool: &'static str, message: String },

    #[error("{tool} produced unusable output: {message}")]
    ExternalToolOutput { tool: &'static str, message: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::BadRequest(format!("Invalid ID: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Persistence(_) => (
            500,
            "PERSISTENCE_ERROR",
            true,
            Some("The file was stored; retry the upload to refresh the record"),
            true,
            LogLevel::Error,
        ),
        AppError::Publish(_) => (
            502,
            "PUBLISH_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check the bearer token"),
            false,
            LogLevel::Debug,
        ),
        AppError::Forbidden(_) => (
            403,
            "FORBIDDEN",
            false,
            Some("Only the owner of the video can upload to it"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedMediaType(_) => (
            415,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Upload one of the accepted content types"),
            false,
            LogLevel::Debug,
        ),
        AppError::Staging(_) => (
            500,
            "STAGING_IO_ERROR",
            true,
            Some("Retry the upload"),
            true,
            LogLevel::Error,
        ),
        AppError::ExternalToolLaunch { .. } => (
            500,
            "EXTERNAL_TOOL_LAUNCH_FAILED",
            false,
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
        AppError::ExternalToolExit { .. } => (
            422,
            "EXTERNAL_TOOL_FAILED",
            false,
            Some("Check that the file is a valid, uncorrupted video"),
            true,
            LogLevel::Warn,
        ),
        AppError::ExternalToolOutput { .. } => (
            422,
            "EXTERNAL_TOOL_OUTPUT_INVALID",
            false,
            Some("Check that the file contains a video stream with dimensions"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Persistence(_) => "Persistence",
            AppError::Publish(_) => "Publish",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            AppError::Staging(_) => "StagingIO",
            AppError::ExternalToolLaunch { .. } => "ExternalToolLaunch",
            AppError::ExternalToolExit { .. } => "ExternalToolExit",
            AppError::ExternalToolOutput { .. } => "ExternalToolOutput",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Persistence(_) => "Failed to update video metadata".to_string(),
            AppError::Publish(_) => "Failed to store uploaded file".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::UnsupportedMediaType(ref msg) => msg.clone(),
            AppError::Staging(_) => "Failed to receive uploaded file".to_string(),
            AppError::ExternalToolLaunch { .. } => "Media tooling is unavailable".to_string(),
            // Tool stderr stays in the logs.
            AppError::ExternalToolExit { tool, .. } => {
                format!("{} could not process the uploaded file", tool)
            }
            AppError::ExternalToolOutput { ref message, .. } => message.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_forbidden() {
        let err = AppError::Forbidden("Not the owner".to_string());
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Not the owner");
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_error_metadata_unsupported_media_type() {
        let err = AppError::UnsupportedMediaType("image/gif".to_string());
        assert_eq!(err.http_status_code(), 415);
        assert_eq!(err.error_code(), "UNSUPPORTED_MEDIA_TYPE");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_external_tool_exit_hides_stderr() {
        let err = AppError::ExternalToolExit {
            tool: "ffprobe",
            message: "moov atom not found".to_string(),
        };
        assert_eq!(err.http_status_code(), 422);
        assert_eq!(err.error_code(), "EXTERNAL_TOOL_FAILED");
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("moov"));
        assert!(err.to_string().contains("moov"));
    }

    #[test]
    fn test_external_tool_failures_have_distinct_codes() {
        let launch = AppError::ExternalToolLaunch {
            tool: "ffmpeg",
            message: "No such file or directory".to_string(),
        };
        let exit = AppError::ExternalToolExit {
            tool: "ffmpeg",
            message: "exit status: 1".to_string(),
        };
        let output = AppError::ExternalToolOutput {
            tool: "ffprobe",
            message: "no streams".to_string(),
        };
        assert_ne!(launch.error_code(), exit.error_code());
        assert_ne!(exit.error_code(), output.error_code());
        assert_eq!(launch.http_status_code(), 500);
    }

    #[test]
    fn test_persistence_and_publish_are_recoverable() {
        let publish = AppError::Publish("timeout".to_string());
        let persist = AppError::Persistence("connection reset".to_string());
        assert_eq!(publish.http_status_code(), 502);
        assert!(publish.is_recoverable());
        assert_eq!(persist.http_status_code(), 500);
        assert!(persist.is_recoverable());
    }

    #[test]
    fn test_uuid_error_is_bad_request() {
        let err: AppError = uuid::Uuid::parse_str("not-a-uuid").unwrap_err().into();
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_type(), "BadRequest");
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("root cause").context("outer"));
        let details = err.detailed_message();
        assert!(details.contains("Caused by"));
    }
}
