//! Error types module
//!
//! All failures a request can hit are unified under `AppError`. Each variant
//! describes how it should be presented over HTTP through the `ErrorMetadata`
//! trait, so the api crate can render every error the same way.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like oversized uploads
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "TOOL_EXECUTION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from the client
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    /// Reading the upload, writing the input resource or reading the output resource failed.
    #[error("IO error: {0}")]
    Io(String),

    /// The external tool could not be started, timed out or exited non-zero.
    #[error("{message}")]
    ToolExecution {
        message: String,
        diagnostics: Option<String>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", err))
    }
}

impl AppError {
    /// Variant name, used as `error_type` in logs and non-production responses.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Io(_) => "Io",
            AppError::ToolExecution { .. } => "ToolExecution",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Full message including tool diagnostics when present.
    pub fn detailed_message(&self) -> String {
        match self {
            AppError::ToolExecution {
                message,
                diagnostics: Some(diagnostics),
            } if !diagnostics.is_empty() => format!("{}: {}", message, diagnostics),
            other => other.to_string(),
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::PayloadTooLarge(_) => 413,
            AppError::Io(_) | AppError::ToolExecution { .. } | AppError::Internal(_) => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::Io(_) => "IO_ERROR",
            AppError::ToolExecution { .. } => "TOOL_EXECUTION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Io(_) => "Failed to process the uploaded document".to_string(),
            AppError::ToolExecution { message, .. } => message.clone(),
            AppError::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    fn is_sensitive(&self) -> bool {
        matches!(self, AppError::Io(_) | AppError::Internal(_))
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidInput(_) => LogLevel::Debug,
            AppError::PayloadTooLarge(_) => LogLevel::Warn,
            AppError::Io(_) | AppError::ToolExecution { .. } | AppError::Internal(_) => {
                LogLevel::Error
            }
        }
    }
}
