//! Error types module
//!
//! All request-level failures are unified under `AppError`. Each variant describes how it
//! should be presented over HTTP through `ErrorMetadata`; the API crate renders that as a
//! `{"error": <message>}` body.

use std::io;

/// Message returned when the upload request carries no file under the expected field.
pub const NO_FILE_UPLOADED: &str = "No file uploaded";
/// Message returned when a file fails the allow-list.
pub const ONLY_IMAGES_ALLOWED: &str = "Only image files are allowed!";
/// Message returned when the upload directory cannot be listed.
pub const UNABLE_TO_READ_DIRECTORY: &str = "Unable to read directory";

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected client mistakes
    Debug,
    Warn,
    /// Unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "NO_FILE_UPLOADED")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether the internal message must not reach clients
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFileUploaded,

    #[error("Unsupported file type: '{filename}' ({content_type})")]
    UnsupportedFileType {
        filename: String,
        content_type: String,
    },

    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unable to read directory: {0}")]
    DirectoryUnreadable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
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

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::NoFileUploaded => (400, "NO_FILE_UPLOADED", false, LogLevel::Debug),
        AppError::UnsupportedFileType { .. } => {
            (400, "UNSUPPORTED_FILE_TYPE", false, LogLevel::Debug)
        }
        AppError::UnexpectedField(_) => (400, "UNEXPECTED_FIELD", false, LogLevel::Debug),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, LogLevel::Warn),
        AppError::DirectoryUnreadable(_) => {
            (500, "DIRECTORY_UNREADABLE", true, LogLevel::Error)
        }
        AppError::Storage(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Variant name, used as a structured logging field.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::NoFileUploaded => "NoFileUploaded",
            AppError::UnsupportedFileType { .. } => "UnsupportedFileType",
            AppError::UnexpectedField(_) => "UnexpectedField",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::DirectoryUnreadable(_) => "DirectoryUnreadable",
            AppError::Storage(_) => "Storage",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn client_message(&self) -> String {
        match self {
            AppError::NoFileUploaded => NO_FILE_UPLOADED.to_string(),
            AppError::UnsupportedFileType { .. } => ONLY_IMAGES_ALLOWED.to_string(),
            AppError::UnexpectedField(field) => format!("Unexpected field: {}", field),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::NotFound(_) => "Not found".to_string(),
            AppError::PayloadTooLarge(msg) => format!("File too large: {}", msg),
            AppError::DirectoryUnreadable(_) => UNABLE_TO_READ_DIRECTORY.to_string(),
            AppError::Storage(_) => "Unable to store file".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }
}
