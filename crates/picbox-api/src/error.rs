//! HTTP error response conversion
//!
//! **Handler pattern:** return `Result<impl IntoResponse, HttpAppError>`. Anything that converts
//! into `AppError` (storage failures, multipart failures, `anyhow`) becomes an `HttpAppError` via
//! `?` and renders as `{"error": <client message>}` with the status from `ErrorMetadata`.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::PathRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use picbox_core::{AppError, ErrorMetadata, LogLevel};
use picbox_storage::StorageError;

pub use picbox_infra::ErrorResponse;

/// Wrapper type for AppError to implement IntoResponse
///
/// `IntoResponse` (axum) and `AppError` (picbox-core) are both foreign to this crate.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(app_error_from_storage(err))
    }
}

/// A request that is not multipart at all carries no file.
impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        tracing::debug!(rejection = %rejection.body_text(), "Upload is not a multipart request");
        HttpAppError(AppError::NoFileUploaded)
    }
}

/// Undecodable path segments (invalid percent-encoding or UTF-8).
impl From<PathRejection> for HttpAppError {
    fn from(rejection: PathRejection) -> Self {
        HttpAppError(AppError::InvalidInput(rejection.body_text()))
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        HttpAppError(app_error_from_multipart(err))
    }
}

pub(crate) fn app_error_from_storage(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(name) => AppError::NotFound(name),
        StorageError::InvalidKey(name) => {
            AppError::InvalidInput(format!("Invalid filename: {}", name))
        }
        StorageError::ListFailed { path, source } => {
            AppError::DirectoryUnreadable(format!("{}: {}", path.display(), source))
        }
        StorageError::CreateDirFailed { path, source } => {
            AppError::Storage(format!("create {}: {}", path.display(), source))
        }
        StorageError::UploadFailed(msg) | StorageError::DownloadFailed(msg) => {
            AppError::Storage(msg)
        }
        StorageError::IoError(err) => AppError::from(err),
    }
}

/// Body limit overflow surfaces as a multipart error carrying 413.
pub(crate) fn app_error_from_multipart(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Malformed multipart body: {}", err.body_text()))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Error => {
            tracing::error!(error = ?error, error_type = error_type, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(ErrorResponse::new(app_error.client_message()))).into_response()
    }
}
