use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use futures::StreamExt;
use picbox_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Serve a stored file
///
/// Streams the raw bytes with a content type inferred from the extension. Names that are not a
/// single plain filename (separators, `..`, hidden files) are rejected before touching the disk.
#[utoipa::path(
    get,
    path = "/uploads/{filename}",
    tag = "photos",
    params(
        ("filename" = String, Path, description = "Stored filename as returned by the upload")
    ),
    responses(
        (status = 200, description = "Raw file content with an inferred content type"),
        (status = 400, description = "Invalid or undecodable filename", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_uploaded_file"))]
pub async fn get_uploaded_file(
    State(state): State<Arc<AppState>>,
    filename: Result<Path<String>, PathRejection>,
) -> Result<Response, HttpAppError> {
    let Path(filename) = filename?;
    let (length, stream) = state.storage.download_stream(&filename).await?;

    let content_type = mime_guess::from_path(&filename).first_or_octet_stream();
    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, length)
        .header(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        )
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}
