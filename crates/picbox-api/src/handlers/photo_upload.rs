use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use picbox_core::models::UploadResponse;

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::PhotoUploadService;
use crate::state::AppState;

/// Upload photo handler
///
/// Accepts one image under the multipart field `photo` and stores it in the upload directory
/// under a generated name.
///
/// # Errors
/// - `AppError::NoFileUploaded` - no file under `photo`, or not a multipart request
/// - `AppError::UnsupportedFileType` - extension or media type outside the allow-list
/// - `AppError::PayloadTooLarge` - body exceeds the configured limit
/// - `AppError::Storage` - the file could not be written
#[utoipa::path(
    post,
    path = "/upload",
    tag = "photos",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Image file under the `photo` field"),
    responses(
        (status = 200, description = "File uploaded successfully", body = UploadResponse),
        (status = 400, description = "No file uploaded, or not an allowed image", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Unable to store file", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_photo"))]
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let multipart = multipart?;
    let stored = PhotoUploadService::new(&state).receive(multipart).await?;
    Ok(Json(UploadResponse::stored(stored.filename)))
}
