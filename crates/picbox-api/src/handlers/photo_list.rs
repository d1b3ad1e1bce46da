use std::sync::Arc;

use axum::{extract::State, Json};
use picbox_core::is_listed_photo;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// List stored photos
///
/// Returns the names of files in the upload directory with a `.jpg`, `.jpeg`, `.png` or `.gif`
/// extension (any case), in directory order.
#[utoipa::path(
    get,
    path = "/photos",
    tag = "photos",
    responses(
        (status = 200, description = "Stored photo filenames", body = Vec<String>),
        (status = 500, description = "Unable to read directory", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_photos"))]
pub async fn list_photos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, HttpAppError> {
    let names = state.storage.list().await?;
    let total = names.len();

    let photos: Vec<String> = names
        .into_iter()
        .filter(|name| is_listed_photo(name))
        .collect();

    tracing::debug!(total, listed = photos.len(), "Listed upload directory");
    Ok(Json(photos))
}
