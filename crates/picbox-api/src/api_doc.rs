//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use crate::setup::routes::health;
use picbox_core::models::{HealthResponse, UploadResponse};

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Picbox API",
        version = "0.1.0",
        description = "Upload images, list what has been stored, and fetch stored files."
    ),
    paths(
        handlers::photo_upload::upload_photo,
        handlers::photo_list::list_photos,
        handlers::uploaded_file::get_uploaded_file,
        health::health_check,
    ),
    components(schemas(UploadResponse, HealthResponse, ErrorResponse)),
    tags(
        (name = "photos", description = "Photo upload, listing and retrieval"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let spec = get_openapi_spec();
        for path in ["/upload", "/photos", "/uploads/{filename}", "/health"] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
