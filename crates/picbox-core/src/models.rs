//! Response models exposed over HTTP.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";

/// Body returned by a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    /// Generated name under which the file was stored
    pub filename: String,
}

impl UploadResponse {
    pub fn stored(filename: impl Into<String>) -> Self {
        Self {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            filename: filename.into(),
        }
    }
}

/// Body returned by the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// `ready` when the upload directory exists, `absent` until the first upload creates it
    pub storage: String,
}
