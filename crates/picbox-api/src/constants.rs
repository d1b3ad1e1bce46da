//! Route paths and wire names shared by the router, handlers and OpenAPI document.

pub const SERVICE_NAME: &str = "picbox";

/// Multipart field carrying the uploaded file
pub const PHOTO_FIELD: &str = "photo";

pub const UPLOAD_PATH: &str = "/upload";
pub const PHOTOS_PATH: &str = "/photos";
pub const UPLOADS_PATH: &str = "/uploads/{filename}";
pub const HEALTH_PATH: &str = "/health";
pub const OPENAPI_PATH: &str = "/api/openapi.json";
pub const DOCS_PATH: &str = "/docs";
