//! Route configuration and setup.
//!
//! Layer order, outermost first: request ID, trace, CORS, panic catcher, concurrency limit,
//! body limit. Health check lives in [health](health).

pub(crate) mod health;

use crate::api_doc;
use crate::constants::{DOCS_PATH, HEALTH_PATH, OPENAPI_PATH, PHOTOS_PATH, UPLOADS_PATH, UPLOAD_PATH};
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use picbox_core::{AppError, Config};
use picbox_infra::request_id_middleware;
use std::any::Any;
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let body_limit = config
        .max_file_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    tracing::info!(
        body_limit_bytes = body_limit,
        http_concurrency_limit = config.http_concurrency_limit(),
        "HTTP limits configured"
    );

    let app = api_routes()
        .route(
            OPENAPI_PATH,
            get(|| async { Json(api_doc::get_openapi_spec()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_PATH).path(DOCS_PATH))
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(concurrency_limit_layer(config.http_concurrency_limit()))
        .layer(catch_panic_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// One semaphore for the whole router. `Router::layer` wraps every route separately, so a
/// per-service limit would be multiplied by the number of routes.
fn concurrency_limit_layer(max_in_flight: usize) -> GlobalConcurrencyLimitLayer {
    GlobalConcurrencyLimitLayer::new(max_in_flight)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(UPLOAD_PATH, post(handlers::photo_upload::upload_photo))
        .route(PHOTOS_PATH, get(handlers::photo_list::list_photos))
        .route(UPLOADS_PATH, get(handlers::uploaded_file::get_uploaded_file))
        .route(HEALTH_PATH, get(health::health_check))
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(cors::Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(cors::Any)
    };
    Ok(cors)
}

pub(crate) fn catch_panic_layer() -> CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response> {
    CatchPanicLayer::custom(panic_response as fn(Box<dyn Any + Send + 'static>) -> Response)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");

    HttpAppError::from(AppError::Internal(detail.to_string())).into_response()
}

async fn route_not_found() -> HttpAppError {
    HttpAppError::from(AppError::NotFound("route".to_string()))
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
        .into_response()
}
