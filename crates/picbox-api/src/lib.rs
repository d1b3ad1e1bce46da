//! Picbox API Library
//!
//! HTTP handlers, routing and application setup for the photo upload service.

mod api_doc;
pub mod constants;
mod handlers;
mod services;
pub mod setup;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
