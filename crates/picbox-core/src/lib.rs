//! Picbox Core Library
//!
//! This crate provides the configuration, error types, allow-list and response models
//! shared by the storage layer and the HTTP API.

pub mod allow_list;
pub mod config;
pub mod error;
pub mod models;
pub mod naming;

// Re-export commonly used types
pub use allow_list::AllowList;
pub use config::{BaseConfig, Config, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use naming::{is_listed_photo, original_extension, FilenameStrategy};
