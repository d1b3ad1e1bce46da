use crate::{LocalStorage, Storage};
use picbox_core::Config;
use std::sync::Arc;

/// Create the storage backend for the configured upload directory.
///
/// Does not touch the filesystem; the directory is created by the first upload.
pub fn create_storage(config: &Config) -> Arc<dyn Storage> {
    tracing::debug!(
        upload_dir = %config.upload_dir().display(),
        "Using local storage backend"
    );
    Arc::new(LocalStorage::new(config.upload_dir()))
}
