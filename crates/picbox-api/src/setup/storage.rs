//! Storage setup and initialization

use picbox_core::Config;
use picbox_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Arc<dyn Storage> {
    let storage = create_storage(config);

    let present = tokio::fs::try_exists(storage.root()).await.unwrap_or(false);
    tracing::info!(
        upload_dir = %storage.root().display(),
        present,
        "Storage initialized"
    );

    storage
}
