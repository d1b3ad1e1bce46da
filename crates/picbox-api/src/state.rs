//! Application state shared by every handler.

use picbox_core::{AllowList, Config};
use picbox_storage::Storage;
use std::sync::Arc;

/// Built once in `setup::initialize_app`, then read-only.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub allow_list: AllowList,
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(config: Config, allow_list: AllowList, storage: Arc<dyn Storage>) -> Self {
        Self {
            config,
            allow_list,
            storage,
        }
    }
}
