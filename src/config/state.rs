// Application state module
// Shared, read-only state handed to every connection

use std::sync::Arc;

use super::types::Config;
use crate::gif_search::GifSearchClient;
use crate::store::{FsImageStore, ImageStore, StoreError};

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ImageStore>,
    pub gif_client: GifSearchClient,
}

impl AppState {
    /// Build state from configuration, creating the images directory if needed
    pub fn new(config: Config) -> Result<Self, StoreError> {
        let store = FsImageStore::open(&config.storage.images_dir)?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Build state around an existing store
    pub fn with_store(config: Config, store: Arc<dyn ImageStore>) -> Self {
        let gif_client = GifSearchClient::new(&config.gif_search);
        Self {
            config,
            store,
            gif_client,
        }
    }
}
