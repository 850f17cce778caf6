//! Application state shared across request handlers.

use std::sync::Arc;

use medcap_captioner::Captioner;
use medcap_core::Config;
use medcap_storage::Storage;

/// Everything a handler needs: configuration, the storage backend, and the
/// captioning model. Both seams are trait objects so tests can substitute
/// doubles without loading model weights.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub captioner: Arc<dyn Captioner>,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn Storage>, captioner: Arc<dyn Captioner>) -> Self {
        Self {
            config,
            storage,
            captioner,
        }
    }
}
