use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::blip::BlipCaptioner;

/// Generates a caption for the image stored at `path`.
///
/// Implementations must be shareable across request handlers.
#[async_trait]
pub trait Captioner: Send + Sync {
    async fn caption(&self, path: &Path) -> Result<String>;
}

/// Async front for the process-wide [`BlipCaptioner`].
///
/// Inference holds `&mut` model state, so requests are admitted one at a
/// time through the mutex while the actual work runs on the blocking pool.
/// Requests that arrive while a caption is in flight queue on the lock
/// instead of failing.
#[derive(Clone)]
pub struct CaptionService {
    model: Arc<Mutex<BlipCaptioner>>,
}

impl CaptionService {
    pub fn new(model: BlipCaptioner) -> Self {
        Self {
            model: Arc::new(Mutex::new(model)),
        }
    }
}

#[async_trait]
impl Captioner for CaptionService {
    async fn caption(&self, path: &Path) -> Result<String> {
        let model = Arc::clone(&self.model);
        let path: PathBuf = path.to_path_buf();

        let start = std::time::Instant::now();
        let caption = tokio::task::spawn_blocking(move || {
            let mut model = model.lock().unwrap_or_else(|e| e.into_inner());
            model.caption_image(&path)
        })
        .await??;

        debug!(duration_ms = start.elapsed().as_millis() as u64, "caption generated");
        Ok(caption)
    }
}
