//! Application state handed to every handler.

use cadenza_services::{CatalogueService, LifecycleCoordinator, NotificationDispatcher, TaxonomyService};
use cadenza_storage::Storage;
use std::path::PathBuf;
use std::sync::Arc;

/// Limits applied while a multipart body is staged to disk
#[derive(Clone, Debug)]
pub struct UploadLimits {
    pub staging_dir: PathBuf,
    pub max_file_size: usize,
    pub audio_content_types: Vec<String>,
    pub image_content_types: Vec<String>,
}

impl UploadLimits {
    pub fn accepts(&self, content_type: &str) -> bool {
        let content_type = content_type.to_ascii_lowercase();
        self.audio_content_types.contains(&content_type)
            || self.image_content_types.contains(&content_type)
    }
}

pub struct AppState {
    pub catalogue: CatalogueService,
    pub lifecycle: LifecycleCoordinator,
    pub taxonomy: TaxonomyService,
    pub notifications: NotificationDispatcher,
    pub storage: Arc<dyn Storage>,
    pub uploads: UploadLimits,
}
