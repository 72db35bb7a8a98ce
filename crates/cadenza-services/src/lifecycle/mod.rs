//! Entity Lifecycle Coordinator
//!
//! Keeps track, artist and playlist rows consistent with the objects they
//! reference. Rows are only created once their files are stored, and a row's
//! objects are only deleted after the row change itself went through. No step
//! is wrapped in a transaction: a failed cleanup leaves an orphaned object,
//! never a row pointing at a missing one.

mod artist;
mod playlist;
mod track;

use crate::deleter::FileBatchDeleter;
use crate::taxonomy::TaxonomyRenameCascader;
use crate::uploader::{FileBatchUploader, StagedFile, UploadedMedia};
use cadenza_core::AppError;
use cadenza_db::{ArtistStore, PlaylistStore, TrackStore};
use std::sync::Arc;

const MISSING_MEDIA: &str = "Missing Media File";
const UPLOAD_FAILED: &str = "Uploading files failed!";
const CLEANUP_FAILED: &str = "File Deletion Failed from storage";

#[derive(Clone)]
pub struct LifecycleCoordinator {
    tracks: Arc<dyn TrackStore>,
    artists: Arc<dyn ArtistStore>,
    playlists: Arc<dyn PlaylistStore>,
    uploader: FileBatchUploader,
    deleter: FileBatchDeleter,
    cascader: TaxonomyRenameCascader,
}

impl LifecycleCoordinator {
    pub fn new(
        tracks: Arc<dyn TrackStore>,
        artists: Arc<dyn ArtistStore>,
        playlists: Arc<dyn PlaylistStore>,
        uploader: FileBatchUploader,
        deleter: FileBatchDeleter,
        cascader: TaxonomyRenameCascader,
    ) -> Self {
        Self {
            tracks,
            artists,
            playlists,
            uploader,
            deleter,
            cascader,
        }
    }

    /// Upload a batch that must yield at least one key
    async fn upload_required(&self, files: Vec<StagedFile>) -> Result<UploadedMedia, AppError> {
        if files.is_empty() {
            return Err(AppError::MissingMedia(MISSING_MEDIA.to_string()));
        }
        self.upload(files).await
    }

    async fn upload(&self, files: Vec<StagedFile>) -> Result<UploadedMedia, AppError> {
        let media = self.uploader.upload(files).await.map_err(|e| {
            tracing::error!(error = %e, "Media upload failed");
            AppError::Upload(UPLOAD_FAILED.to_string())
        })?;

        if media.is_empty() {
            return Err(AppError::Upload(UPLOAD_FAILED.to_string()));
        }
        Ok(media)
    }

    /// Delete objects a committed row change no longer references
    async fn purge(&self, keys: Vec<Option<String>>) -> Result<(), AppError> {
        self.deleter.delete(keys).await.into_result(CLEANUP_FAILED)
    }

    /// Delete the objects an update is about to replace. On failure the
    /// freshly uploaded objects are left behind and the row is not touched.
    async fn replace(&self, old_keys: Vec<Option<String>>, fresh: &UploadedMedia) -> Result<(), AppError> {
        if let Err(e) = self.purge(old_keys).await {
            tracing::warn!(
                audio_key = ?fresh.audio_key,
                image_key = ?fresh.image_key,
                "Update aborted, new objects left unreferenced"
            );
            return Err(e);
        }
        Ok(())
    }

    /// Artists and playlists carry no audio; drop an audio file sent with them
    async fn discard_audio(&self, media: &UploadedMedia) {
        if media.audio_key.is_none() {
            return;
        }
        let report = self.deleter.delete(vec![media.audio_key.clone()]).await;
        if !report.is_clean() {
            tracing::warn!(failed_keys = ?report.failed_keys(), "Unused audio upload not removed");
        }
    }
}

/// Old key of a slot the new batch fills
fn replaced(old: Option<String>, new: Option<&str>) -> Option<String> {
    new.and(old)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaced_only_for_filled_slots() {
        assert_eq!(replaced(Some("old.png".to_string()), Some("new.png")), Some("old.png".to_string()));
        assert_eq!(replaced(Some("old.png".to_string()), None), None);
        assert_eq!(replaced(None, Some("new.png")), None);
    }
}
