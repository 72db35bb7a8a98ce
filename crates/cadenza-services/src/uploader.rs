//! File Batch Uploader
//!
//! Moves staged request files into object storage and reports which key landed
//! in which slot. A batch fills at most one audio slot and one image slot; the
//! first file of each kind (in request order) gets the slot and later files of
//! the same kind are discarded without being uploaded.

use cadenza_core::models::MediaKind;
use cadenza_storage::{generate_object_key, Storage, StorageError};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::AsyncRead;

/// A request file already written to the staging directory
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFile {
    pub original_name: String,
    pub content_type: String,
    pub path: PathBuf,
}

impl StagedFile {
    pub fn kind(&self) -> MediaKind {
        MediaKind::classify(&self.content_type)
    }
}

/// Object keys produced by one batch, by slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedMedia {
    pub audio_key: Option<String>,
    pub image_key: Option<String>,
}

impl UploadedMedia {
    pub fn is_empty(&self) -> bool {
        self.audio_key.is_none() && self.image_key.is_none()
    }

    pub fn key(&self, kind: MediaKind) -> Option<&str> {
        match kind {
            MediaKind::Audio => self.audio_key.as_deref(),
            MediaKind::Image => self.image_key.as_deref(),
        }
    }

    fn fill(&mut self, kind: MediaKind, key: String) {
        match kind {
            MediaKind::Audio => self.audio_key = Some(key),
            MediaKind::Image => self.image_key = Some(key),
        }
    }
}

/// The batch failed; no keys are handed back. Objects stored by other files of
/// the same batch before the failure are left in place.
#[derive(Debug, thiserror::Error)]
#[error("Upload of {original_name} failed: {source}")]
pub struct UploadFailure {
    pub original_name: String,
    #[source]
    pub source: StorageError,
}

#[derive(Clone)]
pub struct FileBatchUploader {
    storage: Arc<dyn Storage>,
    concurrency: usize,
}

impl FileBatchUploader {
    pub fn new(storage: Arc<dyn Storage>, concurrency: usize) -> Self {
        Self {
            storage,
            concurrency: concurrency.max(1),
        }
    }

    /// Upload a batch. Kept files go up concurrently and the call returns once
    /// all of them have finished.
    #[tracing::instrument(skip(self, files), fields(file_count = files.len()))]
    pub async fn upload(&self, files: Vec<StagedFile>) -> Result<UploadedMedia, UploadFailure> {
        let (kept, discarded) = assign_slots(files);

        for file in discarded {
            tracing::warn!(
                original_name = %file.original_name,
                kind = %file.kind(),
                "Discarding duplicate file for an already filled slot"
            );
            remove_staged(&file).await;
        }

        let results: Vec<Result<(MediaKind, String), UploadFailure>> = stream::iter(kept)
            .map(|file| {
                let storage = self.storage.clone();
                async move { upload_one(storage, file).await }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut media = UploadedMedia::default();
        for result in results {
            let (kind, key) = result?;
            media.fill(kind, key);
        }

        tracing::info!(
            audio_key = ?media.audio_key,
            image_key = ?media.image_key,
            "Upload batch stored"
        );

        Ok(media)
    }
}

/// Split a batch into the first file of each kind and everything else,
/// preserving request order in both halves.
pub(crate) fn assign_slots(files: Vec<StagedFile>) -> (Vec<StagedFile>, Vec<StagedFile>) {
    let mut kept: Vec<StagedFile> = Vec::with_capacity(2);
    let mut discarded = Vec::new();

    for file in files {
        let kind = file.kind();
        if kept.iter().any(|k| k.kind() == kind) {
            discarded.push(file);
        } else {
            kept.push(file);
        }
    }

    (kept, discarded)
}

async fn upload_one(
    storage: Arc<dyn Storage>,
    file: StagedFile,
) -> Result<(MediaKind, String), UploadFailure> {
    let kind = file.kind();
    let key = generate_object_key(&file.original_name);
    let start = std::time::Instant::now();

    let staged = tokio::fs::File::open(&file.path)
        .await
        .map_err(|e| UploadFailure {
            original_name: file.original_name.clone(),
            source: StorageError::IoError(e),
        })?;
    let reader = Box::pin(staged) as Pin<Box<dyn AsyncRead + Send + Unpin>>;

    let key = storage
        .put_stream(&key, &file.content_type, reader)
        .await
        .map_err(|source| {
            tracing::error!(
                error = %source,
                original_name = %file.original_name,
                key = %key,
                "Staged file upload failed"
            );
            UploadFailure {
                original_name: file.original_name.clone(),
                source,
            }
        })?;

    tracing::debug!(
        original_name = %file.original_name,
        key = %key,
        kind = %kind,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Staged file uploaded"
    );

    remove_staged(&file).await;

    Ok((kind, key))
}

async fn remove_staged(file: &StagedFile) {
    if let Err(e) = tokio::fs::remove_file(&file.path).await {
        tracing::warn!(
            error = %e,
            path = %file.path.display(),
            "Failed to remove staged file"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockStorage;
    use tempfile::tempdir;

    async fn stage(dir: &std::path::Path, name: &str, content_type: &str, body: &[u8]) -> StagedFile {
        let path = dir.join(format!("staged-{}", name));
        tokio::fs::write(&path, body).await.unwrap();
        StagedFile {
            original_name: name.to_string(),
            content_type: content_type.to_string(),
            path,
        }
    }

    #[test]
    fn test_assign_slots_first_wins() {
        let file = |name: &str, ct: &str| StagedFile {
            original_name: name.to_string(),
            content_type: ct.to_string(),
            path: PathBuf::from(name),
        };
        let (kept, discarded) = assign_slots(vec![
            file("a.png", "image/png"),
            file("song.mp3", "audio/mpeg"),
            file("b.png", "image/png"),
            file("other.mp3", "audio/mp3"),
        ]);

        let kept: Vec<_> = kept.iter().map(|f| f.original_name.as_str()).collect();
        let discarded: Vec<_> = discarded.iter().map(|f| f.original_name.as_str()).collect();
        assert_eq!(kept, vec!["a.png", "song.mp3"]);
        assert_eq!(discarded, vec!["b.png", "other.mp3"]);
    }

    #[tokio::test]
    async fn test_upload_fills_both_slots_and_clears_staging() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(MockStorage::new());
        let uploader = FileBatchUploader::new(storage.clone(), 4);

        let audio = stage(dir.path(), "song.mp3", "audio/mpeg", b"audio").await;
        let image = stage(dir.path(), "cover.PNG", "image/png", b"image").await;
        let paths = vec![audio.path.clone(), image.path.clone()];

        let media = uploader.upload(vec![audio, image]).await.unwrap();

        let audio_key = media.audio_key.clone().unwrap();
        let image_key = media.image_key.clone().unwrap();
        assert!(audio_key.ends_with(".mp3"));
        assert!(image_key.ends_with(".png"));
        assert_eq!(storage.object(&audio_key).unwrap(), b"audio".to_vec());
        assert_eq!(storage.object(&image_key).unwrap(), b"image".to_vec());

        let mut put_keys = storage.put_keys();
        put_keys.sort();
        let mut expected = vec![audio_key, image_key];
        expected.sort();
        assert_eq!(put_keys, expected);

        for path in paths {
            assert!(!path.exists());
        }
    }

    #[tokio::test]
    async fn test_duplicate_kind_is_never_uploaded() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(MockStorage::new());
        let uploader = FileBatchUploader::new(storage.clone(), 4);

        let first = stage(dir.path(), "first.png", "image/png", b"first").await;
        let second = stage(dir.path(), "second.jpg", "image/jpeg", b"second").await;
        let second_path = second.path.clone();

        let media = uploader.upload(vec![first, second]).await.unwrap();

        assert!(media.audio_key.is_none());
        let image_key = media.image_key.unwrap();
        assert!(image_key.ends_with(".png"));
        assert_eq!(storage.put_keys(), vec![image_key]);
        assert!(!second_path.exists());
    }

    #[tokio::test]
    async fn test_any_failure_fails_the_batch() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(MockStorage::new());
        storage.fail_puts_with_extension("mp3");
        let uploader = FileBatchUploader::new(storage.clone(), 4);

        let audio = stage(dir.path(), "song.mp3", "audio/mpeg", b"audio").await;
        let image = stage(dir.path(), "cover.png", "image/png", b"image").await;
        let audio_path = audio.path.clone();

        let err = uploader.upload(vec![audio, image]).await.unwrap_err();
        assert_eq!(err.original_name, "song.mp3");
        // the failed file's staging copy stays for the caller to clean up
        assert!(audio_path.exists());
    }

    #[tokio::test]
    async fn test_missing_staging_file_is_a_failure() {
        let storage = Arc::new(MockStorage::new());
        let uploader = FileBatchUploader::new(storage.clone(), 4);

        let result = uploader
            .upload(vec![StagedFile {
                original_name: "gone.mp3".to_string(),
                content_type: "audio/mpeg".to_string(),
                path: PathBuf::from("/nonexistent/cadenza/gone.mp3"),
            }])
            .await;

        assert!(matches!(
            result,
            Err(UploadFailure { source: StorageError::IoError(_), .. })
        ));
        assert!(storage.put_keys().is_empty());
    }
}
