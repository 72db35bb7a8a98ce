//! File Batch Deleter
//!
//! Best-effort removal of object keys released by a committed row change.
//! It never fails as a whole: each failed delete is recorded in the report.

use cadenza_core::AppError;
use cadenza_storage::Storage;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Deletes actually issued (absent keys are not counted)
    pub attempted: usize,
    pub errors: Vec<DeletionFailure>,
}

impl DeletionReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn failed_keys(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.key.clone()).collect()
    }

    /// `MediaCleanup` when anything failed
    pub fn into_result(self, message: &str) -> Result<(), AppError> {
        if self.is_clean() {
            return Ok(());
        }
        Err(AppError::MediaCleanup {
            message: message.to_string(),
            failed_keys: self.failed_keys(),
        })
    }
}

#[derive(Clone)]
pub struct FileBatchDeleter {
    storage: Arc<dyn Storage>,
    concurrency: usize,
}

impl FileBatchDeleter {
    pub fn new(storage: Arc<dyn Storage>, concurrency: usize) -> Self {
        Self {
            storage,
            concurrency: concurrency.max(1),
        }
    }

    /// Delete every present key concurrently. `None` entries are skipped.
    pub async fn delete(&self, keys: Vec<Option<String>>) -> DeletionReport {
        let keys: Vec<String> = keys.into_iter().flatten().collect();
        let attempted = keys.len();

        let errors: Vec<DeletionFailure> = stream::iter(keys)
            .map(|key| {
                let storage = self.storage.clone();
                async move {
                    match storage.delete(&key).await {
                        Ok(()) => None,
                        Err(e) => {
                            tracing::error!(error = %e, key = %key, "Failed to delete object");
                            Some(DeletionFailure {
                                key,
                                reason: e.to_string(),
                            })
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|failure| async move { failure })
            .collect()
            .await;

        if !errors.is_empty() {
            tracing::warn!(
                attempted,
                failed = errors.len(),
                "Object cleanup incomplete"
            );
        }

        DeletionReport { attempted, errors }
    }
}
