use cadenza_core::models::TermField;
use cadenza_core::AppError;
use cadenza_db::TrackStore;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;

/// Rewrite `old` to `new` in the first slot holding it.
///
/// Later duplicates of `old` stay as they are. Returns `None` when `old` does
/// not occur.
pub fn replace_first_occurrence(terms: &[String], old: &str, new: &str) -> Option<Vec<String>> {
    let index = terms.iter().position(|term| term == old)?;
    let mut renamed = terms.to_vec();
    renamed[index] = new.to_string();
    Some(renamed)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    /// Tracks whose array held the old label
    pub matched: usize,
    /// Rows the store reported as rewritten
    pub updated: u64,
}

/// Propagates a label rename into the denormalized arrays on `tracks`.
///
/// Not atomic: if a rewrite fails, rows already rewritten keep the new label.
#[derive(Clone)]
pub struct TaxonomyRenameCascader {
    tracks: Arc<dyn TrackStore>,
    concurrency: usize,
}

impl TaxonomyRenameCascader {
    pub fn new(tracks: Arc<dyn TrackStore>, concurrency: usize) -> Self {
        Self {
            tracks,
            concurrency: concurrency.max(1),
        }
    }

    #[tracing::instrument(skip(self), fields(column = field.column()))]
    pub async fn cascade(
        &self,
        field: TermField,
        old: &str,
        new: &str,
    ) -> Result<CascadeReport, AppError> {
        let rows = self.tracks.find_containing(field, old).await?;

        let rewrites: Vec<(i32, Vec<String>)> = rows
            .into_iter()
            .filter_map(|row| replace_first_occurrence(&row.terms, old, new).map(|terms| (row.id, terms)))
            .collect();
        let matched = rewrites.len();

        // Every rewrite runs to completion before the first error is reported
        let results: Vec<Result<u64, AppError>> = stream::iter(rewrites)
            .map(|(id, terms)| {
                let tracks = self.tracks.clone();
                async move { tracks.replace_terms(field, id, &terms).await }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut updated = 0;
        for result in results {
            updated += result?;
        }

        tracing::info!(matched, updated, "Rename cascaded into tracks");

        Ok(CascadeReport { matched, updated })
    }
}
