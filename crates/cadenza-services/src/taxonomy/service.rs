use super::cascade::{CascadeReport, TaxonomyRenameCascader};
use crate::catalogue::require_rows;
use cadenza_core::models::{TaxonomyKind, TaxonomyTerm};
use cadenza_core::AppError;
use cadenza_db::TaxonomyStore;
use std::sync::Arc;

/// Genre and category administration
#[derive(Clone)]
pub struct TaxonomyService {
    terms: Arc<dyn TaxonomyStore>,
    cascader: TaxonomyRenameCascader,
}

impl TaxonomyService {
    pub fn new(terms: Arc<dyn TaxonomyStore>, cascader: TaxonomyRenameCascader) -> Self {
        Self { terms, cascader }
    }

    /// Insert a batch of labels. Blank labels are dropped.
    #[tracing::instrument(skip(self, labels), fields(kind = %kind))]
    pub async fn create_terms(
        &self,
        kind: TaxonomyKind,
        labels: Vec<String>,
        visible: bool,
    ) -> Result<Vec<TaxonomyTerm>, AppError> {
        let labels: Vec<String> = labels
            .into_iter()
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .collect();
        if labels.is_empty() {
            return Err(AppError::InvalidInput("At least one label is required".to_string()));
        }

        let created = self.terms.insert_many(kind, &labels, visible).await?;
        if created.len() != labels.len() {
            return Err(AppError::Persistence(format!(
                "Failed to add {}: {} of {} stored",
                kind,
                created.len(),
                labels.len()
            )));
        }

        Ok(created)
    }

    pub async fn list_terms(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyTerm>, AppError> {
        require_rows(self.terms.list(kind).await?)
    }

    /// Rename a term and carry the rename into every track using it.
    ///
    /// The label searched for in tracks is `previous` when given, otherwise
    /// the one the row held before this update. No cascade runs when it
    /// equals the new label.
    #[tracing::instrument(skip(self), fields(kind = %kind))]
    pub async fn update_term(
        &self,
        kind: TaxonomyKind,
        id: i32,
        label: &str,
        visible: bool,
        previous: Option<String>,
    ) -> Result<Option<CascadeReport>, AppError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(AppError::InvalidInput("Label cannot be empty".to_string()));
        }

        let stored = self
            .terms
            .rename(kind, id, label, visible)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No {} entry with id {}", kind, id)))?;

        let old = previous.unwrap_or(stored);
        if old == label {
            return Ok(None);
        }

        let report = self.cascader.cascade(kind.track_field(), &old, label).await?;
        Ok(Some(report))
    }

    pub async fn set_term_visibility(
        &self,
        kind: TaxonomyKind,
        id: i32,
        visible: bool,
    ) -> Result<(), AppError> {
        if self.terms.set_visibility(kind, id, visible).await? == 0 {
            return Err(AppError::NotFound(format!("No {} entry with id {}", kind, id)));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(kind = %kind))]
    pub async fn delete_term(&self, kind: TaxonomyKind, id: i32) -> Result<(), AppError> {
        if self.terms.delete(kind, id).await? == 0 {
            return Err(AppError::NotFound(format!("No {} entry with id {}", kind, id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{track_fields, MockTaxonomyStore, MockTrackStore};

    fn service() -> (TaxonomyService, Arc<MockTaxonomyStore>, Arc<MockTrackStore>) {
        let terms = Arc::new(MockTaxonomyStore::new());
        let tracks = Arc::new(MockTrackStore::new());
        let cascader = TaxonomyRenameCascader::new(tracks.clone(), 4);
        (TaxonomyService::new(terms.clone(), cascader), terms, tracks)
    }

    #[tokio::test]
    async fn test_create_requires_labels() {
        let (service, terms, _) = service();

        let err = service
            .create_terms(TaxonomyKind::Genre, vec![" ".to_string()], true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let created = service
            .create_terms(TaxonomyKind::Genre, vec!["Rock".to_string(), "Jazz".to_string()], true)
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(terms.labels(TaxonomyKind::Genre), vec!["Rock", "Jazz"]);
        assert!(terms.labels(TaxonomyKind::Category).is_empty());
    }

    #[tokio::test]
    async fn test_rename_cascades_from_stored_label() {
        let (service, _, tracks) = service();
        let created = service
            .create_terms(TaxonomyKind::Genre, vec!["Rock".to_string()], true)
            .await
            .unwrap();
        let mut fields = track_fields("Song");
        fields.genre = vec!["Rock".to_string(), "Pop".to_string()];
        let track = tracks.seed(&fields, None, None);

        let report = service
            .update_term(TaxonomyKind::Genre, created[0].id, "Classic", true, None)
            .await
            .unwrap();

        assert_eq!(report.unwrap().updated, 1);
        assert_eq!(
            tracks.track(track.id).unwrap().genre,
            vec!["Classic".to_string(), "Pop".to_string()]
        );
    }

    #[tokio::test]
    async fn test_rename_prefers_supplied_previous_label() {
        let (service, _, tracks) = service();
        let created = service
            .create_terms(TaxonomyKind::Category, vec!["Chill".to_string()], true)
            .await
            .unwrap();
        let mut fields = track_fields("Song");
        fields.category = vec!["Lounge".to_string()];
        let track = tracks.seed(&fields, None, None);

        service
            .update_term(
                TaxonomyKind::Category,
                created[0].id,
                "Relax",
                true,
                Some("Lounge".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(tracks.track(track.id).unwrap().category, vec!["Relax".to_string()]);
    }

    #[tokio::test]
    async fn test_rename_of_missing_term_does_not_cascade() {
        let (service, _, tracks) = service();
        let mut fields = track_fields("Song");
        fields.genre = vec!["Rock".to_string()];
        let track = tracks.seed(&fields, None, None);

        let err = service
            .update_term(TaxonomyKind::Genre, 42, "Classic", true, Some("Rock".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(tracks.track(track.id).unwrap().genre, vec!["Rock".to_string()]);
    }

    #[tokio::test]
    async fn test_unchanged_label_skips_cascade() {
        let (service, _, _) = service();
        let created = service
            .create_terms(TaxonomyKind::Genre, vec!["Rock".to_string()], false)
            .await
            .unwrap();

        let report = service
            .update_term(TaxonomyKind::Genre, created[0].id, "Rock", true, None)
            .await
            .unwrap();
        assert!(report.is_none());
    }

    #[tokio::test]
    async fn test_visibility_and_delete_report_missing_rows() {
        let (service, _, _) = service();
        assert!(matches!(
            service.set_term_visibility(TaxonomyKind::Genre, 1, true).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_term(TaxonomyKind::Category, 1).await,
            Err(AppError::NotFound(_))
        ));
    }
}
