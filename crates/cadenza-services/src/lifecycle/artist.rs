use super::LifecycleCoordinator;
use crate::taxonomy::CascadeReport;
use crate::uploader::StagedFile;
use cadenza_core::models::{ArtistFields, ArtistSummary, TermField};
use cadenza_core::AppError;

impl LifecycleCoordinator {
    #[tracing::instrument(skip(self, fields, files), fields(name = %fields.name, file_count = files.len()))]
    pub async fn create_artist(
        &self,
        fields: ArtistFields,
        files: Vec<StagedFile>,
    ) -> Result<ArtistSummary, AppError> {
        let media = self.upload_required(files).await?;
        self.discard_audio(&media).await;

        let artist = self
            .artists
            .insert(&fields, media.image_key.as_deref())
            .await?
            .ok_or_else(|| AppError::Persistence("Couldn't Add Artist to DB".to_string()))?;

        tracing::info!(artist_id = artist.id, "Artist created");
        Ok(artist.into())
    }

    /// Update an artist, replacing its image when one is given, and carry a
    /// name change into every track crediting the artist.
    ///
    /// `previous_name` overrides the stored name as the value searched for in
    /// tracks. Returns the cascade report when the name changed.
    #[tracing::instrument(skip(self, fields, files), fields(artist_id = id, file_count = files.len()))]
    pub async fn update_artist(
        &self,
        id: i32,
        fields: ArtistFields,
        previous_name: Option<String>,
        files: Vec<StagedFile>,
    ) -> Result<Option<CascadeReport>, AppError> {
        let stored = self
            .artists
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Artist {} not found", id)))?;

        let image_key = if files.is_empty() {
            None
        } else {
            let media = self.upload(files).await?;
            self.discard_audio(&media).await;
            if media.image_key.is_some() {
                self.replace(vec![stored.image_key.clone()], &media).await?;
            }
            media.image_key
        };

        if self
            .artists
            .update(id, &fields, image_key.as_deref())
            .await?
            == 0
        {
            return Err(AppError::NotFound(format!("Artist {} not found", id)));
        }

        let old_name = previous_name.unwrap_or(stored.name);
        if old_name == fields.name {
            return Ok(None);
        }

        let report = self
            .cascader
            .cascade(TermField::Artists, &old_name, &fields.name)
            .await?;
        Ok(Some(report))
    }

    #[tracing::instrument(skip(self), fields(artist_id = id))]
    pub async fn delete_artist(&self, id: i32) -> Result<(), AppError> {
        let artist = self
            .artists
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Artist {} not found", id)))?;

        self.purge(vec![artist.image_key]).await
    }

    pub async fn set_artist_visibility(&self, id: i32, visible: bool) -> Result<(), AppError> {
        if self.artists.set_visibility(id, visible).await? == 0 {
            return Err(AppError::NotFound(format!("Artist {} not found", id)));
        }
        Ok(())
    }
}
