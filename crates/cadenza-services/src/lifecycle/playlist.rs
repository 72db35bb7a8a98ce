use super::LifecycleCoordinator;
use crate::uploader::StagedFile;
use cadenza_core::models::{PlaylistFields, PlaylistSummary};
use cadenza_core::AppError;

impl LifecycleCoordinator {
    #[tracing::instrument(skip(self, fields, files), fields(name = %fields.name, file_count = files.len()))]
    pub async fn create_playlist(
        &self,
        fields: PlaylistFields,
        files: Vec<StagedFile>,
    ) -> Result<PlaylistSummary, AppError> {
        let media = self.upload_required(files).await?;
        self.discard_audio(&media).await;

        let playlist = self
            .playlists
            .insert(&fields, media.image_key.as_deref())
            .await?
            .ok_or_else(|| AppError::Persistence("Couldn't Add Playlist to DB".to_string()))?;

        tracing::info!(playlist_id = playlist.id, "Playlist created");
        Ok(playlist.into())
    }

    #[tracing::instrument(skip(self, fields, files), fields(playlist_id = id, file_count = files.len()))]
    pub async fn update_playlist(
        &self,
        id: i32,
        fields: PlaylistFields,
        files: Vec<StagedFile>,
    ) -> Result<(), AppError> {
        let image_key = if files.is_empty() {
            None
        } else {
            let stored = self
                .playlists
                .get(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Playlist {} not found", id)))?;

            let media = self.upload(files).await?;
            self.discard_audio(&media).await;
            if media.image_key.is_some() {
                self.replace(vec![stored.image_key], &media).await?;
            }
            media.image_key
        };

        if self
            .playlists
            .update(id, &fields, image_key.as_deref())
            .await?
            == 0
        {
            return Err(AppError::NotFound(format!("Playlist {} not found", id)));
        }
        Ok(())
    }

    /// Replace the song list. Ids are stored as given.
    pub async fn set_playlist_songs(&self, id: i32, song_ids: &[i32]) -> Result<(), AppError> {
        if self.playlists.set_songs(id, song_ids).await? == 0 {
            return Err(AppError::NotFound(format!("Playlist {} not found", id)));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(playlist_id = id))]
    pub async fn delete_playlist(&self, id: i32) -> Result<(), AppError> {
        let playlist = self
            .playlists
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Playlist {} not found", id)))?;

        self.purge(vec![playlist.image_key]).await
    }

    pub async fn set_playlist_visibility(&self, id: i32, visible: bool) -> Result<(), AppError> {
        if self.playlists.set_visibility(id, visible).await? == 0 {
            return Err(AppError::NotFound(format!("Playlist {} not found", id)));
        }
        Ok(())
    }
}
