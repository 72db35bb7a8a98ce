use super::{replaced, LifecycleCoordinator};
use crate::uploader::StagedFile;
use cadenza_core::models::{TrackFields, TrackSummary};
use cadenza_core::AppError;

impl LifecycleCoordinator {
    /// Store the track's files, then insert the row referencing them
    #[tracing::instrument(skip(self, fields, files), fields(title = %fields.title, file_count = files.len()))]
    pub async fn create_track(
        &self,
        fields: TrackFields,
        files: Vec<StagedFile>,
    ) -> Result<TrackSummary, AppError> {
        let media = self.upload_required(files).await?;

        let track = self
            .tracks
            .insert(&fields, media.audio_key.as_deref(), media.image_key.as_deref())
            .await?
            .ok_or_else(|| AppError::Persistence("Couldn't Add Song to DB".to_string()))?;

        tracing::info!(track_id = track.id, "Track created");
        Ok(track.into())
    }

    /// Update a track's columns, replacing its files when new ones are given.
    ///
    /// Only the slots the new batch fills are replaced; the old objects are
    /// deleted before the row is rewritten.
    #[tracing::instrument(skip(self, fields, files), fields(track_id = id, file_count = files.len()))]
    pub async fn update_track(
        &self,
        id: i32,
        fields: TrackFields,
        files: Vec<StagedFile>,
    ) -> Result<(), AppError> {
        if files.is_empty() {
            return self.write_track(id, &fields, None, None).await;
        }

        let stored = self
            .tracks
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Track {} not found", id)))?;

        let media = self.upload(files).await?;
        self.replace(
            vec![
                replaced(stored.audio_key, media.audio_key.as_deref()),
                replaced(stored.image_key, media.image_key.as_deref()),
            ],
            &media,
        )
        .await?;

        self.write_track(
            id,
            &fields,
            media.audio_key.as_deref(),
            media.image_key.as_deref(),
        )
        .await
    }

    async fn write_track(
        &self,
        id: i32,
        fields: &TrackFields,
        audio_key: Option<&str>,
        image_key: Option<&str>,
    ) -> Result<(), AppError> {
        if self.tracks.update(id, fields, audio_key, image_key).await? == 0 {
            return Err(AppError::NotFound(format!("Track {} not found", id)));
        }
        Ok(())
    }

    /// Delete the row, drop it from playlists, then delete its objects.
    ///
    /// The row stays deleted when the object cleanup fails.
    #[tracing::instrument(skip(self), fields(track_id = id))]
    pub async fn delete_track(&self, id: i32) -> Result<(), AppError> {
        let track = self
            .tracks
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Track {} not found", id)))?;

        match self.playlists.remove_song(id).await {
            Ok(changed) if changed > 0 => {
                tracing::debug!(playlists = changed, "Removed deleted track from playlists")
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to remove deleted track from playlists")
            }
        }

        self.purge(vec![track.audio_key, track.image_key]).await
    }

    pub async fn set_track_visibility(&self, id: i32, visible: bool) -> Result<(), AppError> {
        if self.tracks.set_visibility(id, visible).await? == 0 {
            return Err(AppError::NotFound(format!("Track {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::lifecycle::fixture::fixture;
    use crate::test_helpers::{stage_file, track_fields};
    use cadenza_core::models::PlaylistFields;
    use cadenza_core::AppError;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_stores_returned_keys_and_hides_them() {
        let f = fixture();
        let dir = tempdir().unwrap();
        let audio = stage_file(dir.path(), "song.mp3", "audio/mpeg").await;
        let image = stage_file(dir.path(), "cover.png", "image/png").await;

        let summary = f
            .coordinator
            .create_track(track_fields("Song"), vec![audio, image])
            .await
            .unwrap();

        let stored = f.tracks.track(summary.id).unwrap();
        let audio_key = stored.audio_key.unwrap();
        let image_key = stored.image_key.unwrap();
        let mut put_keys = f.storage.put_keys();
        put_keys.sort();
        let mut row_keys = vec![audio_key.clone(), image_key.clone()];
        row_keys.sort();
        assert_eq!(put_keys, row_keys);
        assert!(audio_key.ends_with(".mp3"));
        assert!(image_key.ends_with(".png"));

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("audioKey").is_none());
        assert!(json.get("imageKey").is_none());
        assert_eq!(json["title"], "Song");
    }

    #[tokio::test]
    async fn test_create_without_files_writes_nothing() {
        let f = fixture();

        let err = f
            .coordinator
            .create_track(track_fields("Song"), vec![])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MissingMedia(_)));
        assert!(f.storage.put_keys().is_empty());
        assert!(f.tracks.rows().is_empty());
    }

    #[tokio::test]
    async fn test_create_upload_failure_inserts_nothing() {
        let f = fixture();
        f.storage.fail_puts_with_extension("mp3");
        let dir = tempdir().unwrap();
        let audio = stage_file(dir.path(), "song.mp3", "audio/mpeg").await;

        let err = f
            .coordinator
            .create_track(track_fields("Song"), vec![audio])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upload(_)));
        assert!(f.tracks.rows().is_empty());
    }

    #[tokio::test]
    async fn test_create_reports_missing_insert_row() {
        let f = fixture();
        f.tracks.fail_inserts();
        let dir = tempdir().unwrap();
        let image = stage_file(dir.path(), "cover.png", "image/png").await;

        let err = f
            .coordinator
            .create_track(track_fields("Song"), vec![image])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_track_touches_no_storage() {
        let f = fixture();

        let err = f.coordinator.delete_track(7).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(f.storage.deleted_keys().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_row_objects_and_playlist_entries() {
        let f = fixture();
        let track = f
            .tracks
            .seed(&track_fields("Song"), Some("1-aa.mp3"), Some("1-bb.png"));
        let other = f.tracks.seed(&track_fields("Other"), None, None);
        let playlist = f.playlists.seed(
            &PlaylistFields {
                name: "Mix".to_string(),
                song_ids: vec![track.id, other.id, track.id],
                visible: true,
            },
            None,
        );

        f.coordinator.delete_track(track.id).await.unwrap();

        assert!(f.tracks.track(track.id).is_none());
        let mut deleted = f.storage.deleted_keys();
        deleted.sort();
        assert_eq!(deleted, vec!["1-aa.mp3".to_string(), "1-bb.png".to_string()]);
        assert_eq!(f.playlists.playlist(playlist.id).unwrap().song_ids, vec![other.id]);
    }

    #[tokio::test]
    async fn test_cleanup_failure_keeps_row_deleted() {
        let f = fixture();
        let track = f
            .tracks
            .seed(&track_fields("Song"), Some("1-aa.mp3"), Some("1-bb.png"));
        f.storage.fail_delete("1-aa.mp3");

        let err = f.coordinator.delete_track(track.id).await.unwrap_err();

        match err {
            AppError::MediaCleanup { failed_keys, .. } => {
                assert_eq!(failed_keys, vec!["1-aa.mp3".to_string()])
            }
            other => panic!("expected MediaCleanup, got {:?}", other),
        }
        assert!(f.tracks.track(track.id).is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_only_uploaded_slots() {
        let f = fixture();
        let track = f
            .tracks
            .seed(&track_fields("Song"), Some("1-aa.mp3"), Some("1-bb.png"));
        let dir = tempdir().unwrap();
        let image = stage_file(dir.path(), "new.jpg", "image/jpeg").await;

        let mut fields = track_fields("Song (Remastered)");
        fields.duration = 201.5;
        f.coordinator
            .update_track(track.id, fields, vec![image])
            .await
            .unwrap();

        let stored = f.tracks.track(track.id).unwrap();
        assert_eq!(stored.title, "Song (Remastered)");
        assert_eq!(stored.audio_key.as_deref(), Some("1-aa.mp3"));
        let image_key = stored.image_key.unwrap();
        assert_ne!(image_key, "1-bb.png");
        assert_eq!(f.storage.put_keys(), vec![image_key]);
        assert_eq!(f.storage.deleted_keys(), vec!["1-bb.png".to_string()]);
    }

    #[tokio::test]
    async fn test_update_of_missing_track_uploads_nothing() {
        let f = fixture();
        let dir = tempdir().unwrap();
        let image = stage_file(dir.path(), "new.jpg", "image/jpeg").await;

        let err = f
            .coordinator
            .update_track(3, track_fields("Song"), vec![image])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(f.storage.put_keys().is_empty());
        assert!(f.storage.deleted_keys().is_empty());
    }

    #[tokio::test]
    async fn test_update_aborts_when_old_object_survives() {
        let f = fixture();
        let track = f
            .tracks
            .seed(&track_fields("Song"), Some("1-aa.mp3"), Some("1-bb.png"));
        f.storage.fail_delete("1-bb.png");
        let dir = tempdir().unwrap();
        let image = stage_file(dir.path(), "new.jpg", "image/jpeg").await;

        let err = f
            .coordinator
            .update_track(track.id, track_fields("Renamed"), vec![image])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MediaCleanup { .. }));
        let stored = f.tracks.track(track.id).unwrap();
        assert_eq!(stored.title, "Song");
        assert_eq!(stored.image_key.as_deref(), Some("1-bb.png"));
    }

    #[tokio::test]
    async fn test_update_without_files_keeps_keys() {
        let f = fixture();
        let track = f
            .tracks
            .seed(&track_fields("Song"), Some("1-aa.mp3"), Some("1-bb.png"));

        f.coordinator
            .update_track(track.id, track_fields("Renamed"), vec![])
            .await
            .unwrap();

        let stored = f.tracks.track(track.id).unwrap();
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.image_key.as_deref(), Some("1-bb.png"));
        assert!(f.storage.deleted_keys().is_empty());

        assert!(matches!(
            f.coordinator.update_track(99, track_fields("Nope"), vec![]).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_visibility_toggle() {
        let f = fixture();
        let track = f.tracks.seed(&track_fields("Song"), None, None);

        f.coordinator.set_track_visibility(track.id, true).await.unwrap();
        assert!(f.tracks.track(track.id).unwrap().visible);

        assert!(matches!(
            f.coordinator.set_track_visibility(99, true).await,
            Err(AppError::NotFound(_))
        ));
    }
}
