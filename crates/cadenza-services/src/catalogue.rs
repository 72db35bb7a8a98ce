//! Read side of the catalogue: listings served to the player.

use cadenza_core::models::{ArtistSummary, CatalogueDetails, Playlist, TaxonomyKind, Track, TrackSummary};
use cadenza_core::AppError;
use cadenza_db::{ArtistStore, PlaylistStore, TaxonomyStore, TrackStore};
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Listings answer "No Data Found" rather than an empty list
pub fn require_rows<T>(rows: Vec<T>) -> Result<Vec<T>, AppError> {
    if rows.is_empty() {
        return Err(AppError::NotFound("No Data Found".to_string()));
    }
    Ok(rows)
}

fn require_key(key: Option<String>) -> Result<String, AppError> {
    key.ok_or_else(|| AppError::NotFound("No Data Found".to_string()))
}

#[derive(Clone)]
pub struct CatalogueService {
    tracks: Arc<dyn TrackStore>,
    artists: Arc<dyn ArtistStore>,
    taxonomy: Arc<dyn TaxonomyStore>,
    playlists: Arc<dyn PlaylistStore>,
}

impl CatalogueService {
    pub fn new(
        tracks: Arc<dyn TrackStore>,
        artists: Arc<dyn ArtistStore>,
        taxonomy: Arc<dyn TaxonomyStore>,
        playlists: Arc<dyn PlaylistStore>,
    ) -> Self {
        Self {
            tracks,
            artists,
            taxonomy,
            playlists,
        }
    }

    pub async fn list_tracks(&self) -> Result<Vec<TrackSummary>, AppError> {
        let tracks = require_rows(self.tracks.list().await?)?;
        Ok(tracks.into_iter().map(TrackSummary::from).collect())
    }

    /// Every track in random order, with the label lists the player filters by
    pub async fn details(&self) -> Result<CatalogueDetails, AppError> {
        let mut tracks = require_rows(self.tracks.list().await?)?;
        tracks.shuffle(&mut rand::rng());

        let artists = self.artists.list().await?;
        let genres = self.taxonomy.list(TaxonomyKind::Genre).await?;
        let categories = self.taxonomy.list(TaxonomyKind::Category).await?;

        Ok(CatalogueDetails {
            tracks,
            artists: artists.into_iter().map(ArtistSummary::from).collect(),
            genres,
            categories,
        })
    }

    pub async fn album_tracks(&self, album_title: &str) -> Result<Vec<Track>, AppError> {
        require_rows(self.tracks.list_by_album(album_title).await?)
    }

    pub async fn artist_tracks(&self, artist: &str) -> Result<Vec<Track>, AppError> {
        require_rows(self.tracks.list_by_artist(artist).await?)
    }

    pub async fn track_image_key(&self, id: i32) -> Result<String, AppError> {
        let track = self.tracks.get(id).await?;
        require_key(track.and_then(|t| t.image_key))
    }

    pub async fn track_audio_key(&self, id: i32) -> Result<String, AppError> {
        let track = self.tracks.get(id).await?;
        require_key(track.and_then(|t| t.audio_key))
    }

    pub async fn list_artists(&self) -> Result<Vec<ArtistSummary>, AppError> {
        let artists = require_rows(self.artists.list().await?)?;
        Ok(artists.into_iter().map(ArtistSummary::from).collect())
    }

    pub async fn artist_image_key(&self, id: i32) -> Result<String, AppError> {
        let artist = self.artists.get(id).await?;
        require_key(artist.and_then(|a| a.image_key))
    }

    pub async fn artist_image_key_by_name(&self, name: &str) -> Result<String, AppError> {
        let artist = self.artists.find_by_name(name).await?;
        require_key(artist.and_then(|a| a.image_key))
    }

    pub async fn list_playlists(&self) -> Result<Vec<Playlist>, AppError> {
        require_rows(self.playlists.list().await?)
    }

    pub async fn favourite_playlists(&self) -> Result<Vec<Playlist>, AppError> {
        require_rows(self.playlists.list_visible().await?)
    }

    /// Tracks referenced by a playlist; ids of deleted tracks are skipped
    pub async fn playlist_tracks(&self, id: i32) -> Result<Vec<Track>, AppError> {
        let playlist = self
            .playlists
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Playlist not found".to_string()))?;

        require_rows(self.tracks.list_by_ids(&playlist.song_ids).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        track_fields, MockArtistStore, MockPlaylistStore, MockTaxonomyStore, MockTrackStore,
    };
    use cadenza_core::models::PlaylistFields;

    fn service(tracks: Arc<MockTrackStore>, playlists: Arc<MockPlaylistStore>) -> CatalogueService {
        CatalogueService::new(
            tracks,
            Arc::new(MockArtistStore::new()),
            Arc::new(MockTaxonomyStore::new()),
            playlists,
        )
    }

    #[tokio::test]
    async fn test_empty_listing_is_no_data_found() {
        let catalogue = service(Arc::new(MockTrackStore::new()), Arc::new(MockPlaylistStore::new()));

        let err = catalogue.list_tracks().await.unwrap_err();
        assert_eq!(err.to_string(), "Not found: No Data Found");
        assert!(matches!(catalogue.details().await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_album_listing_only_returns_visible_tracks() {
        let tracks = Arc::new(MockTrackStore::new());
        let mut shown = track_fields("Shown");
        shown.album_title = "Colours".to_string();
        shown.visible = true;
        let mut hidden = track_fields("Hidden");
        hidden.album_title = "Colours".to_string();
        tracks.seed(&shown, Some("a.mp3"), Some("a.png"));
        tracks.seed(&hidden, Some("b.mp3"), Some("b.png"));

        let catalogue = service(tracks, Arc::new(MockPlaylistStore::new()));
        let album = catalogue.album_tracks("Colours").await.unwrap();

        assert_eq!(album.len(), 1);
        assert_eq!(album[0].title, "Shown");
    }

    #[tokio::test]
    async fn test_key_lookup_requires_key() {
        let tracks = Arc::new(MockTrackStore::new());
        let with_audio = tracks.seed(&track_fields("One"), Some("one.mp3"), None);

        let catalogue = service(tracks, Arc::new(MockPlaylistStore::new()));
        assert_eq!(catalogue.track_audio_key(with_audio.id).await.unwrap(), "one.mp3");
        assert!(matches!(
            catalogue.track_image_key(with_audio.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(catalogue.track_audio_key(99).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_playlist_tracks_skip_dangling_ids() {
        let tracks = Arc::new(MockTrackStore::new());
        let one = tracks.seed(&track_fields("One"), Some("one.mp3"), None);
        let playlists = Arc::new(MockPlaylistStore::new());
        let playlist = playlists.seed(
            &PlaylistFields {
                name: "Mix".to_string(),
                song_ids: vec![one.id, 404],
                visible: true,
            },
            None,
        );

        let catalogue = service(tracks, playlists);
        let listed = catalogue.playlist_tracks(playlist.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, one.id);
        assert!(matches!(catalogue.playlist_tracks(999).await, Err(AppError::NotFound(_))));
    }
}
