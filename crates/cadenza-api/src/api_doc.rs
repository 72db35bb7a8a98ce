//! OpenAPI documentation, served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::response;
use cadenza_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cadenza API",
        version = "0.1.0",
        description = "Catalogue administration and playback backend for the Cadenza music player"
    ),
    paths(
        handlers::health::status,
        handlers::tracks::list_tracks,
        handlers::tracks::catalogue_details,
        handlers::tracks::album_tracks,
        handlers::tracks::artist_tracks,
        handlers::tracks::track_image_key,
        handlers::tracks::track_audio_key,
        handlers::tracks::create_track,
        handlers::tracks::update_track,
        handlers::tracks::set_track_visibility,
        handlers::tracks::delete_track,
        handlers::artists::list_artists,
        handlers::artists::artist_image_key,
        handlers::artists::create_artist,
        handlers::artists::update_artist,
        handlers::artists::set_artist_visibility,
        handlers::artists::delete_artist,
        handlers::taxonomy::list_terms,
        handlers::taxonomy::create_terms,
        handlers::taxonomy::update_term,
        handlers::taxonomy::set_term_visibility,
        handlers::taxonomy::delete_term,
        handlers::playlists::list_playlists,
        handlers::playlists::favourite_playlists,
        handlers::playlists::playlist_tracks,
        handlers::playlists::create_playlist,
        handlers::playlists::update_playlist,
        handlers::playlists::set_playlist_songs,
        handlers::playlists::set_playlist_visibility,
        handlers::playlists::delete_playlist,
        handlers::notifications::list_broadcasts,
        handlers::notifications::broadcasts_since,
        handlers::notifications::subscribe,
        handlers::notifications::unsubscribe,
        handlers::notifications::create_broadcast,
        handlers::notifications::delete_broadcast,
        handlers::media::download_image,
        handlers::media::download_audio,
        handlers::media::artist_image_by_name,
    ),
    components(schemas(
        error::ErrorResponse,
        response::MessageResponse,
        models::Track,
        models::TrackSummary,
        models::CatalogueDetails,
        models::Artist,
        models::ArtistSummary,
        models::TaxonomyKind,
        models::TaxonomyTerm,
        models::CreateTermsRequest,
        models::UpdateTermRequest,
        models::Playlist,
        models::PlaylistSummary,
        models::SetSongsRequest,
        models::SetVisibilityRequest,
        models::Subscription,
        models::NewSubscription,
        models::SubscribeRequest,
        models::UnsubscribeRequest,
        models::Broadcast,
        models::BroadcastSummary,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "tracks", description = "Track listings and object keys"),
        (name = "artists", description = "Artist listings"),
        (name = "taxonomy", description = "Genres and categories"),
        (name = "playlists", description = "Playlist listings"),
        (name = "notifications", description = "Push subscriptions and broadcasts"),
        (name = "media", description = "Image and audio downloads"),
        (name = "admin", description = "Catalogue administration"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_admin_routes() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/admin/tracks"));
        assert!(spec.paths.paths.contains_key("/admin/taxonomy/{kind}/{id}"));
        assert!(spec.paths.paths.contains_key("/broadcasts/since"));
    }
}
