//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use cadenza_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Room for the text fields and multipart framing around two files
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(handlers::health::status))
        .route("/tracks", get(handlers::tracks::list_tracks))
        .route("/tracks/details", get(handlers::tracks::catalogue_details))
        .route("/tracks/{id}/image-key", get(handlers::tracks::track_image_key))
        .route("/tracks/{id}/audio-key", get(handlers::tracks::track_audio_key))
        .route("/albums/{name}", get(handlers::tracks::album_tracks))
        .route("/artists", get(handlers::artists::list_artists))
        .route("/artists/by-name/{name}/tracks", get(handlers::tracks::artist_tracks))
        .route("/artists/{id}/image-key", get(handlers::artists::artist_image_key))
        .route(
            "/artists/by-name/{name}/image",
            get(handlers::media::artist_image_by_name),
        )
        .route("/image/{key}", get(handlers::media::download_image))
        .route("/audio/{key}", get(handlers::media::download_audio))
        .route("/taxonomy/{kind}", get(handlers::taxonomy::list_terms))
        .route("/playlists", get(handlers::playlists::list_playlists))
        .route(
            "/playlists/favourites",
            get(handlers::playlists::favourite_playlists),
        )
        .route("/playlists/{id}/tracks", get(handlers::playlists::playlist_tracks))
        .route("/broadcasts", get(handlers::notifications::list_broadcasts))
        .route("/broadcasts/since", get(handlers::notifications::broadcasts_since))
        .route(
            "/subscriptions",
            post(handlers::notifications::subscribe).delete(handlers::notifications::unsubscribe),
        )
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/tracks", post(handlers::tracks::create_track))
        .route(
            "/admin/tracks/{id}",
            put(handlers::tracks::update_track).delete(handlers::tracks::delete_track),
        )
        .route(
            "/admin/tracks/{id}/visibility",
            put(handlers::tracks::set_track_visibility),
        )
        .route("/admin/artists", post(handlers::artists::create_artist))
        .route(
            "/admin/artists/{id}",
            put(handlers::artists::update_artist).delete(handlers::artists::delete_artist),
        )
        .route(
            "/admin/artists/{id}/visibility",
            put(handlers::artists::set_artist_visibility),
        )
        .route("/admin/taxonomy/{kind}", post(handlers::taxonomy::create_terms))
        .route(
            "/admin/taxonomy/{kind}/{id}",
            put(handlers::taxonomy::update_term).delete(handlers::taxonomy::delete_term),
        )
        .route(
            "/admin/taxonomy/{kind}/{id}/visibility",
            put(handlers::taxonomy::set_term_visibility),
        )
        .route("/admin/playlists", post(handlers::playlists::create_playlist))
        .route(
            "/admin/playlists/{id}",
            put(handlers::playlists::update_playlist).delete(handlers::playlists::delete_playlist),
        )
        .route(
            "/admin/playlists/{id}/visibility",
            put(handlers::playlists::set_playlist_visibility),
        )
        .route(
            "/admin/playlists/{id}/songs",
            put(handlers::playlists::set_playlist_songs),
        )
        .route("/admin/broadcasts", post(handlers::notifications::create_broadcast))
        .route(
            "/admin/broadcasts/{id}",
            axum::routing::delete(handlers::notifications::delete_broadcast),
        )
}

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Per-file limits are enforced while staging; this caps the whole body
    let body_limit = config
        .max_upload_size_bytes()
        .saturating_mul(2)
        .saturating_add(FORM_OVERHEAD_BYTES);

    let app = public_routes()
        .merge(admin_routes())
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
