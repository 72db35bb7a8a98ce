//! Object downloads proxied from storage.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use cadenza_core::models::MediaKind;
use cadenza_core::AppError;
use futures::StreamExt;
use std::sync::Arc;

async fn stream_object(
    state: &AppState,
    kind: MediaKind,
    key: &str,
) -> Result<Response, HttpAppError> {
    let stream = state.storage.get_stream(key).await?;

    tracing::debug!(key = %key, kind = %kind, "Proxying object from storage");

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, kind.content_type_for_key(key))
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(Body::from_stream(body_stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

#[utoipa::path(
    get,
    path = "/image/{key}",
    tag = "media",
    params(("key" = String, Path, description = "Object key")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 404, description = "No such object", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "download_image"))]
pub async fn download_image(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, HttpAppError> {
    stream_object(&state, MediaKind::Image, &key).await
}

#[utoipa::path(
    get,
    path = "/audio/{key}",
    tag = "media",
    params(("key" = String, Path, description = "Object key")),
    responses(
        (status = 200, description = "Audio bytes", content_type = "audio/*"),
        (status = 404, description = "No such object", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "download_audio"))]
pub async fn download_audio(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, HttpAppError> {
    stream_object(&state, MediaKind::Audio, &key).await
}

#[utoipa::path(
    get,
    path = "/artists/by-name/{name}/image",
    tag = "media",
    params(("name" = String, Path, description = "Artist name")),
    responses(
        (status = 200, description = "The artist's image", content_type = "image/*"),
        (status = 404, description = "No artist or no image", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "download_artist_image"))]
pub async fn artist_image_by_name(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, HttpAppError> {
    let key = state.catalogue.artist_image_key_by_name(&name).await?;
    stream_object(&state, MediaKind::Image, &key).await
}
