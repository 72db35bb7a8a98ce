use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::{Envelope, MessageResponse};
use crate::state::AppState;
use crate::utils::multipart::{read_multipart, FormFields};
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use cadenza_core::models::{visibility_message, SetVisibilityRequest, TrackFields};
use cadenza_core::AppError;
use std::sync::Arc;
use validator::Validate;

/// Track columns from the admin form. List fields take a JSON array or CSV.
fn track_fields(form: &FormFields) -> Result<TrackFields, AppError> {
    let fields = TrackFields {
        title: form.required_text(&["title", "musicTitle"])?,
        album_title: form.text(&["albumTitle"]).unwrap_or_default(),
        artists: form.list(&["artists", "artist"])?,
        genre: form.list(&["genre"])?,
        category: form.list(&["category"])?,
        visible: form.flag(&["visible", "show"])?,
        duration: form.number(&["duration"])?,
    };
    fields.validate()?;
    Ok(fields)
}

#[utoipa::path(
    get,
    path = "/tracks",
    tag = "tracks",
    responses(
        (status = 200, description = "All tracks, without object keys"),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
pub async fn list_tracks(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    let tracks = state.catalogue.list_tracks().await?;
    Ok(Envelope::ok(tracks).into_response())
}

#[utoipa::path(
    get,
    path = "/tracks/details",
    tag = "tracks",
    responses(
        (status = 200, description = "Shuffled tracks with artist, genre and category lists"),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
pub async fn catalogue_details(
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let details = state.catalogue.details().await?;
    Ok(Envelope::ok(details).into_response())
}

#[utoipa::path(
    get,
    path = "/albums/{name}",
    tag = "tracks",
    params(("name" = String, Path, description = "Album title")),
    responses(
        (status = 200, description = "Visible tracks of the album"),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
pub async fn album_tracks(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, HttpAppError> {
    let tracks = state.catalogue.album_tracks(&name).await?;
    Ok(Envelope::ok(tracks).into_response())
}

#[utoipa::path(
    get,
    path = "/artists/by-name/{name}/tracks",
    tag = "tracks",
    params(("name" = String, Path, description = "Artist name")),
    responses(
        (status = 200, description = "Visible tracks crediting the artist"),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
pub async fn artist_tracks(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, HttpAppError> {
    let tracks = state.catalogue.artist_tracks(&name).await?;
    Ok(Envelope::ok(tracks).into_response())
}

#[utoipa::path(
    get,
    path = "/tracks/{id}/image-key",
    tag = "tracks",
    params(("id" = i32, Path, description = "Track ID")),
    responses(
        (status = 200, description = "Object key of the cover image", body = MessageResponse),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
pub async fn track_image_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, HttpAppError> {
    let key = state.catalogue.track_image_key(id).await?;
    Ok(Envelope::ok(key).into_response())
}

#[utoipa::path(
    get,
    path = "/tracks/{id}/audio-key",
    tag = "tracks",
    params(("id" = i32, Path, description = "Track ID")),
    responses(
        (status = 200, description = "Object key of the audio file", body = MessageResponse),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
pub async fn track_audio_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, HttpAppError> {
    let key = state.catalogue.track_audio_key(id).await?;
    Ok(Envelope::ok(key).into_response())
}

#[utoipa::path(
    post,
    path = "/admin/tracks",
    tag = "admin",
    request_body(content_type = "multipart/form-data", description = "Track fields plus audio and image files"),
    responses(
        (status = 200, description = "Track created"),
        (status = 404, description = "No file supplied", body = ErrorResponse),
        (status = 415, description = "Mime type not supported", body = ErrorResponse),
        (status = 500, description = "Upload or insert failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "create_track"))]
pub async fn create_track(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let mut form = read_multipart(multipart, &state.uploads).await?;
    let fields = track_fields(&form.fields)?;
    let track = state.lifecycle.create_track(fields, form.take_files()).await?;

    Ok(Envelope::with_row("Done Successfully", vec![track]).into_response())
}

#[utoipa::path(
    put,
    path = "/admin/tracks/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Track ID")),
    request_body(content_type = "multipart/form-data", description = "Track fields, optionally with replacement files"),
    responses(
        (status = 200, description = "Track updated", body = MessageResponse),
        (status = 400, description = "Old files could not be removed", body = ErrorResponse),
        (status = 404, description = "Track not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(track_id = id, operation = "update_track"))]
pub async fn update_track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let mut form = read_multipart(multipart, &state.uploads).await?;
    let fields = track_fields(&form.fields)?;
    state.lifecycle.update_track(id, fields, form.take_files()).await?;

    Ok(Envelope::ok("Updated data successfully").into_response())
}

#[utoipa::path(
    put,
    path = "/admin/tracks/{id}/visibility",
    tag = "admin",
    params(("id" = i32, Path, description = "Track ID")),
    request_body = SetVisibilityRequest,
    responses(
        (status = 200, description = "Visibility changed", body = MessageResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    )
)]
pub async fn set_track_visibility(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<SetVisibilityRequest>,
) -> Result<Response, HttpAppError> {
    state.lifecycle.set_track_visibility(id, request.visible).await?;
    Ok(Envelope::ok(visibility_message(request.visible)).into_response())
}

#[utoipa::path(
    delete,
    path = "/admin/tracks/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Track ID")),
    responses(
        (status = 200, description = "Track and its files deleted", body = MessageResponse),
        (status = 400, description = "Row deleted, file cleanup failed", body = ErrorResponse),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(track_id = id, operation = "delete_track"))]
pub async fn delete_track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, HttpAppError> {
    state.lifecycle.delete_track(id).await?;
    Ok(Envelope::ok("Data Deleted Successfully").into_response())
}
