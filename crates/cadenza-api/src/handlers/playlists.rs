use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::{Envelope, MessageResponse};
use crate::state::AppState;
use crate::utils::multipart::{read_multipart, FormFields};
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use cadenza_core::models::{visibility_message, PlaylistFields, SetSongsRequest, SetVisibilityRequest};
use cadenza_core::AppError;
use std::sync::Arc;
use validator::Validate;

fn playlist_fields(form: &FormFields) -> Result<PlaylistFields, AppError> {
    let fields = PlaylistFields {
        name: form.required_text(&["name"])?,
        song_ids: form.ids(&["songIds", "songs"])?,
        visible: form.flag(&["visible", "show"])?,
    };
    fields.validate()?;
    Ok(fields)
}

#[utoipa::path(
    get,
    path = "/playlists",
    tag = "playlists",
    responses(
        (status = 200, description = "All playlists"),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
pub async fn list_playlists(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    let playlists = state.catalogue.list_playlists().await?;
    Ok(Envelope::ok(playlists).into_response())
}

#[utoipa::path(
    get,
    path = "/playlists/favourites",
    tag = "playlists",
    responses(
        (status = 200, description = "Visible playlists"),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
pub async fn favourite_playlists(
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let playlists = state.catalogue.favourite_playlists().await?;
    Ok(Envelope::ok(playlists).into_response())
}

#[utoipa::path(
    get,
    path = "/playlists/{id}/tracks",
    tag = "playlists",
    params(("id" = i32, Path, description = "Playlist ID")),
    responses(
        (status = 200, description = "Tracks referenced by the playlist"),
        (status = 404, description = "Playlist not found or empty", body = ErrorResponse)
    )
)]
pub async fn playlist_tracks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, HttpAppError> {
    let tracks = state.catalogue.playlist_tracks(id).await?;
    Ok(Envelope::ok(tracks).into_response())
}

#[utoipa::path(
    post,
    path = "/admin/playlists",
    tag = "admin",
    request_body(content_type = "multipart/form-data", description = "Playlist fields plus a cover image"),
    responses(
        (status = 200, description = "Playlist created"),
        (status = 404, description = "Missing Media File", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "create_playlist"))]
pub async fn create_playlist(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let mut form = read_multipart(multipart, &state.uploads).await?;
    let fields = playlist_fields(&form.fields)?;
    let playlist = state.lifecycle.create_playlist(fields, form.take_files()).await?;

    Ok(Envelope::with_row("Successfully Added Playlist", vec![playlist]).into_response())
}

#[utoipa::path(
    put,
    path = "/admin/playlists/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Playlist ID")),
    request_body(content_type = "multipart/form-data", description = "Playlist fields, optionally with a new cover image"),
    responses(
        (status = 200, description = "Playlist updated", body = MessageResponse),
        (status = 404, description = "Playlist not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(playlist_id = id, operation = "update_playlist"))]
pub async fn update_playlist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let mut form = read_multipart(multipart, &state.uploads).await?;
    let fields = playlist_fields(&form.fields)?;
    state.lifecycle.update_playlist(id, fields, form.take_files()).await?;

    Ok(Envelope::ok("Playlist Updated Successfully").into_response())
}

#[utoipa::path(
    put,
    path = "/admin/playlists/{id}/songs",
    tag = "admin",
    params(("id" = i32, Path, description = "Playlist ID")),
    request_body = SetSongsRequest,
    responses(
        (status = 200, description = "Song list replaced", body = MessageResponse),
        (status = 404, description = "Playlist not found", body = ErrorResponse)
    )
)]
pub async fn set_playlist_songs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<SetSongsRequest>,
) -> Result<Response, HttpAppError> {
    state.lifecycle.set_playlist_songs(id, &request.song_ids).await?;
    Ok(Envelope::ok("Playlist updated Successfully").into_response())
}

#[utoipa::path(
    put,
    path = "/admin/playlists/{id}/visibility",
    tag = "admin",
    params(("id" = i32, Path, description = "Playlist ID")),
    request_body = SetVisibilityRequest,
    responses(
        (status = 200, description = "Visibility changed", body = MessageResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    )
)]
pub async fn set_playlist_visibility(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<SetVisibilityRequest>,
) -> Result<Response, HttpAppError> {
    state
        .lifecycle
        .set_playlist_visibility(id, request.visible)
        .await?;
    Ok(Envelope::ok(visibility_message(request.visible)).into_response())
}

#[utoipa::path(
    delete,
    path = "/admin/playlists/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Playlist ID")),
    responses(
        (status = 200, description = "Playlist and cover deleted", body = MessageResponse),
        (status = 400, description = "Row deleted, image cleanup failed", body = ErrorResponse),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(playlist_id = id, operation = "delete_playlist"))]
pub async fn delete_playlist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, HttpAppError> {
    state.lifecycle.delete_playlist(id).await?;
    Ok(Envelope::ok("Data Deleted Successfully").into_response())
}
