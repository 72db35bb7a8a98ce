use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::{Envelope, MessageResponse};
use crate::state::AppState;
use crate::utils::multipart::{read_multipart, FormFields};
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use cadenza_core::models::{visibility_message, ArtistFields, SetVisibilityRequest};
use cadenza_core::AppError;
use cadenza_services::CascadeReport;
use std::sync::Arc;
use validator::Validate;

fn artist_fields(form: &FormFields) -> Result<ArtistFields, AppError> {
    let fields = ArtistFields {
        name: form.required_text(&["name"])?,
        visible: form.flag(&["visible", "show"])?,
    };
    fields.validate()?;
    Ok(fields)
}

#[utoipa::path(
    get,
    path = "/artists",
    tag = "artists",
    responses(
        (status = 200, description = "All artists"),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
pub async fn list_artists(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    let artists = state.catalogue.list_artists().await?;
    Ok(Envelope::ok(artists).into_response())
}

#[utoipa::path(
    get,
    path = "/artists/{id}/image-key",
    tag = "artists",
    params(("id" = i32, Path, description = "Artist ID")),
    responses(
        (status = 200, description = "Object key of the artist image", body = MessageResponse),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
pub async fn artist_image_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, HttpAppError> {
    let key = state.catalogue.artist_image_key(id).await?;
    Ok(Envelope::ok(key).into_response())
}

#[utoipa::path(
    post,
    path = "/admin/artists",
    tag = "admin",
    request_body(content_type = "multipart/form-data", description = "Artist name plus an image file"),
    responses(
        (status = 200, description = "Artist created"),
        (status = 404, description = "No file supplied", body = ErrorResponse),
        (status = 415, description = "Mime type not supported", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "create_artist"))]
pub async fn create_artist(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let mut form = read_multipart(multipart, &state.uploads).await?;
    let fields = artist_fields(&form.fields)?;
    let artist = state.lifecycle.create_artist(fields, form.take_files()).await?;

    Ok(Envelope::with_row("Artist Added Successfully", vec![artist]).into_response())
}

/// Renaming an artist also rewrites the name in every track crediting them.
/// `rowData` reports how many tracks the rename touched.
#[utoipa::path(
    put,
    path = "/admin/artists/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Artist ID")),
    request_body(content_type = "multipart/form-data", description = "Artist fields, an optional previous name and an optional image"),
    responses(
        (status = 200, description = "Artist updated"),
        (status = 400, description = "Old image could not be removed", body = ErrorResponse),
        (status = 404, description = "Artist not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(artist_id = id, operation = "update_artist"))]
pub async fn update_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let mut form = read_multipart(multipart, &state.uploads).await?;
    let fields = artist_fields(&form.fields)?;
    let previous = form
        .fields
        .text(&["previousName", "old"])
        .filter(|name| !name.is_empty());

    let report = state
        .lifecycle
        .update_artist(id, fields, previous, form.take_files())
        .await?;

    Ok(Envelope::<&str, CascadeReport> {
        code: 200,
        message: "Artist Updated Successfully",
        row_data: report,
    }
    .into_response())
}

#[utoipa::path(
    put,
    path = "/admin/artists/{id}/visibility",
    tag = "admin",
    params(("id" = i32, Path, description = "Artist ID")),
    request_body = SetVisibilityRequest,
    responses(
        (status = 200, description = "Visibility changed", body = MessageResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    )
)]
pub async fn set_artist_visibility(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<SetVisibilityRequest>,
) -> Result<Response, HttpAppError> {
    state.lifecycle.set_artist_visibility(id, request.visible).await?;
    Ok(Envelope::ok(visibility_message(request.visible)).into_response())
}

#[utoipa::path(
    delete,
    path = "/admin/artists/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Artist ID")),
    responses(
        (status = 200, description = "Artist and image deleted", body = MessageResponse),
        (status = 400, description = "Row deleted, image cleanup failed", body = ErrorResponse),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(artist_id = id, operation = "delete_artist"))]
pub async fn delete_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, HttpAppError> {
    state.lifecycle.delete_artist(id).await?;
    Ok(Envelope::ok("Data Deleted Successfully").into_response())
}
