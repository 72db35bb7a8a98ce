use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::{Envelope, MessageResponse};
use crate::state::AppState;
use crate::utils::multipart::read_multipart;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Response},
};
use cadenza_core::models::{BroadcastDraft, SubscribeRequest, UnsubscribeRequest};
use cadenza_services::SubscribeOutcome;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use validator::Validate;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SinceQuery {
    /// Endpoint of the subscription asking
    pub endpoint: String,
}

#[utoipa::path(
    get,
    path = "/broadcasts",
    tag = "notifications",
    responses(
        (status = 200, description = "All broadcasts, without image keys"),
        (status = 404, description = "No Data Found", body = ErrorResponse)
    )
)]
pub async fn list_broadcasts(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    let broadcasts = state.notifications.list_broadcasts().await?;
    Ok(Envelope::ok(broadcasts).into_response())
}

#[utoipa::path(
    get,
    path = "/broadcasts/since",
    tag = "notifications",
    params(SinceQuery),
    responses(
        (status = 200, description = "Broadcasts sent since the subscription was made, newest first"),
        (status = 404, description = "Unknown subscription or nothing sent since", body = ErrorResponse)
    )
)]
pub async fn broadcasts_since(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SinceQuery>,
) -> Result<Response, HttpAppError> {
    let broadcasts = state
        .notifications
        .broadcasts_since_subscription(&query.endpoint)
        .await?;
    Ok(Envelope::ok(broadcasts).into_response())
}

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "notifications",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscribed, or already subscribed", body = MessageResponse),
        (status = 400, description = "Invalid subscription", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "subscribe"))]
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SubscribeRequest>,
) -> Result<Response, HttpAppError> {
    request.subscription.validate()?;
    let message = match state.notifications.subscribe(request.subscription).await? {
        SubscribeOutcome::Created(_) => "Subscribed",
        SubscribeOutcome::AlreadySubscribed => "Already Subscribed",
    };
    Ok(Envelope::ok(message).into_response())
}

#[utoipa::path(
    delete,
    path = "/subscriptions",
    tag = "notifications",
    request_body = UnsubscribeRequest,
    responses(
        (status = 200, description = "Unsubscribed", body = MessageResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "unsubscribe"))]
pub async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UnsubscribeRequest>,
) -> Result<Response, HttpAppError> {
    state.notifications.unsubscribe(&request.endpoint).await?;
    Ok(Envelope::ok("Unsubscribed").into_response())
}

/// Store an announcement and push it to every subscription. `rowData` holds
/// the stored broadcast and one delivery outcome per subscription.
#[utoipa::path(
    post,
    path = "/admin/broadcasts",
    tag = "admin",
    request_body(content_type = "multipart/form-data", description = "title, body, url and an image file"),
    responses(
        (status = 200, description = "Broadcast stored and pushed"),
        (status = 404, description = "Missing media File", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "broadcast"))]
pub async fn create_broadcast(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let mut form = read_multipart(multipart, &state.uploads).await?;
    let draft = BroadcastDraft {
        title: form.fields.required_text(&["title"])?,
        body: form.fields.text(&["body"]).unwrap_or_default(),
        url: form.fields.text(&["url"]).filter(|url| !url.is_empty()),
    };
    draft.validate()?;

    let report = state
        .notifications
        .broadcast(draft, form.take_files())
        .await?;

    tracing::info!(
        broadcast_id = report.broadcast.id,
        delivered = report.delivered(),
        failed = report.failed(),
        "Broadcast dispatched"
    );

    Ok(Envelope::with_row("Successfully Broadcasted", report).into_response())
}

#[utoipa::path(
    delete,
    path = "/admin/broadcasts/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "Broadcast ID")),
    responses(
        (status = 200, description = "Broadcast and image deleted", body = MessageResponse),
        (status = 400, description = "Row deleted, image cleanup failed", body = ErrorResponse),
        (status = 404, description = "Broadcast not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(broadcast_id = id, operation = "delete_broadcast"))]
pub async fn delete_broadcast(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, HttpAppError> {
    state.notifications.delete_broadcast(id).await?;
    Ok(Envelope::ok("Data Deleted Successfully").into_response())
}
