use crate::response::{Envelope, MessageResponse};
use axum::response::{IntoResponse, Response};

#[utoipa::path(
    get,
    path = "/status",
    tag = "health",
    responses((status = 200, description = "Service is up", body = MessageResponse))
)]
pub async fn status() -> Response {
    Envelope::ok("OK").into_response()
}
