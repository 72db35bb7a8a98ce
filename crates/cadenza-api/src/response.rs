//! Success envelope shared by every JSON route: `{code, message, rowData?}`.
//!
//! `message` is either a human-readable string or the listing itself.
//! The HTTP status always equals `code`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<M, R = ()> {
    pub code: u16,
    pub message: M,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_data: Option<R>,
}

impl<M: Serialize> Envelope<M> {
    pub fn ok(message: M) -> Self {
        Envelope {
            code: StatusCode::OK.as_u16(),
            message,
            row_data: None,
        }
    }
}

impl<M: Serialize, R: Serialize> Envelope<M, R> {
    pub fn with_row(message: M, row: R) -> Self {
        Envelope {
            code: StatusCode::OK.as_u16(),
            message,
            row_data: Some(row),
        }
    }
}

impl<M: Serialize, R: Serialize> IntoResponse for Envelope<M, R> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Plain `{code, message}` reply, as documented in the OpenAPI schema
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub code: u16,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_data_is_omitted_when_absent() {
        let json = serde_json::to_value(Envelope::ok("Unsubscribed")).unwrap();
        assert_eq!(json, serde_json::json!({ "code": 200, "message": "Unsubscribed" }));
    }

    #[test]
    fn test_row_data_uses_camel_case() {
        let json = serde_json::to_value(Envelope::with_row("Done Successfully", vec![1, 2])).unwrap();
        assert_eq!(json["rowData"], serde_json::json!([1, 2]));
        assert_eq!(json["code"], 200);
    }
}
