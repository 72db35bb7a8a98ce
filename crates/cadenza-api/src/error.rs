//! HTTP error response conversion
//!
//! Handlers return `Result<Response, HttpAppError>`. Any `AppError` (or a type
//! converting into one) renders as the same `{code, message}` envelope the
//! success paths use, with `code` equal to the HTTP status.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cadenza_core::{AppError, ErrorMetadata, LogLevel};
use cadenza_storage::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status, repeated in the body
    pub code: u16,
    pub message: String,
    /// Machine-readable error code for programmatic handling
    pub error_code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    /// Object keys a cleanup could not remove
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse (orphan rule)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<validator::ValidationErrors> for HttpAppError {
    fn from(err: validator::ValidationErrors) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::UploadFailed(msg) => AppError::Storage(msg),
            StorageError::DownloadFailed(msg) => AppError::Storage(msg),
            StorageError::DeleteFailed(msg) => AppError::Storage(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::BackendError(msg) => AppError::Storage(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

/// JSON body extractor that answers with [`ErrorResponse`] on deserialization failure
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl HttpAppError {
    fn to_body(&self, hide_details: bool) -> ErrorResponse {
        let app_error = &self.0;
        let failed_keys = match app_error {
            AppError::MediaCleanup { failed_keys, .. } => Some(failed_keys.clone()),
            _ => None,
        };
        let (details, error_type) = if hide_details || app_error.is_sensitive() {
            (None, None)
        } else {
            (
                Some(app_error.detailed_message()),
                Some(app_error.error_type().to_string()),
            )
        };

        ErrorResponse {
            code: app_error.http_status_code(),
            message: app_error.client_message(),
            error_code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
            failed_keys,
            details,
            error_type,
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.0);

        (status, Json(self.to_body(is_production_env()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error_not_found() {
        let HttpAppError(app_err) = StorageError::NotFound("1-a.png".to_string()).into();
        match app_err {
            AppError::NotFound(msg) => assert_eq!(msg, "1-a.png"),
            _ => panic!("Expected NotFound variant"),
        }
    }

    #[test]
    fn test_from_storage_error_download_failed() {
        let HttpAppError(app_err) = StorageError::DownloadFailed("timeout".to_string()).into();
        match app_err {
            AppError::Storage(msg) => assert_eq!(msg, "timeout"),
            _ => panic!("Expected Storage variant"),
        }
    }

    #[test]
    fn test_from_storage_error_invalid_key() {
        let HttpAppError(app_err) = StorageError::InvalidKey("../etc".to_string()).into();
        assert!(matches!(app_err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_cleanup_body_lists_failed_keys() {
        let err = HttpAppError(AppError::MediaCleanup {
            message: "File Deletion Failed from storage".to_string(),
            failed_keys: vec!["1-a.mp3".to_string()],
        });
        let json = serde_json::to_value(err.to_body(false)).expect("serialize");
        assert_eq!(json["code"], 400);
        assert_eq!(json["message"], "File Deletion Failed from storage");
        assert_eq!(json["errorCode"], "MEDIA_CLEANUP_FAILED");
        assert_eq!(json["failedKeys"][0], "1-a.mp3");
        assert_eq!(json["errorType"], "MediaCleanup");
    }

    #[test]
    fn test_sensitive_errors_hide_details() {
        let err = HttpAppError(AppError::Storage("bucket credentials rejected".to_string()));
        let json = serde_json::to_value(err.to_body(false)).expect("serialize");
        assert_eq!(json["code"], 500);
        assert_eq!(json["message"], "Failed to access storage");
        assert!(json.get("details").is_none());
        assert!(json.get("failedKeys").is_none());
    }

    #[test]
    fn test_production_hides_details() {
        let err = HttpAppError(AppError::NotFound("Entry not found".to_string()));
        let json = serde_json::to_value(err.to_body(true)).expect("serialize");
        assert_eq!(json["code"], 404);
        assert_eq!(json["message"], "Entry not found");
        assert!(json.get("details").is_none());
    }
}
