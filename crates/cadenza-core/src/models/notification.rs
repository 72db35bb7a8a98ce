use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Stored push destination. `endpoint` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: i32,
    pub endpoint: String,
    /// Milliseconds since the epoch, as reported by the browser
    pub expiration_time: Option<i64>,
    /// `{p256dh, auth}` as sent by the browser; kept opaque
    #[schema(value_type = Object)]
    pub keys: JsonValue,
    pub subscribed_at: DateTime<Utc>,
}

/// Browser `PushSubscription` as serialized by `JSON.stringify`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    #[validate(url(message = "Endpoint must be a valid URL"))]
    pub endpoint: String,
    #[serde(default)]
    pub expiration_time: Option<i64>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub keys: JsonValue,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    pub subscription: NewSubscription,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Broadcast {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastSummary {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub url: Option<String>,
}

impl From<Broadcast> for BroadcastSummary {
    fn from(broadcast: Broadcast) -> Self {
        BroadcastSummary {
            id: broadcast.id,
            title: broadcast.title,
            body: broadcast.body,
            created_at: broadcast.created_at,
            url: broadcast.url,
        }
    }
}

/// Announcement fields from the admin form
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema, Validate)]
pub struct BroadcastDraft {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// JSON pushed to every subscription. `body` is itself a JSON string
/// carrying the text and the click-through URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl NotificationPayload {
    pub fn for_broadcast(broadcast: &Broadcast, public_base_url: &str) -> Self {
        let body = serde_json::json!({
            "body": broadcast.body,
            "url": broadcast.url,
        });
        let icon = broadcast.image_key.as_ref().map(|key| {
            format!("{}/image/{}", public_base_url.trim_end_matches('/'), key)
        });

        NotificationPayload {
            title: broadcast.title.clone(),
            body: body.to_string(),
            icon,
        }
    }
}
