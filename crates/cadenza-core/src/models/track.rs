use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use super::artist::ArtistSummary;
use super::taxonomy::TaxonomyTerm;

/// Track row as stored in `tracks`.
///
/// `artists`, `genre` and `category` hold denormalized term labels, not ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: i32,
    pub title: String,
    pub album_title: String,
    pub artists: Vec<String>,
    pub genre: Vec<String>,
    pub category: Vec<String>,
    pub audio_key: Option<String>,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub visible: bool,
    pub duration: f64,
}

/// Track as returned by listings and create: no object keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub id: i32,
    pub title: String,
    pub album_title: String,
    pub artists: Vec<String>,
    pub genre: Vec<String>,
    pub category: Vec<String>,
    pub visible: bool,
    pub duration: f64,
}

impl From<Track> for TrackSummary {
    fn from(track: Track) -> Self {
        TrackSummary {
            id: track.id,
            title: track.title,
            album_title: track.album_title,
            artists: track.artists,
            genre: track.genre,
            category: track.category,
            visible: track.visible,
            duration: track.duration,
        }
    }
}

/// Editable track columns, supplied on create and update
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackFields {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    #[serde(default)]
    pub album_title: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub visible: bool,
    #[validate(range(min = 0.0, message = "Duration cannot be negative"))]
    #[serde(default)]
    pub duration: f64,
}

/// Catalogue overview served to the player on start-up
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueDetails {
    pub tracks: Vec<Track>,
    pub artists: Vec<ArtistSummary>,
    pub genres: Vec<TaxonomyTerm>,
    pub categories: Vec<TaxonomyTerm>,
}
