use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Playlist row. `song_ids` is ordered and unchecked: duplicates and ids of
/// deleted tracks are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: i32,
    pub name: String,
    pub song_ids: Vec<i32>,
    pub image_key: Option<String>,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    pub id: i32,
    pub name: String,
    pub song_ids: Vec<i32>,
    pub visible: bool,
}

impl From<Playlist> for PlaylistSummary {
    fn from(playlist: Playlist) -> Self {
        PlaylistSummary {
            id: playlist.id,
            name: playlist.name,
            song_ids: playlist.song_ids,
            visible: playlist.visible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistFields {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    #[serde(default)]
    pub song_ids: Vec<i32>,
    #[serde(default)]
    pub visible: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetSongsRequest {
    pub song_ids: Vec<i32>,
}
