use cadenza_core::models::{Playlist, PlaylistFields};
use cadenza_core::AppError;
use sqlx::{PgPool, Postgres};

/// Store operations on `playlists`
#[async_trait::async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn insert(
        &self,
        fields: &PlaylistFields,
        image_key: Option<&str>,
    ) -> Result<Option<Playlist>, AppError>;

    async fn get(&self, id: i32) -> Result<Option<Playlist>, AppError>;

    async fn list(&self) -> Result<Vec<Playlist>, AppError>;

    /// Playlists flagged visible ("favourites")
    async fn list_visible(&self) -> Result<Vec<Playlist>, AppError>;

    /// `None` for `image_key` keeps the stored image
    async fn update(
        &self,
        id: i32,
        fields: &PlaylistFields,
        image_key: Option<&str>,
    ) -> Result<u64, AppError>;

    /// Replace the song list as given; ids are not checked
    async fn set_songs(&self, id: i32, song_ids: &[i32]) -> Result<u64, AppError>;

    async fn set_visibility(&self, id: i32, visible: bool) -> Result<u64, AppError>;

    async fn delete(&self, id: i32) -> Result<Option<Playlist>, AppError>;

    /// Strip a track id from every playlist. Returns playlists changed.
    async fn remove_song(&self, track_id: i32) -> Result<u64, AppError>;
}

/// Repository for playlists
#[derive(Clone)]
pub struct PlaylistRepository {
    pool: PgPool,
}

impl PlaylistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PlaylistStore for PlaylistRepository {
    #[tracing::instrument(skip(self, fields), fields(db.table = "playlists", db.operation = "insert"))]
    async fn insert(
        &self,
        fields: &PlaylistFields,
        image_key: Option<&str>,
    ) -> Result<Option<Playlist>, AppError> {
        let playlist = sqlx::query_as::<Postgres, Playlist>(
            r#"
            INSERT INTO playlists (name, song_ids, image_key, visible)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, song_ids, image_key, visible
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.song_ids)
        .bind(image_key)
        .bind(fields.visible)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    #[tracing::instrument(skip(self), fields(db.table = "playlists", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: i32) -> Result<Option<Playlist>, AppError> {
        let playlist = sqlx::query_as::<Postgres, Playlist>(
            "SELECT id, name, song_ids, image_key, visible FROM playlists WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    #[tracing::instrument(skip(self), fields(db.table = "playlists", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<Playlist>, AppError> {
        let playlists = sqlx::query_as::<Postgres, Playlist>(
            "SELECT id, name, song_ids, image_key, visible FROM playlists ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    #[tracing::instrument(skip(self), fields(db.table = "playlists", db.operation = "select"))]
    async fn list_visible(&self) -> Result<Vec<Playlist>, AppError> {
        let playlists = sqlx::query_as::<Postgres, Playlist>(
            "SELECT id, name, song_ids, image_key, visible FROM playlists WHERE visible ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    #[tracing::instrument(skip(self, fields), fields(db.table = "playlists", db.operation = "update", db.record_id = %id))]
    async fn update(
        &self,
        id: i32,
        fields: &PlaylistFields,
        image_key: Option<&str>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE playlists
            SET name = $1, song_ids = $2, visible = $3, image_key = COALESCE($4, image_key)
            WHERE id = $5
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.song_ids)
        .bind(fields.visible)
        .bind(image_key)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self, song_ids), fields(db.table = "playlists", db.operation = "update", db.record_id = %id, count = song_ids.len()))]
    async fn set_songs(&self, id: i32, song_ids: &[i32]) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE playlists SET song_ids = $1 WHERE id = $2")
            .bind(song_ids)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "playlists", db.operation = "update", db.record_id = %id))]
    async fn set_visibility(&self, id: i32, visible: bool) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE playlists SET visible = $1 WHERE id = $2")
            .bind(visible)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "playlists", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: i32) -> Result<Option<Playlist>, AppError> {
        let playlist = sqlx::query_as::<Postgres, Playlist>(
            "DELETE FROM playlists WHERE id = $1 RETURNING id, name, song_ids, image_key, visible",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    #[tracing::instrument(skip(self), fields(db.table = "playlists", db.operation = "update"))]
    async fn remove_song(&self, track_id: i32) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE playlists SET song_ids = array_remove(song_ids, $1) WHERE $1 = ANY(song_ids)",
        )
        .bind(track_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
