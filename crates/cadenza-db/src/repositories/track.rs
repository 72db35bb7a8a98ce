use cadenza_core::models::{TermField, Track, TrackFields, TrackTerms};
use cadenza_core::AppError;
use sqlx::{PgPool, Postgres};

const TRACK_COLUMNS: &str = "id, title, album_title, artists, genre, category, audio_key, image_key, created_at, visible, duration";

/// Store operations on `tracks`
#[async_trait::async_trait]
pub trait TrackStore: Send + Sync {
    /// Insert a row; `None` when the store returned nothing
    async fn insert(
        &self,
        fields: &TrackFields,
        audio_key: Option<&str>,
        image_key: Option<&str>,
    ) -> Result<Option<Track>, AppError>;

    async fn get(&self, id: i32) -> Result<Option<Track>, AppError>;

    /// Update columns. `None` keys keep the stored value. Returns rows affected.
    async fn update(
        &self,
        id: i32,
        fields: &TrackFields,
        audio_key: Option<&str>,
        image_key: Option<&str>,
    ) -> Result<u64, AppError>;

    async fn set_visibility(&self, id: i32, visible: bool) -> Result<u64, AppError>;

    /// Delete a row and hand back what it held, keys included
    async fn delete(&self, id: i32) -> Result<Option<Track>, AppError>;

    async fn list(&self) -> Result<Vec<Track>, AppError>;

    /// Visible tracks of an album
    async fn list_by_album(&self, album_title: &str) -> Result<Vec<Track>, AppError>;

    /// Visible tracks crediting an artist
    async fn list_by_artist(&self, artist: &str) -> Result<Vec<Track>, AppError>;

    async fn list_by_ids(&self, ids: &[i32]) -> Result<Vec<Track>, AppError>;

    /// Rows whose `field` array contains `value`
    async fn find_containing(&self, field: TermField, value: &str)
        -> Result<Vec<TrackTerms>, AppError>;

    /// Overwrite one row's `field` array
    async fn replace_terms(&self, field: TermField, id: i32, terms: &[String])
        -> Result<u64, AppError>;
}

/// Repository for the track catalogue
#[derive(Clone)]
pub struct TrackRepository {
    pool: PgPool,
}

impl TrackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TrackStore for TrackRepository {
    #[tracing::instrument(skip(self, fields), fields(db.table = "tracks", db.operation = "insert"))]
    async fn insert(
        &self,
        fields: &TrackFields,
        audio_key: Option<&str>,
        image_key: Option<&str>,
    ) -> Result<Option<Track>, AppError> {
        let track = sqlx::query_as::<Postgres, Track>(&format!(
            r#"
            INSERT INTO tracks (title, album_title, artists, genre, category, audio_key, image_key, visible, duration)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TRACK_COLUMNS}
            "#
        ))
        .bind(&fields.title)
        .bind(&fields.album_title)
        .bind(&fields.artists)
        .bind(&fields.genre)
        .bind(&fields.category)
        .bind(audio_key)
        .bind(image_key)
        .bind(fields.visible)
        .bind(fields.duration)
        .fetch_optional(&self.pool)
        .await?;

        Ok(track)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tracks", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: i32) -> Result<Option<Track>, AppError> {
        let track = sqlx::query_as::<Postgres, Track>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(track)
    }

    #[tracing::instrument(skip(self, fields), fields(db.table = "tracks", db.operation = "update", db.record_id = %id))]
    async fn update(
        &self,
        id: i32,
        fields: &TrackFields,
        audio_key: Option<&str>,
        image_key: Option<&str>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE tracks
            SET title = $1, album_title = $2, artists = $3, genre = $4, category = $5,
                visible = $6, duration = $7,
                audio_key = COALESCE($8, audio_key),
                image_key = COALESCE($9, image_key)
            WHERE id = $10
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.album_title)
        .bind(&fields.artists)
        .bind(&fields.genre)
        .bind(&fields.category)
        .bind(fields.visible)
        .bind(fields.duration)
        .bind(audio_key)
        .bind(image_key)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "tracks", db.operation = "update", db.record_id = %id))]
    async fn set_visibility(&self, id: i32, visible: bool) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE tracks SET visible = $1 WHERE id = $2")
            .bind(visible)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "tracks", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: i32) -> Result<Option<Track>, AppError> {
        let track = sqlx::query_as::<Postgres, Track>(&format!(
            "DELETE FROM tracks WHERE id = $1 RETURNING {TRACK_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(track)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tracks", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<Track>, AppError> {
        let tracks = sqlx::query_as::<Postgres, Track>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(tracks)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tracks", db.operation = "select"))]
    async fn list_by_album(&self, album_title: &str) -> Result<Vec<Track>, AppError> {
        let tracks = sqlx::query_as::<Postgres, Track>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE album_title = $1 AND visible ORDER BY id"
        ))
        .bind(album_title)
        .fetch_all(&self.pool)
        .await?;

        Ok(tracks)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tracks", db.operation = "select"))]
    async fn list_by_artist(&self, artist: &str) -> Result<Vec<Track>, AppError> {
        let tracks = sqlx::query_as::<Postgres, Track>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE $1 = ANY(artists) AND visible ORDER BY id"
        ))
        .bind(artist)
        .fetch_all(&self.pool)
        .await?;

        Ok(tracks)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tracks", db.operation = "select"))]
    async fn list_by_ids(&self, ids: &[i32]) -> Result<Vec<Track>, AppError> {
        let tracks = sqlx::query_as::<Postgres, Track>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(tracks)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tracks", db.operation = "select", db.column = field.column()))]
    async fn find_containing(
        &self,
        field: TermField,
        value: &str,
    ) -> Result<Vec<TrackTerms>, AppError> {
        // Column names come from a closed enum, never from input
        let column = field.column();
        let rows = sqlx::query_as::<Postgres, TrackTerms>(&format!(
            "SELECT id, {column} AS terms FROM tracks WHERE $1 = ANY({column}) ORDER BY id"
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self, terms), fields(db.table = "tracks", db.operation = "update", db.record_id = %id, db.column = field.column()))]
    async fn replace_terms(
        &self,
        field: TermField,
        id: i32,
        terms: &[String],
    ) -> Result<u64, AppError> {
        let column = field.column();
        let result = sqlx::query(&format!("UPDATE tracks SET {column} = $1 WHERE id = $2"))
            .bind(terms)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
