use cadenza_core::models::{Artist, ArtistFields};
use cadenza_core::AppError;
use sqlx::{PgPool, Postgres};

/// Store operations on `artists`
#[async_trait::async_trait]
pub trait ArtistStore: Send + Sync {
    async fn insert(
        &self,
        fields: &ArtistFields,
        image_key: Option<&str>,
    ) -> Result<Option<Artist>, AppError>;

    async fn get(&self, id: i32) -> Result<Option<Artist>, AppError>;

    /// First artist carrying `name`. Names are not unique in the schema.
    async fn find_by_name(&self, name: &str) -> Result<Option<Artist>, AppError>;

    async fn list(&self) -> Result<Vec<Artist>, AppError>;

    /// `None` for `image_key` keeps the stored image
    async fn update(
        &self,
        id: i32,
        fields: &ArtistFields,
        image_key: Option<&str>,
    ) -> Result<u64, AppError>;

    async fn set_visibility(&self, id: i32, visible: bool) -> Result<u64, AppError>;

    async fn delete(&self, id: i32) -> Result<Option<Artist>, AppError>;
}

/// Repository for artists
#[derive(Clone)]
pub struct ArtistRepository {
    pool: PgPool,
}

impl ArtistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ArtistStore for ArtistRepository {
    #[tracing::instrument(skip(self, fields), fields(db.table = "artists", db.operation = "insert"))]
    async fn insert(
        &self,
        fields: &ArtistFields,
        image_key: Option<&str>,
    ) -> Result<Option<Artist>, AppError> {
        let artist = sqlx::query_as::<Postgres, Artist>(
            r#"
            INSERT INTO artists (name, image_key, visible)
            VALUES ($1, $2, $3)
            RETURNING id, name, image_key, visible
            "#,
        )
        .bind(&fields.name)
        .bind(image_key)
        .bind(fields.visible)
        .fetch_optional(&self.pool)
        .await?;

        Ok(artist)
    }

    #[tracing::instrument(skip(self), fields(db.table = "artists", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: i32) -> Result<Option<Artist>, AppError> {
        let artist = sqlx::query_as::<Postgres, Artist>(
            "SELECT id, name, image_key, visible FROM artists WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(artist)
    }

    #[tracing::instrument(skip(self), fields(db.table = "artists", db.operation = "select"))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Artist>, AppError> {
        let artist = sqlx::query_as::<Postgres, Artist>(
            "SELECT id, name, image_key, visible FROM artists WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(artist)
    }

    #[tracing::instrument(skip(self), fields(db.table = "artists", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<Artist>, AppError> {
        let artists = sqlx::query_as::<Postgres, Artist>(
            "SELECT id, name, image_key, visible FROM artists ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(artists)
    }

    #[tracing::instrument(skip(self, fields), fields(db.table = "artists", db.operation = "update", db.record_id = %id))]
    async fn update(
        &self,
        id: i32,
        fields: &ArtistFields,
        image_key: Option<&str>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE artists
            SET name = $1, visible = $2, image_key = COALESCE($3, image_key)
            WHERE id = $4
            "#,
        )
        .bind(&fields.name)
        .bind(fields.visible)
        .bind(image_key)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "artists", db.operation = "update", db.record_id = %id))]
    async fn set_visibility(&self, id: i32, visible: bool) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE artists SET visible = $1 WHERE id = $2")
            .bind(visible)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "artists", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: i32) -> Result<Option<Artist>, AppError> {
        let artist = sqlx::query_as::<Postgres, Artist>(
            "DELETE FROM artists WHERE id = $1 RETURNING id, name, image_key, visible",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(artist)
    }
}
