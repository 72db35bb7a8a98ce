use cadenza_core::models::{TaxonomyKind, TaxonomyTerm};
use cadenza_core::AppError;
use sqlx::{PgPool, Postgres};

/// Store operations on `genres` and `categories`
#[async_trait::async_trait]
pub trait TaxonomyStore: Send + Sync {
    /// Insert every label in one statement
    async fn insert_many(
        &self,
        kind: TaxonomyKind,
        labels: &[String],
        visible: bool,
    ) -> Result<Vec<TaxonomyTerm>, AppError>;

    async fn list(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyTerm>, AppError>;

    /// Set label and visibility. Returns the label the row held before, or
    /// `None` when no row has that id.
    async fn rename(
        &self,
        kind: TaxonomyKind,
        id: i32,
        label: &str,
        visible: bool,
    ) -> Result<Option<String>, AppError>;

    async fn set_visibility(
        &self,
        kind: TaxonomyKind,
        id: i32,
        visible: bool,
    ) -> Result<u64, AppError>;

    async fn delete(&self, kind: TaxonomyKind, id: i32) -> Result<u64, AppError>;
}

/// Repository for both label tables; the table is picked by [`TaxonomyKind`]
#[derive(Clone)]
pub struct TaxonomyRepository {
    pool: PgPool,
}

impl TaxonomyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TaxonomyStore for TaxonomyRepository {
    #[tracing::instrument(skip(self, labels), fields(db.table = kind.table(), db.operation = "insert", count = labels.len()))]
    async fn insert_many(
        &self,
        kind: TaxonomyKind,
        labels: &[String],
        visible: bool,
    ) -> Result<Vec<TaxonomyTerm>, AppError> {
        let table = kind.table();
        let terms = sqlx::query_as::<Postgres, TaxonomyTerm>(&format!(
            r#"
            INSERT INTO {table} (label, visible)
            SELECT label, $2 FROM UNNEST($1::text[]) AS label
            RETURNING id, label, visible
            "#
        ))
        .bind(labels)
        .bind(visible)
        .fetch_all(&self.pool)
        .await?;

        Ok(terms)
    }

    #[tracing::instrument(skip(self), fields(db.table = kind.table(), db.operation = "select"))]
    async fn list(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyTerm>, AppError> {
        let table = kind.table();
        let terms = sqlx::query_as::<Postgres, TaxonomyTerm>(&format!(
            "SELECT id, label, visible FROM {table} ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(terms)
    }

    #[tracing::instrument(skip(self), fields(db.table = kind.table(), db.operation = "update", db.record_id = %id))]
    async fn rename(
        &self,
        kind: TaxonomyKind,
        id: i32,
        label: &str,
        visible: bool,
    ) -> Result<Option<String>, AppError> {
        let table = kind.table();
        let previous = sqlx::query_scalar::<Postgres, String>(&format!(
            r#"
            WITH prev AS (SELECT id, label FROM {table} WHERE id = $3)
            UPDATE {table} AS t
            SET label = $1, visible = $2
            FROM prev
            WHERE t.id = prev.id
            RETURNING prev.label
            "#
        ))
        .bind(label)
        .bind(visible)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(previous)
    }

    #[tracing::instrument(skip(self), fields(db.table = kind.table(), db.operation = "update", db.record_id = %id))]
    async fn set_visibility(
        &self,
        kind: TaxonomyKind,
        id: i32,
        visible: bool,
    ) -> Result<u64, AppError> {
        let table = kind.table();
        let result = sqlx::query(&format!("UPDATE {table} SET visible = $1 WHERE id = $2"))
            .bind(visible)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = kind.table(), db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, kind: TaxonomyKind, id: i32) -> Result<u64, AppError> {
        let table = kind.table();
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
