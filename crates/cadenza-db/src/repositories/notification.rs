use cadenza_core::models::{Broadcast, BroadcastDraft, NewSubscription, Subscription};
use cadenza_core::AppError;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};

/// Store operations on `subscriptions`
#[async_trait::async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find_by_endpoint(&self, endpoint: &str) -> Result<Option<Subscription>, AppError>;

    /// Insert unless the endpoint is already registered. `None` means it was.
    async fn insert_if_absent(
        &self,
        subscription: &NewSubscription,
    ) -> Result<Option<Subscription>, AppError>;

    async fn list(&self) -> Result<Vec<Subscription>, AppError>;

    async fn delete_by_endpoint(&self, endpoint: &str) -> Result<u64, AppError>;
}

/// Store operations on `broadcasts`
#[async_trait::async_trait]
pub trait BroadcastStore: Send + Sync {
    async fn insert(
        &self,
        draft: &BroadcastDraft,
        image_key: Option<&str>,
    ) -> Result<Option<Broadcast>, AppError>;

    async fn list(&self) -> Result<Vec<Broadcast>, AppError>;

    /// Broadcasts created at or after `since`, newest first
    async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<Broadcast>, AppError>;

    async fn delete(&self, id: i32) -> Result<Option<Broadcast>, AppError>;
}

/// Repository for push subscriptions
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SubscriptionStore for SubscriptionRepository {
    #[tracing::instrument(skip(self), fields(db.table = "subscriptions", db.operation = "select"))]
    async fn find_by_endpoint(&self, endpoint: &str) -> Result<Option<Subscription>, AppError> {
        let subscription = sqlx::query_as::<Postgres, Subscription>(
            r#"
            SELECT id, endpoint, expiration_time, keys, subscribed_at
            FROM subscriptions
            WHERE endpoint = $1
            "#,
        )
        .bind(endpoint)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }

    #[tracing::instrument(skip(self, subscription), fields(db.table = "subscriptions", db.operation = "insert"))]
    async fn insert_if_absent(
        &self,
        subscription: &NewSubscription,
    ) -> Result<Option<Subscription>, AppError> {
        let inserted = sqlx::query_as::<Postgres, Subscription>(
            r#"
            INSERT INTO subscriptions (endpoint, expiration_time, keys)
            VALUES ($1, $2, $3)
            ON CONFLICT (endpoint) DO NOTHING
            RETURNING id, endpoint, expiration_time, keys, subscribed_at
            "#,
        )
        .bind(&subscription.endpoint)
        .bind(subscription.expiration_time)
        .bind(&subscription.keys)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscriptions", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<Subscription>, AppError> {
        let subscriptions = sqlx::query_as::<Postgres, Subscription>(
            "SELECT id, endpoint, expiration_time, keys, subscribed_at FROM subscriptions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(subscriptions)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscriptions", db.operation = "delete"))]
    async fn delete_by_endpoint(&self, endpoint: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE endpoint = $1")
            .bind(endpoint)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Repository for broadcast announcements
#[derive(Clone)]
pub struct BroadcastRepository {
    pool: PgPool,
}

impl BroadcastRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl BroadcastStore for BroadcastRepository {
    #[tracing::instrument(skip(self, draft), fields(db.table = "broadcasts", db.operation = "insert"))]
    async fn insert(
        &self,
        draft: &BroadcastDraft,
        image_key: Option<&str>,
    ) -> Result<Option<Broadcast>, AppError> {
        let broadcast = sqlx::query_as::<Postgres, Broadcast>(
            r#"
            INSERT INTO broadcasts (title, body, image_key, url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, body, image_key, created_at, url
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.body)
        .bind(image_key)
        .bind(&draft.url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(broadcast)
    }

    #[tracing::instrument(skip(self), fields(db.table = "broadcasts", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<Broadcast>, AppError> {
        let broadcasts = sqlx::query_as::<Postgres, Broadcast>(
            "SELECT id, title, body, image_key, created_at, url FROM broadcasts ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(broadcasts)
    }

    #[tracing::instrument(skip(self), fields(db.table = "broadcasts", db.operation = "select"))]
    async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<Broadcast>, AppError> {
        let broadcasts = sqlx::query_as::<Postgres, Broadcast>(
            r#"
            SELECT id, title, body, image_key, created_at, url
            FROM broadcasts
            WHERE created_at >= $1
            ORDER BY id DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(broadcasts)
    }

    #[tracing::instrument(skip(self), fields(db.table = "broadcasts", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: i32) -> Result<Option<Broadcast>, AppError> {
        let broadcast = sqlx::query_as::<Postgres, Broadcast>(
            "DELETE FROM broadcasts WHERE id = $1 RETURNING id, title, body, image_key, created_at, url",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(broadcast)
    }
}
