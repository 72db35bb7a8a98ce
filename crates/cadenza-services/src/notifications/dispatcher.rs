use super::push::{PushDelivery, PushError};
use crate::catalogue::require_rows;
use crate::deleter::FileBatchDeleter;
use crate::uploader::{FileBatchUploader, StagedFile};
use cadenza_core::models::{
    Broadcast, BroadcastDraft, BroadcastSummary, NewSubscription, NotificationPayload,
    Subscription,
};
use cadenza_core::AppError;
use cadenza_db::{BroadcastStore, SubscriptionStore};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DeliveryStatus {
    Delivered,
    /// The push service reported the subscription gone and it was removed
    Pruned,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub subscription_id: i32,
    pub endpoint: String,
    #[serde(flatten)]
    pub status: DeliveryStatus,
}

/// Result of one broadcast: the stored row and one outcome per subscription
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastReport {
    pub broadcast: BroadcastSummary,
    pub deliveries: Vec<DeliveryOutcome>,
}

impl BroadcastReport {
    pub fn delivered(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| d.status == DeliveryStatus::Delivered)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| matches!(d.status, DeliveryStatus::Failed { .. }))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubscribeOutcome {
    Created(Subscription),
    AlreadySubscribed,
}

/// Broadcast announcements and push subscription bookkeeping
#[derive(Clone)]
pub struct NotificationDispatcher {
    subscriptions: Arc<dyn SubscriptionStore>,
    broadcasts: Arc<dyn BroadcastStore>,
    uploader: FileBatchUploader,
    deleter: FileBatchDeleter,
    push: Arc<dyn PushDelivery>,
    public_base_url: String,
    concurrency: usize,
}

impl NotificationDispatcher {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        broadcasts: Arc<dyn BroadcastStore>,
        uploader: FileBatchUploader,
        deleter: FileBatchDeleter,
        push: Arc<dyn PushDelivery>,
        public_base_url: String,
        concurrency: usize,
    ) -> Self {
        Self {
            subscriptions,
            broadcasts,
            uploader,
            deleter,
            push,
            public_base_url,
            concurrency: concurrency.max(1),
        }
    }

    /// Store a broadcast and push it to every subscription.
    ///
    /// Deliveries are independent: a failing endpoint is reported in its
    /// outcome and does not fail the call once the row is stored.
    #[tracing::instrument(skip(self, draft, files), fields(title = %draft.title))]
    pub async fn broadcast(
        &self,
        draft: BroadcastDraft,
        files: Vec<StagedFile>,
    ) -> Result<BroadcastReport, AppError> {
        if files.is_empty() {
            return Err(AppError::MissingMedia("Missing media File".to_string()));
        }

        let media = self.uploader.upload(files).await.map_err(|e| {
            tracing::error!(error = %e, "Broadcast image upload failed");
            AppError::Upload("Uploading files failed!".to_string())
        })?;

        let Some(image_key) = media.image_key else {
            // An audio-only batch still stored an object nobody will reference
            let report = self.deleter.delete(vec![media.audio_key]).await;
            if !report.is_clean() {
                tracing::warn!(failed_keys = ?report.failed_keys(), "Stray broadcast upload not removed");
            }
            return Err(AppError::MissingMedia("Missing media File".to_string()));
        };

        let broadcast = self
            .broadcasts
            .insert(&draft, Some(&image_key))
            .await?
            .ok_or_else(|| AppError::Persistence("Couldn't Add Broadcast to DB".to_string()))?;

        let deliveries = self.deliver_all(&broadcast).await?;
        let report = BroadcastReport {
            broadcast: broadcast.into(),
            deliveries,
        };

        tracing::info!(
            broadcast_id = report.broadcast.id,
            subscriptions = report.deliveries.len(),
            delivered = report.delivered(),
            failed = report.failed(),
            "Broadcast dispatched"
        );

        Ok(report)
    }

    async fn deliver_all(&self, broadcast: &Broadcast) -> Result<Vec<DeliveryOutcome>, AppError> {
        let payload = NotificationPayload::for_broadcast(broadcast, &self.public_base_url);
        let payload = serde_json::to_string(&payload)?;
        let subscriptions = self.subscriptions.list().await?;

        let outcomes = stream::iter(subscriptions)
            .map(|subscription| {
                let payload = payload.as_str();
                async move {
                    let status = match self.push.deliver(&subscription, payload).await {
                        Ok(()) => DeliveryStatus::Delivered,
                        Err(PushError::Gone(status)) => self.prune(&subscription, status).await,
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                subscription_id = subscription.id,
                                "Push delivery failed"
                            );
                            DeliveryStatus::Failed {
                                reason: e.to_string(),
                            }
                        }
                    };
                    DeliveryOutcome {
                        subscription_id: subscription.id,
                        endpoint: subscription.endpoint,
                        status,
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(outcomes)
    }

    async fn prune(&self, subscription: &Subscription, status: u16) -> DeliveryStatus {
        match self.subscriptions.delete_by_endpoint(&subscription.endpoint).await {
            Ok(_) => {
                tracing::info!(
                    subscription_id = subscription.id,
                    status,
                    "Pruned expired push subscription"
                );
                DeliveryStatus::Pruned
            }
            Err(e) => {
                tracing::error!(error = %e, subscription_id = subscription.id, "Failed to prune subscription");
                DeliveryStatus::Failed {
                    reason: format!("Subscription gone, prune failed: {}", e),
                }
            }
        }
    }

    /// Register an endpoint unless it is already known
    #[tracing::instrument(skip(self, subscription))]
    pub async fn subscribe(
        &self,
        subscription: NewSubscription,
    ) -> Result<SubscribeOutcome, AppError> {
        match self.subscriptions.insert_if_absent(&subscription).await? {
            Some(created) => {
                tracing::info!(subscription_id = created.id, "Push subscription created");
                Ok(SubscribeOutcome::Created(created))
            }
            None => Ok(SubscribeOutcome::AlreadySubscribed),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn unsubscribe(&self, endpoint: &str) -> Result<(), AppError> {
        let rows = self.subscriptions.delete_by_endpoint(endpoint).await?;
        if rows == 0 {
            return Err(AppError::NotFound("Subscription not found".to_string()));
        }
        Ok(())
    }

    pub async fn list_broadcasts(&self) -> Result<Vec<BroadcastSummary>, AppError> {
        let rows = require_rows(self.broadcasts.list().await?)?;
        Ok(rows.into_iter().map(BroadcastSummary::from).collect())
    }

    /// Broadcasts a subscriber has been eligible for, newest first
    pub async fn broadcasts_since_subscription(
        &self,
        endpoint: &str,
    ) -> Result<Vec<Broadcast>, AppError> {
        let subscription = self
            .subscriptions
            .find_by_endpoint(endpoint)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;

        require_rows(self.broadcasts.list_since(subscription.subscribed_at).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_broadcast(&self, id: i32) -> Result<(), AppError> {
        let broadcast = self
            .broadcasts
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Broadcast not found".to_string()))?;

        self.deleter
            .delete(vec![broadcast.image_key])
            .await
            .into_result("File Deletion Failed from storage")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        stage_file, MockBroadcastStore, MockPushOutcome, MockStorage, MockSubscriptionStore,
        RecordingPushDelivery,
    };
    use tempfile::tempdir;

    struct Fixture {
        storage: Arc<MockStorage>,
        subscriptions: Arc<MockSubscriptionStore>,
        broadcasts: Arc<MockBroadcastStore>,
        push: Arc<RecordingPushDelivery>,
        dispatcher: NotificationDispatcher,
    }

    fn fixture() -> Fixture {
        let storage = Arc::new(MockStorage::new());
        let subscriptions = Arc::new(MockSubscriptionStore::new());
        let broadcasts = Arc::new(MockBroadcastStore::new());
        let push = Arc::new(RecordingPushDelivery::new());
        let dispatcher = NotificationDispatcher::new(
            subscriptions.clone(),
            broadcasts.clone(),
            FileBatchUploader::new(storage.clone(), 4),
            FileBatchDeleter::new(storage.clone(), 4),
            push.clone(),
            "http://localhost:5000".to_string(),
            4,
        );
        Fixture {
            storage,
            subscriptions,
            broadcasts,
            push,
            dispatcher,
        }
    }

    fn new_subscription(endpoint: &str) -> NewSubscription {
        NewSubscription {
            endpoint: endpoint.to_string(),
            expiration_time: None,
            keys: serde_json::json!({ "p256dh": "BK", "auth": "a" }),
        }
    }

    fn draft() -> BroadcastDraft {
        BroadcastDraft {
            title: "New album".to_string(),
            body: "Out now".to_string(),
            url: Some("https://cadenza.example/albums/1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_failing_delivery_does_not_mask_others() {
        let f = fixture();
        for endpoint in ["https://push.example/a", "https://push.example/b", "https://push.example/c"] {
            f.dispatcher.subscribe(new_subscription(endpoint)).await.unwrap();
        }
        f.push.respond("https://push.example/b", MockPushOutcome::Rejected(500));
        f.push.respond("https://push.example/c", MockPushOutcome::Gone);

        let dir = tempdir().unwrap();
        let image = stage_file(dir.path(), "banner.png", "image/png").await;

        let report = f.dispatcher.broadcast(draft(), vec![image]).await.unwrap();

        assert_eq!(report.deliveries.len(), 3);
        assert_eq!(report.delivered(), 1);
        assert_eq!(report.failed(), 1);
        let pruned: Vec<_> = report
            .deliveries
            .iter()
            .filter(|d| d.status == DeliveryStatus::Pruned)
            .map(|d| d.endpoint.as_str())
            .collect();
        assert_eq!(pruned, vec!["https://push.example/c"]);

        let remaining: Vec<_> = f.subscriptions.endpoints();
        assert_eq!(remaining.len(), 2);
        assert!(!remaining.contains(&"https://push.example/c".to_string()));
        assert_eq!(f.broadcasts.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_payload_carries_icon_for_stored_image() {
        let f = fixture();
        f.dispatcher
            .subscribe(new_subscription("https://push.example/a"))
            .await
            .unwrap();

        let dir = tempdir().unwrap();
        let image = stage_file(dir.path(), "banner.png", "image/png").await;
        f.dispatcher.broadcast(draft(), vec![image]).await.unwrap();

        let stored = f.broadcasts.rows().pop().unwrap();
        let image_key = stored.image_key.unwrap();
        let (_, payload) = f.push.sent().pop().unwrap();
        let payload: NotificationPayload = serde_json::from_str(&payload).unwrap();
        assert_eq!(
            payload.icon.unwrap(),
            format!("http://localhost:5000/image/{}", image_key)
        );
        assert!(f.storage.object(&image_key).is_some());
    }

    #[tokio::test]
    async fn test_broadcast_without_image_is_missing_media() {
        let f = fixture();

        let err = f.dispatcher.broadcast(draft(), vec![]).await.unwrap_err();
        assert!(matches!(err, AppError::MissingMedia(_)));

        let dir = tempdir().unwrap();
        let audio = stage_file(dir.path(), "jingle.mp3", "audio/mpeg").await;
        let err = f.dispatcher.broadcast(draft(), vec![audio]).await.unwrap_err();
        assert!(matches!(err, AppError::MissingMedia(_)));

        assert!(f.broadcasts.rows().is_empty());
        assert_eq!(f.storage.put_keys().len(), 1);
        assert_eq!(f.storage.deleted_keys(), f.storage.put_keys());
        assert!(f.push.sent().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_is_idempotent_per_endpoint() {
        let f = fixture();

        let first = f
            .dispatcher
            .subscribe(new_subscription("https://push.example/a"))
            .await
            .unwrap();
        let second = f
            .dispatcher
            .subscribe(new_subscription("https://push.example/a"))
            .await
            .unwrap();

        assert!(matches!(first, SubscribeOutcome::Created(_)));
        assert_eq!(second, SubscribeOutcome::AlreadySubscribed);
        assert_eq!(f.subscriptions.endpoints().len(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_endpoint() {
        let f = fixture();
        let err = f
            .dispatcher
            .unsubscribe("https://push.example/nobody")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        f.dispatcher
            .subscribe(new_subscription("https://push.example/a"))
            .await
            .unwrap();
        assert!(f.dispatcher.unsubscribe("https://push.example/a").await.is_ok());
        assert!(f.subscriptions.endpoints().is_empty());
    }

    #[tokio::test]
    async fn test_broadcasts_since_requires_known_endpoint() {
        let f = fixture();
        let err = f
            .dispatcher
            .broadcasts_since_subscription("https://push.example/nobody")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_broadcast_removes_image() {
        let f = fixture();
        let dir = tempdir().unwrap();
        let image = stage_file(dir.path(), "banner.png", "image/png").await;
        let report = f.dispatcher.broadcast(draft(), vec![image]).await.unwrap();
        let image_key = f.broadcasts.rows()[0].image_key.clone().unwrap();

        f.dispatcher.delete_broadcast(report.broadcast.id).await.unwrap();

        assert!(f.broadcasts.rows().is_empty());
        assert_eq!(f.storage.deleted_keys(), vec![image_key]);
        assert!(matches!(
            f.dispatcher.delete_broadcast(report.broadcast.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
