//! Service wiring

use crate::state::{AppState, UploadLimits};
use anyhow::{Context, Result};
use cadenza_core::Config;
use cadenza_db::{
    ArtistRepository, ArtistStore, BroadcastRepository, BroadcastStore, PlaylistRepository,
    PlaylistStore, SubscriptionRepository, SubscriptionStore, TaxonomyRepository, TaxonomyStore,
    TrackRepository, TrackStore,
};
use cadenza_services::{
    CatalogueService, FileBatchDeleter, FileBatchUploader, LifecycleCoordinator,
    NotificationDispatcher, PushDelivery, TaxonomyRenameCascader, TaxonomyService, VapidKeys,
    WebPushClient, WebPushConfig,
};
use cadenza_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Every relational store the services read and write
#[derive(Clone)]
pub struct Stores {
    pub tracks: Arc<dyn TrackStore>,
    pub artists: Arc<dyn ArtistStore>,
    pub taxonomy: Arc<dyn TaxonomyStore>,
    pub playlists: Arc<dyn PlaylistStore>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub broadcasts: Arc<dyn BroadcastStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            tracks: Arc::new(TrackRepository::new(pool.clone())),
            artists: Arc::new(ArtistRepository::new(pool.clone())),
            taxonomy: Arc::new(TaxonomyRepository::new(pool.clone())),
            playlists: Arc::new(PlaylistRepository::new(pool.clone())),
            subscriptions: Arc::new(SubscriptionRepository::new(pool.clone())),
            broadcasts: Arc::new(BroadcastRepository::new(pool)),
        }
    }
}

/// Web push client from the VAPID settings; unsigned when no keys are set
pub fn setup_push(config: &Config) -> Result<Arc<dyn PushDelivery>> {
    let vapid = match (config.web_push_public_key(), config.web_push_private_key()) {
        (Some(public_key), Some(private_key)) => Some(VapidKeys {
            public_key: public_key.to_string(),
            private_key_pem: private_key.to_string(),
            subject: config.web_push_mail_id().unwrap_or_default().to_string(),
        }),
        _ => None,
    };

    let client = WebPushClient::new(WebPushConfig {
        timeout: Duration::from_secs(config.push_timeout_seconds()),
        ttl_seconds: config.push_ttl_seconds(),
        vapid,
    })
    .context("Failed to initialize web push client")?;

    Ok(Arc::new(client))
}

/// Build the handler state from its collaborators
pub fn build_state(
    config: &Config,
    stores: Stores,
    storage: Arc<dyn Storage>,
    push: Arc<dyn PushDelivery>,
) -> Arc<AppState> {
    let concurrency = config.storage_concurrency();
    let uploader = FileBatchUploader::new(storage.clone(), concurrency);
    let deleter = FileBatchDeleter::new(storage.clone(), concurrency);
    let cascader = TaxonomyRenameCascader::new(stores.tracks.clone(), concurrency);

    let catalogue = CatalogueService::new(
        stores.tracks.clone(),
        stores.artists.clone(),
        stores.taxonomy.clone(),
        stores.playlists.clone(),
    );
    let lifecycle = LifecycleCoordinator::new(
        stores.tracks.clone(),
        stores.artists.clone(),
        stores.playlists.clone(),
        uploader.clone(),
        deleter.clone(),
        cascader.clone(),
    );
    let taxonomy = TaxonomyService::new(stores.taxonomy.clone(), cascader);
    let notifications = NotificationDispatcher::new(
        stores.subscriptions,
        stores.broadcasts,
        uploader,
        deleter,
        push,
        config.public_base_url().to_string(),
        config.push_max_concurrent(),
    );

    tracing::info!(
        storage_concurrency = concurrency,
        push_max_concurrent = config.push_max_concurrent(),
        "Services initialized"
    );

    Arc::new(AppState {
        catalogue,
        lifecycle,
        taxonomy,
        notifications,
        storage,
        uploads: UploadLimits {
            staging_dir: config.upload_staging_dir().clone(),
            max_file_size: config.max_upload_size_bytes(),
            audio_content_types: config.audio_content_types().to_vec(),
            image_content_types: config.image_content_types().to_vec(),
        },
    })
}
