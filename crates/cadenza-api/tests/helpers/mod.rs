//! Test helpers: an API over in-memory stores and storage.
//!
//! Run from workspace root: `cargo test -p cadenza-api`. No database or
//! object store is needed.

pub mod fixtures;

use axum_test::TestServer;
use cadenza_api::setup::routes;
use cadenza_api::setup::services::{build_state, Stores};
use cadenza_core::{BaseConfig, Config, ServiceConfig, StorageBackend};
use cadenza_services::test_helpers::{
    MockArtistStore, MockBroadcastStore, MockPlaylistStore, MockStorage, MockSubscriptionStore,
    MockTaxonomyStore, MockTrackStore, RecordingPushDelivery,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// Test application: server plus handles on every double behind it
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MockStorage>,
    pub tracks: Arc<MockTrackStore>,
    pub artists: Arc<MockArtistStore>,
    pub taxonomy: Arc<MockTaxonomyStore>,
    pub playlists: Arc<MockPlaylistStore>,
    pub subscriptions: Arc<MockSubscriptionStore>,
    pub broadcasts: Arc<MockBroadcastStore>,
    pub push: Arc<RecordingPushDelivery>,
    pub staging: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Names of files left in the staging root, recursively
    pub fn staged_leftovers(&self) -> Vec<String> {
        fn walk(dir: &Path, out: &mut Vec<String>) {
            let Ok(entries) = std::fs::read_dir(dir) else {
                return;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, out);
                } else {
                    out.push(path.display().to_string());
                }
            }
        }
        let mut out = Vec::new();
        walk(self.staging.path(), &mut out);
        out
    }
}

pub fn create_test_config(staging_dir: &Path) -> Config {
    Config(Box::new(ServiceConfig {
        base: BaseConfig {
            server_port: 5000,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 1,
            environment: "test".to_string(),
        },
        database_url: "postgres://localhost/cadenza_test".to_string(),
        storage_backend: Some(StorageBackend::Local),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: Some(staging_dir.join("objects").display().to_string()),
        local_storage_base_url: Some("http://localhost:5000/media".to_string()),
        upload_staging_dir: staging_dir.to_path_buf(),
        max_upload_size_bytes: MAX_UPLOAD_BYTES,
        audio_content_types: vec!["audio/mpeg".to_string(), "audio/mp3".to_string()],
        image_content_types: vec![
            "image/png".to_string(),
            "image/jpeg".to_string(),
            "image/jpg".to_string(),
        ],
        storage_concurrency: 4,
        public_base_url: "http://localhost:5000".to_string(),
        web_push_public_key: None,
        web_push_private_key: None,
        web_push_mail_id: None,
        push_timeout_seconds: 1,
        push_ttl_seconds: 60,
        push_max_concurrent: 4,
    }))
}

pub fn setup_test_app() -> TestApp {
    let staging = TempDir::new().expect("Failed to create staging dir");
    let config = create_test_config(staging.path());

    let storage = Arc::new(MockStorage::new());
    let tracks = Arc::new(MockTrackStore::new());
    let artists = Arc::new(MockArtistStore::new());
    let taxonomy = Arc::new(MockTaxonomyStore::new());
    let playlists = Arc::new(MockPlaylistStore::new());
    let subscriptions = Arc::new(MockSubscriptionStore::new());
    let broadcasts = Arc::new(MockBroadcastStore::new());
    let push = Arc::new(RecordingPushDelivery::new());

    let stores = Stores {
        tracks: tracks.clone(),
        artists: artists.clone(),
        taxonomy: taxonomy.clone(),
        playlists: playlists.clone(),
        subscriptions: subscriptions.clone(),
        broadcasts: broadcasts.clone(),
    };
    let state = build_state(&config, stores, storage.clone(), push.clone());

    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        tracks,
        artists,
        taxonomy,
        playlists,
        subscriptions,
        broadcasts,
        push,
        staging,
    }
}
