//! Test helpers for service and API tests
//!
//! In-memory doubles for the object store, every relational store and push
//! delivery, plus small fixtures. No database or network is needed.

pub mod fixtures;
pub mod mock_push;
pub mod mock_repositories;
pub mod mock_storage;

pub use fixtures::*;
pub use mock_push::{MockPushOutcome, RecordingPushDelivery};
pub use mock_repositories::{
    MockArtistStore, MockBroadcastStore, MockPlaylistStore, MockSubscriptionStore,
    MockTaxonomyStore, MockTrackStore,
};
pub use mock_storage::MockStorage;
