//! Cadenza Services Layer
//!
//! Business logic between the HTTP surface and the gateways: moving staged
//! files into object storage, keeping rows and blobs consistent across
//! create/update/delete, propagating taxonomy renames into tracks, and fanning
//! broadcasts out to push subscriptions. Every service receives its stores and
//! storage handle explicitly, so tests run against in-memory doubles.

pub mod catalogue;
pub mod deleter;
pub mod lifecycle;
pub mod notifications;
pub mod taxonomy;
pub mod uploader;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use catalogue::CatalogueService;
pub use deleter::{DeletionFailure, DeletionReport, FileBatchDeleter};
pub use lifecycle::LifecycleCoordinator;
pub use notifications::{
    BroadcastReport, DeliveryOutcome, DeliveryStatus, NotificationDispatcher, PushDelivery,
    PushError, SubscribeOutcome, VapidKeys, WebPushClient, WebPushConfig,
};
pub use taxonomy::{replace_first_occurrence, CascadeReport, TaxonomyRenameCascader, TaxonomyService};
pub use uploader::{FileBatchUploader, StagedFile, UploadFailure, UploadedMedia};
