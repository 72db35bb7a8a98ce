//! Postgres repositories, one per table family.

pub mod artist;
pub mod notification;
pub mod playlist;
pub mod taxonomy;
pub mod track;

pub use artist::{ArtistRepository, ArtistStore};
pub use notification::{BroadcastRepository, BroadcastStore, SubscriptionRepository, SubscriptionStore};
pub use playlist::{PlaylistRepository, PlaylistStore};
pub use taxonomy::{TaxonomyRepository, TaxonomyStore};
pub use track::{TrackRepository, TrackStore};
