//! Cadenza DB Library
//!
//! Relational Store Gateway. Every table family has a store trait (the seam the
//! services depend on) and a Postgres repository implementing it. Id-targeted
//! mutations report the affected row count or the row itself via `RETURNING`,
//! so callers can tell "not found" apart from success.
//!
//! Statements run in autocommit mode; there are no multi-statement transactions.

pub mod repositories;

pub use repositories::{
    ArtistRepository, ArtistStore, BroadcastRepository, BroadcastStore, PlaylistRepository,
    PlaylistStore, SubscriptionRepository, SubscriptionStore, TaxonomyRepository, TaxonomyStore,
    TrackRepository, TrackStore,
};

/// Directory holding the SQL migrations for this crate
pub const MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations");
