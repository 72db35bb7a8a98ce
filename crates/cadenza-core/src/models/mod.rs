//! Data models for the application
//!
//! Catalogue rows as stored, the trimmed views returned to players, and the
//! request payloads accepted by the admin surface.

mod artist;
mod common;
mod media;
mod notification;
mod playlist;
mod taxonomy;
mod track;

pub use artist::*;
pub use common::*;
pub use media::*;
pub use notification::*;
pub use playlist::*;
pub use taxonomy::*;
pub use track::*;
