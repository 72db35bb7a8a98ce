pub mod artists;
pub mod health;
pub mod media;
pub mod notifications;
pub mod playlists;
pub mod taxonomy;
pub mod tracks;
