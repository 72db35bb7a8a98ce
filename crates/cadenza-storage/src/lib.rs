//! Cadenza Storage Library
//!
//! Object Store Gateway for track audio, cover art and broadcast images.
//! It provides the [`Storage`] trait plus S3 and local filesystem backends.
//!
//! # Object key format
//!
//! Keys are flat: `{unix_millis}-{8 hex chars}{.ext}`, for example
//! `1700000000000-3f9a12bc.mp3`. Keys must not be empty, contain `..` or start
//! with `/`. Key generation is centralized in the `keys` module so every
//! backend accepts the same keys.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use cadenza_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{generate_object_key, validate_key};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
