//! Object key generation and validation shared by every backend.

use crate::traits::{StorageError, StorageResult};
use uuid::Uuid;

/// Generate a fresh object key for an uploaded file.
///
/// The key is `{unix_millis}-{8 hex chars}` followed by the lower-cased
/// extension of `original_name`, if it has one.
pub fn generate_object_key(original_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();

    match extension_of(original_name) {
        Some(ext) => format!("{}-{}.{}", millis, &suffix[..8], ext),
        None => format!("{}-{}", millis, &suffix[..8]),
    }
}

fn extension_of(original_name: &str) -> Option<String> {
    // Only the final path segment counts, browsers sometimes send full paths
    let file_name = original_name.rsplit(['/', '\\']).next().unwrap_or(original_name);
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Reject keys that could escape a backend's namespace.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.trim().is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_keeps_lowercased_extension() {
        let key = generate_object_key("My Song.MP3");
        let (prefix, ext) = key.rsplit_once('.').unwrap();
        assert_eq!(ext, "mp3");

        let (millis, hex) = prefix.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(hex.len(), 8);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_key_without_extension() {
        let key = generate_object_key("cover");
        assert!(!key.contains('.'));
        assert!(!generate_object_key(".hidden").contains('.'));
        assert!(generate_object_key("C:\\uploads\\cover.PNG").ends_with(".png"));
    }

    #[test]
    fn test_generated_keys_do_not_collide() {
        let a = generate_object_key("a.png");
        let b = generate_object_key("a.png");
        assert_ne!(a, b);
        assert!(validate_key(&a).is_ok());
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("1700000000000-3f9a12bc.mp3").is_ok());
        assert!(matches!(validate_key(""), Err(StorageError::InvalidKey(_))));
        assert!(matches!(validate_key("../etc/passwd"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(validate_key("/etc/passwd"), Err(StorageError::InvalidKey(_))));
    }
}
