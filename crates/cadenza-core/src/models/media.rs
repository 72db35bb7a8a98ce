use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Slot a staged file fills once uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Image,
}

impl MediaKind {
    /// Classify by top-level MIME category. Anything that is not `image/*`
    /// is treated as audio.
    pub fn classify(content_type: &str) -> Self {
        let top_level = content_type
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if top_level == "image" {
            MediaKind::Image
        } else {
            MediaKind::Audio
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Image => "image",
        }
    }

    /// `Content-Type` to serve a stored object of this kind with.
    /// The type is derived from the key's extension; `.mp3` maps to `audio/mpeg`.
    pub fn content_type_for_key(&self, key: &str) -> String {
        let ext = key
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && !ext.contains('/'));

        match (self, ext.as_deref()) {
            (MediaKind::Audio, Some("mp3")) => "audio/mpeg".to_string(),
            (MediaKind::Image, Some("jpg")) => "image/jpeg".to_string(),
            (kind, Some(ext)) => format!("{}/{}", kind.as_str(), ext),
            (_, None) => "application/octet-stream".to_string(),
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_top_level_type() {
        assert_eq!(MediaKind::classify("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::classify("IMAGE/JPEG"), MediaKind::Image);
        assert_eq!(MediaKind::classify("audio/mpeg"), MediaKind::Audio);
        assert_eq!(MediaKind::classify("application/octet-stream"), MediaKind::Audio);
        assert_eq!(MediaKind::classify(""), MediaKind::Audio);
    }

    #[test]
    fn test_content_type_for_key() {
        assert_eq!(
            MediaKind::Audio.content_type_for_key("1700000000000-ab12cd34.mp3"),
            "audio/mpeg"
        );
        assert_eq!(MediaKind::Audio.content_type_for_key("a.WAV"), "audio/wav");
        assert_eq!(MediaKind::Image.content_type_for_key("cover.png"), "image/png");
        assert_eq!(MediaKind::Image.content_type_for_key("cover.jpg"), "image/jpeg");
        assert_eq!(
            MediaKind::Image.content_type_for_key("cover"),
            "application/octet-stream"
        );
    }
}
