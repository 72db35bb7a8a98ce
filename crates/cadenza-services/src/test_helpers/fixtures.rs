use crate::uploader::StagedFile;
use cadenza_core::models::TrackFields;
use std::path::Path;

/// Write a small file into `dir` the way the multipart layer stages uploads
pub async fn stage_file(dir: &Path, original_name: &str, content_type: &str) -> StagedFile {
    let path = dir.join(format!("staged-{}", original_name));
    tokio::fs::write(&path, original_name.as_bytes())
        .await
        .unwrap();
    StagedFile {
        original_name: original_name.to_string(),
        content_type: content_type.to_string(),
        path,
    }
}

/// Hidden track with only a title set
pub fn track_fields(title: &str) -> TrackFields {
    TrackFields {
        title: title.to_string(),
        album_title: String::new(),
        artists: Vec::new(),
        genre: Vec::new(),
        category: Vec::new(),
        visible: false,
        duration: 0.0,
    }
}
