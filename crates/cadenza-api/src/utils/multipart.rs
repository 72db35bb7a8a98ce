//! Multipart staging for the admin forms.
//!
//! Text fields are collected as strings. File fields are streamed chunk by
//! chunk into a per-request directory under the staging root, so a large
//! audio file never sits in memory. The directory is removed when the
//! [`MultipartForm`] is dropped, which takes any file the services did not
//! consume with it.

use crate::state::UploadLimits;
use axum::extract::Multipart;
use cadenza_core::AppError;
use cadenza_services::StagedFile;
use std::collections::HashMap;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

const UNSUPPORTED_MIME: &str = "Mime type not supported";

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_ascii_lowercase()
}

fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Text fields of a form, looked up by any of several accepted names
#[derive(Debug, Default, Clone)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// First present field among `names`, trimmed
    pub fn text(&self, names: &[&str]) -> Option<String> {
        names
            .iter()
            .find_map(|name| self.0.get(*name))
            .map(|value| value.trim().to_string())
    }

    pub fn required_text(&self, names: &[&str]) -> Result<String, AppError> {
        self.text(names)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::InvalidInput(format!("Field '{}' is required", names[0])))
    }

    /// A JSON array of strings or a comma-separated string. Absent means empty.
    pub fn list(&self, names: &[&str]) -> Result<Vec<String>, AppError> {
        let Some(raw) = self.text(names) else {
            return Ok(Vec::new());
        };
        if raw.starts_with('[') {
            let values: Vec<String> = serde_json::from_str(&raw).map_err(|e| {
                AppError::InvalidInput(format!("Field '{}' is not a list: {}", names[0], e))
            })?;
            return Ok(values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect());
        }
        Ok(raw
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect())
    }

    pub fn ids(&self, names: &[&str]) -> Result<Vec<i32>, AppError> {
        let Some(raw) = self.text(names) else {
            return Ok(Vec::new());
        };
        if raw.starts_with('[') {
            return serde_json::from_str(&raw).map_err(|e| {
                AppError::InvalidInput(format!("Field '{}' is not a list of ids: {}", names[0], e))
            });
        }
        raw.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| {
                v.parse::<i32>().map_err(|_| {
                    AppError::InvalidInput(format!("Field '{}' holds a non-numeric id", names[0]))
                })
            })
            .collect()
    }

    /// Absent or empty means false
    pub fn flag(&self, names: &[&str]) -> Result<bool, AppError> {
        match self.text(names).map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("false") | Some("0") | Some("off") | Some("no") => Ok(false),
            Some("true") | Some("1") | Some("on") | Some("yes") => Ok(true),
            Some(other) => Err(AppError::InvalidInput(format!(
                "Field '{}' must be a boolean, got '{}'",
                names[0], other
            ))),
        }
    }

    pub fn number(&self, names: &[&str]) -> Result<f64, AppError> {
        match self.text(names).filter(|v| !v.is_empty()) {
            None => Ok(0.0),
            Some(raw) => raw.parse::<f64>().map_err(|_| {
                AppError::InvalidInput(format!("Field '{}' must be a number", names[0]))
            }),
        }
    }
}

/// A parsed form. Keep it alive until the operation finishes.
pub struct MultipartForm {
    pub fields: FormFields,
    files: Vec<StagedFile>,
    _staging: TempDir,
}

impl MultipartForm {
    pub fn take_files(&mut self) -> Vec<StagedFile> {
        std::mem::take(&mut self.files)
    }
}

/// Read every part of a multipart body, staging file parts on disk
pub async fn read_multipart(
    mut multipart: Multipart,
    limits: &UploadLimits,
) -> Result<MultipartForm, AppError> {
    tokio::fs::create_dir_all(&limits.staging_dir).await?;
    let staging = tempfile::Builder::new()
        .prefix("upload-")
        .tempdir_in(&limits.staging_dir)?;

    let mut fields = FormFields::default();
    let mut files = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();

        let Some(original_name) = field.file_name().map(|s| s.to_string()) else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read field: {}", e)))?;
            fields.insert(name, value);
            continue;
        };

        // Browsers send an empty part for a file input left blank
        if original_name.is_empty() {
            continue;
        }

        let content_type = normalize_mime_type(
            field.content_type().unwrap_or("application/octet-stream"),
        );
        if !limits.accepts(&content_type) {
            tracing::debug!(field = %name, content_type = %content_type, "Rejected upload content type");
            return Err(AppError::UnsupportedMediaType(UNSUPPORTED_MIME.to_string()));
        }

        let path = staging
            .path()
            .join(format!("{:02}-{}", files.len(), sanitize_filename(&original_name)));
        let mut out = tokio::fs::File::create(&path).await?;
        let mut written = 0usize;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?
        {
            written += chunk.len();
            if written > limits.max_file_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "File size exceeds maximum allowed size of {} MB",
                    limits.max_file_size / 1024 / 1024
                )));
            }
            out.write_all(&chunk).await?;
        }
        out.flush().await?;

        tracing::debug!(
            field = %name,
            original_name = %original_name,
            content_type = %content_type,
            size_bytes = written,
            "Staged upload"
        );

        files.push(StagedFile {
            original_name,
            content_type,
            path,
        });
    }

    Ok(MultipartForm {
        fields,
        files,
        _staging: staging,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        let mut fields = FormFields::default();
        for (name, value) in pairs {
            fields.insert(*name, *value);
        }
        fields
    }

    #[test]
    fn test_list_accepts_json_and_csv() {
        let form = fields(&[("genre", r#"["Rock", " Jazz "]"#), ("artist", "Ana, Bo,,")]);
        assert_eq!(form.list(&["genre"]).unwrap(), vec!["Rock", "Jazz"]);
        assert_eq!(form.list(&["artists", "artist"]).unwrap(), vec!["Ana", "Bo"]);
        assert!(form.list(&["category"]).unwrap().is_empty());
    }

    #[test]
    fn test_list_rejects_broken_json() {
        let form = fields(&[("genre", "[\"Rock\"")]);
        assert!(matches!(form.list(&["genre"]), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_aliases_pick_first_present() {
        let form = fields(&[("musicTitle", " Blue "), ("show", "true")]);
        assert_eq!(form.text(&["title", "musicTitle"]).as_deref(), Some("Blue"));
        assert!(form.flag(&["visible", "show"]).unwrap());
        assert!(!form.flag(&["missing"]).unwrap());
        assert!(form.flag(&["musicTitle"]).is_err());
    }

    #[test]
    fn test_numbers_and_ids() {
        let form = fields(&[("duration", "182.5"), ("songIds", "[3, 1, 3]"), ("csv", "4, 5")]);
        assert_eq!(form.number(&["duration"]).unwrap(), 182.5);
        assert_eq!(form.number(&["absent"]).unwrap(), 0.0);
        assert_eq!(form.ids(&["songIds"]).unwrap(), vec![3, 1, 3]);
        assert_eq!(form.ids(&["csv"]).unwrap(), vec![4, 5]);
        assert!(fields(&[("csv", "4,x")]).ids(&["csv"]).is_err());
    }

    #[test]
    fn test_required_text_rejects_blank() {
        let form = fields(&[("name", "  ")]);
        assert!(form.required_text(&["name"]).is_err());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("../../etc/pass wd"), "pass_wd");
        assert_eq!(sanitize_filename("C:\\music\\song.mp3"), "song.mp3");
        assert_eq!(sanitize_filename(".."), "upload");
        assert_eq!(normalize_mime_type("Image/PNG; q=1"), "image/png");
    }
}
