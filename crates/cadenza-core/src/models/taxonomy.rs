use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Structurally identical label tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TaxonomyKind {
    #[serde(rename = "genres")]
    Genre,
    #[serde(rename = "categories")]
    Category,
}

impl TaxonomyKind {
    pub fn table(&self) -> &'static str {
        match self {
            TaxonomyKind::Genre => "genres",
            TaxonomyKind::Category => "categories",
        }
    }

    /// Track column holding labels of this kind
    pub fn track_field(&self) -> TermField {
        match self {
            TaxonomyKind::Genre => TermField::Genre,
            TaxonomyKind::Category => TermField::Category,
        }
    }
}

impl std::fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Denormalized label array on `tracks` that a rename rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermField {
    Genre,
    Category,
    Artists,
}

impl TermField {
    pub fn column(&self) -> &'static str {
        match self {
            TermField::Genre => "genre",
            TermField::Category => "category",
            TermField::Artists => "artists",
        }
    }
}

/// Genre or category row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct TaxonomyTerm {
    pub id: i32,
    pub label: String,
    pub visible: bool,
}

/// One track's label array for a single [`TermField`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct TrackTerms {
    pub id: i32,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateTermsRequest {
    #[validate(length(min = 1, message = "At least one label is required"))]
    #[serde(alias = "types")]
    pub labels: Vec<String>,
    #[serde(default, alias = "show")]
    pub visible: bool,
}

/// Rename request. `previous` overrides the label read back from the row
/// as the value to search for in tracks.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UpdateTermRequest {
    #[validate(length(min = 1, max = 255, message = "Label must be between 1 and 255 characters"))]
    #[serde(alias = "type")]
    pub label: String,
    #[serde(default, alias = "show")]
    pub visible: bool,
    #[serde(default, alias = "old")]
    pub previous: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_path_names() {
        let kind: TaxonomyKind = serde_json::from_str("\"genres\"").unwrap();
        assert_eq!(kind, TaxonomyKind::Genre);
        let kind: TaxonomyKind = serde_json::from_str("\"categories\"").unwrap();
        assert_eq!(kind.track_field(), TermField::Category);
        assert!(serde_json::from_str::<TaxonomyKind>("\"genre\"").is_err());
    }

    #[test]
    fn test_requests_accept_legacy_field_names() {
        let create: CreateTermsRequest =
            serde_json::from_value(serde_json::json!({ "types": ["Rock"], "show": true })).unwrap();
        assert_eq!(create.labels, vec!["Rock".to_string()]);
        assert!(create.visible);

        let update: UpdateTermRequest =
            serde_json::from_value(serde_json::json!({ "type": "Jazz", "old": "Rock" })).unwrap();
        assert_eq!(update.label, "Jazz");
        assert_eq!(update.previous.as_deref(), Some("Rock"));
        assert!(!update.visible);
    }
}
