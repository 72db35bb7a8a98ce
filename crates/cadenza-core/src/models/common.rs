use serde::Deserialize;
use utoipa::ToSchema;

/// Body of every `.../visibility` route
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct SetVisibilityRequest {
    #[serde(alias = "state")]
    pub visible: bool,
}

/// Message returned by a visibility toggle.
pub fn visibility_message(visible: bool) -> &'static str {
    if visible {
        "Added Favourite"
    } else {
        "Removed Favourite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_accepts_state_alias() {
        let request: SetVisibilityRequest =
            serde_json::from_value(serde_json::json!({ "state": true })).unwrap();
        assert!(request.visible);
    }

    #[test]
    fn test_visibility_message() {
        assert_eq!(visibility_message(true), "Added Favourite");
        assert_eq!(visibility_message(false), "Removed Favourite");
    }
}
