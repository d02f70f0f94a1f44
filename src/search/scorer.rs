use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Points awarded for each kind of match
///
/// Field names follow the `Scorer` object a documentation theme can override
/// (`term`, `partialTerm`, `title`, `partialTitle`); omitted fields keep
/// their default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scorer {
    /// Exact match in the body
    pub term: i32,
    /// Body term containing the word
    #[serde(alias = "partial_term")]
    pub partial_term: i32,
    /// Exact match in a heading
    pub title: i32,
    /// Heading term containing the word
    #[serde(alias = "partial_title")]
    pub partial_title: i32,
}

impl Default for Scorer {
    fn default() -> Self {
        Self { term: 5, partial_term: 2, title: 15, partial_title: 7 }
    }
}

impl Scorer {
    /// Load weights from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scorer file: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid scorer file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_defaults() {
        let scorer = Scorer::default();
        assert_eq!(scorer.term, 5);
        assert_eq!(scorer.partial_term, 2);
        assert_eq!(scorer.title, 15);
        assert_eq!(scorer.partial_title, 7);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let scorer: Scorer = serde_json::from_str(r#"{"title": 30, "partialTerm": 1}"#).unwrap();
        assert_eq!(scorer, Scorer { term: 5, partial_term: 1, title: 30, partial_title: 7 });
    }

    #[test]
    fn test_snake_case_alias() {
        let scorer: Scorer = serde_json::from_str(r#"{"partial_title": 9}"#).unwrap();
        assert_eq!(scorer.partial_title, 9);
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scorer.json");
        fs::write(&path, r#"{"term": 1}"#).unwrap();
        assert_eq!(Scorer::from_file(&path).unwrap().term, 1);

        fs::write(&path, "not json").unwrap();
        let err = Scorer::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid scorer file"));
    }
}
