use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::ConfigError;

/// Keywords are stored lowercase: letters, digits, single spaces.
static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+( [a-z0-9]+)*$").expect("keyword regex is valid"));

/// The researched keyword catalog, loaded from `config/keywords.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordsFile {
    pub keywords: Vec<String>,
}

/// Load and validate the keyword catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation (empty catalog, malformed keyword, duplicates).
pub fn load_keywords(path: &Path) -> Result<KeywordsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::KeywordsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: KeywordsFile = serde_yaml::from_str(&content)?;
    validate_keywords(&file)?;
    Ok(file)
}

fn validate_keywords(file: &KeywordsFile) -> Result<(), ConfigError> {
    if file.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "keyword catalog must contain at least one keyword".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for keyword in &file.keywords {
        if !KEYWORD_RE.is_match(keyword) {
            return Err(ConfigError::Validation(format!(
                "invalid keyword '{keyword}'; use lowercase words separated by single spaces"
            )));
        }
        if !seen.insert(keyword.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate keyword: '{keyword}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(keywords: &[&str]) -> KeywordsFile {
        KeywordsFile {
            keywords: keywords.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn accepts_valid_catalog() {
        assert!(validate_keywords(&file(&["daily planner", "budget tracker"])).is_ok());
    }

    #[test]
    fn rejects_empty_catalog() {
        let err = validate_keywords(&file(&[])).unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn rejects_uppercase_keyword() {
        let err = validate_keywords(&file(&["Daily Planner"])).unwrap_err();
        assert!(err.to_string().contains("invalid keyword"));
    }

    #[test]
    fn rejects_double_spaces() {
        assert!(validate_keywords(&file(&["daily  planner"])).is_err());
    }

    #[test]
    fn rejects_duplicates() {
        let err = validate_keywords(&file(&["habit tracker", "habit tracker"])).unwrap_err();
        assert!(err.to_string().contains("duplicate keyword"));
    }

    #[test]
    fn load_keywords_from_real_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("keywords.yaml");
        assert!(
            path.exists(),
            "keywords.yaml missing at {path:?} — required for this test"
        );
        let result = load_keywords(&path);
        assert!(result.is_ok(), "failed to load keywords.yaml: {result:?}");
        assert!(!result.unwrap().keywords.is_empty());
    }
}
