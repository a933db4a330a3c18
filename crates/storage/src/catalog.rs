//! Loads the question catalog from JSON.

use std::path::{Path, PathBuf};

use quiz_core::model::{Catalog, CatalogDraft, CatalogError};
use thiserror::Error;

/// The catalog compiled into the binary.
pub const BUNDLED_CATALOG_JSON: &str = include_str!("../assets/catalog.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogLoadError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] CatalogError),
}

/// Parse and validate a catalog document.
///
/// # Errors
///
/// Returns `CatalogLoadError::Parse` for malformed JSON and
/// `CatalogLoadError::Invalid` if any category or question is rejected.
pub fn parse_catalog(json: &str) -> Result<Catalog, CatalogLoadError> {
    let draft: CatalogDraft = serde_json::from_str(json)?;
    let catalog = draft.validate()?;
    log::debug!(
        "loaded catalog with {} categories",
        catalog.categories().len()
    );
    Ok(catalog)
}

/// Read a catalog from disk.
///
/// # Errors
///
/// Returns `CatalogLoadError` if the file cannot be read or is invalid.
pub fn load_catalog_file(path: &Path) -> Result<Catalog, CatalogLoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&json)
}

/// The bundled catalog.
///
/// # Errors
///
/// Returns `CatalogLoadError` only if the bundled document is broken.
pub fn bundled_catalog() -> Result<Catalog, CatalogLoadError> {
    parse_catalog(BUNDLED_CATALOG_JSON)
}

/// Load from `path` when given, otherwise fall back to the bundled catalog.
///
/// # Errors
///
/// Returns `CatalogLoadError` if the selected catalog cannot be loaded.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, CatalogLoadError> {
    match path {
        Some(path) => load_catalog_file(path),
        None => bundled_catalog(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{CategoryId, QuestionType};

    #[test]
    fn bundled_catalog_is_valid() {
        let catalog = bundled_catalog().unwrap();
        assert!(!catalog.categories().is_empty());
        assert!(catalog.find(&CategoryId::new("nutrition")).is_some());
    }

    #[test]
    fn bundled_catalog_covers_every_question_type() {
        let catalog = bundled_catalog().unwrap();
        let kinds: Vec<QuestionType> = catalog
            .categories()
            .iter()
            .flat_map(|c| c.questions().iter().map(|q| q.kind().question_type()))
            .collect();

        for expected in [
            QuestionType::TrueFalse,
            QuestionType::MultipleChoice,
            QuestionType::Matching,
            QuestionType::FillBlank,
            QuestionType::ShortQuestion,
        ] {
            assert!(kinds.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_catalog("{ not json").unwrap_err();
        assert!(matches!(err, CatalogLoadError::Parse(_)));
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let err = parse_catalog(r#"{ "categories": [] }"#).unwrap_err();
        assert!(matches!(err, CatalogLoadError::Invalid(CatalogError::Empty)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_catalog(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, CatalogLoadError::Io { .. }));
    }
}
