//! Listing batch loading.

use std::path::{Path, PathBuf};

use realty_listing_models::Listing;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Listing #{index} has no externalId")]
    MissingId { index: usize },
}

/// Parses a JSON array of listings, rejecting records without an
/// identifier.
///
/// # Errors
///
/// * If `json` is not an array of listing objects
/// * If any listing has an empty `externalId`
pub fn parse_listings(json: &str, path: &Path) -> Result<Vec<Listing>, InputError> {
    let listings: Vec<Listing> =
        serde_json::from_str(json).map_err(|source| InputError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(index) = listings
        .iter()
        .position(|l| l.external_id.trim().is_empty())
    {
        return Err(InputError::MissingId { index });
    }

    Ok(listings)
}

/// Reads a listing batch from `path`.
///
/// # Errors
///
/// * If the file cannot be read
/// * If the contents fail [`parse_listings`]
pub fn read_listings(path: &Path) -> Result<Vec<Listing>, InputError> {
    let json = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let listings = parse_listings(&json, path)?;
    log::info!("Loaded {} listings from {}", listings.len(), path.display());
    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_batch() {
        let json = r#"[
            {"externalId": "1", "source": "kufar", "address": "Барановичи, ул. Николы Теслы, 33",
             "price": 45000, "area": 48.2, "rooms": 2, "latitude": null, "longitude": null,
             "floor": "3/9", "createdAt": "2026-10-01T12:00:00Z"},
            {"externalId": "2", "source": "realt", "metadata": {"city": "Барановичи", "lat": 53.13, "lng": 26.0}}
        ]"#;
        let listings = parse_listings(json, Path::new("batch.json")).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].rooms, Some(2));
        assert_eq!(listings[1].metadata_str("city"), Some("Барановичи"));
    }

    #[test]
    fn rejects_missing_identifier() {
        let json = r#"[{"externalId": "1", "source": "kufar"}, {"externalId": " ", "source": "kufar"}]"#;
        let err = parse_listings(json, Path::new("batch.json")).unwrap_err();
        assert!(matches!(err, InputError::MissingId { index: 1 }));
    }

    #[test]
    fn rejects_non_array() {
        let err = parse_listings("{}", Path::new("batch.json")).unwrap_err();
        assert!(matches!(err, InputError::Json { .. }));
    }
}
