//! The transport.data.gouv.fr dataset catalog.
//!
//! The catalog endpoint returns a JSON array of datasets. Only the fields
//! used by the sync are modelled; everything else in the payload is ignored.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::config::CatalogSource;
use crate::error::TopoSyncError;

/// Dataset type tag of the datasets whose resources get imported.
pub const PUBLIC_TRANSIT: &str = "public-transit";

/// Upper bound on the catalog payload. The full catalog is a few megabytes.
const MAX_CATALOG_BYTES: u64 = 64 * 1024 * 1024;

/// A dataset listed by the catalog.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Dataset {
    #[serde(default)]
    pub title: Option<String>,
    pub datagouv_id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Dataset {
    pub fn is_public_transit(&self) -> bool {
        self.kind.as_deref() == Some(PUBLIC_TRANSIT)
    }

    /// Title used in logs and failure records.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("<untitled>")
    }
}

/// A downloadable resource of a dataset.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Resource {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Resource {
    /// The download URL, if present and non-empty.
    pub fn import_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    /// True if the format tag is `gtfs`, ignoring case.
    pub fn is_gtfs(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case("gtfs"))
    }
}

/// Load the catalog from wherever the settings point.
pub fn load_catalog(source: &CatalogSource) -> Result<Vec<Dataset>, TopoSyncError> {
    let datasets = match source {
        CatalogSource::Remote(url) => fetch_catalog(url)?,
        CatalogSource::File(path) => read_catalog_file(path)?,
    };
    tracing::debug!("catalog lists {} datasets", datasets.len());
    Ok(datasets)
}

/// Fetch the catalog over HTTP.
///
/// No retry and no pagination: any network, HTTP status or decoding error
/// aborts the run.
pub fn fetch_catalog(url: &str) -> Result<Vec<Dataset>, TopoSyncError> {
    tracing::info!("fetching catalog from {url}");

    let fetch_error = |message: String| TopoSyncError::CatalogFetch {
        url: url.to_string(),
        message,
    };

    let mut response = ureq::get(url)
        .call()
        .map_err(|source| fetch_error(source.to_string()))?;
    let body = response
        .body_mut()
        .with_config()
        .limit(MAX_CATALOG_BYTES)
        .read_to_string()
        .map_err(|source| fetch_error(source.to_string()))?;

    parse_catalog(&body, url)
}

/// Read a catalog snapshot from a local JSON file.
pub fn read_catalog_file(path: &Path) -> Result<Vec<Dataset>, TopoSyncError> {
    tracing::info!("reading catalog from {}", path.display());

    let file = File::open(path).map_err(|source| TopoSyncError::CatalogRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| TopoSyncError::CatalogParse {
        origin: path.display().to_string(),
        source,
    })
}

/// Parse a catalog JSON document.
///
/// `origin` only appears in error messages.
pub fn parse_catalog(json: &str, origin: &str) -> Result<Vec<Dataset>, TopoSyncError> {
    serde_json::from_str(json).map_err(|source| TopoSyncError::CatalogParse {
        origin: origin.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "title": "Réseau Mistral",
            "datagouv_id": "5b3cc5a3c751df5a2f56fd28",
            "type": "public-transit",
            "slug": "reseau-mistral",
            "resources": [
                {"url": "https://example.org/mistral.zip", "format": "GTFS", "title": "GTFS Mistral"},
                {"url": "https://example.org/mistral.json", "format": "gbfs", "title": "Vélos"}
            ]
        },
        {
            "title": null,
            "datagouv_id": "abc",
            "type": "bike-sharing"
        }
    ]"#;

    #[test]
    fn parses_catalog_and_ignores_unknown_fields() {
        let datasets = parse_catalog(SAMPLE, "sample").unwrap();
        assert_eq!(datasets.len(), 2);

        let mistral = &datasets[0];
        assert_eq!(mistral.title.as_deref(), Some("Réseau Mistral"));
        assert!(mistral.is_public_transit());
        assert_eq!(mistral.resources.len(), 2);
        assert!(mistral.resources[0].is_gtfs());
        assert!(!mistral.resources[1].is_gtfs());

        let bikes = &datasets[1];
        assert_eq!(bikes.title, None);
        assert_eq!(bikes.display_title(), "<untitled>");
        assert!(!bikes.is_public_transit());
        assert!(bikes.resources.is_empty());
    }

    #[test]
    fn missing_identifier_is_a_parse_error() {
        let err = parse_catalog(r#"[{"title": "x"}]"#, "inline").unwrap_err();
        assert!(matches!(err, TopoSyncError::CatalogParse { .. }));
        assert!(err.to_string().contains("inline"));
    }

    #[test]
    fn non_array_payload_is_a_parse_error() {
        assert!(parse_catalog(r#"{"datasets": []}"#, "inline").is_err());
    }

    #[test]
    fn gtfs_match_ignores_case() {
        for format in ["gtfs", "GTFS", "Gtfs"] {
            let resource = Resource {
                format: Some(format.to_string()),
                ..Default::default()
            };
            assert!(resource.is_gtfs(), "{format} should match");
        }
        assert!(!Resource::default().is_gtfs());
        assert!(!Resource {
            format: Some("gtfs-rt".to_string()),
            ..Default::default()
        }
        .is_gtfs());
    }

    #[test]
    fn empty_url_is_not_importable() {
        let empty = Resource {
            url: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(empty.import_url(), None);
        assert_eq!(Resource::default().import_url(), None);

        let present = Resource {
            url: Some("https://example.org/gtfs.zip".to_string()),
            ..Default::default()
        };
        assert_eq!(present.import_url(), Some("https://example.org/gtfs.zip"));
    }

    #[test]
    fn reads_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let datasets = load_catalog(&CatalogSource::File(path)).unwrap();
        assert_eq!(datasets.len(), 2);
    }

    #[test]
    fn missing_catalog_file_is_fatal() {
        let err = read_catalog_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, TopoSyncError::CatalogRead { .. }));
    }
}
