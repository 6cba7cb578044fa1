//! Run settings shared by every subcommand.
//!
//! Settings come from command-line flags (with environment fallbacks, see
//! `lib.rs`). There is no configuration file.

use std::path::PathBuf;

use url::Url;

use crate::error::TopoSyncError;

/// Wikibase API endpoint of the transit topo entity store.
pub const DEFAULT_API: &str = "https://topo.transport.data.gouv.fr/api.php";
/// SPARQL endpoint backing the entity store.
pub const DEFAULT_SPARQL: &str = "https://sparql.topo.transport.data.gouv.fr/bigdata/sparql";
/// Dataset catalog endpoint of transport.data.gouv.fr.
pub const DEFAULT_CATALOG_URL: &str = "https://transport.data.gouv.fr/api/datasets";
/// Base of the canonical data.gouv.fr dataset pages.
const DATASET_PAGE_BASE: &str = "https://www.data.gouv.fr/fr/datasets/";

/// Name of the url property linking a producer to its data.gouv.fr page.
pub const DATA_GOUV_URL_PROPERTY: &str = "data_gouv_url";

/// Where the catalog is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    Remote(String),
    File(PathBuf),
}

/// Program names of the external tools.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Programs {
    pub entities: String,
    pub prepopulate: String,
    pub import_gtfs: String,
}

impl Default for Programs {
    fn default() -> Self {
        Self {
            entities: "entities".to_string(),
            prepopulate: "prepopulate".to_string(),
            import_gtfs: "import-gtfs".to_string(),
        }
    }
}

/// Settings for one run.
#[derive(Clone, Debug)]
pub struct Settings {
    pub api: String,
    pub sparql: String,
    pub catalog: CatalogSource,
    /// Identifier of the `data_gouv_url` property, when already known.
    pub property_id: Option<String>,
    pub programs: Programs,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: DEFAULT_API.to_string(),
            sparql: DEFAULT_SPARQL.to_string(),
            catalog: CatalogSource::Remote(DEFAULT_CATALOG_URL.to_string()),
            property_id: None,
            programs: Programs::default(),
        }
    }
}

impl Settings {
    /// Arguments appended to every entity-store command.
    pub fn common_args(&self) -> Vec<String> {
        vec![
            "--api".to_string(),
            self.api.clone(),
            "--sparql".to_string(),
            self.sparql.clone(),
        ]
    }

    /// Canonical data.gouv.fr page of a dataset, used as the producer claim value.
    pub fn dataset_page_url(&self, datagouv_id: &str) -> Result<String, TopoSyncError> {
        page_url(DATASET_PAGE_BASE, datagouv_id)
    }
}

fn page_url(base: &str, datagouv_id: &str) -> Result<String, TopoSyncError> {
    let invalid = |message: String| TopoSyncError::DatasetUrl {
        id: datagouv_id.to_string(),
        message,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(format!("bad base '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|()| invalid(format!("'{base}' cannot be a base")))?
        .pop_if_empty()
        .push(datagouv_id);
    Ok(url.to_string())
}
