//! Orchestration of the catalog → entity store sync.
//!
//! Each dataset is handled on its own: its producer is resolved by claim
//! before any of its resources is imported, and an import that exits
//! non-zero is recorded in the [`ImportReport`] instead of stopping the run.
//! A dataset whose producer cannot be found is counted and its resources
//! are skipped. Every other failure is returned as an error and aborts the
//! run.

mod report;

pub use report::{CreationSummary, ImportFailure, ImportReport};

use crate::catalog::Dataset;
use crate::config::{Settings, DATA_GOUV_URL_PROPERTY};
use crate::error::{display_status, TopoSyncError};
use crate::store::EntityStore;

/// Options for importing resources.
#[derive(Clone, Debug, Default)]
pub struct ImportOptions {
    /// Re-import feeds the store already holds.
    pub override_existing: bool,
}

/// State threaded through one run.
///
/// Holds the settings and the identifier of the `data_gouv_url` property
/// once it is known, so the property is created at most once per run.
#[derive(Clone, Debug)]
pub struct SyncContext {
    settings: Settings,
    property_id: Option<String>,
}

impl SyncContext {
    pub fn new(settings: Settings) -> Self {
        let property_id = settings.property_id.clone();
        Self {
            settings,
            property_id,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The property identifier, if already known.
    pub fn property_id(&self) -> Option<&str> {
        self.property_id.as_deref()
    }

    /// Create the `data_gouv_url` property and remember its identifier.
    pub fn create_property(
        &mut self,
        store: &mut dyn EntityStore,
    ) -> Result<String, TopoSyncError> {
        let output = store.create_property(DATA_GOUV_URL_PROPERTY)?;
        let id = single_identifier(&output, "entities create data_gouv_url")?;
        tracing::info!("property {DATA_GOUV_URL_PROPERTY} is {id}");

        self.property_id = Some(id.clone());
        Ok(id)
    }

    /// The property identifier, creating the property on first use.
    pub fn ensure_property(
        &mut self,
        store: &mut dyn EntityStore,
    ) -> Result<String, TopoSyncError> {
        match &self.property_id {
            Some(id) => Ok(id.clone()),
            None => self.create_property(store),
        }
    }

    /// Find the producer item claiming the dataset's data.gouv.fr page.
    ///
    /// Returns the search's trimmed output, or `None` when it is empty (no
    /// producer holds the claim). Several matches are passed through as-is:
    /// deduplicating producers is left to the store.
    pub fn resolve_producer(
        &mut self,
        store: &mut dyn EntityStore,
        dataset: &Dataset,
    ) -> Result<Option<String>, TopoSyncError> {
        let property = self.ensure_property(store)?;
        let url = self.settings.dataset_page_url(&dataset.datagouv_id)?;
        tracing::info!("searching producer of {}", dataset.display_title());

        let output = store.search_by_claim(&property, &url)?;
        let producer = output.trim();
        if producer.is_empty() {
            return Ok(None);
        }
        if producer.contains(char::is_whitespace) {
            tracing::warn!("several producers claim {url}: {producer}");
        }
        Ok(Some(producer.to_string()))
    }

    /// Create one producer per titled dataset.
    ///
    /// Nothing checks whether the producer already exists: the store's
    /// unique claim on `@instance_of=@producer` is what prevents duplicates.
    pub fn create_all_producers(
        &mut self,
        store: &mut dyn EntityStore,
        datasets: &[Dataset],
    ) -> Result<CreationSummary, TopoSyncError> {
        let property = self.ensure_property(store)?;
        let mut summary = CreationSummary::default();

        for dataset in datasets {
            summary.datasets += 1;

            let Some(title) = dataset.title.as_deref().filter(|t| !t.trim().is_empty()) else {
                tracing::info!("skipping dataset {} without title", dataset.datagouv_id);
                summary.skipped += 1;
                continue;
            };

            let title = ascii_title(title);
            tracing::info!("creating producer {title}");

            let url = self.settings.dataset_page_url(&dataset.datagouv_id)?;
            let id = store.create_producer(&title, &property, &url)?;
            tracing::debug!("producer {title} is {id}");
            summary.created += 1;
        }

        tracing::info!("{summary}");
        Ok(summary)
    }

    /// Import the GTFS resources of one dataset.
    ///
    /// A resource is imported when it has a URL, its dataset is
    /// public-transit, and its format is GTFS.
    pub fn import_dataset(
        &mut self,
        store: &mut dyn EntityStore,
        dataset: &Dataset,
        opts: &ImportOptions,
    ) -> Result<ImportReport, TopoSyncError> {
        let dataset_name = dataset.display_title();
        let mut report = ImportReport {
            datasets: 1,
            ..Default::default()
        };

        let Some(producer) = self.resolve_producer(store, dataset)? else {
            tracing::warn!("no producer for dataset {dataset_name}, skipping its resources");
            return Ok(report);
        };
        tracing::info!("dataset {dataset_name}, producer {producer}");

        for resource in &dataset.resources {
            let Some(url) = resource.import_url() else {
                continue;
            };
            if !dataset.is_public_transit() || !resource.is_gtfs() {
                continue;
            }
            report.resources += 1;

            let outcome = store.import_gtfs(url, &producer, opts.override_existing)?;
            if !outcome.success() {
                tracing::warn!(
                    "command {} exited with {}",
                    outcome.command,
                    display_status(&outcome.status)
                );
                report.failures.push(ImportFailure {
                    dataset: dataset_name.to_string(),
                    producer: producer.clone(),
                    command: outcome.command,
                    status: outcome.status,
                    resource: resource.title.clone(),
                });
            }
        }

        Ok(report)
    }

    /// Import every dataset of the catalog and log the summary.
    pub fn import_all(
        &mut self,
        store: &mut dyn EntityStore,
        datasets: &[Dataset],
        opts: &ImportOptions,
    ) -> Result<ImportReport, TopoSyncError> {
        let mut total = ImportReport::new();
        for dataset in datasets {
            total.merge(self.import_dataset(store, dataset, opts)?);
        }

        tracing::info!(
            "{} datasets and {} resources imported",
            total.datasets,
            total.resources
        );
        if !total.is_clean() {
            tracing::warn!("failed datasets:");
            for failure in &total.failures {
                tracing::warn!("{failure}");
            }
        }

        Ok(total)
    }
}

/// Plain-ASCII rendition of a title. The store rejects some non-ASCII labels.
pub fn ascii_title(title: &str) -> String {
    deunicode::deunicode(title).trim().to_string()
}

/// Check that a tool printed exactly one identifier.
fn single_identifier(output: &str, command: &str) -> Result<String, TopoSyncError> {
    let id = output.trim();
    if id.is_empty() {
        return Err(TopoSyncError::UnexpectedOutput {
            command: command.to_string(),
            message: "no identifier returned".to_string(),
        });
    }
    if id.contains(char::is_whitespace) {
        return Err(TopoSyncError::UnexpectedOutput {
            command: command.to_string(),
            message: format!("expected a single identifier, got '{id}'"),
        });
    }
    Ok(id.to_string())
}
