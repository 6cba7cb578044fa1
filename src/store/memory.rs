//! In-process entity store for tests and dry runs of the orchestration.

use std::collections::BTreeMap;

use crate::error::TopoSyncError;

use super::{render_command, EntityStore, ImportOutcome};

/// A call received by a [`MemoryStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    Prepopulate,
    Search {
        property: String,
        value: String,
    },
    CreateProperty {
        name: String,
    },
    CreateProducer {
        title: String,
        property: String,
        url: String,
    },
    ImportGtfs {
        url: String,
        producer: String,
        override_existing: bool,
    },
}

/// Entity store kept in memory.
///
/// Producers are keyed by their claim, so creating the same producer twice
/// returns the existing item, like the real store's unique claim does.
/// Imports succeed unless their URL was registered with
/// [`MemoryStore::fail_import`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    calls: Vec<StoreCall>,
    properties: BTreeMap<String, String>,
    producers: BTreeMap<(String, String), String>,
    failing_imports: BTreeMap<String, Option<i32>>,
    next_item: u64,
    next_property: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make imports of `url` exit with `status`.
    pub fn fail_import(mut self, url: impl Into<String>, status: Option<i32>) -> Self {
        self.failing_imports.insert(url.into(), status);
        self
    }

    /// Register an existing property.
    pub fn with_property(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.properties.insert(name.into(), id.into());
        self
    }

    /// Register an existing producer.
    pub fn with_producer(
        mut self,
        property: impl Into<String>,
        url: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        self.producers
            .insert((property.into(), url.into()), id.into());
        self
    }

    /// Every call received, in order.
    pub fn calls(&self) -> &[StoreCall] {
        &self.calls
    }

    /// The import calls received, in order.
    pub fn imports(&self) -> Vec<&StoreCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, StoreCall::ImportGtfs { .. }))
            .collect()
    }

    /// Number of distinct producers in the store.
    pub fn producer_count(&self) -> usize {
        self.producers.len()
    }
}

impl EntityStore for MemoryStore {
    fn prepopulate(&mut self) -> Result<(), TopoSyncError> {
        self.calls.push(StoreCall::Prepopulate);
        Ok(())
    }

    fn search_by_claim(&mut self, property: &str, value: &str) -> Result<String, TopoSyncError> {
        self.calls.push(StoreCall::Search {
            property: property.to_string(),
            value: value.to_string(),
        });
        Ok(self
            .producers
            .get(&(property.to_string(), value.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn create_property(&mut self, name: &str) -> Result<String, TopoSyncError> {
        self.calls.push(StoreCall::CreateProperty {
            name: name.to_string(),
        });
        if let Some(id) = self.properties.get(name) {
            return Ok(id.clone());
        }
        self.next_property += 1;
        let id = format!("P{}", self.next_property);
        self.properties.insert(name.to_string(), id.clone());
        Ok(id)
    }

    fn create_producer(
        &mut self,
        title: &str,
        property: &str,
        url: &str,
    ) -> Result<String, TopoSyncError> {
        self.calls.push(StoreCall::CreateProducer {
            title: title.to_string(),
            property: property.to_string(),
            url: url.to_string(),
        });
        let key = (property.to_string(), url.to_string());
        if let Some(id) = self.producers.get(&key) {
            return Ok(id.clone());
        }
        self.next_item += 1;
        let id = format!("Q{}", self.next_item);
        self.producers.insert(key, id.clone());
        Ok(id)
    }

    fn import_gtfs(
        &mut self,
        url: &str,
        producer: &str,
        override_existing: bool,
    ) -> Result<ImportOutcome, TopoSyncError> {
        self.calls.push(StoreCall::ImportGtfs {
            url: url.to_string(),
            producer: producer.to_string(),
            override_existing,
        });

        let mut args = vec![
            "--input-gtfs".to_string(),
            url.to_string(),
            "--producer".to_string(),
            producer.to_string(),
        ];
        if override_existing {
            args.push("--override-existing".to_string());
        }

        Ok(ImportOutcome {
            command: render_command("import-gtfs", &args),
            status: self.failing_imports.get(url).copied().unwrap_or(Some(0)),
        })
    }
}
