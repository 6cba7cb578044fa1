//! Access to the transit topo entity store.
//!
//! The store is only reachable through external command-line tools. The
//! [`EntityStore`] trait names the handful of operations the sync needs so
//! the orchestration in [`crate::sync`] does not depend on process spawning:
//! [`CommandStore`] runs the real tools, [`MemoryStore`] stands in for them
//! in tests.

mod command;
mod memory;

pub use command::{render_command, CommandStore};
pub use memory::{MemoryStore, StoreCall};

use crate::error::TopoSyncError;

/// Uniqueness constraint attached to every producer creation.
pub const PRODUCER_UNIQUE_CLAIM: &str = "@instance_of=@producer";

/// Operations on the entity store.
pub trait EntityStore {
    /// Pre-seed the store with its base entities and properties.
    fn prepopulate(&mut self) -> Result<(), TopoSyncError>;

    /// Search entities whose `property` claim equals the IRI `value`.
    ///
    /// Returns the tool's trimmed standard output.
    fn search_by_claim(&mut self, property: &str, value: &str) -> Result<String, TopoSyncError>;

    /// Create a url property named `name` and return its identifier.
    fn create_property(&mut self, name: &str) -> Result<String, TopoSyncError>;

    /// Create a producer item claiming `property = url`.
    ///
    /// Returns the tool's trimmed standard output.
    fn create_producer(
        &mut self,
        title: &str,
        property: &str,
        url: &str,
    ) -> Result<String, TopoSyncError>;

    /// Import a GTFS feed for `producer`.
    ///
    /// A non-zero exit of the import tool is reported through the returned
    /// [`ImportOutcome`], not as an error.
    fn import_gtfs(
        &mut self,
        url: &str,
        producer: &str,
        override_existing: bool,
    ) -> Result<ImportOutcome, TopoSyncError>;
}

/// What happened when an import ran.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportOutcome {
    /// The command line, as logged.
    pub command: String,
    /// Exit code, `None` if the process was killed by a signal.
    pub status: Option<i32>,
}

impl ImportOutcome {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}
