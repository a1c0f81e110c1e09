//! End-to-end scenarios for graphvec
//! Catalog, reconciler and routing fallback wired together over an
//! in-memory catalog, the way the binary wires them over Bolt.

use std::sync::Arc;

use graph_link::{ConnectionConfig, Connector};
use telemetry::RecordingObserver;
use vec_index::testing::MemoryCatalog;
use vec_index::IndexCatalog;

#[cfg(test)]
mod catalog_scenarios;
#[cfg(test)]
mod reconcile_scenarios;
#[cfg(test)]
mod routing_scenarios;

/// Everything a scenario needs to drive and inspect one catalog.
pub struct Harness {
    pub memory: MemoryCatalog,
    pub observer: Arc<RecordingObserver>,
    pub catalog: IndexCatalog,
}

impl Harness {
    pub fn new(address: &str) -> Self {
        Self::with_memory(MemoryCatalog::new(), address)
    }

    pub fn with_memory(memory: MemoryCatalog, address: &str) -> Self {
        let observer = Arc::new(RecordingObserver::new());
        let connector = Connector::new(Arc::new(memory.clone()), observer.clone());
        let config = ConnectionConfig::new(address, "neo4j", "password")
            .with_database(Some("neo4j".to_string()));
        Self {
            memory,
            observer,
            catalog: IndexCatalog::new(connector, config),
        }
    }

    pub fn connector(&self) -> Connector {
        Connector::new(Arc::new(self.memory.clone()), self.observer.clone())
    }

    pub fn sessions_balanced(&self) -> bool {
        self.memory.opened_sessions() == self.memory.closed_sessions()
    }
}
