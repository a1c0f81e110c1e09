//! Decide which vector index is safe to use for a given embedding model,
//! creating it when needed.
//!
//! An index is only reused when its dimension matches the embeddings.
//! On a mismatch the index name gets the measured dimension as a suffix
//! (`docs` -> `docs_768`). Two different base names can format to the
//! same suffixed name; that collision is not guarded against.
//!
//! Two callers reconciling the same base name with different models at
//! the same time may both see "missing" and both create. The create
//! statement is idempotent so the catalog stays consistent, but the
//! callers can briefly disagree on the effective name.

use std::fmt;

use serde::Serialize;
use telemetry::Event;

use crate::catalog::IndexCatalog;
use crate::error::{IndexResult, Role};
use crate::probe::{measure_dimension, EmbeddingProbe};
use crate::types::{IndexSpec, SimilarityFunction};
use crate::validation::validate_identifier;

pub const DEFAULT_INDEX_NAME: &str = "vector_index";
pub const DEFAULT_NODE_LABEL: &str = "Chunk";
pub const DEFAULT_EMBEDDING_PROPERTY: &str = "embedding";

/// Name used when an existing index has the wrong dimension.
pub fn suffixed_index_name(base_name: &str, dimension: u32) -> String {
    format!("{}_{}", base_name, dimension)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRequest {
    pub base_name: String,
    pub label: String,
    pub property: String,
    pub similarity: SimilarityFunction,
}

impl Default for ReconcileRequest {
    fn default() -> Self {
        Self {
            base_name: DEFAULT_INDEX_NAME.to_string(),
            label: DEFAULT_NODE_LABEL.to_string(),
            property: DEFAULT_EMBEDDING_PROPERTY.to_string(),
            similarity: SimilarityFunction::Cosine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No index under the base name; created it.
    Created,
    /// Base index exists with a matching (or unconstrained) dimension.
    Reused,
    /// Base index has another dimension; created the suffixed one.
    CreatedSuffixed,
    /// Base index has another dimension; the suffixed one already existed.
    ReusedSuffixed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Reused => "reused",
            Outcome::CreatedSuffixed => "created_suffixed",
            Outcome::ReusedSuffixed => "reused_suffixed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// Index the caller must read and write vectors through.
    pub effective_name: String,
    pub dimension: u32,
    pub outcome: Outcome,
}

pub struct DimensionReconciler<'a> {
    catalog: &'a IndexCatalog,
}

impl<'a> DimensionReconciler<'a> {
    pub fn new(catalog: &'a IndexCatalog) -> Self {
        Self { catalog }
    }

    /// Ensure an index matching the probe's dimension exists and return
    /// its name. Any failure aborts; rerunning converges on the same state.
    pub async fn reconcile(
        &self,
        request: &ReconcileRequest,
        probe: &dyn EmbeddingProbe,
        database: Option<&str>,
    ) -> IndexResult<Reconciliation> {
        validate_identifier(&request.base_name, Role::IndexName)?;
        validate_identifier(&request.label, Role::NodeLabel)?;
        validate_identifier(&request.property, Role::Property)?;

        let dimension = measure_dimension(probe).await?;
        let base = self.catalog.check_exists(&request.base_name, database).await?;

        let (effective_name, outcome) = if !base.exists {
            self.catalog
                .create(&self.spec(request, &request.base_name, dimension), database)
                .await?;
            (request.base_name.clone(), Outcome::Created)
        } else {
            match base.dimension {
                Some(existing) if existing != dimension => {
                    self.catalog.observer().observe(Event::DimensionMismatch {
                        name: request.base_name.clone(),
                        existing,
                        measured: dimension,
                    });
                    self.reconcile_suffixed(request, dimension, database).await?
                }
                _ => (request.base_name.clone(), Outcome::Reused),
            }
        };

        self.catalog.observer().observe(Event::Reconciled {
            base: request.base_name.clone(),
            effective: effective_name.clone(),
            dimension,
            outcome: outcome.as_str(),
        });

        Ok(Reconciliation {
            effective_name,
            dimension,
            outcome,
        })
    }

    async fn reconcile_suffixed(
        &self,
        request: &ReconcileRequest,
        dimension: u32,
        database: Option<&str>,
    ) -> IndexResult<(String, Outcome)> {
        let name = suffixed_index_name(&request.base_name, dimension);
        validate_identifier(&name, Role::IndexName)?;
        let existing = self.catalog.check_exists(&name, database).await?;

        if existing.exists {
            if let Some(other) = existing.dimension.filter(|d| *d != dimension) {
                self.catalog.observer().observe(Event::DimensionMismatch {
                    name: name.clone(),
                    existing: other,
                    measured: dimension,
                });
            }
            return Ok((name, Outcome::ReusedSuffixed));
        }

        self.catalog
            .create(&self.spec(request, &name, dimension), database)
            .await?;
        Ok((name, Outcome::CreatedSuffixed))
    }

    fn spec(&self, request: &ReconcileRequest, name: &str, dimension: u32) -> IndexSpec {
        IndexSpec {
            name: name.to_string(),
            label: request.label.clone(),
            property: request.property.clone(),
            dimension,
            similarity: request.similarity,
        }
    }
}
