/*!
# Vec Index

Vector index management on top of [`graph_link`].

- [`IndexCatalog`]: check, create, drop, list and describe vector indexes.
- [`DimensionReconciler`]: pick an index whose dimension matches an
  embedding model, creating `<base>_<dimension>` when the base index
  was built for another model.
- [`validation`]: identifier and dimension checks applied before any
  value reaches statement text.
*/

pub mod catalog;
pub mod error;
pub mod probe;
pub mod reconcile;
pub mod types;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use catalog::IndexCatalog;
pub use error::{ErrorKind, IndexError, IndexResult, Role, ValidationError};
pub use probe::{measure_dimension, EmbeddingProbe, FixedDimensionProbe, PROBE_TEXT};
pub use reconcile::{
    suffixed_index_name, DimensionReconciler, Outcome, ReconcileRequest, Reconciliation,
    DEFAULT_EMBEDDING_PROPERTY, DEFAULT_INDEX_NAME, DEFAULT_NODE_LABEL,
};
pub use types::{IndexDescriptor, IndexExistence, IndexSpec, SimilarityFunction};
pub use validation::{
    dimension_from_number, validate_dimension, validate_identifier, MAX_IDENTIFIER_LENGTH,
    MAX_VECTOR_DIMENSION,
};
