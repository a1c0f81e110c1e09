use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Role, ValidationError};

/// Similarity functions supported by vector indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityFunction {
    #[default]
    Cosine,
    Euclidean,
}

impl SimilarityFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityFunction::Cosine => "cosine",
            SimilarityFunction::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for SimilarityFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; the catalog reports `COSINE`, users type `cosine`.
impl FromStr for SimilarityFunction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(SimilarityFunction::Cosine),
            "euclidean" => Ok(SimilarityFunction::Euclidean),
            _ => Err(ValidationError::new(
                Role::Similarity,
                s,
                "Must be 'cosine' or 'euclidean'.",
            )),
        }
    }
}

/// One vector index as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    pub name: String,
    pub node_label: String,
    pub property: String,
    /// `None` when the index was created without a fixed dimension.
    pub dimension: Option<u32>,
    pub similarity_function: SimilarityFunction,
    pub state: String,
}

/// `docs (768D, Chunk.embedding)`
impl fmt::Display for IndexDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dimension {
            Some(d) => write!(f, "{} ({}D", self.name, d)?,
            None => write!(f, "{} (any dimension", self.name)?,
        }
        write!(f, ", {}.{})", self.node_label, self.property)
    }
}

/// Result of an existence probe. `dimension` and `similarity_function`
/// are only ever set when `exists` is true.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexExistence {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_function: Option<String>,
}

impl IndexExistence {
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn found(dimension: Option<u32>, similarity_function: Option<String>) -> Self {
        Self {
            exists: true,
            dimension,
            similarity_function,
        }
    }
}

/// Everything needed to create one vector index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub label: String,
    pub property: String,
    pub dimension: u32,
    pub similarity: SimilarityFunction,
}
