use anyhow::anyhow;
use async_trait::async_trait;

use crate::error::{IndexError, IndexResult};
use crate::validation::validate_dimension;

/// Text embedded once to measure the model's output dimension.
pub const PROBE_TEXT: &str = "test";

/// Embedding model seen from the index side: only the vector length matters.
#[async_trait]
pub trait EmbeddingProbe: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Embed [`PROBE_TEXT`] once and return the validated vector length.
pub async fn measure_dimension(probe: &dyn EmbeddingProbe) -> IndexResult<u32> {
    let vectors = probe
        .embed_batch(&[PROBE_TEXT.to_string()])
        .await
        .map_err(IndexError::Probe)?;

    let first = vectors
        .first()
        .ok_or_else(|| IndexError::Probe(anyhow!("embedding probe returned no vectors")))?;

    let length = i64::try_from(first.len()).unwrap_or(i64::MAX);
    Ok(validate_dimension(length)?)
}

/// Stands in for a model whose dimension is already known.
#[derive(Debug, Clone, Copy)]
pub struct FixedDimensionProbe {
    dimension: u32,
}

impl FixedDimensionProbe {
    pub fn new(dimension: u32) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProbe for FixedDimensionProbe {
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|_| vec![0.0; self.dimension as usize])
            .collect())
    }
}
