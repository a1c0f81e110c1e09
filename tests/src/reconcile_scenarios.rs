use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vec_index::testing::StoredIndex;
use vec_index::{
    DimensionReconciler, EmbeddingProbe, ErrorKind, FixedDimensionProbe, Outcome,
    ReconcileRequest, PROBE_TEXT,
};

use crate::Harness;

/// Counts calls and checks it is only ever asked to embed the probe text.
struct CountingProbe {
    dimension: usize,
    calls: AtomicUsize,
}

impl CountingProbe {
    fn new(dimension: usize) -> Self {
        Self {
            dimension,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmbeddingProbe for CountingProbe {
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if texts.len() != 1 || texts[0] != PROBE_TEXT {
            return Err(anyhow!("unexpected probe input {:?}", texts));
        }
        Ok(vec![vec![0.25; self.dimension]])
    }
}

struct OfflineProbe;

#[async_trait]
impl EmbeddingProbe for OfflineProbe {
    async fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Err(anyhow!("connection refused (os error 111)"))
    }
}

fn docs() -> ReconcileRequest {
    ReconcileRequest {
        base_name: "docs".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fresh_catalog_uses_base_name() {
    let h = Harness::new("bolt://localhost:7687");
    let probe = CountingProbe::new(768);

    let result = DimensionReconciler::new(&h.catalog)
        .reconcile(&docs(), &probe, None)
        .await
        .unwrap();

    assert_eq!(result.effective_name, "docs");
    assert_eq!(result.dimension, 768);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 1);

    let info = h.catalog.get_info("docs", None).await.unwrap().unwrap();
    assert_eq!(info.dimension, Some(768));
    assert_eq!(info.node_label, "Chunk");
    assert_eq!(info.property, "embedding");
}

#[tokio::test]
async fn test_mismatched_base_leads_to_suffixed_index() {
    let h = Harness::new("bolt://localhost:7687");
    h.memory
        .insert(StoredIndex::new("docs", "Chunk", "embedding", Some(1536)));

    let result = DimensionReconciler::new(&h.catalog)
        .reconcile(&docs(), &CountingProbe::new(768), None)
        .await
        .unwrap();

    assert_eq!(result.effective_name, "docs_768");
    assert_eq!(result.outcome, Outcome::CreatedSuffixed);
    let mut names: Vec<_> = h
        .catalog
        .list(None)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "docs (1536D, Chunk.embedding)",
            "docs_768 (768D, Chunk.embedding)"
        ]
    );
}

#[tokio::test]
async fn test_switching_models_back_and_forth_converges() {
    let h = Harness::new("bolt://localhost:7687");
    let reconciler = DimensionReconciler::new(&h.catalog);
    let small = FixedDimensionProbe::new(384);
    let large = FixedDimensionProbe::new(1536);

    let a = reconciler.reconcile(&docs(), &small, None).await.unwrap();
    let b = reconciler.reconcile(&docs(), &large, None).await.unwrap();
    let c = reconciler.reconcile(&docs(), &small, None).await.unwrap();
    let d = reconciler.reconcile(&docs(), &large, None).await.unwrap();

    assert_eq!((a.effective_name.as_str(), a.outcome), ("docs", Outcome::Created));
    assert_eq!(
        (b.effective_name.as_str(), b.outcome),
        ("docs_1536", Outcome::CreatedSuffixed)
    );
    assert_eq!((c.effective_name.as_str(), c.outcome), ("docs", Outcome::Reused));
    assert_eq!(
        (d.effective_name.as_str(), d.outcome),
        ("docs_1536", Outcome::ReusedSuffixed)
    );
    assert_eq!(h.memory.len(None), 2);
    assert_eq!(h.observer.count("index_created"), 2);
    assert!(h.sessions_balanced());
}

#[tokio::test]
async fn test_probe_failure_touches_nothing() {
    let h = Harness::new("bolt://localhost:7687");

    let err = DimensionReconciler::new(&h.catalog)
        .reconcile(&docs(), &OfflineProbe, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Probe);
    assert!(h.memory.addresses().is_empty());
}

#[tokio::test]
async fn test_oversized_model_is_rejected_before_io() {
    let h = Harness::new("bolt://localhost:7687");

    let err = DimensionReconciler::new(&h.catalog)
        .reconcile(&docs(), &CountingProbe::new(3072), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(h.memory.opened_sessions(), 0);
}

#[tokio::test]
async fn test_reconcile_in_named_database() {
    let h = Harness::new("bolt://localhost:7687");
    h.memory.insert_into(
        "movies",
        StoredIndex::new("docs", "Chunk", "embedding", Some(1536)),
    );

    let result = DimensionReconciler::new(&h.catalog)
        .reconcile(&docs(), &FixedDimensionProbe::new(768), Some("movies"))
        .await
        .unwrap();

    assert_eq!(result.effective_name, "docs_768");
    assert!(h.memory.index(Some("movies"), "docs_768").is_some());
    assert!(h.memory.index(None, "docs").is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reconciliations_converge() {
    let h = Arc::new(Harness::new("bolt://localhost:7687"));

    let tasks: Vec<_> = [384u32, 768, 1536, 384]
        .into_iter()
        .map(|dimension| {
            let h = Arc::clone(&h);
            tokio::spawn(async move {
                DimensionReconciler::new(&h.catalog)
                    .reconcile(&docs(), &FixedDimensionProbe::new(dimension), None)
                    .await
            })
        })
        .collect();

    for task in tasks {
        let result = task.await.unwrap().unwrap();
        assert!(
            result.effective_name == "docs"
                || result.effective_name == format!("docs_{}", result.dimension),
            "unexpected effective name {}",
            result.effective_name
        );
    }
    assert!(h.sessions_balanced());

    // Racing callers may disagree on the effective name; the next
    // sequential pass must settle every model on a matching index.
    let reconciler = DimensionReconciler::new(&h.catalog);
    for dimension in [384u32, 768, 1536] {
        let result = reconciler
            .reconcile(&docs(), &FixedDimensionProbe::new(dimension), None)
            .await
            .unwrap();
        let stored = h.memory.index(None, &result.effective_name).unwrap();
        assert_eq!(stored.dimension, Some(dimension));
    }

    let names: Vec<_> = h
        .catalog
        .list(None)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), names.len());
    assert!(names.len() <= 4);
    assert!(h.sessions_balanced());
}
