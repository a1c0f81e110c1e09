use vec_index::testing::StoredIndex;
use vec_index::{ErrorKind, IndexSpec, SimilarityFunction};

use crate::Harness;

fn spec(name: &str, dimension: u32) -> IndexSpec {
    IndexSpec {
        name: name.to_string(),
        label: "Chunk".to_string(),
        property: "embedding".to_string(),
        dimension,
        similarity: SimilarityFunction::Cosine,
    }
}

#[tokio::test]
async fn test_missing_index_reports_nothing_else() {
    let h = Harness::new("bolt://localhost:7687");

    let existence = h.catalog.check_exists("missing_index", None).await.unwrap();

    assert!(!existence.exists);
    assert_eq!(
        serde_json::to_value(&existence).unwrap(),
        serde_json::json!({ "exists": false })
    );
    assert!(h.sessions_balanced());
}

#[tokio::test]
async fn test_create_then_create_again_leaves_one_index() {
    let h = Harness::new("bolt://localhost:7687");

    h.catalog.create(&spec("docs", 768), None).await.unwrap();
    let after_first = h.catalog.list(None).await.unwrap();
    h.catalog.create(&spec("docs", 768), None).await.unwrap();
    let after_second = h.catalog.list(None).await.unwrap();

    assert_eq!(after_first, after_second);
    assert_eq!(after_second.len(), 1);
    assert_eq!(after_second[0].to_string(), "docs (768D, Chunk.embedding)");
}

#[tokio::test]
async fn test_full_lifecycle() {
    let h = Harness::new("bolt://localhost:7687");
    let euclidean = IndexSpec {
        similarity: SimilarityFunction::Euclidean,
        ..spec("images", 512)
    };

    h.catalog.create(&euclidean, None).await.unwrap();
    let info = h.catalog.get_info("images", None).await.unwrap().unwrap();
    assert_eq!(info.similarity_function, SimilarityFunction::Euclidean);
    assert_eq!(info.dimension, Some(512));

    h.catalog.delete("images", None).await.unwrap();
    assert!(h.catalog.get_info("images", None).await.unwrap().is_none());
    h.catalog.delete("images", None).await.unwrap();

    assert_eq!(h.observer.count("index_dropped"), 2);
    assert!(h.sessions_balanced());
}

#[tokio::test]
async fn test_injection_attempts_never_reach_the_database() {
    let h = Harness::new("bolt://localhost:7687");
    let hostile = [
        IndexSpec {
            label: "Chunk`) MATCH (n) DETACH DELETE n //".to_string(),
            ..spec("docs", 768)
        },
        IndexSpec {
            property: "embedding }) DROP INDEX docs //".to_string(),
            ..spec("docs", 768)
        },
        spec(&"x".repeat(256), 768),
        spec("docs", 2049),
    ];

    for bad in &hostile {
        let err = h.catalog.create(bad, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
    assert!(h.memory.statements().is_empty());
    assert_eq!(h.memory.opened_sessions(), 0);
}

#[tokio::test]
async fn test_catalog_errors_are_not_retried() {
    let h = Harness::new("neo4j://localhost:7687");
    h.memory.fail_statements("Neo.ClientError.Statement.SyntaxError");

    let err = h.catalog.list(None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Catalog);
    assert_eq!(h.memory.addresses(), vec!["neo4j://localhost:7687"]);
    assert_eq!(h.memory.statements().len(), 1);
    assert!(h.sessions_balanced());
}

#[tokio::test]
async fn test_close_failure_is_reported_and_session_counted() {
    let h = Harness::new("bolt://localhost:7687");
    h.memory.fail_closes("connection reset by peer");

    let err = h.catalog.check_exists("docs", None).await.unwrap_err();

    assert!(err.to_string().contains("connection reset"));
    assert!(h.sessions_balanced());
}

#[tokio::test]
async fn test_listing_tolerates_unconstrained_dimension() {
    let h = Harness::new("bolt://localhost:7687");
    h.memory.insert_into(
        "neo4j",
        StoredIndex::new("loose", "Doc", "vec", None).with_state("POPULATING"),
    );

    let indexes = h.catalog.list(None).await.unwrap();

    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0].dimension, None);
    assert_eq!(indexes[0].state, "POPULATING");
    assert_eq!(indexes[0].to_string(), "loose (any dimension, Doc.vec)");
}
