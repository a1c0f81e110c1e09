use graph_link::{should_retry_direct, to_direct_address, ConnectionConfig, LinkError};
use telemetry::Event;
use vec_index::{ErrorKind, IndexSpec, SimilarityFunction};

use crate::Harness;

const NO_ROUTING: &str = "Could not perform discovery. No routing servers available. Known routing table: RoutingTable[database=neo4j, expirationTime=0, routers=[]]";

fn connection_error(message: &str) -> LinkError {
    LinkError::Connection {
        address: "neo4j://host:7687".to_string(),
        message: message.to_string(),
    }
}

#[test]
fn test_router_decisions() {
    let routing = connection_error("No routing servers available");
    assert!(should_retry_direct(&routing, "neo4j://host:7687"));
    assert_eq!(to_direct_address("neo4j://host:7687"), "bolt://host:7687");
    assert!(should_retry_direct(&routing, "neo4j+s://host:7687"));
    assert_eq!(to_direct_address("neo4j+s://host:7687"), "bolt+s://host:7687");
    assert_eq!(to_direct_address("neo4j+ssc://host:7687"), "bolt+ssc://host:7687");

    assert!(!should_retry_direct(&routing, "bolt://host:7687"));

    let auth = connection_error(
        "Neo.ClientError.Security.Unauthorized: The client is unauthorized due to authentication failure.",
    );
    assert!(!should_retry_direct(&auth, "neo4j://host:7687"));
}

#[tokio::test]
async fn test_discovery_failure_recovers_over_bolt() {
    let h = Harness::new("neo4j+s://graph.internal:7687");
    h.memory.fail_connections("neo4j", NO_ROUTING);

    let existence = h.catalog.check_exists("docs", None).await.unwrap();

    assert!(!existence.exists);
    assert_eq!(
        h.memory.addresses(),
        vec!["neo4j+s://graph.internal:7687", "bolt+s://graph.internal:7687"]
    );
    assert_eq!(
        h.observer.events()[0],
        Event::DirectFallback {
            from: "neo4j+s://graph.internal:7687".to_string(),
            to: "bolt+s://graph.internal:7687".to_string(),
            error: format!("Connection to neo4j+s://graph.internal:7687 failed: {}", NO_ROUTING),
        }
    );
}

#[tokio::test]
async fn test_direct_retry_happens_once() {
    let h = Harness::new("neo4j://graph.internal:7687");
    h.memory.fail_connections("neo4j", NO_ROUTING);
    h.memory.fail_connections("bolt", "Connection refused");

    let err = h
        .catalog
        .create(
            &IndexSpec {
                name: "docs".to_string(),
                label: "Chunk".to_string(),
                property: "embedding".to_string(),
                dimension: 768,
                similarity: SimilarityFunction::Cosine,
            },
            None,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.to_string().contains("bolt://graph.internal:7687"));
    assert_eq!(h.memory.addresses().len(), 2);
    assert_eq!(h.observer.count("direct_fallback"), 1);
    assert_eq!(h.observer.count("direct_fallback_failed"), 1);
    assert_eq!(h.memory.opened_sessions(), 0);
}

#[tokio::test]
async fn test_auth_failure_is_not_retried() {
    let h = Harness::new("neo4j://graph.internal:7687");
    h.memory
        .fail_connections("neo4j", "The client is unauthorized due to authentication failure.");

    let err = h.catalog.list(None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(h.memory.addresses(), vec!["neo4j://graph.internal:7687"]);
    assert_eq!(h.observer.count("direct_fallback"), 0);
}

#[tokio::test]
async fn test_discovery_failure_on_bolt_address_is_final() {
    let h = Harness::new("bolt://graph.internal:7687");
    h.memory.fail_connections("bolt", NO_ROUTING);

    let err = h.catalog.list(None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RoutingFailure);
    assert_eq!(h.memory.addresses().len(), 1);
}

#[tokio::test]
async fn test_ping_reports_effective_address() {
    let h = Harness::new("neo4j://graph.internal:7687");
    h.memory.fail_connections("neo4j://", NO_ROUTING);
    let config = ConnectionConfig::new("neo4j://graph.internal:7687", "neo4j", "password");

    let effective = h.connector().ping(&config).await.unwrap();

    assert_eq!(effective.address(), "bolt://graph.internal:7687");
    assert_eq!(effective.username(), "neo4j");
    assert!(h.sessions_balanced());
}
