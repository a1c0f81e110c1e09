/*!
# Telemetry

Observability for graphvec. Library components never log directly: they
emit typed [`Event`]s through an injected [`Observer`]. Binaries forward
events to `tracing`, tests record them.
*/

use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

/// Something worth reporting that happened inside a component.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A routing address failed discovery and the operation is retried directly.
    DirectFallback {
        from: String,
        to: String,
        error: String,
    },
    /// The direct retry failed as well; the error is returned to the caller.
    DirectFallbackFailed { address: String, error: String },
    /// The database rejected or failed a catalog statement.
    StatementFailed { statement: String, error: String },
    /// A create-if-absent statement succeeded. The index may already have
    /// existed, in which case the database changed nothing.
    IndexCreated {
        name: String,
        label: String,
        property: String,
        dimension: u32,
    },
    IndexDropped { name: String },
    /// An existing index has a different dimension than the embeddings.
    DimensionMismatch {
        name: String,
        existing: u32,
        measured: u32,
    },
    Reconciled {
        base: String,
        effective: String,
        dimension: u32,
        outcome: &'static str,
    },
}

impl Event {
    /// Short stable name, used as a metric key and in tests.
    pub fn name(&self) -> &'static str {
        match self {
            Event::DirectFallback { .. } => "direct_fallback",
            Event::DirectFallbackFailed { .. } => "direct_fallback_failed",
            Event::StatementFailed { .. } => "statement_failed",
            Event::IndexCreated { .. } => "index_created",
            Event::IndexDropped { .. } => "index_dropped",
            Event::DimensionMismatch { .. } => "dimension_mismatch",
            Event::Reconciled { .. } => "reconciled",
        }
    }
}

/// Logger port passed into each component.
pub trait Observer: Send + Sync {
    fn observe(&self, event: Event);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, event: Event) {
        match event {
            Event::DirectFallback { from, to, error } => {
                tracing::warn!(%from, %to, %error, "routing discovery failed, retrying with direct address");
            }
            Event::DirectFallbackFailed { address, error } => {
                tracing::warn!(%address, %error, "direct connection attempt failed");
            }
            Event::StatementFailed { statement, error } => {
                tracing::debug!(%statement, %error, "catalog statement failed");
            }
            Event::IndexCreated {
                name,
                label,
                property,
                dimension,
            } => {
                tracing::info!(%name, %label, %property, dimension, "vector index create applied");
            }
            Event::IndexDropped { name } => {
                tracing::info!(%name, "vector index dropped");
            }
            Event::DimensionMismatch {
                name,
                existing,
                measured,
            } => {
                tracing::warn!(%name, existing, measured, "vector index dimension mismatch");
            }
            Event::Reconciled {
                base,
                effective,
                dimension,
                outcome,
            } => {
                tracing::info!(%base, %effective, dimension, outcome, "vector index reconciled");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn observe(&self, _event: Event) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name() == name).count()
    }
}

impl Observer for RecordingObserver {
    fn observe(&self, event: Event) {
        self.events.lock().push(event);
    }
}

/// Install the global fmt subscriber. `RUST_LOG` takes precedence over
/// `default_filter`.
pub fn init_tracing(
    default_filter: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
}
