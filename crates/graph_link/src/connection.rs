use std::sync::Arc;

use telemetry::Observer;

use crate::config::ConnectionConfig;
use crate::error::{LinkError, LinkResult};
use crate::router::with_direct_fallback;
use crate::session::{GraphSession, Record, SessionProvider, Statement};

/// Opens sessions through a provider, applying the one-shot direct
/// fallback when a routing address fails discovery.
///
/// Only session establishment is retried. Statement failures are returned
/// to the caller untouched.
#[derive(Clone)]
pub struct Connector {
    provider: Arc<dyn SessionProvider>,
    observer: Arc<dyn Observer>,
}

impl Connector {
    pub fn new(provider: Arc<dyn SessionProvider>, observer: Arc<dyn Observer>) -> Self {
        Self { provider, observer }
    }

    pub fn observer(&self) -> &Arc<dyn Observer> {
        &self.observer
    }

    /// Open a session, returning it with the configuration that worked.
    pub async fn open(
        &self,
        config: &ConnectionConfig,
    ) -> LinkResult<(Box<dyn GraphSession>, ConnectionConfig)> {
        with_direct_fallback(config, self.observer.as_ref(), |cfg| {
            let provider = Arc::clone(&self.provider);
            async move {
                let session = provider.open_session(&cfg).await?;
                Ok::<_, LinkError>((session, cfg))
            }
        })
        .await
    }

    /// Open a session, run one statement and close the session.
    pub async fn run(
        &self,
        config: &ConnectionConfig,
        statement: &Statement,
    ) -> LinkResult<Vec<Record>> {
        let (session, _) = self.open(config).await?;
        run_scoped(session, statement).await
    }

    /// Round-trip `RETURN 1` and report the address that answered.
    pub async fn ping(&self, config: &ConnectionConfig) -> LinkResult<ConnectionConfig> {
        let (session, effective) = self.open(config).await?;
        let statement = Statement::new("RETURN 1 AS test").returning(&["test"]);
        let records = run_scoped(session, &statement).await?;

        match records.first().and_then(|r| r.get("test")).and_then(|v| v.as_i64()) {
            Some(1) => Ok(effective),
            other => Err(LinkError::Statement {
                message: format!("unexpected connectivity check result: {:?}", other),
            }),
        }
    }
}

/// Run `statement` and close `session` whatever the outcome. A statement
/// error wins over a close error.
pub async fn run_scoped(
    mut session: Box<dyn GraphSession>,
    statement: &Statement,
) -> LinkResult<Vec<Record>> {
    let outcome = session.run(statement).await;
    let closed = session.close().await;
    let records = outcome?;
    closed?;
    Ok(records)
}
