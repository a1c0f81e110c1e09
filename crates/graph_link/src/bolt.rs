//! Session provider backed by the `neo4rs` Bolt driver.

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph};
use serde_json::Value;

use crate::config::ConnectionConfig;
use crate::error::{LinkError, LinkResult};
use crate::session::{GraphSession, Record, SessionProvider, Statement};

/// Opens one single-connection driver per session.
#[derive(Debug, Clone)]
pub struct BoltProvider {
    fetch_size: usize,
}

impl BoltProvider {
    pub fn new() -> Self {
        Self { fetch_size: 200 }
    }

    pub fn with_fetch_size(fetch_size: usize) -> Self {
        Self { fetch_size }
    }
}

impl Default for BoltProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionProvider for BoltProvider {
    async fn open_session(&self, config: &ConnectionConfig) -> LinkResult<Box<dyn GraphSession>> {
        let address = config.address();

        let mut builder = ConfigBuilder::default()
            .uri(address)
            .user(config.username())
            .password(config.password())
            .fetch_size(self.fetch_size)
            .max_connections(1);
        if let Some(database) = config.database() {
            builder = builder.db(database);
        }
        let driver_config = builder
            .build()
            .map_err(|e| LinkError::connection(address, &e))?;

        let graph = Graph::connect(driver_config)
            .await
            .map_err(|e| LinkError::connection(address, &e))?;

        // Discovery and authentication failures surface on first use.
        let mut probe = graph
            .execute(query("RETURN 1"))
            .await
            .map_err(|e| LinkError::connection(address, &e))?;
        while probe
            .next()
            .await
            .map_err(|e| LinkError::connection(address, &e))?
            .is_some()
        {}

        Ok(Box::new(BoltSession { graph }))
    }
}

struct BoltSession {
    graph: Graph,
}

#[async_trait]
impl GraphSession for BoltSession {
    async fn run(&mut self, statement: &Statement) -> LinkResult<Vec<Record>> {
        let mut cypher = query(statement.text());
        for (key, value) in statement.params() {
            cypher = cypher.param(key, value.as_str());
        }

        let mut rows = self
            .graph
            .execute(cypher)
            .await
            .map_err(|e| LinkError::statement(&e))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| LinkError::statement(&e))? {
            let mut record = Record::new();
            for column in statement.columns() {
                let value = row.get::<Value>(column).unwrap_or(Value::Null);
                record.insert(*column, value);
            }
            records.push(record);
        }
        Ok(records)
    }

    async fn close(self: Box<Self>) -> LinkResult<()> {
        // Dropping the driver closes its pooled connection.
        drop(self.graph);
        Ok(())
    }
}
