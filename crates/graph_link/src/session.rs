use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ConnectionConfig;
use crate::error::LinkResult;

/// A Cypher statement with string parameters and the columns it returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    text: String,
    params: BTreeMap<String, String>,
    columns: Vec<&'static str>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: BTreeMap::new(),
            columns: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Columns the driver should extract from every row.
    pub fn returning(mut self, columns: &[&'static str]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }
}

/// One result row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Missing columns and explicit nulls both read as `None`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }
}

/// A database session scoped to a single operation.
#[async_trait]
pub trait GraphSession: Send {
    async fn run(&mut self, statement: &Statement) -> LinkResult<Vec<Record>>;

    /// Release the session. Must be called on every exit path.
    async fn close(self: Box<Self>) -> LinkResult<()>;
}

/// Opens sessions for a connection configuration.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn open_session(&self, config: &ConnectionConfig) -> LinkResult<Box<dyn GraphSession>>;
}
