//! In-memory stand-in for a graph database's vector index catalog.
//!
//! Understands exactly the statements this crate emits, keeps indexes per
//! database and counts sessions so tests can assert that every opened
//! session was closed. Failures can be injected per connection address
//! prefix or for every statement.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use graph_link::{
    ConnectionConfig, GraphSession, LinkError, LinkResult, Record, SessionProvider, Statement,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use serde_json::Value;

/// Database used when a connection does not name one.
pub const DEFAULT_DATABASE: &str = "neo4j";

static CREATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^CREATE VECTOR INDEX `([^`]+)` IF NOT EXISTS\s+FOR \(n:`([^`]+)`\)\s+ON \(n\.`([^`]+)`\).*`vector\.dimensions`: (\d+).*`vector\.similarity_function`: '(\w+)'",
    )
    .expect("create pattern is valid")
});

static DROP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^DROP INDEX `([^`]+)` IF EXISTS$").expect("drop pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredIndex {
    pub name: String,
    pub label: String,
    pub property: String,
    pub dimension: Option<u32>,
    /// Upper case, the way the catalog reports it.
    pub similarity: String,
    pub state: String,
}

impl StoredIndex {
    pub fn new(name: &str, label: &str, property: &str, dimension: Option<u32>) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            property: property.to_string(),
            dimension,
            similarity: "COSINE".to_string(),
            state: "ONLINE".to_string(),
        }
    }

    pub fn with_similarity(mut self, similarity: &str) -> Self {
        self.similarity = similarity.to_string();
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = state.to_string();
        self
    }

    fn column(&self, column: &str) -> Value {
        match column {
            "name" => Value::from(self.name.as_str()),
            "state" => Value::from(self.state.as_str()),
            "nodeLabel" => Value::from(self.label.as_str()),
            "property" => Value::from(self.property.as_str()),
            "dimension" => match self.dimension {
                Some(d) => Value::from(d),
                None => Value::Null,
            },
            "similarityFunction" => Value::from(self.similarity.as_str()),
            _ => Value::Null,
        }
    }
}

#[derive(Default)]
struct State {
    databases: HashMap<String, BTreeMap<String, StoredIndex>>,
    connection_failures: Vec<(String, String)>,
    statement_failure: Option<String>,
    close_failure: Option<String>,
    addresses: Vec<String>,
    statements: Vec<String>,
    opened: usize,
    closed: usize,
}

/// Shared handle; clones see the same catalog.
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    state: Arc<Mutex<State>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an index in the default database.
    pub fn insert(&self, index: StoredIndex) {
        self.insert_into(DEFAULT_DATABASE, index);
    }

    pub fn insert_into(&self, database: &str, index: StoredIndex) {
        self.state
            .lock()
            .databases
            .entry(database.to_string())
            .or_default()
            .insert(index.name.clone(), index);
    }

    pub fn index(&self, database: Option<&str>, name: &str) -> Option<StoredIndex> {
        let database = database.unwrap_or(DEFAULT_DATABASE);
        self.state
            .lock()
            .databases
            .get(database)
            .and_then(|indexes| indexes.get(name).cloned())
    }

    pub fn len(&self, database: Option<&str>) -> usize {
        let database = database.unwrap_or(DEFAULT_DATABASE);
        self.state
            .lock()
            .databases
            .get(database)
            .map_or(0, BTreeMap::len)
    }

    /// Opening a session on an address starting with `prefix` fails with
    /// `message`.
    pub fn fail_connections(&self, prefix: &str, message: &str) {
        self.state
            .lock()
            .connection_failures
            .push((prefix.to_string(), message.to_string()));
    }

    /// Every statement fails with `message`. Sessions still open and close.
    pub fn fail_statements(&self, message: &str) {
        self.state.lock().statement_failure = Some(message.to_string());
    }

    pub fn fail_closes(&self, message: &str) {
        self.state.lock().close_failure = Some(message.to_string());
    }

    /// Addresses of every session open attempt, in order.
    pub fn addresses(&self) -> Vec<String> {
        self.state.lock().addresses.clone()
    }

    /// Text of every statement received, in order.
    pub fn statements(&self) -> Vec<String> {
        self.state.lock().statements.clone()
    }

    pub fn opened_sessions(&self) -> usize {
        self.state.lock().opened
    }

    pub fn closed_sessions(&self) -> usize {
        self.state.lock().closed
    }
}

#[async_trait]
impl SessionProvider for MemoryCatalog {
    async fn open_session(&self, config: &ConnectionConfig) -> LinkResult<Box<dyn GraphSession>> {
        let mut state = self.state.lock();
        state.addresses.push(config.address().to_string());

        let failure = state
            .connection_failures
            .iter()
            .find(|(prefix, _)| config.address().starts_with(prefix.as_str()))
            .map(|(_, message)| message.clone());
        if let Some(message) = failure {
            return Err(LinkError::Connection {
                address: config.address().to_string(),
                message,
            });
        }

        state.opened += 1;
        Ok(Box::new(MemorySession {
            state: Arc::clone(&self.state),
            database: config.database().unwrap_or(DEFAULT_DATABASE).to_string(),
        }))
    }
}

struct MemorySession {
    state: Arc<Mutex<State>>,
    database: String,
}

#[async_trait]
impl GraphSession for MemorySession {
    async fn run(&mut self, statement: &Statement) -> LinkResult<Vec<Record>> {
        let mut state = self.state.lock();
        let text = statement.text().trim();
        state.statements.push(text.to_string());

        if let Some(message) = &state.statement_failure {
            return Err(LinkError::Statement {
                message: message.clone(),
            });
        }

        let indexes = state.databases.entry(self.database.clone()).or_default();

        if text.starts_with("SHOW VECTOR INDEXES") {
            let wanted = statement.params().get("indexName");
            return Ok(indexes
                .values()
                .filter(|index| wanted.map_or(true, |name| &index.name == name))
                .map(|index| {
                    statement
                        .columns()
                        .iter()
                        .fold(Record::new(), |record, column| {
                            record.with(*column, index.column(column))
                        })
                })
                .collect());
        }

        if let Some(caps) = CREATE.captures(text) {
            let dimension = caps[4].parse::<u32>().map_err(|e| LinkError::Statement {
                message: format!("Invalid vector.dimensions: {}", e),
            })?;
            indexes.entry(caps[1].to_string()).or_insert_with(|| {
                StoredIndex::new(&caps[1], &caps[2], &caps[3], Some(dimension))
                    .with_similarity(&caps[5].to_ascii_uppercase())
            });
            return Ok(Vec::new());
        }

        if let Some(caps) = DROP.captures(text) {
            indexes.remove(&caps[1]);
            return Ok(Vec::new());
        }

        if text == "RETURN 1 AS test" {
            return Ok(vec![Record::new().with("test", 1)]);
        }

        Err(LinkError::Statement {
            message: format!("Invalid input: {}", text.lines().next().unwrap_or_default()),
        })
    }

    async fn close(self: Box<Self>) -> LinkResult<()> {
        let mut state = self.state.lock();
        state.closed += 1;
        match &state.close_failure {
            Some(message) => Err(LinkError::Close {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}
