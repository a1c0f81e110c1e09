//! `graphvec.toml` loading with environment and flag overrides.

use std::path::Path;

use anyhow::{Context, Result};
use graph_link::ConnectionConfig;
use serde::Deserialize;
use vec_index::{
    SimilarityFunction, DEFAULT_EMBEDDING_PROPERTY, DEFAULT_INDEX_NAME, DEFAULT_NODE_LABEL,
};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "graphvec.toml";

pub const DEFAULT_FETCH_SIZE: usize = 200;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub connection: ConnectionSection,
    pub index: IndexSection,
    pub logging: LoggingSection,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionSection {
    pub uri: String,
    pub username: String,
    pub password: String,
    /// Empty selects the server's default database.
    pub database: String,
    /// Rows the driver pulls per round-trip.
    pub fetch_size: usize,
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            uri: "neo4j://localhost:7687".to_string(),
            username: "neo4j".to_string(),
            password: String::new(),
            database: "neo4j".to_string(),
            fetch_size: DEFAULT_FETCH_SIZE,
        }
    }
}

impl std::fmt::Debug for ConnectionSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSection")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("fetch_size", &self.fetch_size)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexSection {
    pub name: String,
    pub label: String,
    pub property: String,
    pub similarity: SimilarityFunction,
}

impl Default for IndexSection {
    fn default() -> Self {
        Self {
            name: DEFAULT_INDEX_NAME.to_string(),
            label: DEFAULT_NODE_LABEL.to_string(),
            property: DEFAULT_EMBEDDING_PROPERTY.to_string(),
            similarity: SimilarityFunction::Cosine,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Read `path`, or `graphvec.toml` if present. An explicit path that
    /// does not exist is an error; a missing default file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply `NEO4J_*` variables. `lookup` is `std::env::var` in the binary.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup("NEO4J_URI") {
            self.connection.uri = uri;
        }
        if let Some(username) = lookup("NEO4J_USERNAME") {
            self.connection.username = username;
        }
        if let Some(password) = lookup("NEO4J_PASSWORD") {
            self.connection.password = password;
        }
        if let Some(database) = lookup("NEO4J_DATABASE") {
            self.connection.database = database;
        }
    }

    /// Command-line flags win over file and environment.
    pub fn apply_overrides(&mut self, uri: Option<String>, database: Option<String>) {
        if let Some(uri) = uri {
            self.connection.uri = uri;
        }
        if let Some(database) = database {
            self.connection.database = database;
        }
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new(
            &self.connection.uri,
            &self.connection.username,
            &self.connection.password,
        )
        .with_database(Some(self.connection.database.clone()))
    }
}
