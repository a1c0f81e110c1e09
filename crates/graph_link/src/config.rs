use std::fmt;

/// How to reach the database for one logical operation.
///
/// The scheme of `address` decides whether the driver attempts routing
/// discovery (`neo4j://` family) or connects straight to the host
/// (`bolt://` family).
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    address: String,
    username: String,
    password: String,
    database: Option<String>,
}

impl ConnectionConfig {
    pub fn new(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            username: username.into(),
            password: password.into(),
            database: None,
        }
    }

    /// An empty name selects the server's default database.
    pub fn with_database(mut self, database: Option<String>) -> Self {
        self.database = database.filter(|d| !d.trim().is_empty());
        self
    }

    /// Same credentials and database, different address.
    pub fn with_address(&self, address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..self.clone()
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}
