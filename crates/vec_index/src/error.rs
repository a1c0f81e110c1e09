use std::fmt;

use graph_link::LinkError;

/// Which input a [`ValidationError`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    IndexName,
    NodeLabel,
    Property,
    Dimension,
    Similarity,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::IndexName => "index name",
            Role::NodeLabel => "node label",
            Role::Property => "property name",
            Role::Dimension => "vector dimension",
            Role::Similarity => "similarity function",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {role}: \"{value}\". {reason}")]
pub struct ValidationError {
    pub role: Role,
    pub value: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(role: Role, value: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self {
            role,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("Vector index \"{name}\" does not exist")]
    NotFound { name: String },

    #[error("Vector index \"{name}\" already exists{}", describe_dimension(.dimension))]
    AlreadyExists { name: String, dimension: Option<u32> },

    #[error("Unexpected value in catalog column {column}: {detail}")]
    UnexpectedRow { column: &'static str, detail: String },

    #[error("Embedding probe failed: {0}")]
    Probe(anyhow::Error),
}

fn describe_dimension(dimension: &Option<u32>) -> String {
    match dimension {
        Some(d) => format!(" with dimension {}", d),
        None => String::new(),
    }
}

/// Coarse classification callers use to decide user-facing behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad identifier or dimension; no I/O happened.
    Validation,
    /// Discovery failed and the direct retry did not help (or was not possible).
    RoutingFailure,
    /// The session could not be opened for another reason (auth, unreachable host).
    Connection,
    /// The database failed a catalog statement, or returned something unreadable.
    Catalog,
    NotFound,
    Conflict,
    Probe,
}

impl IndexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IndexError::Validation(_) => ErrorKind::Validation,
            IndexError::Link(link) if link.is_routing_failure() => ErrorKind::RoutingFailure,
            IndexError::Link(LinkError::Connection { .. }) => ErrorKind::Connection,
            IndexError::Link(_) => ErrorKind::Catalog,
            IndexError::UnexpectedRow { .. } => ErrorKind::Catalog,
            IndexError::NotFound { .. } => ErrorKind::NotFound,
            IndexError::AlreadyExists { .. } => ErrorKind::Conflict,
            IndexError::Probe(_) => ErrorKind::Probe,
        }
    }
}

pub type IndexResult<T> = Result<T, IndexError>;
