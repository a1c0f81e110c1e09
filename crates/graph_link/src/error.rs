use std::error::Error as StdError;

use crate::router;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinkError {
    #[error("Connection to {address} failed: {message}")]
    Connection { address: String, message: String },

    #[error("Statement failed: {message}")]
    Statement { message: String },

    #[error("Closing session failed: {message}")]
    Close { message: String },
}

impl LinkError {
    pub fn connection(address: &str, err: &(dyn StdError + 'static)) -> Self {
        LinkError::Connection {
            address: address.to_string(),
            message: flatten(err),
        }
    }

    pub fn statement(err: &(dyn StdError + 'static)) -> Self {
        LinkError::Statement {
            message: flatten(err),
        }
    }

    /// True when the message carries a routing-discovery signature.
    pub fn is_routing_failure(&self) -> bool {
        match self {
            LinkError::Connection { message, .. } => router::is_routing_failure_message(message),
            _ => false,
        }
    }
}

/// Render an error and its source chain as one line.
fn flatten(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

pub type LinkResult<T> = Result<T, LinkError>;
