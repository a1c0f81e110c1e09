//! Routing-to-direct connection fallback.
//!
//! Routing addresses need a discovery handshake before the driver can
//! connect. In some network setups discovery fails while a direct Bolt
//! connection to the same host works, so a failed routing attempt is
//! retried exactly once against the direct form of the address.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;

use once_cell::sync::Lazy;
use regex::Regex;
use telemetry::{Event, Observer};

use crate::config::ConnectionConfig;

static ROUTING_FAILURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)could not perform discovery|no routing servers available")
        .expect("routing failure pattern is valid")
});

/// Address schemes understood by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Neo4j,
    Neo4jS,
    Neo4jSsc,
    Bolt,
    BoltS,
    BoltSsc,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Neo4j => "neo4j",
            Scheme::Neo4jS => "neo4j+s",
            Scheme::Neo4jSsc => "neo4j+ssc",
            Scheme::Bolt => "bolt",
            Scheme::BoltS => "bolt+s",
            Scheme::BoltSsc => "bolt+ssc",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "neo4j" => Some(Scheme::Neo4j),
            "neo4j+s" => Some(Scheme::Neo4jS),
            "neo4j+ssc" => Some(Scheme::Neo4jSsc),
            "bolt" => Some(Scheme::Bolt),
            "bolt+s" => Some(Scheme::BoltS),
            "bolt+ssc" => Some(Scheme::BoltSsc),
            _ => None,
        }
    }

    /// Split `address` into its scheme and the remainder after `://`.
    pub fn parse(address: &str) -> Option<(Self, &str)> {
        let (scheme, rest) = address.split_once("://")?;
        Self::from_name(scheme).map(|s| (s, rest))
    }

    pub fn is_routing(&self) -> bool {
        matches!(self, Scheme::Neo4j | Scheme::Neo4jS | Scheme::Neo4jSsc)
    }

    /// Direct equivalent, keeping the encryption qualifier.
    pub fn direct(&self) -> Self {
        match self {
            Scheme::Neo4j => Scheme::Bolt,
            Scheme::Neo4jS => Scheme::BoltS,
            Scheme::Neo4jSsc => Scheme::BoltSsc,
            direct => *direct,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_routing_failure_message(message: &str) -> bool {
    ROUTING_FAILURE.is_match(message)
}

/// Whether a failure against `address` warrants one direct retry.
///
/// Requires a routing scheme and a routing-failure signature anywhere in
/// the error's source chain. Authentication, syntax and unrelated timeout
/// errors never qualify.
pub fn should_retry_direct(error: &(dyn StdError + 'static), address: &str) -> bool {
    let routing = matches!(Scheme::parse(address), Some((scheme, _)) if scheme.is_routing());
    if !routing {
        return false;
    }

    let mut current = Some(error);
    while let Some(err) = current {
        if is_routing_failure_message(&err.to_string()) {
            return true;
        }
        current = err.source();
    }
    false
}

/// Rewrite a routing address to its direct form. Anything else is
/// returned unchanged.
pub fn to_direct_address(address: &str) -> String {
    match Scheme::parse(address) {
        Some((scheme, rest)) if scheme.is_routing() => format!("{}://{}", scheme.direct(), rest),
        _ => address.to_string(),
    }
}

/// Run `attempt` against `config`; on a routing failure run it once more
/// against the direct address. The second failure is returned as is.
pub async fn with_direct_fallback<T, E, F, Fut>(
    config: &ConnectionConfig,
    observer: &dyn Observer,
    mut attempt: F,
) -> Result<T, E>
where
    E: StdError + 'static,
    F: FnMut(ConnectionConfig) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let first = match attempt(config.clone()).await {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    if !should_retry_direct(&first, config.address()) {
        return Err(first);
    }

    let direct = config.with_address(to_direct_address(config.address()));
    observer.observe(Event::DirectFallback {
        from: config.address().to_string(),
        to: direct.address().to_string(),
        error: first.to_string(),
    });

    let address = direct.address().to_string();
    attempt(direct).await.map_err(|err| {
        observer.observe(Event::DirectFallbackFailed {
            address,
            error: err.to_string(),
        });
        err
    })
}
