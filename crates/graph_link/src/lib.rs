/*!
# Graph Link

Sessions against a Neo4j-compatible graph database. Every session open
goes through the routing fallback: a `neo4j://` address whose discovery
handshake fails is retried once as the matching `bolt://` address.
*/

pub mod bolt;
pub mod config;
pub mod connection;
pub mod error;
pub mod router;
pub mod session;

pub use bolt::BoltProvider;
pub use config::ConnectionConfig;
pub use connection::{run_scoped, Connector};
pub use error::{LinkError, LinkResult};
pub use router::{should_retry_direct, to_direct_address, with_direct_fallback, Scheme};
pub use session::{GraphSession, Record, SessionProvider, Statement};
