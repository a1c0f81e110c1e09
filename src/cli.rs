// src/cli.rs
// Command-line surface for graphvec

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(name = "graphvec", version, about = "Manage Neo4j vector indexes")]
pub struct Cli {
    #[clap(long, global = true, help = "Path to the config file (default: ./graphvec.toml)")]
    pub config: Option<PathBuf>,

    #[clap(long, global = true, help = "Database URI, e.g. neo4j://localhost:7687")]
    pub uri: Option<String>,

    #[clap(long, global = true, help = "Database name (empty for the server default)")]
    pub database: Option<String>,

    #[clap(long, global = true, help = "Print results as JSON")]
    pub json: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check connectivity and report the address that answered
    Ping,

    /// List every vector index
    List,

    /// Show one vector index
    Info {
        #[clap(help = "Name of the index")]
        name: String,
    },

    /// Report whether an index exists and how it is configured
    Exists {
        #[clap(help = "Name of the index")]
        name: String,
    },

    /// Create a vector index; fails if the name is taken
    Create {
        #[clap(long, help = "Index name (default from config)")]
        name: Option<String>,

        #[clap(long, help = "Node label to index (default from config)")]
        label: Option<String>,

        #[clap(long, help = "Embedding property (default from config)")]
        property: Option<String>,

        #[clap(long, help = "Vector dimension, 1 to 2048")]
        dimension: u32,

        #[clap(long, help = "cosine or euclidean (default from config)")]
        similarity: Option<String>,
    },

    /// Drop a vector index; fails if it does not exist
    Drop {
        #[clap(help = "Name of the index")]
        name: String,
    },

    /// Make sure an index matching the embedding dimension exists
    Ensure {
        #[clap(long, help = "Base index name (default from config)")]
        name: Option<String>,

        #[clap(long, help = "Node label to index (default from config)")]
        label: Option<String>,

        #[clap(long, help = "Embedding property (default from config)")]
        property: Option<String>,

        #[clap(long, help = "Output dimension of the embedding model")]
        dimension: u32,
    },
}
