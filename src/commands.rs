//! Handlers behind each subcommand.
//!
//! Management commands are strict: `create` refuses a taken name, `drop`
//! and `info` refuse a missing one. The catalog itself stays idempotent.

use anyhow::{Context, Result};
use graph_link::Connector;
use serde_json::json;
use tracing::info;
use vec_index::{
    DimensionReconciler, FixedDimensionProbe, IndexCatalog, IndexDescriptor, IndexError,
    IndexExistence, IndexResult, IndexSpec, ReconcileRequest, Reconciliation,
    SimilarityFunction,
};

use crate::cli::Commands;
use crate::config::AppConfig;

/// Create `spec`, failing with `AlreadyExists` if its name is taken.
pub async fn create_strict(catalog: &IndexCatalog, spec: &IndexSpec) -> IndexResult<()> {
    let existing = catalog.check_exists(&spec.name, None).await?;
    if existing.exists {
        return Err(IndexError::AlreadyExists {
            name: spec.name.clone(),
            dimension: existing.dimension,
        });
    }
    catalog.create(spec, None).await
}

/// Drop `name`, failing with `NotFound` if there is no such index.
pub async fn drop_strict(catalog: &IndexCatalog, name: &str) -> IndexResult<()> {
    if !catalog.check_exists(name, None).await?.exists {
        return Err(IndexError::NotFound {
            name: name.to_string(),
        });
    }
    catalog.delete(name, None).await
}

pub async fn info_strict(catalog: &IndexCatalog, name: &str) -> IndexResult<IndexDescriptor> {
    catalog
        .get_info(name, None)
        .await?
        .ok_or_else(|| IndexError::NotFound {
            name: name.to_string(),
        })
}

pub fn render_list(indexes: &[IndexDescriptor]) -> String {
    if indexes.is_empty() {
        return "No vector indexes found".to_string();
    }
    indexes
        .iter()
        .map(|index| {
            format!(
                "{}  {}  {}",
                index, index.similarity_function, index.state
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_existence(name: &str, existence: &IndexExistence) -> String {
    if !existence.exists {
        return format!("{}: not found", name);
    }
    let dimension = existence
        .dimension
        .map_or_else(|| "any dimension".to_string(), |d| format!("{}D", d));
    match &existence.similarity_function {
        Some(similarity) => format!("{}: exists ({}, {})", name, dimension, similarity),
        None => format!("{}: exists ({})", name, dimension),
    }
}

pub fn render_reconciliation(result: &Reconciliation) -> String {
    format!(
        "Using index {} ({}D, {})",
        result.effective_name, result.dimension, result.outcome
    )
}

/// Run one subcommand and print its result.
pub async fn execute(
    command: Commands,
    config: &AppConfig,
    connector: &Connector,
    json_output: bool,
) -> Result<()> {
    let catalog = IndexCatalog::new(connector.clone(), config.connection_config());

    match command {
        Commands::Ping => {
            let effective = connector
                .ping(catalog.config())
                .await
                .with_context(|| format!("Failed to reach {}", catalog.config().address()))?;
            if json_output {
                println!("{}", json!({ "ok": true, "address": effective.address() }));
            } else {
                println!("Connected via {}", effective.address());
            }
        }

        Commands::List => {
            let indexes = catalog.list(None).await.context("Failed to list vector indexes")?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&indexes)?);
            } else {
                println!("{}", render_list(&indexes));
            }
        }

        Commands::Info { name } => {
            let descriptor = info_strict(&catalog, &name).await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&descriptor)?);
            } else {
                println!("{}", descriptor);
                println!("  similarity: {}", descriptor.similarity_function);
                println!("  state:      {}", descriptor.state);
            }
        }

        Commands::Exists { name } => {
            let existence = catalog.check_exists(&name, None).await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&existence)?);
            } else {
                println!("{}", render_existence(&name, &existence));
            }
        }

        Commands::Create {
            name,
            label,
            property,
            dimension,
            similarity,
        } => {
            let similarity = match similarity {
                Some(s) => s.parse::<SimilarityFunction>()?,
                None => config.index.similarity,
            };
            let spec = IndexSpec {
                name: name.unwrap_or_else(|| config.index.name.clone()),
                label: label.unwrap_or_else(|| config.index.label.clone()),
                property: property.unwrap_or_else(|| config.index.property.clone()),
                dimension,
                similarity,
            };
            create_strict(&catalog, &spec).await?;
            info!(index = %spec.name, dimension, "Created vector index");
            if json_output {
                println!("{}", json!({ "created": spec.name, "dimension": dimension }));
            } else {
                println!("Created {} ({}D, {}.{})", spec.name, dimension, spec.label, spec.property);
            }
        }

        Commands::Drop { name } => {
            drop_strict(&catalog, &name).await?;
            if json_output {
                println!("{}", json!({ "dropped": name }));
            } else {
                println!("Dropped {}", name);
            }
        }

        Commands::Ensure {
            name,
            label,
            property,
            dimension,
        } => {
            let request = ReconcileRequest {
                base_name: name.unwrap_or_else(|| config.index.name.clone()),
                label: label.unwrap_or_else(|| config.index.label.clone()),
                property: property.unwrap_or_else(|| config.index.property.clone()),
                similarity: config.index.similarity,
            };
            let probe = FixedDimensionProbe::new(dimension);
            let result = DimensionReconciler::new(&catalog)
                .reconcile(&request, &probe, None)
                .await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", render_reconciliation(&result));
            }
        }
    }

    Ok(())
}
