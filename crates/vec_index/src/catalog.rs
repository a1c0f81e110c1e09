//! Vector index lifecycle against the database's index catalog.
//!
//! Reads are parameterized. Writes interpolate identifiers into the
//! statement text, so every write builder validates its inputs first.
//! Nothing here retries: catalog failures reach the caller unchanged,
//! only session establishment goes through the routing fallback.

use graph_link::{ConnectionConfig, Connector, LinkError, Record, Statement};
use serde_json::Value;
use telemetry::{Event, Observer};

use crate::error::{IndexError, IndexResult, Role};
use crate::types::{IndexDescriptor, IndexExistence, IndexSpec, SimilarityFunction};
use crate::validation::{validate_dimension, validate_identifier};

const EXISTS_COLUMNS: &[&str] = &["name", "dimension", "similarityFunction"];

const DESCRIPTOR_COLUMNS: &[&str] = &[
    "name",
    "state",
    "nodeLabel",
    "property",
    "dimension",
    "similarityFunction",
];

const EXISTS_QUERY: &str = "SHOW VECTOR INDEXES
YIELD name, options
WHERE name = $indexName
RETURN name,
       options.indexConfig['vector.dimensions'] AS dimension,
       options.indexConfig['vector.similarity_function'] AS similarityFunction";

const LIST_QUERY: &str = "SHOW VECTOR INDEXES
YIELD name, state, labelsOrTypes, properties, options
RETURN name,
       state,
       labelsOrTypes[0] AS nodeLabel,
       properties[0] AS property,
       options.indexConfig['vector.dimensions'] AS dimension,
       options.indexConfig['vector.similarity_function'] AS similarityFunction";

const INFO_QUERY: &str = "SHOW VECTOR INDEXES
YIELD name, state, labelsOrTypes, properties, options
WHERE name = $indexName
RETURN name,
       state,
       labelsOrTypes[0] AS nodeLabel,
       properties[0] AS property,
       options.indexConfig['vector.dimensions'] AS dimension,
       options.indexConfig['vector.similarity_function'] AS similarityFunction";

pub fn exists_statement(name: &str) -> Statement {
    Statement::new(EXISTS_QUERY)
        .param("indexName", name)
        .returning(EXISTS_COLUMNS)
}

pub fn list_statement() -> Statement {
    Statement::new(LIST_QUERY).returning(DESCRIPTOR_COLUMNS)
}

pub fn info_statement(name: &str) -> Statement {
    Statement::new(INFO_QUERY)
        .param("indexName", name)
        .returning(DESCRIPTOR_COLUMNS)
}

/// `CREATE VECTOR INDEX ... IF NOT EXISTS`, so repeating it is harmless.
pub fn create_statement(spec: &IndexSpec) -> IndexResult<Statement> {
    validate_identifier(&spec.name, Role::IndexName)?;
    validate_identifier(&spec.label, Role::NodeLabel)?;
    validate_identifier(&spec.property, Role::Property)?;
    let dimension = validate_dimension(i64::from(spec.dimension))?;

    Ok(Statement::new(format!(
        "CREATE VECTOR INDEX `{name}` IF NOT EXISTS
FOR (n:`{label}`)
ON (n.`{property}`)
OPTIONS {{
  indexConfig: {{
    `vector.dimensions`: {dimension},
    `vector.similarity_function`: '{similarity}'
  }}
}}",
        name = spec.name,
        label = spec.label,
        property = spec.property,
        dimension = dimension,
        similarity = spec.similarity.as_str(),
    )))
}

/// `DROP INDEX ... IF EXISTS`, so dropping a missing index succeeds.
pub fn drop_statement(name: &str) -> IndexResult<Statement> {
    validate_identifier(name, Role::IndexName)?;
    Ok(Statement::new(format!("DROP INDEX `{}` IF EXISTS", name)))
}

/// Catalog client bound to one connection configuration.
///
/// Each operation opens its own session and closes it before returning.
/// Results are never cached, so changes made by other clients show up on
/// the next call.
#[derive(Clone)]
pub struct IndexCatalog {
    connector: Connector,
    config: ConnectionConfig,
}

impl IndexCatalog {
    pub fn new(connector: Connector, config: ConnectionConfig) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn observer(&self) -> &dyn Observer {
        self.connector.observer().as_ref()
    }

    /// Existence and configuration of the index called `name`.
    pub async fn check_exists(
        &self,
        name: &str,
        database: Option<&str>,
    ) -> IndexResult<IndexExistence> {
        let records = self.execute(&exists_statement(name), database).await?;

        let Some(record) = records.first() else {
            return Ok(IndexExistence::missing());
        };

        let dimension = record.get("dimension").map(parse_dimension).transpose()?;
        let similarity = record.get_str("similarityFunction").map(str::to_string);
        Ok(IndexExistence::found(dimension, similarity))
    }

    /// Issue the create-if-absent statement. `IndexCreated` is emitted on
    /// success whether or not the index already existed.
    pub async fn create(&self, spec: &IndexSpec, database: Option<&str>) -> IndexResult<()> {
        let statement = create_statement(spec)?;
        self.execute(&statement, database).await?;

        self.observer().observe(Event::IndexCreated {
            name: spec.name.clone(),
            label: spec.label.clone(),
            property: spec.property.clone(),
            dimension: spec.dimension,
        });
        Ok(())
    }

    pub async fn delete(&self, name: &str, database: Option<&str>) -> IndexResult<()> {
        let statement = drop_statement(name)?;
        self.execute(&statement, database).await?;

        self.observer().observe(Event::IndexDropped {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Every vector index in scope. Order is whatever the catalog returns.
    pub async fn list(&self, database: Option<&str>) -> IndexResult<Vec<IndexDescriptor>> {
        let records = self.execute(&list_statement(), database).await?;
        records.iter().map(parse_descriptor).collect()
    }

    pub async fn get_info(
        &self,
        name: &str,
        database: Option<&str>,
    ) -> IndexResult<Option<IndexDescriptor>> {
        let records = self.execute(&info_statement(name), database).await?;
        records.first().map(parse_descriptor).transpose()
    }

    async fn execute(
        &self,
        statement: &Statement,
        database: Option<&str>,
    ) -> IndexResult<Vec<Record>> {
        let config = match database {
            Some(db) => self.config.clone().with_database(Some(db.to_string())),
            None => self.config.clone(),
        };

        match self.connector.run(&config, statement).await {
            Ok(records) => Ok(records),
            Err(err) => {
                if let LinkError::Statement { message } = &err {
                    self.observer().observe(Event::StatementFailed {
                        statement: first_line(statement.text()).to_string(),
                        error: message.clone(),
                    });
                }
                Err(err.into())
            }
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim()
}

/// The catalog hands dimensions back as whatever numeric type the driver
/// chose (integer, float, occasionally a string). Normalize to `u32`.
pub fn parse_dimension(value: &Value) -> IndexResult<u32> {
    let unexpected = |detail: String| IndexError::UnexpectedRow {
        column: "dimension",
        detail,
    };

    let number = match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return u32::try_from(u).map_err(|_| unexpected(format!("{} is out of range", u)));
            }
            n.as_f64().ok_or_else(|| unexpected(n.to_string()))?
        }
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| unexpected(format!("{:?} is not a number", s)))?,
        other => return Err(unexpected(format!("expected a number, got {}", other))),
    };

    if !number.is_finite() || number.fract() != 0.0 || number < 0.0 || number > f64::from(u32::MAX)
    {
        return Err(unexpected(format!("{} is not a valid dimension", number)));
    }
    Ok(number as u32)
}

fn required_str<'a>(record: &'a Record, column: &'static str) -> IndexResult<&'a str> {
    record
        .get_str(column)
        .ok_or_else(|| IndexError::UnexpectedRow {
            column,
            detail: "missing or not a string".to_string(),
        })
}

fn parse_descriptor(record: &Record) -> IndexResult<IndexDescriptor> {
    let similarity_function = required_str(record, "similarityFunction")?
        .parse::<SimilarityFunction>()
        .map_err(|e| IndexError::UnexpectedRow {
            column: "similarityFunction",
            detail: e.reason,
        })?;

    Ok(IndexDescriptor {
        name: required_str(record, "name")?.to_string(),
        node_label: required_str(record, "nodeLabel")?.to_string(),
        property: required_str(record, "property")?.to_string(),
        dimension: record.get("dimension").map(parse_dimension).transpose()?,
        similarity_function,
        state: record.get_str("state").unwrap_or_default().to_string(),
    })
}
