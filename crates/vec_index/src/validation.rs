//! Validation for values interpolated into catalog statements.
//!
//! Index, label and property names cannot be passed as query parameters
//! in index DDL, so they are spliced into the statement text. These checks
//! are the only barrier against Cypher injection and run on every path
//! that builds such a statement.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Role, ValidationError};

/// Largest vector dimension the database accepts.
pub const MAX_VECTOR_DIMENSION: u32 = 2048;

/// Longest accepted identifier, in characters.
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
});

/// Validate an index name, node label or property name.
pub fn validate_identifier(identifier: &str, role: Role) -> Result<(), ValidationError> {
    if identifier.is_empty() {
        return Err(ValidationError::new(role, identifier, "Must not be empty."));
    }

    if identifier.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::new(
            role,
            identifier,
            format!("Must be {} characters or less.", MAX_IDENTIFIER_LENGTH),
        ));
    }

    if identifier.contains('`') {
        return Err(ValidationError::new(
            role,
            identifier,
            "Backticks are not allowed.",
        ));
    }

    if !IDENTIFIER.is_match(identifier) {
        return Err(ValidationError::new(
            role,
            identifier,
            "Must start with a letter, underscore, or dollar sign, \
             and contain only letters, numbers, underscores, and dollar signs.",
        ));
    }

    Ok(())
}

/// Validate a vector dimension, returning it as the catalog's unsigned type.
pub fn validate_dimension(dimension: i64) -> Result<u32, ValidationError> {
    if dimension < 1 || dimension > i64::from(MAX_VECTOR_DIMENSION) {
        return Err(ValidationError::new(
            Role::Dimension,
            dimension,
            format!(
                "Vector dimension must be between 1 and {}.",
                MAX_VECTOR_DIMENSION
            ),
        ));
    }
    Ok(dimension as u32)
}

/// Same as [`validate_dimension`] for values that arrive as floating point
/// (JSON input, embedding metadata). Fractional values are rejected.
pub fn dimension_from_number(value: f64) -> Result<u32, ValidationError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(ValidationError::new(
            Role::Dimension,
            value,
            "Vector dimension must be an integer.",
        ));
    }
    validate_dimension(value as i64)
}
