//! Identifier gate for table names
//!
//! Anything that ends up in SQL object-name position must pass
//! [`validate_identifier`] first. Values bound as query parameters do not.

use crate::error::{Error, Result};
use std::fmt;

/// Returns true when `name` is non-empty and made only of ASCII letters,
/// digits and underscores.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Fails with [`Error::InvalidIdentifier`] unless `name` matches `^[A-Za-z0-9_]+$`.
pub fn validate_identifier(name: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        tracing::warn!(table = %name, "Rejected invalid table name");
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}

/// A table name.
///
/// Names coming from a caller are built with [`TableName::parse`] and are
/// always safe identifiers. Names reported back by the catalog (the other end
/// of a foreign key) are built with [`TableName::from_catalog`] and may not be;
/// check [`TableName::is_safe_identifier`] before interpolating one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableName(String);

impl TableName {
    pub fn parse(raw: &str) -> Result<Self> {
        validate_identifier(raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn from_catalog(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_safe_identifier(&self) -> bool {
        is_valid_identifier(&self.0)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
