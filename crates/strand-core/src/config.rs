//! Physical binding of a primitive series to a table.
//!
//! A [`SeriesConfig`] is built once from registration metadata and checked
//! against the store's schema. It is immutable afterwards.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const TABLE_NAME_KEY: &str = "table_name";
pub const DATE_COLUMN_KEY: &str = "date_column";
pub const VALUE_COLUMN_KEY: &str = "value_column";
pub const CREATED_AT_COLUMN_KEY: &str = "created_at_column";

pub const DEFAULT_DATE_COLUMN: &str = "date_value";
pub const DEFAULT_VALUE_COLUMN: &str = "value";
pub const DEFAULT_CREATED_AT_COLUMN: &str = "created_at";

// ─── Schema description ──────────────────────────────────────────────────────

/// The declared type of a column, as far as registration cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
  Text,
  Integer,
  Other(String),
}

impl fmt::Display for ColumnType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Text => f.write_str("TEXT"),
      Self::Integer => f.write_str("INTEGER"),
      Self::Other(declared) => f.write_str(declared),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
  pub name: String,
  pub ty:   ColumnType,
}

/// A table as reported by the store's schema introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
  pub name:    String,
  pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
  fn column(&self, name: &str) -> Option<&ColumnSchema> {
    self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
  }
}

// ─── SeriesConfig ────────────────────────────────────────────────────────────

/// Where a primitive series lives: one table with a textual date column, an
/// integer value column, and a textual creation-order column used to pick
/// between rows that share a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesConfig {
  table:             String,
  date_column:       String,
  value_column:      String,
  created_at_column: String,
}

impl SeriesConfig {
  /// Build a config from registration metadata and validate it against
  /// `tables`. Only `table_name` is required; the column keys fall back to
  /// `date_value`, `value` and `created_at`.
  pub fn from_metadata(
    metadata: &BTreeMap<String, String>,
    tables: &[TableSchema],
  ) -> Result<Self> {
    let table = metadata.get(TABLE_NAME_KEY).ok_or(Error::MissingTable)?;
    let column = |key: &str, default: &str| {
      metadata.get(key).map(String::as_str).unwrap_or(default).to_owned()
    };

    let config = Self {
      table:             table.clone(),
      date_column:       column(DATE_COLUMN_KEY, DEFAULT_DATE_COLUMN),
      value_column:      column(VALUE_COLUMN_KEY, DEFAULT_VALUE_COLUMN),
      created_at_column: column(CREATED_AT_COLUMN_KEY, DEFAULT_CREATED_AT_COLUMN),
    };
    config.validate(tables)?;
    Ok(config)
  }

  fn validate(&self, tables: &[TableSchema]) -> Result<()> {
    ensure_identifier(&self.table)?;
    ensure_identifier(&self.date_column)?;
    ensure_identifier(&self.value_column)?;
    ensure_identifier(&self.created_at_column)?;

    let table = tables
      .iter()
      .find(|t| t.name.eq_ignore_ascii_case(&self.table))
      .ok_or_else(|| Error::TableNotFound(self.table.clone()))?;

    let check = |role: &'static str, column: &str, expected: ColumnType| -> Result<()> {
      let found = table.column(column).ok_or_else(|| Error::ColumnNotFound {
        role,
        column: column.to_owned(),
      })?;
      if found.ty != expected {
        return Err(Error::ColumnTypeMismatch {
          role,
          column: column.to_owned(),
          expected,
          found: found.ty.clone(),
        });
      }
      Ok(())
    };

    check("date", &self.date_column, ColumnType::Text)?;
    check("value", &self.value_column, ColumnType::Integer)?;
    check("created_at", &self.created_at_column, ColumnType::Text)?;
    Ok(())
  }

  pub fn table(&self) -> &str { &self.table }

  pub fn date_column(&self) -> &str { &self.date_column }

  pub fn value_column(&self) -> &str { &self.value_column }

  pub fn created_at_column(&self) -> &str { &self.created_at_column }
}

/// Table and column names are interpolated into SQL, so only plain
/// identifiers (`[A-Za-z_][A-Za-z0-9_]*`) are accepted.
pub fn ensure_identifier(name: &str) -> Result<()> {
  let mut chars = name.chars();
  let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
  if valid {
    Ok(())
  } else {
    Err(Error::InvalidIdentifier(name.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ErrorKind;

  fn price_table(value_type: ColumnType) -> TableSchema {
    TableSchema {
      name:    "Price".into(),
      columns: vec![
        ColumnSchema { name: "date_value".into(), ty: ColumnType::Text },
        ColumnSchema { name: "value".into(), ty: value_type },
        ColumnSchema { name: "created_at".into(), ty: ColumnType::Text },
        ColumnSchema { name: "observed".into(), ty: ColumnType::Text },
      ],
    }
  }

  fn metadata(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  #[test]
  fn defaults_fill_in_missing_columns() {
    let config = SeriesConfig::from_metadata(
      &metadata(&[("table_name", "price")]),
      &[price_table(ColumnType::Integer)],
    )
    .unwrap();

    assert_eq!(config.table(), "price");
    assert_eq!(config.date_column(), "date_value");
    assert_eq!(config.value_column(), "value");
    assert_eq!(config.created_at_column(), "created_at");
  }

  #[test]
  fn explicit_columns_override_defaults() {
    let config = SeriesConfig::from_metadata(
      &metadata(&[("table_name", "price"), ("date_column", "observed")]),
      &[price_table(ColumnType::Integer)],
    )
    .unwrap();
    assert_eq!(config.date_column(), "observed");
  }

  #[test]
  fn registration_failures() {
    let tables = [price_table(ColumnType::Integer)];
    let kind = |pairs: &[(&str, &str)], tables: &[TableSchema]| {
      SeriesConfig::from_metadata(&metadata(pairs), tables)
        .unwrap_err()
        .kind()
    };

    assert_eq!(kind(&[], &tables), ErrorKind::MissingTable);
    assert_eq!(kind(&[("table_name", "cpi")], &tables), ErrorKind::TableNotFound);
    assert_eq!(
      kind(&[("table_name", "price"), ("value_column", "amount")], &tables),
      ErrorKind::ColumnNotFound
    );
    assert_eq!(
      kind(&[("table_name", "price")], &[price_table(ColumnType::Text)]),
      ErrorKind::ColumnTypeMismatch
    );
    assert_eq!(
      kind(&[("table_name", "price; DROP TABLE price")], &tables),
      ErrorKind::InvalidIdentifier
    );
  }

  #[test]
  fn identifiers() {
    assert!(ensure_identifier("date_value").is_ok());
    assert!(ensure_identifier("_t1").is_ok());
    assert!(ensure_identifier("").is_err());
    assert!(ensure_identifier("1abc").is_err());
    assert!(ensure_identifier("a\"b").is_err());
  }
}
