//! Structural snapshot of a database: tables, columns and foreign keys.
//!
//! Order matters. Tables and columns are kept exactly in the order the
//! introspection layer (or a snapshot file) declared them, because every
//! resolver is first-match-wins over that order.
//!
//! Snapshots serialize as:
//!
//! ```json
//! {"tables": [{"name": "Book",
//!              "columns": [{"name": "id", "type": "INTEGER", "pk": true}],
//!              "foreign_keys": [{"from": "author_id", "table": "Author", "to": "id"}]}]}
//! ```

use crate::ast::{Limit, OrderBy, Query, Select, SortOrder};
use crate::error::{AskError, AskResult};
use crate::transpiler::ToSql;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Declared type, free-form (`INTEGER`, `VARCHAR(255)`, or empty).
    #[serde(rename = "type", default)]
    pub col_type: String,
    #[serde(rename = "pk", default)]
    pub primary_key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, col_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            col_type: col_type.into(),
            primary_key: false,
        }
    }

    /// Mark this column as (part of) the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// Foreign key edge from a column of the owning table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    #[serde(rename = "from")]
    pub column: String,
    #[serde(rename = "table")]
    pub target_table: String,
    #[serde(rename = "to", default)]
    pub target_column: String,
}

impl ForeignKey {
    pub fn new(
        column: impl Into<String>,
        target_table: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            target_table: target_table.into(),
            target_column: target_column.into(),
        }
    }
}

/// Table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Append a column. A column with the same name is replaced in place.
    pub fn column(mut self, column: Column) -> Self {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        self
    }

    pub fn foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }
}

/// An ordered set of tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    tables: Vec<Table>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Schema::add_table`].
    pub fn table(mut self, table: Table) -> Self {
        self.add_table(table);
        self
    }

    /// Add a table, replacing (in place) any table with the same name.
    pub fn add_table(&mut self, table: Table) {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    /// Tables in declaration order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Preview query for a table: newest-first by its first column
    /// (`rowid` when it has none), 50 rows.
    pub fn quick_select(&self, name: &str) -> Option<String> {
        let table = self.get(name)?;
        let column = table
            .columns
            .first()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "rowid".to_string());

        let query = Query::Select(Select {
            table: table.name.clone(),
            filter: None,
            order: Some(OrderBy::new(column, SortOrder::Desc)),
            limit: Limit::rows(50),
        });
        Some(query.to_sql())
    }

    pub fn from_json_str(json: &str) -> AskResult<Self> {
        let schema: Schema = serde_json::from_str(json)?;
        schema.check_unique()?;
        Ok(schema)
    }

    /// Load a snapshot previously written with [`Schema::to_json`].
    pub fn from_json_file(path: impl AsRef<Path>) -> AskResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AskError::Schema(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let schema = Self::from_json_str(&content)?;
        tracing::debug!("Loaded {} table(s) from {}", schema.len(), path.display());
        Ok(schema)
    }

    /// Pretty-printed snapshot, readable by [`Schema::from_json_str`].
    pub fn to_json(&self) -> AskResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn check_unique(&self) -> AskResult<()> {
        for (i, table) in self.tables.iter().enumerate() {
            if self.tables[..i].iter().any(|t| t.name == table.name) {
                return Err(AskError::Schema(format!(
                    "Duplicate table '{}'",
                    table.name
                )));
            }
            for (j, col) in table.columns.iter().enumerate() {
                if table.columns[..j].iter().any(|c| c.name == col.name) {
                    return Err(AskError::Schema(format!(
                        "Duplicate column '{}' in table '{}'",
                        col.name, table.name
                    )));
                }
            }
        }
        Ok(())
    }
}
