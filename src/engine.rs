//! SQLite execution engine for asksql.
//!
//! Opens a database file with sqlx, introspects its schema for the
//! translator and runs statements, returning rows as JSON values.

use crate::error::{AskError, AskResult};
use crate::schema::{Column, ForeignKey, Schema, Table};

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as _, Row, ValueRef};
use std::str::FromStr;
use std::time::{Duration, Instant};

/// How to open the database.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    /// Open files with `SQLITE_OPEN_READONLY`.
    pub read_only: bool,
    /// Pool size. In-memory databases need exactly one connection.
    pub max_connections: u32,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            read_only: true,
            max_connections: 1,
        }
    }
}

/// A SQLite database.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

/// Rows returned by a statement.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl QueryOutput {
    /// Rows as `{column: value}` objects.
    pub fn records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| self.columns.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }
}

impl Database {
    /// Open a database.
    ///
    /// Accepts a `sqlite:` URL (`sqlite::memory:`, `sqlite://app.db`) or a
    /// bare file path.
    ///
    /// ```rust,ignore
    /// let db = Database::connect("library.sqlite", DatabaseOptions::default()).await?;
    /// ```
    pub async fn connect(target: &str, options: DatabaseOptions) -> AskResult<Self> {
        let in_memory = target.contains(":memory:");
        let connect = if target.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(target)
                .map_err(|e| AskError::Connection(e.to_string()))?
        } else {
            SqliteConnectOptions::new().filename(target)
        };
        let connect = connect.read_only(options.read_only && !in_memory);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections.max(1))
            .connect_with(connect)
            .await
            .map_err(|e| AskError::Connection(format!("{}: {}", target, e)))?;

        tracing::info!("Opened {} (read-only: {})", target, options.read_only);
        Ok(Self { pool })
    }

    /// User tables in catalog order.
    pub async fn tables(&self) -> AskResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%';",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AskError::Database(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("name")
                    .map_err(|e| AskError::Database(e.to_string()))
            })
            .collect()
    }

    /// Introspect tables, columns and foreign keys.
    pub async fn schema(&self) -> AskResult<Schema> {
        let mut schema = Schema::new();

        for name in self.tables().await? {
            let quoted = quote_identifier(&name);
            let mut table = Table::new(&name);

            let columns = sqlx::query(&format!("PRAGMA table_info({});", quoted))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AskError::Database(e.to_string()))?;
            for row in &columns {
                table = table.column(column_from_row(row)?);
            }

            let keys = sqlx::query(&format!("PRAGMA foreign_key_list({});", quoted))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AskError::Database(e.to_string()))?;
            for row in &keys {
                table = table.foreign_key(foreign_key_from_row(row)?);
            }

            tracing::debug!(
                "Table {}: {} column(s), {} foreign key(s)",
                name,
                table.columns.len(),
                table.foreign_keys.len()
            );
            schema.add_table(table);
        }

        tracing::info!("Loaded schema with {} table(s)", schema.len());
        Ok(schema)
    }

    /// Run a statement and collect its rows.
    pub async fn fetch_all(&self, sql: &str) -> AskResult<QueryOutput> {
        let start = Instant::now();
        let rows: Vec<SqliteRow> = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AskError::Execution(e.to_string()))?;
        let elapsed = start.elapsed();

        let columns = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let rows = rows.iter().map(row_to_values).collect();

        Ok(QueryOutput {
            columns,
            rows,
            elapsed,
        })
    }

    /// Execute a statement that returns no rows.
    /// Returns the number of affected rows.
    pub async fn execute(&self, sql: &str) -> AskResult<u64> {
        let result = sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| AskError::Execution(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_from_row(row: &SqliteRow) -> AskResult<Column> {
    let get_err = |e: sqlx::Error| AskError::Database(e.to_string());

    let name: String = row.try_get("name").map_err(get_err)?;
    let col_type: Option<String> = row.try_get("type").map_err(get_err)?;
    let pk: i64 = row.try_get("pk").map_err(get_err)?;

    Ok(Column {
        name,
        col_type: col_type.unwrap_or_default(),
        primary_key: pk > 0,
    })
}

fn foreign_key_from_row(row: &SqliteRow) -> AskResult<ForeignKey> {
    let get_err = |e: sqlx::Error| AskError::Database(e.to_string());

    let target_table: String = row.try_get("table").map_err(get_err)?;
    let column: String = row.try_get("from").map_err(get_err)?;
    // NULL when the key implicitly targets the primary key.
    let target_column: Option<String> = row.try_get("to").map_err(get_err)?;

    Ok(ForeignKey {
        column,
        target_table,
        target_column: target_column.unwrap_or_default(),
    })
}

/// Convert a row to JSON values by storage class.
fn row_to_values(row: &SqliteRow) -> Vec<serde_json::Value> {
    (0..row.columns().len())
        .map(|i| {
            let is_null = row.try_get_raw(i).map(|v| v.is_null()).unwrap_or(true);
            if is_null {
                return serde_json::Value::Null;
            }

            if let Ok(v) = row.try_get::<i64, _>(i) {
                serde_json::Value::Number(v.into())
            } else if let Ok(v) = row.try_get::<f64, _>(i) {
                serde_json::Number::from_f64(v)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            } else if let Ok(v) = row.try_get::<String, _>(i) {
                serde_json::Value::String(v)
            } else if let Ok(v) = row.try_get::<Vec<u8>, _>(i) {
                serde_json::Value::String(format!("<{} bytes>", v.len()))
            } else {
                serde_json::Value::Null
            }
        })
        .collect()
}
