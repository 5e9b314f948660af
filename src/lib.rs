//! # asksql — Ask an unknown database in plain words
//!
//! > **Type what you want to see. Get a query you can run.**
//!
//! asksql turns short free-text requests into read-only SQLite queries
//! using a fixed set of heuristics over the loaded schema. No model, no
//! grammar: the first rule that fits wins.
//!
//! ## Quick Example
//!
//! ```rust
//! use asksql::prelude::*;
//!
//! let schema = Schema::new().table(
//!     Table::new("Book")
//!         .column(Column::new("id", "INTEGER").primary_key())
//!         .column(Column::new("title", "TEXT"))
//!         .column(Column::new("price", "REAL")),
//! );
//!
//! let translator = Translator::with_schema(schema);
//! assert_eq!(
//!     translator.translate("books under 20"),
//!     "SELECT * FROM \"Book\" WHERE price < 20 ORDER BY price ASC LIMIT 20;"
//! );
//! ```
//!
//! ## Cues
//!
//! | Say               | Get                              |
//! |-------------------|----------------------------------|
//! | `books`           | the table, 20 rows               |
//! | `under 20`        | `WHERE price < 20`               |
//! | `find dune`       | `WHERE title LIKE '%dune%'`      |
//! | `how many books`  | `COUNT(*)`                       |
//! | `newest orders`   | 5 rows by date, descending       |
//! | `sort by year`    | `ORDER BY year`                  |
//! | `a-z` / `z-a`     | alphabetical by a text column    |
//! | `limit 5`         | `LIMIT 5` (`no limit` removes it) |
//!
//! Search terms and numbers are interpolated without escaping. Run the
//! output against a read-only connection.

pub mod ast;
pub mod clause;
pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod resolver;
pub mod schema;
pub mod translator;
pub mod transpiler;
pub mod utterance;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::{Config, OutputFormat};
    pub use crate::engine::{Database, DatabaseOptions, QueryOutput};
    pub use crate::error::*;
    pub use crate::guard::{ensure_read_only, is_read_only};
    pub use crate::schema::{Column, ForeignKey, Schema, Table};
    pub use crate::translator::Translator;
    pub use crate::transpiler::ToSql;
}

/// Translate one utterance against `schema`.
///
/// # Example
///
/// ```
/// use asksql::schema::Schema;
///
/// let sql = asksql::translate(&Schema::new(), "help");
/// assert!(sql.ends_with(" as \"Help\";"));
/// ```
pub fn translate(schema: &schema::Schema, utterance: &str) -> String {
    translator::Translator::with_schema(schema.clone()).translate(utterance)
}
