//! Table and column resolution.
//!
//! Every resolver is greedy and first-match-wins over the schema's
//! declaration order. There is no scoring.

use crate::schema::{Column, Schema, Table};
use crate::utterance;

/// Names that usually mark surrogate keys or codes rather than content.
const IDENTIFIER_HINTS: &[&str] = &["id", "isbn", "code"];

/// A family of declared types plus the column names preferred within it.
#[derive(Debug, Clone, Copy)]
pub struct Affinity {
    /// Substrings matched against the upper-cased declared type.
    pub types: &'static [&'static str],
    /// Substrings matched against the lower-cased column name.
    pub names: &'static [&'static str],
}

pub const NUMERIC: Affinity = Affinity {
    types: &["INTEGER", "REAL", "NUMERIC", "FLOAT"],
    names: &["price", "cost", "amount", "quantity", "total"],
};

/// Columns worth sorting alphabetically.
pub const SORTABLE_TEXT: Affinity = Affinity {
    types: &["TEXT", "VARCHAR"],
    names: &["title", "name", "lastname"],
};

/// Columns worth searching.
pub const SEARCHABLE_TEXT: Affinity = Affinity {
    types: &["TEXT", "VARCHAR"],
    names: &["title", "name", "firstname", "lastname", "description", "bio"],
};

pub const TEMPORAL: Affinity = Affinity {
    types: &["DATE", "DATETIME", "INTEGER"],
    names: &["year", "date", "time", "created"],
};

/// Column names that carry a price, looked up by name only.
pub const PRICE_NAMES: &[&str] = &["price", "cost", "amount"];

/// Find a table named by a single lower-case token.
///
/// Exact (case-insensitive) name first, then the token with one trailing
/// `s` removed.
pub fn find_table<'s>(schema: &'s Schema, word: &str) -> Option<&'s Table> {
    if word.is_empty() {
        return None;
    }

    let by_name = |name: &str| {
        schema
            .tables()
            .iter()
            .find(|t| t.name.to_lowercase() == name)
    };

    by_name(word).or_else(|| word.strip_suffix('s').and_then(by_name))
}

/// The first token of `q` that names a table.
pub fn primary_table<'s>(schema: &'s Schema, q: &str) -> Option<&'s Table> {
    utterance::tokens(q).find_map(|word| find_table(schema, word))
}

fn type_matches(column: &Column, types: &[&str]) -> bool {
    let declared = column.col_type.to_uppercase();
    types.iter().any(|t| declared.contains(t))
}

fn name_matches(column: &Column, names: &[&str]) -> bool {
    let name = column.name.to_lowercase();
    names.iter().any(|n| name.contains(n))
}

/// Pick the column that best represents `affinity` in `table`.
///
/// 1. first column matching both a type and a preferred name;
/// 2. else the first type match whose name does not look like an identifier;
/// 3. else the first type match.
pub fn find_column_by_type<'t>(table: &'t Table, affinity: Affinity) -> Option<&'t Column> {
    if let Some(col) = table
        .columns
        .iter()
        .find(|c| type_matches(c, affinity.types) && name_matches(c, affinity.names))
    {
        return Some(col);
    }

    let mut candidates = table
        .columns
        .iter()
        .filter(|c| type_matches(c, affinity.types))
        .peekable();
    let first = *candidates.peek()?;

    Some(
        candidates
            .find(|c| !name_matches(c, IDENTIFIER_HINTS))
            .unwrap_or(first),
    )
}

/// The first column whose lower-cased name contains any of `names`.
pub fn find_column_by_name<'t>(table: &'t Table, names: &[&str]) -> Option<&'t Column> {
    table.columns.iter().find(|c| name_matches(c, names))
}
