//! Clause builders: the optional LIMIT and ORDER BY fragments derived
//! from an utterance.

use crate::ast::{Limit, OrderBy, SortOrder};
use crate::resolver::{self, SORTABLE_TEXT};
use crate::schema::Table;
use crate::utterance::{self, contains_any};

/// Rows returned when the utterance does not say otherwise.
pub const DEFAULT_LIMIT: u64 = 20;

const UNLIMITED: &[&str] = &["no limit", "unlimited"];
const DESCENDING: &[&str] = &["desc", "descending", "reverse"];
const ALPHABETICAL: &[&str] = &["alphabetic", "alphabetical", "a-z"];
const REVERSE_ALPHABETICAL: &str = "z-a";

/// `no limit` / `unlimited` → none, `limit N` → N, otherwise the default.
pub fn limit_clause(q: &str) -> Limit {
    if contains_any(q, UNLIMITED) {
        return Limit::Unbounded;
    }
    match utterance::limit_count(q) {
        Some(n) => Limit::Rows(n.to_string()),
        None => Limit::rows(DEFAULT_LIMIT),
    }
}

/// ORDER BY requested by the utterance for `table`, if any column resolves.
pub fn sort_clause(q: &str, table: &Table) -> Option<OrderBy> {
    let mut order = if contains_any(q, DESCENDING) {
        SortOrder::Desc
    } else {
        SortOrder::Asc
    };

    let mut column = utterance::sort_by_word(q)
        .and_then(|word| resolver::find_column_by_name(table, &[word]));

    if column.is_none() && contains_any(q, ALPHABETICAL) {
        // Ascending stays unless a descending cue was given.
        column = resolver::find_column_by_type(table, SORTABLE_TEXT);
    }

    if column.is_none() && q.contains(REVERSE_ALPHABETICAL) {
        column = resolver::find_column_by_type(table, SORTABLE_TEXT);
        order = SortOrder::Desc;
    }

    column.map(|c| OrderBy::new(c.name.clone(), order))
}
