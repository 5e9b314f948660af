//! Free-text to SQL translation.
//!
//! A [`Translator`] owns one schema snapshot and turns utterances into a
//! single read-only statement by walking a fixed cascade of rules. The
//! first rule that produces a query wins; a rule that cannot resolve the
//! table or column it needs falls through to the next one. The last rule
//! always applies, so translation never fails.
//!
//! | # | Rule        | Cue                                         |
//! |---|-------------|---------------------------------------------|
//! | 1 | help        | `help`, `what can you do`                   |
//! | 2 | comparison  | `under 20`, `more than 5`, ...              |
//! | 3 | find        | `find`                                      |
//! | 4 | show        | starts with `show`, `list`, `get`, `select` |
//! | 5 | count       | `count`, `how many`                         |
//! | 6 | oldest      | `oldest`, `first`                           |
//! | 7 | newest      | `newest`, `latest`, `recent`                |
//! | 8 | priciest    | `expensive`, `cost`, `price`                |
//! | 9 | table       | any table named                             |
//! | 10| catalog     | anything else                               |

use std::sync::Arc;

use crate::ast::*;
use crate::clause::{limit_clause, sort_clause};
use crate::resolver::{self, NUMERIC, PRICE_NAMES, SEARCHABLE_TEXT, TEMPORAL};
use crate::schema::{Schema, Table};
use crate::transpiler::ToSql;
use crate::utterance::{self, contains_any, starts_with_any};

/// Tables tried, in order, when `find` names none.
const FIND_FALLBACK_TABLES: &[&str] = &["Book", "Author"];

/// Rows returned by the `newest` rule.
const NEWEST_ROWS: u64 = 5;

/// Translates utterances against the current schema snapshot.
///
/// Replacing the snapshot swaps an `Arc`, so a snapshot obtained from
/// [`Translator::snapshot`] is never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    schema: Arc<Schema>,
}

/// Per-call state shared by the rules.
struct Utterance<'s> {
    schema: &'s Schema,
    /// Lower-cased, trimmed text.
    q: String,
    /// First table named by a token.
    table: Option<&'s Table>,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            schema: schema.into(),
        }
    }

    /// Replace the held schema. Nothing from the previous snapshot survives.
    pub fn set_schema(&mut self, schema: impl Into<Arc<Schema>>) {
        self.schema = schema.into();
        tracing::debug!("Schema replaced: {} table(s)", self.schema.len());
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Shared handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Translate an utterance into a SQL statement ending in `;`.
    pub fn translate(&self, utterance: &str) -> String {
        self.plan(utterance).to_sql()
    }

    /// Translate an utterance into the query AST.
    pub fn plan(&self, utterance: &str) -> Query {
        let q = utterance::normalize(utterance);
        let table = resolver::primary_table(&self.schema, &q);
        tracing::trace!(
            utterance = %q,
            table = table.map(|t| t.name.as_str()),
            "Translating"
        );

        let ctx = Utterance {
            schema: &self.schema,
            q,
            table,
        };

        let query = help(&ctx)
            .or_else(|| comparison(&ctx))
            .or_else(|| find(&ctx))
            .or_else(|| show(&ctx))
            .or_else(|| count(&ctx))
            .or_else(|| oldest(&ctx))
            .or_else(|| newest(&ctx))
            .or_else(|| priciest(&ctx))
            .or_else(|| whole_table(&ctx))
            .unwrap_or(Query::ListTables);

        tracing::trace!(?query, "Planned");
        query
    }
}

fn help(u: &Utterance<'_>) -> Option<Query> {
    (u.q == "help" || u.q.contains("what can you do")).then_some(Query::Help)
}

/// `<table> under|over N` against the table's numeric column.
fn comparison(u: &Utterance<'_>) -> Option<Query> {
    let (op, n) = utterance::comparison(&u.q)?;
    let table = u.table?;
    let column = resolver::find_column_by_type(table, NUMERIC)?;

    let order = sort_clause(&u.q, table)
        .unwrap_or_else(|| OrderBy::new(column.name.clone(), op.natural_order()));

    Some(Query::Select(Select {
        table: table.name.clone(),
        filter: Some(Condition {
            column: column.name.clone(),
            op,
            value: n.to_string(),
        }),
        order: Some(order),
        limit: limit_clause(&u.q),
    }))
}

/// `find <term> [in <table>]` as a substring match on a text column.
fn find(u: &Utterance<'_>) -> Option<Query> {
    if !u.q.contains("find") {
        return None;
    }

    let (table, term) = match u.table {
        Some(table) => {
            let lowered = table.name.to_lowercase();
            let mut term = u.q.clone();
            for word in ["find", "in", lowered.as_str()] {
                term = utterance::remove_word(&term, word);
            }
            (table, term)
        }
        None => {
            let table = FIND_FALLBACK_TABLES
                .iter()
                .find_map(|name| u.schema.get(name))
                .or_else(|| u.schema.tables().first())?;
            (table, u.q.replace("find", ""))
        }
    };

    let term = term.trim();
    let column = resolver::find_column_by_type(table, SEARCHABLE_TEXT)?;
    if term.is_empty() {
        return None;
    }

    Some(Query::Select(Select {
        table: table.name.clone(),
        filter: Some(Condition {
            column: column.name.clone(),
            op: Operator::Contains,
            value: term.to_string(),
        }),
        order: sort_clause(&u.q, table),
        limit: limit_clause(&u.q),
    }))
}

fn show(u: &Utterance<'_>) -> Option<Query> {
    if !starts_with_any(&u.q, &["show", "list", "get", "select"]) {
        return None;
    }
    whole_table(u)
}

fn count(u: &Utterance<'_>) -> Option<Query> {
    if !contains_any(&u.q, &["count", "how many"]) {
        return None;
    }
    Some(match u.table {
        Some(table) => Query::Count {
            table: table.name.clone(),
        },
        None => Query::CountTables,
    })
}

fn oldest(u: &Utterance<'_>) -> Option<Query> {
    if !contains_any(&u.q, &["oldest", "first"]) {
        return None;
    }
    by_date(u, SortOrder::Asc, 1)
}

fn newest(u: &Utterance<'_>) -> Option<Query> {
    if !contains_any(&u.q, &["newest", "latest", "recent"]) {
        return None;
    }
    by_date(u, SortOrder::Desc, NEWEST_ROWS)
}

fn by_date(u: &Utterance<'_>, order: SortOrder, rows: u64) -> Option<Query> {
    let table = u.table?;
    let column = resolver::find_column_by_type(table, TEMPORAL)?;

    Some(Query::Select(Select {
        table: table.name.clone(),
        filter: None,
        order: Some(OrderBy::new(column.name.clone(), order)),
        limit: Limit::rows(rows),
    }))
}

/// Most expensive rows of the named table, or of the first table with a
/// price-like column.
fn priciest(u: &Utterance<'_>) -> Option<Query> {
    if !contains_any(&u.q, &["expensive", "cost", "price"]) {
        return None;
    }

    let candidates = match u.table {
        Some(table) => std::slice::from_ref(table),
        None => u.schema.tables(),
    };

    candidates.iter().find_map(|table| {
        let column = resolver::find_column_by_name(table, PRICE_NAMES)?;
        Some(Query::Select(Select {
            table: table.name.clone(),
            filter: None,
            order: Some(OrderBy::new(column.name.clone(), SortOrder::Desc)),
            limit: limit_clause(&u.q),
        }))
    })
}

fn whole_table(u: &Utterance<'_>) -> Option<Query> {
    let table = u.table?;
    Some(Query::Select(Select {
        table: table.name.clone(),
        filter: None,
        order: sort_clause(&u.q, table),
        limit: limit_clause(&u.q),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use pretty_assertions::assert_eq;

    fn library() -> Schema {
        Schema::new()
            .table(
                Table::new("Book")
                    .column(Column::new("id", "INTEGER").primary_key())
                    .column(Column::new("title", "TEXT"))
                    .column(Column::new("year", "INTEGER"))
                    .column(Column::new("price", "REAL")),
            )
            .table(
                Table::new("Author")
                    .column(Column::new("id", "INTEGER").primary_key())
                    .column(Column::new("name", "TEXT"))
                    .column(Column::new("bio", "TEXT")),
            )
    }

    fn translate(q: &str) -> String {
        Translator::with_schema(library()).translate(q)
    }

    #[test]
    fn test_help() {
        assert_eq!(Translator::new().plan("Help"), Query::Help);
        assert_eq!(Translator::new().plan("so what can you do?"), Query::Help);
        assert_ne!(Translator::new().plan("help me"), Query::Help);
    }

    #[test]
    fn test_comparison_under() {
        assert_eq!(
            translate("books under 20"),
            "SELECT * FROM \"Book\" WHERE price < 20 ORDER BY price ASC LIMIT 20;"
        );
    }

    #[test]
    fn test_comparison_over_sorts_descending() {
        assert_eq!(
            translate("books more than 15"),
            "SELECT * FROM \"Book\" WHERE price > 15 ORDER BY price DESC LIMIT 20;"
        );
    }

    #[test]
    fn test_comparison_with_explicit_sort() {
        assert_eq!(
            translate("books over 10 sort by title limit 3"),
            "SELECT * FROM \"Book\" WHERE price > 10 ORDER BY title ASC LIMIT 3;"
        );
    }

    #[test]
    fn test_comparison_needs_a_table() {
        // No table named: falls through to the catalog listing.
        assert_eq!(translate("under 20"), Query::ListTables.to_sql());
    }

    #[test]
    fn test_comparison_without_numeric_column_falls_through() {
        let schema = Schema::new().table(Table::new("Tag").column(Column::new("label", "TEXT")));
        let sql = Translator::with_schema(schema).translate("tags under 5");
        assert_eq!(sql, "SELECT * FROM \"Tag\" LIMIT 20;");
    }

    #[test]
    fn test_find_in_table() {
        assert_eq!(
            translate("find rowling in author"),
            "SELECT * FROM \"Author\" WHERE name LIKE '%rowling%' LIMIT 20;"
        );
    }

    #[test]
    fn test_find_infers_table() {
        assert_eq!(
            translate("Find Dune"),
            "SELECT * FROM \"Book\" WHERE title LIKE '%dune%' LIMIT 20;"
        );
    }

    #[test]
    fn test_find_falls_back_to_first_table() {
        let schema = Schema::new()
            .table(Table::new("Movie").column(Column::new("title", "TEXT")))
            .table(Table::new("Actor").column(Column::new("name", "TEXT")));
        let sql = Translator::with_schema(schema).translate("find alien");
        assert_eq!(sql, "SELECT * FROM \"Movie\" WHERE title LIKE '%alien%' LIMIT 20;");
    }

    #[test]
    fn test_find_with_empty_term_falls_through() {
        // "find book" leaves nothing to search for; the table rule answers.
        assert_eq!(translate("find book"), "SELECT * FROM \"Book\" LIMIT 20;");
    }

    #[test]
    fn test_find_only_strips_the_exact_table_name() {
        // The plural token resolves the table but is not a whole-word match.
        assert_eq!(
            translate("find books"),
            "SELECT * FROM \"Book\" WHERE title LIKE '%books%' LIMIT 20;"
        );
    }

    #[test]
    fn test_find_keeps_inner_whitespace() {
        assert_eq!(
            translate("find j k  rowling in author"),
            "SELECT * FROM \"Author\" WHERE name LIKE '%j k  rowling%' LIMIT 20;"
        );
    }

    #[test]
    fn test_show() {
        assert_eq!(translate("show books limit 5"), "SELECT * FROM \"Book\" LIMIT 5;");
        assert_eq!(
            translate("list authors z-a no limit"),
            "SELECT * FROM \"Author\" ORDER BY name DESC;"
        );
    }

    #[test]
    fn test_count() {
        assert_eq!(translate("count authors"), "SELECT COUNT(*) as Total FROM \"Author\";");
        assert_eq!(translate("how many tables"), Query::CountTables.to_sql());
    }

    #[test]
    fn test_oldest_and_newest() {
        assert_eq!(
            translate("oldest book"),
            "SELECT * FROM \"Book\" ORDER BY year ASC LIMIT 1;"
        );
        assert_eq!(
            translate("latest books"),
            "SELECT * FROM \"Book\" ORDER BY year DESC LIMIT 5;"
        );
    }

    #[test]
    fn test_show_without_table_falls_through_to_count() {
        assert_eq!(translate("show count"), Query::CountTables.to_sql());
    }

    #[test]
    fn test_dates_need_a_temporal_column() {
        let schema = Schema::new().table(Table::new("Tag").column(Column::new("label", "TEXT")));
        let translator = Translator::with_schema(schema);
        assert_eq!(translator.translate("oldest tags"), "SELECT * FROM \"Tag\" LIMIT 20;");
        assert_eq!(translator.translate("newest tags"), "SELECT * FROM \"Tag\" LIMIT 20;");
    }

    #[test]
    fn test_priciest() {
        assert_eq!(
            translate("most expensive"),
            "SELECT * FROM \"Book\" ORDER BY price DESC LIMIT 20;"
        );
        // A named table without a price column does not borrow another table's.
        assert_eq!(
            translate("author price"),
            "SELECT * FROM \"Author\" LIMIT 20;"
        );
    }

    #[test]
    fn test_table_fallback() {
        assert_eq!(
            translate("authors alphabetical"),
            "SELECT * FROM \"Author\" ORDER BY name ASC LIMIT 20;"
        );
    }

    #[test]
    fn test_catalog_fallback() {
        assert_eq!(translate("hello there"), Query::ListTables.to_sql());
        assert_eq!(Translator::new().translate(""), Query::ListTables.to_sql());
    }

    #[test]
    fn test_set_schema_replaces() {
        let mut translator = Translator::with_schema(library());
        translator.set_schema(Schema::new().table(Table::new("Order")));
        assert!(translator.schema().get("Book").is_none());
        assert_eq!(translator.translate("books"), Query::ListTables.to_sql());
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let mut translator = Translator::with_schema(library());
        let old = translator.snapshot();
        translator.set_schema(Schema::new());
        assert_eq!(old.len(), 2);
        assert!(translator.schema().is_empty());
    }
}
