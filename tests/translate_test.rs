use asksql::prelude::*;
use pretty_assertions::assert_eq;

fn library() -> Schema {
    Schema::new()
        .table(
            Table::new("Book")
                .column(Column::new("id", "INTEGER").primary_key())
                .column(Column::new("isbn", "VARCHAR(13)"))
                .column(Column::new("title", "VARCHAR(255)"))
                .column(Column::new("published_year", "INTEGER"))
                .column(Column::new("price", "REAL"))
                .column(Column::new("author_id", "INTEGER"))
                .foreign_key(ForeignKey::new("author_id", "Author", "id")),
        )
        .table(
            Table::new("Author")
                .column(Column::new("id", "INTEGER").primary_key())
                .column(Column::new("name", "TEXT"))
                .column(Column::new("bio", "TEXT")),
        )
        .table(
            Table::new("Orders")
                .column(Column::new("order_id", "INTEGER").primary_key())
                .column(Column::new("created_at", "DATETIME"))
                .column(Column::new("total_amount", "NUMERIC")),
        )
}

fn translator() -> Translator {
    Translator::with_schema(library())
}

#[test]
fn test_every_answer_is_one_terminated_statement() {
    let translator = translator();
    let utterances = [
        "",
        "   ",
        "help",
        "what can you do",
        "books under 20",
        "find",
        "find rowling in author",
        "show",
        "select",
        "count",
        "oldest",
        "newest orders",
        "expensive",
        "z-a",
        "limit 99999999999999999999999",
        "sort by",
        "ünïcödé ßtraße",
        "'; drop table book; --",
    ];

    for u in utterances {
        let sql = translator.translate(u);
        assert!(!sql.is_empty(), "empty output for {:?}", u);
        assert!(sql.ends_with(';'), "unterminated output for {:?}: {}", u, sql);
    }
}

#[test]
fn test_empty_schema_never_panics() {
    let translator = Translator::new();
    for u in ["find x", "books under 3", "count", "most expensive", "newest", "show all"] {
        assert!(translator.translate(u).ends_with(';'));
    }
}

#[test]
fn test_plural_and_singular_tables() {
    let schema = library();
    assert_eq!(
        asksql::resolver::primary_table(&schema, "books").map(|t| t.name.as_str()),
        Some("Book")
    );
    assert_eq!(
        asksql::resolver::primary_table(&schema, "book").map(|t| t.name.as_str()),
        Some("Book")
    );
    assert_eq!(
        asksql::resolver::primary_table(&schema, "authors").map(|t| t.name.as_str()),
        Some("Author")
    );
    // "Orders" is matched exactly, not as a plural of "Order".
    assert_eq!(
        asksql::resolver::primary_table(&schema, "orders").map(|t| t.name.as_str()),
        Some("Orders")
    );
}

#[test]
fn test_numeric_filter() {
    assert_eq!(
        translator().translate("books under 20"),
        "SELECT * FROM \"Book\" WHERE price < 20 ORDER BY price ASC LIMIT 20;"
    );
    assert_eq!(
        translator().translate("Orders above 100 no limit"),
        "SELECT * FROM \"Orders\" WHERE total_amount > 100 ORDER BY total_amount DESC;"
    );
}

#[test]
fn test_cues_split_on_unicode_whitespace() {
    assert_eq!(
        translator().translate("books under\u{a0}20"),
        "SELECT * FROM \"Book\" WHERE price < 20 ORDER BY price ASC LIMIT 20;"
    );
    assert_eq!(
        translator().translate("books limit\u{a0}5"),
        "SELECT * FROM \"Book\" LIMIT 5;"
    );
}

#[test]
fn test_find_in_explicit_table() {
    assert_eq!(
        translator().translate("find rowling in author"),
        "SELECT * FROM \"Author\" WHERE name LIKE '%rowling%' LIMIT 20;"
    );
}

#[test]
fn test_find_sort_cue_in_term_still_sorts() {
    // The whole utterance feeds the sort clause, including the term.
    assert_eq!(
        translator().translate("find dune a-z"),
        "SELECT * FROM \"Book\" WHERE title LIKE '%dune a-z%' ORDER BY title ASC LIMIT 20;"
    );
}

#[test]
fn test_count_without_table_counts_catalog() {
    assert_eq!(
        translator().translate("how many tables"),
        "SELECT count(*) as TotalTables FROM sqlite_master WHERE type='table';"
    );
}

#[test]
fn test_same_snapshot_same_answer() {
    let mut translator = Translator::new();
    let schema = library();

    translator.set_schema(schema.clone());
    let first = translator.translate("newest orders limit 3");
    translator.set_schema(schema);
    let second = translator.translate("newest orders limit 3");

    assert_eq!(first, second);
    assert_eq!(first, "SELECT * FROM \"Orders\" ORDER BY created_at DESC LIMIT 5;");
}

#[test]
fn test_limit_override() {
    assert_eq!(
        translator().translate("show books limit 5"),
        "SELECT * FROM \"Book\" LIMIT 5;"
    );
}

#[test]
fn test_help_ignores_schema() {
    let expected = Query::Help.to_sql();
    assert_eq!(translator().translate("Help"), expected);
    assert_eq!(translator().translate("  HELP  "), expected);
    assert_eq!(Translator::new().translate("what can you do for books"), expected);
}

#[test]
fn test_rule_priority() {
    let translator = translator();
    // Comparison beats find.
    assert_eq!(
        translator.translate("find books under 10"),
        "SELECT * FROM \"Book\" WHERE price < 10 ORDER BY price ASC LIMIT 20;"
    );
    // Show beats count.
    assert_eq!(
        translator.translate("show book count"),
        "SELECT * FROM \"Book\" LIMIT 20;"
    );
    // Count beats oldest.
    assert_eq!(
        translator.translate("count first books"),
        "SELECT COUNT(*) as Total FROM \"Book\";"
    );
}

#[test]
fn test_oldest_skips_identifier_columns() {
    assert_eq!(
        translator().translate("oldest orders"),
        "SELECT * FROM \"Orders\" ORDER BY created_at ASC LIMIT 1;"
    );
    assert_eq!(
        translator().translate("first book"),
        "SELECT * FROM \"Book\" ORDER BY published_year ASC LIMIT 1;"
    );
}

#[test]
fn test_price_search_without_table() {
    assert_eq!(
        translator().translate("what costs the most"),
        "SELECT * FROM \"Book\" ORDER BY price DESC LIMIT 20;"
    );
}

#[test]
fn test_description_reads_as_descending() {
    // Substring cue: "description" contains "desc".
    assert_eq!(
        translator().translate("authors sort by name description"),
        "SELECT * FROM \"Author\" ORDER BY name DESC LIMIT 20;"
    );
}

#[test]
fn test_free_function() {
    assert_eq!(
        asksql::translate(&library(), "count authors"),
        "SELECT COUNT(*) as Total FROM \"Author\";"
    );
}
