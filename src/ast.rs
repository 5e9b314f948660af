//! Query AST produced by the translator.
//!
//! Deliberately small: every statement the translator can emit is one of
//! these shapes. Rendering lives in [`crate::transpiler`].

use std::fmt;

/// A complete read-only statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Fixed hint text instead of a data query.
    Help,
    /// `SELECT * FROM "table" ...`
    Select(Select),
    /// Row count of one table.
    Count { table: String },
    /// Number of tables in the catalog.
    CountTables,
    /// Names of all user tables.
    ListTables,
}

/// `SELECT *` over a single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub table: String,
    pub filter: Option<Condition>,
    pub order: Option<OrderBy>,
    pub limit: Limit,
}

impl Select {
    pub fn all(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: None,
            order: None,
            limit: Limit::Unbounded,
        }
    }
}

/// A single WHERE condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub op: Operator,
    /// Inserted verbatim (digits for comparisons, the search term for `Contains`).
    pub value: String,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `LIKE '%value%'`
    Contains,
}

impl Operator {
    /// Sort direction used when a comparison has no explicit sort.
    pub fn natural_order(self) -> SortOrder {
        match self {
            Operator::Gt => SortOrder::Desc,
            Operator::Lt | Operator::Contains => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub order: SortOrder,
}

impl OrderBy {
    pub fn new(column: impl Into<String>, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }
}

/// Row limit. The count is kept as the digits the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Limit {
    Unbounded,
    Rows(String),
}

impl Limit {
    pub fn rows(n: u64) -> Self {
        Limit::Rows(n.to_string())
    }
}
