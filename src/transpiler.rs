//! SQL Transpiler for the query AST.
//!
//! Converts translated queries into executable SQLite statements. Table
//! names are double-quoted, column names come from the schema and are
//! emitted bare. Values are interpolated as-is.

use crate::ast::*;

/// Hint returned for `help`.
pub const HELP_TEXT: &str =
    r#"Try asking: "Show all books", "Count authors", "Newest orders", or "Find Rowling in Author""#;

/// Trait for converting AST nodes to SQL.
pub trait ToSql {
    /// Convert this node to a SQL string.
    fn to_sql(&self) -> String;
}

impl ToSql for Query {
    fn to_sql(&self) -> String {
        match self {
            Query::Help => format!("SELECT '{}' as \"Help\";", HELP_TEXT),
            Query::Select(select) => format!("{};", select.to_sql()),
            Query::Count { table } => format!("SELECT COUNT(*) as Total FROM \"{}\";", table),
            Query::CountTables => {
                "SELECT count(*) as TotalTables FROM sqlite_master WHERE type='table';".to_string()
            }
            Query::ListTables => "SELECT name as TableName FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%';".to_string(),
        }
    }
}

impl ToSql for Select {
    /// Without the terminating `;`.
    fn to_sql(&self) -> String {
        let mut sql = format!("SELECT * FROM \"{}\"", self.table);

        if let Some(cond) = &self.filter {
            sql.push_str(" WHERE ");
            sql.push_str(&cond.to_sql());
        }

        if let Some(order) = &self.order {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.to_sql());
        }

        if let Limit::Rows(n) = &self.limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }

        sql
    }
}

impl ToSql for Condition {
    fn to_sql(&self) -> String {
        match self.op {
            Operator::Lt => format!("{} < {}", self.column, self.value),
            Operator::Gt => format!("{} > {}", self.column, self.value),
            Operator::Contains => format!("{} LIKE '%{}%'", self.column, self.value),
        }
    }
}

impl ToSql for OrderBy {
    fn to_sql(&self) -> String {
        format!("{} {}", self.column, self.order)
    }
}
