//! Read-only statement check for the direct query path.
//!
//! Free-text translations only ever produce SELECTs; they and anything
//! typed into the direct query box go through [`ensure_read_only`] before
//! they reach the database.

use crate::error::{AskError, AskResult};

const READ_ONLY_KEYWORDS: &[&str] = &["SELECT", "WITH", "PRAGMA", "EXPLAIN", "VALUES"];

/// Skip leading whitespace, `-- line` and `/* block */` comments.
fn skip_trivia(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, after)| after);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, after)| after);
        } else {
            return sql;
        }
    }
}

/// Whether the statement starts with a keyword that cannot write.
///
/// Only the leading keyword is inspected. `WITH ... DELETE` and stacked
/// statements are not detected; pair this with a read-only connection.
pub fn is_read_only(sql: &str) -> bool {
    let sql = skip_trivia(sql);
    let keyword: String = sql
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();

    READ_ONLY_KEYWORDS.contains(&keyword.as_str())
}

/// [`is_read_only`] as a result, refusing anything else.
pub fn ensure_read_only(sql: &str) -> AskResult<()> {
    if is_read_only(sql) {
        Ok(())
    } else {
        tracing::warn!("Refused statement: {}", sql);
        Err(AskError::read_only(sql))
    }
}
