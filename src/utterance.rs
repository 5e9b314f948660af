//! Utterance normalization and pattern matching using nom.
//!
//! Free text is matched loosely: table names are looked up per
//! whitespace token, every other cue is a substring or a small nom
//! pattern that may start anywhere in the text.
//!
//! ```text
//! show books under 20 sort by title limit 5
//! ─┬── ──┬── ───┬──── ──────┬────── ───┬───
//!  │     │      │           │          └── limit_count
//!  │     │      │           └── sort_by_word
//!  │     │      └── comparison
//!  │     └── token → table
//!  └── starts_with show/list/get/select
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::digit1,
    combinator::value,
    sequence::{preceded, terminated, tuple},
    IResult,
};

use crate::ast::Operator;

/// Lower-case and trim.
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Whitespace-delimited tokens.
pub fn tokens(q: &str) -> impl Iterator<Item = &str> {
    q.split_whitespace()
}

pub fn contains_any(q: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| q.contains(n))
}

pub fn starts_with_any(q: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| q.starts_with(p))
}

/// Run `parser` at every char boundary and return the first success.
fn search<'a, O, F>(input: &'a str, mut parser: F) -> Option<O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    input
        .char_indices()
        .find_map(|(i, _)| parser(&input[i..]).ok().map(|(_, out)| out))
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// One or more whitespace chars, Unicode spaces included, matching the
/// separators [`tokens`] splits on.
fn space1(input: &str) -> IResult<&str, &str> {
    take_while1(char::is_whitespace)(input)
}

/// `limit <digits>`
fn limit_clause(input: &str) -> IResult<&str, &str> {
    preceded(terminated(tag("limit"), space1), digit1)(input)
}

/// `sort by <word>`
fn sort_by_clause(input: &str) -> IResult<&str, &str> {
    preceded(terminated(tag("sort by"), space1), take_while1(is_word_char))(input)
}

/// `under 20`, `more than 5`, ...
fn comparison_clause(input: &str) -> IResult<&str, (Operator, &str)> {
    let (input, (op, _, n)) = tuple((
        alt((
            value(Operator::Lt, tag("under")),
            value(Operator::Lt, tag("less than")),
            value(Operator::Lt, tag("below")),
            value(Operator::Gt, tag("over")),
            value(Operator::Gt, tag("more than")),
            value(Operator::Gt, tag("above")),
            value(Operator::Lt, tag("cheaper than")),
        )),
        space1,
        digit1,
    ))(input)?;

    Ok((input, (op, n)))
}

/// Digits following the first `limit`.
pub fn limit_count(q: &str) -> Option<&str> {
    search(q, limit_clause)
}

/// Word following the first `sort by`.
pub fn sort_by_word(q: &str) -> Option<&str> {
    search(q, sort_by_clause)
}

/// First numeric comparison cue and its number, digits as written.
pub fn comparison(q: &str) -> Option<(Operator, &str)> {
    search(q, comparison_clause)
}

/// Remove every whole-word occurrence of `word`.
///
/// Word boundaries follow `[A-Za-z0-9_]`; the surrounding whitespace is
/// left alone.
pub fn remove_word(text: &str, word: &str) -> String {
    if word.is_empty() {
        return text.to_string();
    }

    let first_is_word = word.starts_with(is_word_char);
    let last_is_word = word.ends_with(is_word_char);

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut prev: Option<char> = None;

    while let Some(pos) = rest.find(word) {
        let before = rest[..pos].chars().next_back().or(prev);
        let after = rest[pos + word.len()..].chars().next();

        // A boundary sits between a word char and a non-word char.
        let bounded_left = before.is_some_and(is_word_char) != first_is_word;
        let bounded_right = after.is_some_and(is_word_char) != last_is_word;

        if bounded_left && bounded_right {
            out.push_str(&rest[..pos]);
            prev = word.chars().next_back();
            rest = &rest[pos + word.len()..];
        } else {
            // Step one char past the rejected match start.
            let step = rest[pos..].chars().next().map_or(1, char::len_utf8);
            out.push_str(&rest[..pos + step]);
            prev = rest[pos..].chars().next();
            rest = &rest[pos + step..];
        }
    }

    out.push_str(rest);
    out
}
