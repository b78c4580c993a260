use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::index::ParameterIndex;

/// Pattern for a named placeholder in a SQL statement text.
///
/// A placeholder is a colon followed by an ASCII letter and any number of
/// ASCII letters or digits. It has to be preceded by one character that is
/// not a colon; that character is part of the match and does not survive the
/// rewrite. Group 1 is the bare parameter name.
pub const VARIABLE_PATTERN: &str = r"[^:]:([a-zA-Z][a-zA-Z0-9]*)";

/// Replacement for a match of [`VARIABLE_PATTERN`].
pub const POSITIONAL_MARKER: &str = " ?";

/// Name → positions, filled while the statement text is scanned.
pub type IndexBuffer = HashMap<String, Vec<usize>>;

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    // constant pattern, covered by the tests below
    Regex::new(VARIABLE_PATTERN).expect("VARIABLE_PATTERN must be a valid regular expression")
});

/// Rewrites named placeholders (`:name`) into positional ones (`?`) for MySQL.
///
/// Every match gets the next 1-based position, and that position is appended
/// to the entry of the parameter name in `index_buffer`. Text that does not
/// match is copied verbatim.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `sql` is empty or blank; the index
/// buffer is left untouched in that case.
///
/// # Examples
///
/// ```
/// use sqlx_named_params::builder::{parse_sql, IndexBuffer};
///
/// let mut buffer = IndexBuffer::new();
/// let sql = parse_sql("SELECT * FROM t WHERE a > :x AND b < :y AND c = :x", &mut buffer)?;
/// assert_eq!(sql, "SELECT * FROM t WHERE a > ? AND b < ? AND c = ?");
/// assert_eq!(buffer["x"], vec![1, 3]);
/// assert_eq!(buffer["y"], vec![2]);
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
pub fn parse_sql(sql: &str, index_buffer: &mut IndexBuffer) -> crate::Result<String> {
    if sql.trim().is_empty() {
        return Err(Error::blank("sql"));
    }

    let mut position = 0;
    let mut tail = 0;
    let mut rewritten = String::with_capacity(sql.len());
    for captures in VARIABLE.captures_iter(sql) {
        let (Some(matched), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        position += 1;
        index_buffer
            .entry(name.as_str().to_owned())
            .or_default()
            .push(position);
        rewritten.push_str(&sql[tail..matched.start()]);
        rewritten.push_str(POSITIONAL_MARKER);
        tail = matched.end();
    }
    rewritten.push_str(&sql[tail..]);
    Ok(rewritten)
}

/// Rewrites `template` and returns the positional SQL together with its
/// finished [`ParameterIndex`].
///
/// # Examples
///
/// ```
/// use sqlx_named_params::builder::build_query;
///
/// let (sql, index) = build_query("SELECT * FROM users WHERE id = :id AND name = :name")?;
/// assert_eq!(sql, "SELECT * FROM users WHERE id = ? AND name = ?");
/// assert_eq!(index.get("id"), Some(&[1][..]));
/// assert_eq!(index.get("name"), Some(&[2][..]));
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
pub fn build_query(template: &str) -> crate::Result<(String, ParameterIndex)> {
    let mut buffer = IndexBuffer::new();
    let sql = parse_sql(template, &mut buffer)?;
    Ok((sql, ParameterIndex::from(buffer)))
}
