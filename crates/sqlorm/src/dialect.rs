//! Backend dialect translation.
//!
//! The builder always renders canonical SQL: `$1, $2, ...` placeholders in
//! strict first-use order and double-quoted identifiers. [`translate`]
//! rewrites one statement into a backend's native syntax right before
//! dispatch, reordering the argument list to match.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// A recognized backend SQL variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Native `$n` placeholders and double-quoted identifiers; canonical SQL
    /// passes through untouched.
    Postgres,
    /// Positional `?` placeholders and backtick-quoted identifiers.
    Mysql,
    /// Positional `?` placeholders; double-quoted identifiers are accepted
    /// as-is.
    Sqlite,
}

impl Dialect {
    /// Stable name used for driver registration and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$(\d+)").expect("valid placeholder pattern"))
}

/// Rewrite canonical SQL and its argument list for the target backend.
///
/// For the pass-through dialect this returns the input unchanged. For the
/// positional dialects every `$N` occurrence is replaced by `?` in scan
/// order, and the returned argument list holds the referenced values in that
/// same order. A `$N` referencing a position outside the argument list fails
/// with [`OrmError::PlaceholderOutOfRange`] before anything is dispatched.
pub fn translate(dialect: Dialect, sql: &str, args: &[Value]) -> OrmResult<(String, Vec<Value>)> {
    match dialect {
        Dialect::Postgres => Ok((sql.to_string(), args.to_vec())),
        Dialect::Mysql => {
            let requoted = requote_backticks(sql);
            positional(&requoted, args)
        }
        Dialect::Sqlite => positional(sql, args),
    }
}

/// `"` to `` ` ``.
///
/// Plain textual substitution, matching the canonical surface: the builder
/// never emits double quotes outside identifier positions.
fn requote_backticks(sql: &str) -> String {
    sql.replace('"', "`")
}

/// `$1, $2, ...` to `?, ?, ...`, reordering arguments to scan order.
fn positional(sql: &str, args: &[Value]) -> OrmResult<(String, Vec<Value>)> {
    let re = placeholder_re();
    let mut reordered = Vec::new();
    for caps in re.captures_iter(sql) {
        let index: usize = caps[1]
            .parse()
            .map_err(|_| OrmError::validation(format!("malformed placeholder {}", &caps[0])))?;
        if index == 0 || index > args.len() {
            return Err(OrmError::PlaceholderOutOfRange {
                index,
                available: args.len(),
            });
        }
        reordered.push(args[index - 1].clone());
    }
    Ok((re.replace_all(sql, "?").into_owned(), reordered))
}
