//! Canonical SQL identifier quoting.
//!
//! The builder renders identifiers in the canonical dialect-neutral form:
//! each dot-separated part wrapped in double quotes with embedded quotes
//! escaped as `""`. The dialect translator rewrites the quoting for backends
//! that use a different convention.
//!
//! Two literal tokens are exempt: `*` and `1` pass through unquoted. They are
//! the conventional "no specific column" markers (`SELECT *`, `WHERE 1`,
//! `COUNT(1)`-style fillers) and must stay bare to remain valid SQL.

/// Quote a field or table identifier for canonical SQL.
///
/// Dotted notation quotes each part individually, so `a.title` becomes
/// `"a"."title"` and a trailing `*` stays bare (`"a".*`).
pub fn quote(field: &str) -> String {
    if field == "*" || field == "1" {
        return field.to_string();
    }

    let mut out = String::with_capacity(field.len() + 4);
    for (i, part) in field.split('.').enumerate() {
        if i > 0 {
            out.push('.');
        }
        if part == "*" {
            out.push('*');
            continue;
        }
        out.push('"');
        for ch in part.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
    }
    out
}

/// Quote a list of identifiers and join them with `", "`.
pub fn quote_list(fields: &[&str]) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&quote(field));
    }
    out
}
