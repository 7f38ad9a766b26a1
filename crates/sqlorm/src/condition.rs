//! Condition fragment builders.
//!
//! Every comparison method binds its value(s) on the owning [`Query`] and
//! returns a rendered fragment string, so placeholder numbering is assigned
//! at call time and is global to the statement. Callers mixing conditions
//! across clauses must invoke these in the order the placeholders should
//! appear in the final SQL.
//!
//! Each operator comes in three forms: bare, `AND`-prefixed, and
//! `OR`-prefixed. Composition is purely textual; the `and`/`or`/`not`
//! combinators wrap already-rendered fragments in parentheses and append them
//! to whichever clause was touched last.

use crate::ident;
use crate::query::Query;
use crate::value::ToValue;

impl Query<'_> {
    fn cmp(&mut self, prefix: &str, field: &str, op: &str, value: impl ToValue) -> String {
        self.placeholder += 1;
        self.args.push(value.to_value());
        format!(
            "{prefix}{} {op} ${}",
            ident::quote(field),
            self.placeholder
        )
    }

    /// `"field" = $n`
    pub fn eq(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("", field, "=", value)
    }

    /// `AND "field" = $n`
    pub fn and_eq(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("AND ", field, "=", value)
    }

    /// `OR "field" = $n`
    pub fn or_eq(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("OR ", field, "=", value)
    }

    /// `"field" <> $n`
    pub fn ne(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("", field, "<>", value)
    }

    /// `AND "field" <> $n`
    pub fn and_ne(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("AND ", field, "<>", value)
    }

    /// `OR "field" <> $n`
    pub fn or_ne(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("OR ", field, "<>", value)
    }

    /// `"field" > $n`
    pub fn gt(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("", field, ">", value)
    }

    /// `AND "field" > $n`
    pub fn and_gt(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("AND ", field, ">", value)
    }

    /// `OR "field" > $n`
    pub fn or_gt(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("OR ", field, ">", value)
    }

    /// `"field" >= $n`
    pub fn ge(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("", field, ">=", value)
    }

    /// `AND "field" >= $n`
    pub fn and_ge(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("AND ", field, ">=", value)
    }

    /// `OR "field" >= $n`
    pub fn or_ge(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("OR ", field, ">=", value)
    }

    /// `"field" < $n`
    pub fn lt(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("", field, "<", value)
    }

    /// `AND "field" < $n`
    pub fn and_lt(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("AND ", field, "<", value)
    }

    /// `OR "field" < $n`
    pub fn or_lt(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("OR ", field, "<", value)
    }

    /// `"field" <= $n`
    pub fn le(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("", field, "<=", value)
    }

    /// `AND "field" <= $n`
    pub fn and_le(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("AND ", field, "<=", value)
    }

    /// `OR "field" <= $n`
    pub fn or_le(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("OR ", field, "<=", value)
    }

    /// `"field" LIKE $n`
    pub fn like(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("", field, "LIKE", value)
    }

    /// `AND "field" LIKE $n`
    pub fn and_like(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("AND ", field, "LIKE", value)
    }

    /// `OR "field" LIKE $n`
    pub fn or_like(&mut self, field: &str, value: impl ToValue) -> String {
        self.cmp("OR ", field, "LIKE", value)
    }

    fn in_cmp<T, I>(&mut self, prefix: &str, field: &str, values: I) -> String
    where
        T: ToValue,
        I: IntoIterator<Item = T>,
    {
        let mut placeholders = String::new();
        for value in values {
            if !placeholders.is_empty() {
                placeholders.push_str(", ");
            }
            self.placeholder += 1;
            self.args.push(value.to_value());
            placeholders.push('$');
            placeholders.push_str(&self.placeholder.to_string());
        }
        if placeholders.is_empty() {
            // IN over an empty set matches nothing; `IN ()` is not valid SQL.
            return format!("{prefix}1 = 0");
        }
        format!("{prefix}{} IN ({placeholders})", ident::quote(field))
    }

    /// `"field" IN ($n, $n+1, ...)`, one placeholder per value.
    pub fn in_list<T, I>(&mut self, field: &str, values: I) -> String
    where
        T: ToValue,
        I: IntoIterator<Item = T>,
    {
        self.in_cmp("", field, values)
    }

    /// `AND "field" IN ($n, ...)`
    pub fn and_in<T, I>(&mut self, field: &str, values: I) -> String
    where
        T: ToValue,
        I: IntoIterator<Item = T>,
    {
        self.in_cmp("AND ", field, values)
    }

    /// `OR "field" IN ($n, ...)`
    pub fn or_in<T, I>(&mut self, field: &str, values: I) -> String
    where
        T: ToValue,
        I: IntoIterator<Item = T>,
    {
        self.in_cmp("OR ", field, values)
    }

    fn combine<I>(&mut self, op: &str, fragments: I) -> &mut Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut joined = String::new();
        for fragment in fragments {
            if !joined.is_empty() {
                joined.push(' ');
            }
            joined.push_str(&fragment);
        }
        self.extend_current(&format!(" {op} ({joined})"));
        self
    }

    /// Append ` AND (fragments...)` to the most recently touched clause.
    pub fn and<I>(&mut self, fragments: I) -> &mut Self
    where
        I: IntoIterator<Item = String>,
    {
        self.combine("AND", fragments)
    }

    /// Append ` OR (fragments...)` to the most recently touched clause.
    pub fn or<I>(&mut self, fragments: I) -> &mut Self
    where
        I: IntoIterator<Item = String>,
    {
        self.combine("OR", fragments)
    }

    /// Append ` AND NOT (fragments...)` to the most recently touched clause.
    pub fn not<I>(&mut self, fragments: I) -> &mut Self
    where
        I: IntoIterator<Item = String>,
    {
        self.combine("AND NOT", fragments)
    }
}
