//! Table metadata derived from record types.

use crate::error::OrmResult;
use crate::value::Value;

/// A struct that maps to a database table row.
///
/// Typically derived with `#[derive(Record)]` from the `sqlorm-derive` crate:
///
/// ```ignore
/// use sqlorm::Record;
///
/// #[derive(Record)]
/// #[orm(table = "passport_user")]
/// struct User {
///     #[orm(primary_key)]
///     user_id: i64,
///     #[orm(column = "birth_year")]
///     birth: i64,
///     nickname: String,
/// }
/// ```
///
/// Field order is the struct declaration order and is load-bearing:
/// positional row mapping pairs the Nth result column with the Nth declared
/// field, so `SELECT *` only works when the table's column order matches.
pub trait Record: Sized {
    /// Table name.
    const TABLE: &'static str;

    /// Primary key column name, or `""` when no field is marked as one.
    ///
    /// Callers must handle the empty case: an INSERT against such a record
    /// cannot report a generated key.
    fn primary_field() -> &'static str;

    /// Column names in declaration order, primary key excluded.
    fn fields() -> &'static [&'static str];

    /// Column names in declaration order, primary key included.
    fn all_fields() -> &'static [&'static str];

    /// Build a record from one row of canonical values, positionally.
    ///
    /// `values.len()` must equal `all_fields().len()`; anything else is a
    /// shape error.
    fn from_values(values: Vec<Value>) -> OrmResult<Self>;

    /// All field values in declaration order, primary key included.
    fn to_values(&self) -> Vec<Value>;

    /// Field values in declaration order, primary key excluded.
    ///
    /// This is the tuple an INSERT binds when the key is generated by the
    /// database.
    fn insert_values(&self) -> Vec<Value>;
}

/// Table descriptor: name, primary key, and ordered column lists.
///
/// Derived once per record type; immutable and cheap to clone, so callers
/// may cache it freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Table name
    pub name: &'static str,
    /// Primary key column, empty if none
    pub primary: &'static str,
    /// Columns in declaration order, primary excluded
    pub fields: &'static [&'static str],
    /// Columns in declaration order, primary included
    pub all_fields: &'static [&'static str],
}

impl Table {
    /// Derive the descriptor for a record type.
    pub fn of<T: Record>() -> Self {
        Table {
            name: T::TABLE,
            primary: T::primary_field(),
            fields: T::fields(),
            all_fields: T::all_fields(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrmError;

    #[derive(Debug)]
    struct Region {
        region_id: i64,
        parent_region_id: i64,
        title: String,
    }

    impl Record for Region {
        const TABLE: &'static str = "region";

        fn primary_field() -> &'static str {
            "region_id"
        }

        fn fields() -> &'static [&'static str] {
            &["parent_region_id", "title"]
        }

        fn all_fields() -> &'static [&'static str] {
            &["region_id", "parent_region_id", "title"]
        }

        fn from_values(values: Vec<Value>) -> OrmResult<Self> {
            if values.len() != 3 {
                return Err(OrmError::shape(format!(
                    "column count {} does not match field count 3",
                    values.len()
                )));
            }
            let mut values = values.into_iter();
            Ok(Region {
                region_id: values.next().and_then(|v| v.as_i64()).unwrap_or_default(),
                parent_region_id: values.next().and_then(|v| v.as_i64()).unwrap_or_default(),
                title: values
                    .next()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default(),
            })
        }

        fn to_values(&self) -> Vec<Value> {
            vec![
                Value::Int(self.region_id),
                Value::Int(self.parent_region_id),
                Value::Text(self.title.clone()),
            ]
        }

        fn insert_values(&self) -> Vec<Value> {
            vec![
                Value::Int(self.parent_region_id),
                Value::Text(self.title.clone()),
            ]
        }
    }

    #[test]
    fn descriptor_is_deterministic() {
        let a = Table::of::<Region>();
        let b = Table::of::<Region>();
        assert_eq!(a, b);
        assert_eq!(a.name, "region");
        assert_eq!(a.primary, "region_id");
        assert_eq!(a.fields, &["parent_region_id", "title"]);
        assert_eq!(a.all_fields, &["region_id", "parent_region_id", "title"]);
    }

    #[test]
    fn from_values_rejects_wrong_width() {
        let err = Region::from_values(vec![Value::Int(1)]).unwrap_err();
        assert!(err.is_shape());
    }
}
