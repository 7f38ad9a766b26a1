//! Result materialization.
//!
//! A terminal fetch pairs a row cursor with a destination shape. Supported
//! shapes implement [`ScanRow`]: derived records (positional), [`Item`] maps
//! (column-name keyed), and positional `Vec<Value>` lists. Multi-row fetches
//! append one fresh instance per row; instances are never reused across rows.

use crate::error::{OrmError, OrmResult};
use crate::server::Rows;
use crate::value::Value;
use std::collections::HashMap;

/// An open row: column name to canonical value.
pub type Item = HashMap<String, Value>;

/// A destination shape one result row can be materialized into.
///
/// `check_columns` runs once per fetch, before any row is read, so shape
/// errors surface without touching the destination. `scan_row` builds a fresh
/// instance from one row of canonical values.
pub trait ScanRow: Sized {
    /// Validate the result's column set against this shape.
    fn check_columns(columns: &[String]) -> OrmResult<()> {
        let _ = columns;
        Ok(())
    }

    /// Materialize one row.
    fn scan_row(columns: &[String], values: Vec<Value>) -> OrmResult<Self>;
}

impl ScanRow for Item {
    fn scan_row(columns: &[String], values: Vec<Value>) -> OrmResult<Self> {
        Ok(columns.iter().cloned().zip(values).collect())
    }
}

impl ScanRow for Vec<Value> {
    fn scan_row(_columns: &[String], values: Vec<Value>) -> OrmResult<Self> {
        Ok(values)
    }
}

fn coerce_row(columns: &[String], raw: Vec<crate::value::RawValue>) -> OrmResult<Vec<Value>> {
    if raw.len() != columns.len() {
        return Err(OrmError::shape(format!(
            "row width {} does not match column count {}",
            raw.len(),
            columns.len()
        )));
    }
    Ok(raw.into_iter().map(Value::from_raw).collect())
}

/// Fetch at most one row into `dest`, leaving it untouched on an empty
/// result. Remaining rows are not read.
pub(crate) fn fetch_one<D: ScanRow>(rows: &mut dyn Rows, dest: &mut D) -> OrmResult<()> {
    let columns = rows.columns().to_vec();
    D::check_columns(&columns)?;
    if let Some(raw) = rows.next_row()? {
        let values = coerce_row(&columns, raw)?;
        *dest = D::scan_row(&columns, values)?;
    }
    Ok(())
}

/// Fetch every row, appending one fresh instance per row to `dest`.
///
/// Rows appended before a later failure stay appended.
pub(crate) fn fetch_all<D: ScanRow>(rows: &mut dyn Rows, dest: &mut Vec<D>) -> OrmResult<()> {
    let columns = rows.columns().to_vec();
    D::check_columns(&columns)?;
    while let Some(raw) = rows.next_row()? {
        let values = coerce_row(&columns, raw)?;
        dest.push(D::scan_row(&columns, values)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::RawValue;

    struct FakeRows {
        columns: Vec<String>,
        rows: Vec<Vec<RawValue>>,
        cursor: usize,
    }

    impl FakeRows {
        fn new(columns: &[&str], rows: Vec<Vec<RawValue>>) -> Self {
            FakeRows {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
                cursor: 0,
            }
        }
    }

    impl Rows for FakeRows {
        fn columns(&self) -> &[String] {
            &self.columns
        }

        fn next_row(&mut self) -> OrmResult<Option<Vec<RawValue>>> {
            let row = self.rows.get(self.cursor).cloned();
            self.cursor += 1;
            Ok(row)
        }
    }

    #[test]
    fn fetch_one_into_item() {
        let mut rows = FakeRows::new(
            &["id", "name"],
            vec![
                vec![RawValue::Int(1), RawValue::Text("a".into())],
                vec![RawValue::Int(2), RawValue::Text("b".into())],
            ],
        );
        let mut item = Item::new();
        fetch_one(&mut rows, &mut item).unwrap();
        assert_eq!(item["id"], Value::Int(1));
        assert_eq!(item["name"], Value::Text("a".into()));
        // Second row was not consumed into the destination.
        assert_eq!(item.len(), 2);
    }

    #[test]
    fn fetch_one_empty_result_leaves_dest_untouched() {
        let mut rows = FakeRows::new(&["id"], vec![]);
        let mut item: Item = [("id".to_string(), Value::Int(99))].into_iter().collect();
        fetch_one(&mut rows, &mut item).unwrap();
        assert_eq!(item["id"], Value::Int(99));
    }

    #[test]
    fn fetch_all_appends_distinct_instances() {
        let mut rows = FakeRows::new(
            &["id"],
            vec![vec![RawValue::Int(1)], vec![RawValue::Int(2)]],
        );
        let mut out: Vec<Item> = Vec::new();
        fetch_all(&mut rows, &mut out).unwrap();
        assert_eq!(out.len(), 2);
        out[0].insert("id".into(), Value::Int(100));
        // Mutating one element leaves the others alone.
        assert_eq!(out[1]["id"], Value::Int(2));
    }

    #[test]
    fn fetch_all_positional_lists() {
        let mut rows = FakeRows::new(
            &["a", "b"],
            vec![vec![RawValue::Int(1), RawValue::Bytes(b"x".to_vec())]],
        );
        let mut out: Vec<Vec<Value>> = Vec::new();
        fetch_all(&mut rows, &mut out).unwrap();
        assert_eq!(out, vec![vec![Value::Int(1), Value::Text("x".into())]]);
    }

    struct FailingRows {
        columns: Vec<String>,
        yielded: bool,
    }

    impl Rows for FailingRows {
        fn columns(&self) -> &[String] {
            &self.columns
        }

        fn next_row(&mut self) -> OrmResult<Option<Vec<RawValue>>> {
            if self.yielded {
                return Err(OrmError::execution("connection reset mid-cursor"));
            }
            self.yielded = true;
            Ok(Some(vec![RawValue::Int(1)]))
        }
    }

    #[test]
    fn cursor_failure_propagates_and_keeps_prior_rows() {
        let mut rows = FailingRows {
            columns: vec!["id".to_string()],
            yielded: false,
        };
        let mut out: Vec<Vec<Value>> = Vec::new();
        let err = fetch_all(&mut rows, &mut out).unwrap_err();
        assert!(matches!(err, OrmError::Execution(_)));
        assert_eq!(out, vec![vec![Value::Int(1)]]);
    }

    #[test]
    fn row_width_mismatch_is_shape_error() {
        let mut rows = FakeRows::new(&["a", "b"], vec![vec![RawValue::Int(1)]]);
        let mut out: Vec<Vec<Value>> = Vec::new();
        let err = fetch_all(&mut rows, &mut out).unwrap_err();
        assert!(err.is_shape());
        assert!(out.is_empty());
    }
}
