//! Logical row records.

use serde::Serialize;
use std::collections::BTreeMap;

/// Field name -> value payload used for writes (`create`, `update`).
pub type Record = BTreeMap<String, String>;

/// Build a [`Record`] from `(field, value)` pairs.
pub fn record<I, K, V>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// A decoded grid row.
///
/// `row` is the 1-based physical row number the record was read from. It is
/// only valid until the sheet is next mutated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RowRecord {
    #[serde(flatten)]
    pub fields: Record,
    #[serde(rename = "__row")]
    pub row: usize,
}

impl RowRecord {
    pub fn new(row: usize) -> RowRecord {
        RowRecord {
            fields: Record::new(),
            row,
        }
    }

    pub fn with_fields(row: usize, fields: Record) -> RowRecord {
        RowRecord { fields, row }
    }

    /// Value of a field; None when the cell was absent, which is distinct
    /// from `Some("")`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Table row index (1-based physical row).
    pub fn table_row_index(&self) -> usize {
        self.row
    }

    /// Zero-based index for dimension deletes.
    pub fn delete_index(&self) -> usize {
        self.row.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_is_not_empty() {
        let mut rec = RowRecord::new(3);
        rec.insert("email", "");
        assert_eq!(rec.get("email"), Some(""));
        assert_eq!(rec.get("username"), None);
        assert!(!rec.contains("username"));
        assert_eq!(rec.delete_index(), 2);
    }

    #[test]
    fn test_serializes_with_row_marker() {
        let rec = RowRecord::with_fields(2, record([("username", "b"), ("email", "")]));
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"email":"","username":"b","__row":2}"#);
    }
}
