//! Exact-match row filters.
//!
//! A [`Filter`] is a conjunction of `field == expected` terms. The expected
//! value may be absent, which selects rows whose field is absent. An empty
//! string only matches a field that is present and empty.

use crate::record::RowRecord;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    terms: BTreeMap<String, Option<String>>,
}

impl Filter {
    pub fn new() -> Filter {
        Filter::default()
    }

    /// Require `field` to equal `value`.
    pub fn equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Filter {
        self.terms.insert(field.into(), Some(value.into()));
        self
    }

    /// Require `field` to be absent from the row.
    pub fn absent(mut self, field: impl Into<String>) -> Filter {
        self.terms.insert(field.into(), None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.terms
            .iter()
            .map(|(field, value)| (field.as_str(), value.as_deref()))
    }

    pub fn matches(&self, row: &RowRecord) -> bool {
        self.terms()
            .all(|(field, expected)| row.get(field) == expected)
    }

    /// Matching rows, in input order.
    pub fn apply<'a, I>(&self, rows: I) -> Vec<RowRecord>
    where
        I: IntoIterator<Item = &'a RowRecord>,
    {
        rows.into_iter()
            .filter(|row| self.matches(row))
            .cloned()
            .collect()
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for Filter
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, Option<V>)>>(iter: T) -> Self {
        Filter {
            terms: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.map(Into::into)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::record;

    fn rows() -> Vec<RowRecord> {
        vec![
            RowRecord::with_fields(1, record([("username", "a"), ("email", "x@y.com")])),
            RowRecord::with_fields(2, record([("username", "b"), ("email", "")])),
            RowRecord::with_fields(3, record([("username", "c")])),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything_in_order() {
        let rows = rows();
        assert_eq!(Filter::new().apply(&rows), rows);
    }

    #[test]
    fn test_exact_match() {
        let rows = rows();
        let matched = Filter::new().equals("username", "b").apply(&rows);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].row, 2);
    }

    #[test]
    fn test_empty_string_is_not_absent() {
        let rows = rows();
        let empty = Filter::new().equals("email", "").apply(&rows);
        assert_eq!(empty.iter().map(|r| r.row).collect::<Vec<_>>(), vec![2]);

        let absent = Filter::new().absent("email").apply(&rows);
        assert_eq!(absent.iter().map(|r| r.row).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_conjunction() {
        let rows = rows();
        let f = Filter::new().equals("username", "a").equals("email", "nope");
        assert!(f.apply(&rows).is_empty());
        let f = Filter::new().equals("username", "a").equals("email", "x@y.com");
        assert_eq!(f.apply(&rows).len(), 1);
    }

    #[test]
    fn test_unknown_field_behaves_as_absent() {
        let rows = rows();
        assert_eq!(Filter::new().absent("phone").apply(&rows).len(), 3);
        assert!(Filter::new().equals("phone", "1").apply(&rows).is_empty());
    }

    #[test]
    fn test_from_iter() {
        let f: Filter = [("email", None::<&str>), ("username", Some("c"))]
            .into_iter()
            .collect();
        assert_eq!(f, Filter::new().absent("email").equals("username", "c"));
    }
}
