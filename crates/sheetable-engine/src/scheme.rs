//! Scheme Mapper.
//!
//! A [`Scheme`] projects physical columns into named fields. Columns that are
//! not part of the scheme are skipped by every lookup, so a scheme may cover
//! only a subset of the sheet.

use crate::column::{column_index, column_letters, DEFAULT_LAST_COLUMN};
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemeError {
    #[error("Invalid column '{column}' for field '{field}'")]
    InvalidColumn { column: String, field: String },
}

/// Column letter -> field name mapping plus its inverse.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scheme {
    /// Field names keyed by zero-based column offset, in column order.
    by_column: BTreeMap<usize, String>,
    /// Inverted scheme: field name -> column offset. Last write wins.
    by_field: HashMap<String, usize>,
}

impl Scheme {
    /// Build a scheme from `(column letter, field name)` pairs.
    ///
    /// Pairs are applied in order: a repeated column replaces the earlier
    /// field, a repeated field points at the later column.
    pub fn new<I, C, F>(pairs: I) -> Result<Scheme, SchemeError>
    where
        I: IntoIterator<Item = (C, F)>,
        C: AsRef<str>,
        F: Into<String>,
    {
        let mut scheme = Scheme::default();
        for (column, field) in pairs {
            let field = field.into();
            let col = column_index(column.as_ref()).ok_or_else(|| SchemeError::InvalidColumn {
                column: column.as_ref().to_string(),
                field: field.clone(),
            })?;
            if let Some(previous) = scheme.by_column.insert(col, field.clone()) {
                if scheme.by_field.get(&previous) == Some(&col) {
                    scheme.by_field.remove(&previous);
                }
            }
            scheme.by_field.insert(field, col);
        }
        Ok(scheme)
    }

    /// Zero-based offset of a column letter, mapped or not.
    pub fn to_column_index(&self, letter: &str) -> Option<usize> {
        column_index(letter)
    }

    /// Field projected from a column letter.
    pub fn to_field(&self, letter: &str) -> Option<&str> {
        self.field_at(column_index(letter)?)
    }

    /// Column letter a field is stored in.
    pub fn to_letter(&self, field: &str) -> Option<String> {
        self.column_of(field).map(column_letters)
    }

    pub fn field_at(&self, col: usize) -> Option<&str> {
        self.by_column.get(&col).map(String::as_str)
    }

    pub fn column_of(&self, field: &str) -> Option<usize> {
        self.by_field.get(field).copied()
    }

    /// Highest mapped column offset.
    pub fn last_column(&self) -> Option<usize> {
        self.by_column.keys().next_back().copied()
    }

    /// Last column a whole-table range has to cover: `Z`, or further when the
    /// scheme maps columns past it.
    pub fn range_end_column(&self) -> usize {
        self.last_column()
            .map_or(DEFAULT_LAST_COLUMN, |last| last.max(DEFAULT_LAST_COLUMN))
    }

    /// `(column offset, field)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (usize, &str)> {
        self.by_column.iter().map(|(col, field)| (*col, field.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_column.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_column.is_empty()
    }
}

impl<'de> Deserialize<'de> for Scheme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        Scheme::new(raw).map_err(serde::de::Error::custom)
    }
}
