//! Cell addresses and rectangular grid ranges in A1 notation.
//!
//! A [`CellAddress`] is the unit of a single-cell write (`B5`). A
//! [`GridRange`] names a rectangle on an optional sheet and may be open-ended
//! downward (`users!A1:Z`), which is how whole-table reads are expressed.

use crate::column::{column_index, column_letters};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static CELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$").expect("valid cell regex")
});

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:'(?<quoted>(?:[^']|'')+)'|(?<sheet>[A-Za-z0-9_]+))!)?(?<start>[A-Za-z]+[0-9]+):(?<end_col>[A-Za-z]+)(?<end_row>[0-9]+)?$",
    )
    .expect("valid range regex")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid cell reference: {0}")]
    InvalidCell(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),
}

/// A single cell: zero-based column offset and 1-based row number.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellAddress {
    pub col: usize,
    pub row: usize,
}

impl CellAddress {
    pub fn new(col: usize, row: usize) -> CellAddress {
        CellAddress { col, row }
    }

    /// Parse spreadsheet notation (e.g. "A1", "b7", "AA10").
    /// Returns None for malformed input and for row 0.
    pub fn parse(name: &str) -> Option<CellAddress> {
        let caps = CELL_RE.captures(name)?;
        let col = column_index(&caps["letters"])?;
        let row = caps["numbers"].parse::<usize>().ok()?;
        if row == 0 {
            return None;
        }
        Some(CellAddress::new(col, row))
    }

    pub fn column_letters(&self) -> String {
        column_letters(self.col)
    }
}

impl std::str::FromStr for CellAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| AddressError::InvalidCell(s.to_string()))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row)
    }
}

/// A rectangle of cells, optionally scoped to a named sheet.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridRange {
    pub sheet: Option<String>,
    pub start: CellAddress,
    pub end_col: usize,
    /// Inclusive last row; None runs to the end of the sheet.
    pub end_row: Option<usize>,
}

impl GridRange {
    /// Rows `first_row..` across columns `A..=end_col`.
    pub fn open(sheet: Option<&str>, first_row: usize, end_col: usize) -> GridRange {
        GridRange {
            sheet: sheet.map(str::to_string),
            start: CellAddress::new(0, first_row.max(1)),
            end_col,
            end_row: None,
        }
    }

    /// Rows `first_row..=last_row` across columns `A..=end_col`.
    pub fn rows(sheet: Option<&str>, first_row: usize, last_row: usize, end_col: usize) -> GridRange {
        GridRange {
            end_row: Some(last_row),
            ..GridRange::open(sheet, first_row, end_col)
        }
    }

    pub fn contains_col(&self, col: usize) -> bool {
        col >= self.start.col && col <= self.end_col
    }

    pub fn contains_row(&self, row: usize) -> bool {
        row >= self.start.row && self.end_row.is_none_or(|end| row <= end)
    }
}

fn needs_quotes(sheet: &str) -> bool {
    sheet.is_empty() || !sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for GridRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            if needs_quotes(sheet) {
                write!(f, "'{}'!", sheet.replace('\'', "''"))?;
            } else {
                write!(f, "{}!", sheet)?;
            }
        }
        write!(f, "{}:{}", self.start, column_letters(self.end_col))?;
        if let Some(end_row) = self.end_row {
            write!(f, "{}", end_row)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for GridRange {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AddressError::InvalidRange(s.to_string());
        let caps = RANGE_RE.captures(s).ok_or_else(invalid)?;

        let sheet = caps
            .name("quoted")
            .map(|m| m.as_str().replace("''", "'"))
            .or_else(|| caps.name("sheet").map(|m| m.as_str().to_string()));
        let start = CellAddress::parse(&caps["start"]).ok_or_else(invalid)?;
        let end_col = column_index(&caps["end_col"]).ok_or_else(invalid)?;
        let end_row = match caps.name("end_row") {
            Some(m) => Some(m.as_str().parse::<usize>().map_err(|_| invalid())?),
            None => None,
        };

        if end_col < start.col || end_row.is_some_and(|end| end < start.row) {
            return Err(invalid());
        }

        Ok(GridRange {
            sheet,
            start,
            end_col,
            end_row,
        })
    }
}

/// A zero-based, half-open run of rows `[start, end)` for dimension deletes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DimensionRange {
    pub start: usize,
    pub end: usize,
}

impl DimensionRange {
    /// The single row at zero-based index `index`.
    pub fn row(index: usize) -> DimensionRange {
        DimensionRange {
            start: index,
            end: index + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
