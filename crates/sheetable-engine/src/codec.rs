//! Row Codec: physical grid rows <-> logical records.

use crate::column::column_letters;
use crate::record::{Record, RowRecord};
use crate::scheme::Scheme;
use log::trace;

/// Translates rows through a [`Scheme`].
#[derive(Clone, Copy, Debug)]
pub struct RowCodec<'a> {
    scheme: &'a Scheme,
}

impl<'a> RowCodec<'a> {
    pub fn new(scheme: &'a Scheme) -> RowCodec<'a> {
        RowCodec { scheme }
    }

    /// Decode one physical row read from table row `row`.
    ///
    /// Cells in unmapped columns are dropped. Cells past the end of a short
    /// row stay absent rather than becoming empty strings.
    pub fn decode<S: AsRef<str>>(&self, cells: &[S], row: usize) -> RowRecord {
        let mut record = RowRecord::new(row);
        for (col, cell) in cells.iter().enumerate() {
            match self.scheme.field_at(col) {
                Some(field) => record.insert(field, cell.as_ref()),
                None => trace!("row {}: dropping unmapped column {}", row, column_letters(col)),
            }
        }
        record
    }

    /// `(column offset, value)` pairs for every mapped field in `data`,
    /// ordered by column.
    pub fn encode(&self, data: &Record) -> Vec<(usize, String)> {
        let mut cells: Vec<(usize, String)> = data
            .iter()
            .filter_map(|(field, value)| match self.scheme.column_of(field) {
                Some(col) => Some((col, value.clone())),
                None => {
                    trace!("dropping unmapped field '{}'", field);
                    None
                }
            })
            .collect();
        cells.sort_by_key(|(col, _)| *col);
        cells
    }

    /// Contiguous row starting at column A, sized to the highest mapped
    /// offset + 1. Gaps hold empty strings.
    pub fn encode_dense(&self, data: &Record) -> Vec<String> {
        let cells = self.encode(data);
        let width = cells.last().map_or(0, |(col, _)| col + 1);
        let mut row = vec![String::new(); width];
        for (col, value) in cells {
            row[col] = value;
        }
        row
    }
}
