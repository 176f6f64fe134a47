//! Grid store backends.
//!
//! [`GridStore`] is the only way the table engine touches cells. Every call is
//! scoped to a document (`table_id`); row and cell calls are further scoped to
//! a sheet, where `None` means the document's first sheet.

mod csv;
mod memory;

pub use csv::CsvStore;
pub use memory::{MemoryStore, StoreCall};

use crate::config::Credentials;
use crate::error::StoreResult;
use async_trait::async_trait;
use serde::Serialize;
use sheetable_engine::{CellAddress, DimensionRange, GridRange};
use std::sync::Arc;

/// Backend identifier of a sheet (tab) within a document.
pub type SheetId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SheetProperties {
    pub id: SheetId,
    pub title: String,
}

#[async_trait]
pub trait GridStore: Send + Sync {
    /// Authorization handshake. Called once per table engine.
    async fn authorize(&self, credentials: &Credentials) -> StoreResult<()>;

    /// Rows of `range`, up to the last non-empty one. Short rows are not
    /// padded; blank rows before the last non-empty row come back empty.
    async fn get_range(&self, table_id: &str, range: &GridRange) -> StoreResult<Vec<Vec<String>>>;

    /// Overwrite exactly one cell.
    async fn set_cell(
        &self,
        table_id: &str,
        sheet: Option<&str>,
        cell: CellAddress,
        value: &str,
    ) -> StoreResult<()>;

    /// Remove row ranges from a sheet, applied in the order given. Each
    /// removal shifts the rows below it up.
    async fn batch_delete_rows(
        &self,
        table_id: &str,
        sheet_id: SheetId,
        ranges: &[DimensionRange],
    ) -> StoreResult<()>;

    /// Append one row right after the last occupied row of the sheet that
    /// `range` points at.
    async fn append_row(&self, table_id: &str, range: &GridRange, values: Vec<String>)
    -> StoreResult<()>;

    async fn list_sheets(&self, table_id: &str) -> StoreResult<Vec<SheetProperties>>;
}

#[async_trait]
impl<S: GridStore + ?Sized> GridStore for Arc<S> {
    async fn authorize(&self, credentials: &Credentials) -> StoreResult<()> {
        (**self).authorize(credentials).await
    }

    async fn get_range(&self, table_id: &str, range: &GridRange) -> StoreResult<Vec<Vec<String>>> {
        (**self).get_range(table_id, range).await
    }

    async fn set_cell(
        &self,
        table_id: &str,
        sheet: Option<&str>,
        cell: CellAddress,
        value: &str,
    ) -> StoreResult<()> {
        (**self).set_cell(table_id, sheet, cell, value).await
    }

    async fn batch_delete_rows(
        &self,
        table_id: &str,
        sheet_id: SheetId,
        ranges: &[DimensionRange],
    ) -> StoreResult<()> {
        (**self).batch_delete_rows(table_id, sheet_id, ranges).await
    }

    async fn append_row(
        &self,
        table_id: &str,
        range: &GridRange,
        values: Vec<String>,
    ) -> StoreResult<()> {
        (**self).append_row(table_id, range, values).await
    }

    async fn list_sheets(&self, table_id: &str) -> StoreResult<Vec<SheetProperties>> {
        (**self).list_sheets(table_id).await
    }
}
