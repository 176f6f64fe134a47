//! In-process grid store.
//!
//! A [`MemoryStore`] is one document holding any number of sheets. Cells live
//! in a sparse `DashMap` per sheet. Every call is recorded in a journal so
//! callers can see exactly which requests reached the store.

use super::{GridStore, SheetId, SheetProperties};
use crate::config::Credentials;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use sheetable_engine::{CellAddress, DimensionRange, GridRange};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Sparse cell storage for one sheet. Clones share the same cells.
pub type Grid = Arc<DashMap<CellAddress, String>>;

/// One request as it reached the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    Authorize,
    GetRange(String),
    SetCell {
        sheet: Option<String>,
        cell: String,
        value: String,
    },
    BatchDeleteRows {
        sheet_id: SheetId,
        ranges: Vec<DimensionRange>,
    },
    AppendRow {
        range: String,
        values: Vec<String>,
    },
    ListSheets,
}

struct MemorySheet {
    props: SheetProperties,
    grid: Grid,
}

impl MemorySheet {
    fn new(id: SheetId, title: &str) -> MemorySheet {
        MemorySheet {
            props: SheetProperties {
                id,
                title: title.to_string(),
            },
            grid: Arc::new(DashMap::new()),
        }
    }

    fn fill<R, C>(&self, rows: R)
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        for (r, cells) in rows.into_iter().enumerate() {
            for (c, value) in cells.into_iter().enumerate() {
                self.grid.insert(CellAddress::new(c, r + 1), value.into());
            }
        }
    }

    /// Last row holding any cell, 0 when the sheet is empty.
    fn last_row(&self) -> usize {
        self.grid.iter().map(|e| e.key().row).max().unwrap_or(0)
    }

    fn row_cells(&self, row: usize, first_col: usize, last_col: usize) -> Vec<String> {
        let last = (first_col..=last_col)
            .rev()
            .find(|col| self.grid.contains_key(&CellAddress::new(*col, row)));
        match last {
            Some(last) => (first_col..=last)
                .map(|col| {
                    self.grid
                        .get(&CellAddress::new(col, row))
                        .map(|v| v.value().clone())
                        .unwrap_or_default()
                })
                .collect(),
            None => Vec::new(),
        }
    }

    fn rows_in(&self, range: &GridRange) -> Vec<Vec<String>> {
        let last = self
            .grid
            .iter()
            .map(|e| *e.key())
            .filter(|addr| range.contains_col(addr.col) && range.contains_row(addr.row))
            .map(|addr| addr.row)
            .max();
        match last {
            Some(last) => (range.start.row..=last)
                .map(|row| self.row_cells(row, range.start.col, range.end_col))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Remove the zero-based half-open row range and shift rows below it up.
    fn delete_rows(&self, range: DimensionRange) {
        let removed = range.len();
        if removed == 0 {
            return;
        }
        // 1-based, inclusive.
        let first = range.start + 1;
        let last = range.end;

        self.grid.retain(|addr, _| addr.row < first || addr.row > last);

        let cells_to_move: Vec<(CellAddress, String)> = self
            .grid
            .iter()
            .filter(|e| e.key().row > last)
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        for (addr, _) in &cells_to_move {
            self.grid.remove(addr);
        }
        for (addr, value) in cells_to_move {
            self.grid
                .insert(CellAddress::new(addr.col, addr.row - removed), value);
        }
    }

    fn snapshot(&self) -> Vec<Vec<String>> {
        let last_col = self.grid.iter().map(|e| e.key().col).max().unwrap_or(0);
        (1..=self.last_row())
            .map(|row| self.row_cells(row, 0, last_col))
            .collect()
    }
}

/// A single in-memory document.
pub struct MemoryStore {
    id: String,
    sheets: RwLock<Vec<MemorySheet>>,
    required: Option<Credentials>,
    journal: Mutex<Vec<StoreCall>>,
}

impl MemoryStore {
    /// Document `id` with one empty sheet, `Sheet1` (id 0).
    pub fn new(id: impl Into<String>) -> MemoryStore {
        MemoryStore::with_sheet_title(id, "Sheet1")
    }

    /// Document `id` whose first sheet (id 0) is called `title`.
    pub fn with_sheet_title(id: impl Into<String>, title: &str) -> MemoryStore {
        MemoryStore {
            id: id.into(),
            sheets: RwLock::new(vec![MemorySheet::new(0, title)]),
            required: None,
            journal: Mutex::new(Vec::new()),
        }
    }

    /// Seed the first sheet, row by row from row 1.
    pub fn with_rows<R, C>(self, rows: R) -> MemoryStore
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        if let Some(first) = self.read_sheets().first() {
            first.fill(rows);
        }
        self
    }

    /// Reject any handshake that does not present `credentials`.
    pub fn with_required_credentials(mut self, credentials: Credentials) -> MemoryStore {
        self.required = Some(credentials);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Add a sheet seeded with `rows`, returning its id.
    pub fn add_sheet<R, C>(&self, title: &str, rows: R) -> SheetId
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut sheets = self.write_sheets();
        let id = sheets.iter().map(|s| s.props.id).max().map_or(0, |max| max + 1);
        let sheet = MemorySheet::new(id, title);
        sheet.fill(rows);
        sheets.push(sheet);
        id
    }

    /// Full contents of a sheet (`None` = first), one vector per row.
    pub fn rows(&self, sheet: Option<&str>) -> StoreResult<Vec<Vec<String>>> {
        let sheets = self.read_sheets();
        Ok(find_sheet(&sheets, sheet)?.snapshot())
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.journal().clone()
    }

    pub fn clear_calls(&self) {
        self.journal().clear();
    }

    fn record(&self, call: StoreCall) {
        debug!("memory store {}: {:?}", self.id, call);
        self.journal().push(call);
    }

    fn journal(&self) -> MutexGuard<'_, Vec<StoreCall>> {
        self.journal.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_sheets(&self) -> RwLockReadGuard<'_, Vec<MemorySheet>> {
        self.sheets.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_sheets(&self) -> RwLockWriteGuard<'_, Vec<MemorySheet>> {
        self.sheets.write().unwrap_or_else(|e| e.into_inner())
    }

    fn check_table(&self, table_id: &str) -> StoreResult<()> {
        if table_id == self.id {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("document {}", table_id)))
        }
    }
}

fn find_sheet<'a>(sheets: &'a [MemorySheet], title: Option<&str>) -> StoreResult<&'a MemorySheet> {
    match title {
        Some(title) => sheets.iter().find(|s| s.props.title == title),
        None => sheets.first(),
    }
    .ok_or_else(|| StoreError::NotFound(format!("sheet {}", title.unwrap_or("<first>"))))
}

#[async_trait]
impl GridStore for MemoryStore {
    async fn authorize(&self, credentials: &Credentials) -> StoreResult<()> {
        self.record(StoreCall::Authorize);
        match &self.required {
            Some(required) if required != credentials => {
                Err(StoreError::Rejected("invalid credentials".to_string()))
            }
            _ => Ok(()),
        }
    }

    async fn get_range(&self, table_id: &str, range: &GridRange) -> StoreResult<Vec<Vec<String>>> {
        self.record(StoreCall::GetRange(range.to_string()));
        self.check_table(table_id)?;
        let sheets = self.read_sheets();
        Ok(find_sheet(&sheets, range.sheet.as_deref())?.rows_in(range))
    }

    async fn set_cell(
        &self,
        table_id: &str,
        sheet: Option<&str>,
        cell: CellAddress,
        value: &str,
    ) -> StoreResult<()> {
        self.record(StoreCall::SetCell {
            sheet: sheet.map(str::to_string),
            cell: cell.to_string(),
            value: value.to_string(),
        });
        self.check_table(table_id)?;
        let sheets = self.read_sheets();
        find_sheet(&sheets, sheet)?
            .grid
            .insert(cell, value.to_string());
        Ok(())
    }

    async fn batch_delete_rows(
        &self,
        table_id: &str,
        sheet_id: SheetId,
        ranges: &[DimensionRange],
    ) -> StoreResult<()> {
        self.record(StoreCall::BatchDeleteRows {
            sheet_id,
            ranges: ranges.to_vec(),
        });
        self.check_table(table_id)?;
        if let Some(bad) = ranges.iter().find(|r| r.is_empty()) {
            return Err(StoreError::Rejected(format!(
                "empty delete range [{}, {})",
                bad.start, bad.end
            )));
        }
        // Hold the write lock for the whole batch so it applies as one unit.
        let sheets = self.write_sheets();
        let sheet = sheets
            .iter()
            .find(|s| s.props.id == sheet_id)
            .ok_or_else(|| StoreError::NotFound(format!("sheet id {}", sheet_id)))?;
        for range in ranges {
            sheet.delete_rows(*range);
        }
        Ok(())
    }

    async fn append_row(
        &self,
        table_id: &str,
        range: &GridRange,
        values: Vec<String>,
    ) -> StoreResult<()> {
        self.record(StoreCall::AppendRow {
            range: range.to_string(),
            values: values.clone(),
        });
        self.check_table(table_id)?;
        let sheets = self.write_sheets();
        let sheet = find_sheet(&sheets, range.sheet.as_deref())?;
        let row = sheet.last_row().max(range.start.row.saturating_sub(1)) + 1;
        for (offset, value) in values.into_iter().enumerate() {
            sheet
                .grid
                .insert(CellAddress::new(range.start.col + offset, row), value);
        }
        Ok(())
    }

    async fn list_sheets(&self, table_id: &str) -> StoreResult<Vec<SheetProperties>> {
        self.record(StoreCall::ListSheets);
        self.check_table(table_id)?;
        Ok(self.read_sheets().iter().map(|s| s.props.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_rows() -> MemoryStore {
        MemoryStore::new("doc").with_rows((1..=10).map(|i| vec![format!("r{}", i)]))
    }

    fn column_a(store: &MemoryStore) -> Vec<String> {
        store
            .rows(None)
            .unwrap()
            .into_iter()
            .map(|r| r.into_iter().next().unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn test_get_range_trims_trailing_blank_rows_and_keeps_short_rows() {
        let store = MemoryStore::new("doc").with_rows(vec![vec!["a", "b", "c"], vec!["d"]]);
        let rows = store
            .get_range("doc", &GridRange::open(None, 1, 25))
            .await
            .unwrap();
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["d"]]);

        let rows = store
            .get_range("doc", &GridRange::rows(None, 1, 10, 1))
            .await
            .unwrap();
        assert_eq!(rows, vec![vec!["a", "b"], vec!["d"]]);
    }

    #[tokio::test]
    async fn test_get_range_keeps_interior_blank_rows() {
        let store = MemoryStore::new("doc");
        store.set_cell("doc", None, CellAddress::new(0, 3), "x").await.unwrap();
        let rows = store
            .get_range("doc", &GridRange::open(None, 1, 25))
            .await
            .unwrap();
        assert_eq!(rows, vec![vec![], vec![], vec!["x".to_string()]]);
    }

    #[tokio::test]
    async fn test_get_range_pads_interior_gaps() {
        let store = MemoryStore::new("doc");
        store.set_cell("doc", None, CellAddress::new(2, 1), "c").await.unwrap();
        let rows = store
            .get_range("doc", &GridRange::open(None, 1, 25))
            .await
            .unwrap();
        assert_eq!(rows, vec![vec!["", "", "c"]]);
    }

    #[tokio::test]
    async fn test_batch_delete_descending_matches_sequential() {
        let batch = ten_rows();
        let ranges: Vec<_> = [6, 4, 1].into_iter().map(DimensionRange::row).collect();
        batch.batch_delete_rows("doc", 0, &ranges).await.unwrap();

        let sequential = ten_rows();
        for index in [6, 4, 1] {
            sequential
                .batch_delete_rows("doc", 0, &[DimensionRange::row(index)])
                .await
                .unwrap();
        }

        assert_eq!(column_a(&batch), column_a(&sequential));
        assert_eq!(
            column_a(&batch),
            vec!["r1", "r3", "r4", "r6", "r8", "r9", "r10"]
        );
    }

    #[tokio::test]
    async fn test_batch_delete_rejects_empty_range() {
        let store = ten_rows();
        let err = store
            .batch_delete_rows("doc", 0, &[DimensionRange { start: 2, end: 2 }])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        assert_eq!(column_a(&store).len(), 10);
    }

    #[tokio::test]
    async fn test_append_goes_after_last_occupied_row() {
        let store = MemoryStore::new("doc").with_rows(vec![vec!["1", ""], vec!["", "x"]]);
        store
            .append_row("doc", &GridRange::open(None, 1, 0), vec!["3".into(), "y".into()])
            .await
            .unwrap();
        assert_eq!(
            store.rows(None).unwrap(),
            vec![vec!["1", ""], vec!["", "x"], vec!["3", "y"]]
        );
    }

    #[tokio::test]
    async fn test_sheets_are_scoped_by_title_and_id() {
        let store = MemoryStore::new("doc");
        let id = store.add_sheet("users", vec![vec!["u1"], vec!["u2"]]);
        assert_eq!(id, 1);

        let sheets = store.list_sheets("doc").await.unwrap();
        let titles: Vec<_> = sheets.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Sheet1", "users"]);

        store
            .batch_delete_rows("doc", id, &[DimensionRange::row(0)])
            .await
            .unwrap();
        assert_eq!(store.rows(Some("users")).unwrap(), vec![vec!["u2"]]);
        assert!(store.rows(None).unwrap().is_empty());
        assert!(store.rows(Some("missing")).is_err());
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_found() {
        let store = MemoryStore::new("doc");
        let err = store.list_sheets("other").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_required_credentials() {
        let store = MemoryStore::new("doc")
            .with_required_credentials(Credentials::new("svc", "key"));
        assert!(store.authorize(&Credentials::new("svc", "key")).await.is_ok());
        assert!(store.authorize(&Credentials::new("svc", "nope")).await.is_err());
        assert_eq!(store.calls(), vec![StoreCall::Authorize, StoreCall::Authorize]);
    }
}
