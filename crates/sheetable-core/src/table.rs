//! Table engine.
//!
//! A [`Table`] treats one sheet of a grid store as a table of named fields.
//! Reads fetch a row range and decode it through the scheme; updates become
//! point cell writes; deletes become one batch of dimension deletes.
//!
//! Row records carry the physical row they were read from. Every cell address
//! and delete index is derived from those row numbers, so records must not be
//! reused once the sheet has been mutated.

use crate::config::TableConfig;
use crate::error::{Result, SheetableError};
use crate::store::{GridStore, SheetId, SheetProperties};
use futures_util::future::try_join_all;
use log::{debug, info, warn};
use sheetable_engine::{
    CellAddress, DimensionRange, Filter, GridRange, Record, RowCodec, RowRecord, Scheme,
};
use tokio::sync::OnceCell;

/// Options for [`Table::read`].
#[derive(Clone, Debug, Default)]
pub struct ReadOptions {
    pub filter: Option<Filter>,
    /// Number of rows to fetch; defaults to [`Table::count`].
    pub limit: Option<usize>,
    /// Rows to skip from the top of the sheet.
    pub offset: Option<usize>,
}

impl ReadOptions {
    pub fn filter(mut self, filter: Filter) -> ReadOptions {
        self.filter = Some(filter);
        self
    }

    pub fn limit(mut self, limit: usize) -> ReadOptions {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> ReadOptions {
        self.offset = Some(offset);
        self
    }
}

pub struct Table<S> {
    store: S,
    scheme: Scheme,
    config: TableConfig,
    /// Outcome of the authorization handshake, set exactly once.
    ready: OnceCell<std::result::Result<(), String>>,
}

impl<S: GridStore> Table<S> {
    pub fn new(store: S, scheme: Scheme, config: TableConfig) -> Table<S> {
        Table {
            store,
            scheme,
            config,
            ready: OnceCell::new(),
        }
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// True once the handshake has succeeded.
    pub fn is_ready(&self) -> bool {
        matches!(self.ready.get(), Some(Ok(())))
    }

    /// Run the authorization handshake.
    ///
    /// Concurrent callers share a single attempt. A rejection is final: every
    /// later call on this table fails with the same `AuthenticationFailure`.
    pub async fn init(&self) -> Result<()> {
        let outcome = self
            .ready
            .get_or_init(|| async {
                match self.store.authorize(&self.config.credentials).await {
                    Ok(()) => {
                        info!("table {}: authorized", self.config.table_id);
                        Ok(())
                    }
                    Err(err) => {
                        warn!("table {}: authorization rejected: {}", self.config.table_id, err);
                        Err(err.to_string())
                    }
                }
            })
            .await;
        outcome
            .clone()
            .map_err(SheetableError::AuthenticationFailure)
    }

    fn sheet(&self) -> Option<&str> {
        self.config.sheet.as_deref()
    }

    fn table_id(&self) -> &str {
        &self.config.table_id
    }

    /// Number of rows in the table's full column range, up to the last
    /// non-empty one.
    pub async fn count(&self) -> Result<usize> {
        self.init().await?;
        let range = GridRange::open(self.sheet(), 1, self.scheme.range_end_column());
        let rows = self.store.get_range(self.table_id(), &range).await?;
        debug!("count {}: {}", range, rows.len());
        Ok(rows.len())
    }

    /// Fetch rows `offset+1 ..= offset+limit`, decode them, and apply the
    /// filter.
    pub async fn read(&self, options: ReadOptions) -> Result<Vec<RowRecord>> {
        self.init().await?;
        let count = match options.limit {
            Some(limit) => limit,
            None => self.count().await?,
        };
        if count == 0 {
            return Ok(Vec::new());
        }

        let offset = options.offset.unwrap_or(0);
        let Some(first_row) = offset.checked_add(1) else {
            debug!("read: offset {} is past the last addressable row", offset);
            return Ok(Vec::new());
        };
        let range = GridRange::rows(
            self.sheet(),
            first_row,
            offset.saturating_add(count),
            self.scheme.range_end_column(),
        );
        let cells = self.store.get_range(self.table_id(), &range).await?;
        debug!("read {}: {} rows", range, cells.len());

        let codec = RowCodec::new(&self.scheme);
        let rows = cells
            .iter()
            .enumerate()
            .map(|(i, row)| codec.decode(row, first_row + i));

        Ok(match &options.filter {
            Some(filter) => rows.filter(|row| filter.matches(row)).collect(),
            None => rows.collect(),
        })
    }

    /// Apply `filter` to rows already in memory.
    pub fn filter_rows(&self, rows: &[RowRecord], filter: &Filter) -> Vec<RowRecord> {
        filter.apply(rows)
    }

    /// Write `data` into every row matching `filter`.
    ///
    /// Returns false without writing when the table has no rows at all; a
    /// filter that matches nothing still returns true.
    pub async fn update(&self, filter: &Filter, data: &Record) -> Result<bool> {
        let rows = self.read(ReadOptions::default()).await?;
        self.update_rows(&rows, filter, data).await
    }

    /// Like [`update`](Table::update), against rows the caller has just read.
    pub async fn update_rows(
        &self,
        rows: &[RowRecord],
        filter: &Filter,
        data: &Record,
    ) -> Result<bool> {
        self.init().await?;
        if rows.is_empty() {
            return Ok(false);
        }

        let matched: Vec<&RowRecord> = rows.iter().filter(|row| filter.matches(row)).collect();
        let cells = self.cells_for_update(&matched, data);
        debug!(
            "update: {} cells across {} matched rows",
            cells.len(),
            matched.len()
        );

        let sheet = self.sheet();
        let writes = cells
            .iter()
            .map(|(cell, value)| self.store.set_cell(self.table_id(), sheet, *cell, value));
        try_join_all(writes).await?;
        Ok(true)
    }

    fn cells_for_update(&self, rows: &[&RowRecord], data: &Record) -> Vec<(CellAddress, String)> {
        let columns = RowCodec::new(&self.scheme).encode(data);
        rows.iter()
            .flat_map(|row| {
                columns
                    .iter()
                    .map(move |(col, value)| (CellAddress::new(*col, row.row), value.clone()))
            })
            .collect()
    }

    /// Delete every row matching `filter` (all rows when None).
    ///
    /// Returns false when the table has no rows.
    pub async fn delete(&self, filter: Option<&Filter>) -> Result<bool> {
        let rows = self.read(ReadOptions::default()).await?;
        if rows.is_empty() {
            return Ok(false);
        }
        let indexes: Vec<usize> = rows
            .iter()
            .filter(|row| filter.is_none_or(|f| f.matches(row)))
            .map(RowRecord::delete_index)
            .collect();
        self.delete_rows_by_index(&indexes).await?;
        Ok(true)
    }

    /// Delete rows by zero-based index, all computed against the current
    /// layout. Issues a single batch, highest index first. Returns false when
    /// there is nothing to delete.
    pub async fn delete_rows_by_index(&self, indexes: &[usize]) -> Result<bool> {
        self.init().await?;
        let ranges = delete_plan(indexes);
        if ranges.is_empty() {
            return Ok(false);
        }
        let sheet_id = self.sheet_id(None).await?;
        debug!("delete from sheet {}: {:?}", sheet_id, ranges);
        self.store
            .batch_delete_rows(self.table_id(), sheet_id, &ranges)
            .await?;
        Ok(true)
    }

    /// Append `data` after the last occupied row. Fields outside the scheme
    /// are dropped; nothing is written if none remain.
    pub async fn create(&self, data: &Record) -> Result<()> {
        self.init().await?;
        let values = RowCodec::new(&self.scheme).encode_dense(data);
        if values.is_empty() {
            debug!("create: no mapped fields, skipping append");
            return Ok(());
        }
        let range = GridRange::open(self.sheet(), 1, 0);
        self.store
            .append_row(self.table_id(), &range, values)
            .await?;
        Ok(())
    }

    /// Append each record in order.
    pub async fn create_many(&self, records: &[Record]) -> Result<()> {
        for data in records {
            self.create(data).await?;
        }
        Ok(())
    }

    /// Sheets (tabs) of the document.
    pub async fn read_sheets(&self) -> Result<Vec<SheetProperties>> {
        self.init().await?;
        Ok(self.store.list_sheets(self.table_id()).await?)
    }

    /// Resolve a sheet name (default: the configured sheet, else the first
    /// sheet) to its backend id.
    pub async fn sheet_id(&self, name: Option<&str>) -> Result<SheetId> {
        let name = name.or(self.sheet());
        let sheets = self.read_sheets().await?;
        let found = match name {
            Some(name) => sheets.iter().find(|s| s.title == name),
            None => sheets.first(),
        };
        found
            .map(|s| s.id)
            .ok_or_else(|| SheetableError::SheetNotFound(name.unwrap_or("<first>").to_string()))
    }
}

/// One single-row range per distinct index, highest first.
fn delete_plan(indexes: &[usize]) -> Vec<DimensionRange> {
    let mut sorted = indexes.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();
    sorted.into_iter().map(DimensionRange::row).collect()
}
