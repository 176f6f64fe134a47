//! CSV-file grid store.
//!
//! The file is one sheet. It is read once on open, served from memory, and
//! rewritten after every mutating call.

use super::memory::MemoryStore;
use super::{GridStore, SheetId, SheetProperties};
use crate::config::Credentials;
use crate::error::StoreResult;
use async_trait::async_trait;
use log::debug;
use sheetable_engine::{CellAddress, DimensionRange, GridRange};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub struct CsvStore {
    path: PathBuf,
    inner: MemoryStore,
    /// Held across snapshot and write so rewrites land in order.
    write_lock: Mutex<()>,
}

impl CsvStore {
    /// Open `path` as document `table_id`. The sheet is called `sheet`, or
    /// after the file stem. A missing file is an empty sheet.
    pub async fn open(
        path: impl AsRef<Path>,
        table_id: &str,
        sheet: Option<&str>,
    ) -> StoreResult<CsvStore> {
        let path = path.as_ref().to_path_buf();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };

        let rows = parse_csv(&content);
        debug!("opened {} ({} rows)", path.display(), rows.len());

        let title = match sheet {
            Some(sheet) => sheet.to_string(),
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Sheet1".to_string()),
        };
        let inner = MemoryStore::with_sheet_title(table_id, &title).with_rows(rows);

        Ok(CsvStore {
            path,
            inner,
            write_lock: Mutex::new(()),
        })
    }

    /// Require `credentials` in the authorization handshake.
    pub fn with_required_credentials(mut self, credentials: Credentials) -> CsvStore {
        self.inner = self.inner.with_required_credentials(credentials);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let out = render_csv(&self.inner.rows(None)?);
        tokio::fs::write(&self.path, out).await?;
        debug!("wrote {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl GridStore for CsvStore {
    async fn authorize(&self, credentials: &Credentials) -> StoreResult<()> {
        self.inner.authorize(credentials).await
    }

    async fn get_range(&self, table_id: &str, range: &GridRange) -> StoreResult<Vec<Vec<String>>> {
        self.inner.get_range(table_id, range).await
    }

    async fn set_cell(
        &self,
        table_id: &str,
        sheet: Option<&str>,
        cell: CellAddress,
        value: &str,
    ) -> StoreResult<()> {
        self.inner.set_cell(table_id, sheet, cell, value).await?;
        self.persist().await
    }

    async fn batch_delete_rows(
        &self,
        table_id: &str,
        sheet_id: SheetId,
        ranges: &[DimensionRange],
    ) -> StoreResult<()> {
        self.inner
            .batch_delete_rows(table_id, sheet_id, ranges)
            .await?;
        self.persist().await
    }

    async fn append_row(
        &self,
        table_id: &str,
        range: &GridRange,
        values: Vec<String>,
    ) -> StoreResult<()> {
        self.inner.append_row(table_id, range, values).await?;
        self.persist().await
    }

    async fn list_sheets(&self, table_id: &str) -> StoreResult<Vec<SheetProperties>> {
        self.inner.list_sheets(table_id).await
    }
}

/// Parse CSV content into rows. Quoted fields may span line breaks; a
/// blank line is an empty row.
pub(crate) fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut row_started = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' => {
                if field.trim().is_empty() {
                    field.clear();
                }
                in_quotes = true;
                field_was_quoted = true;
                row_started = true;
            }
            ',' => {
                row.push(finish_field(&mut field, field_was_quoted));
                field_was_quoted = false;
                row_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if row_started {
                    row.push(finish_field(&mut field, field_was_quoted));
                }
                rows.push(std::mem::take(&mut row));
                field_was_quoted = false;
                row_started = false;
            }
            _ => {
                field.push(c);
                row_started = true;
            }
        }
    }
    if row_started {
        row.push(finish_field(&mut field, field_was_quoted));
        rows.push(row);
    }
    rows
}

fn finish_field(field: &mut String, quoted: bool) -> String {
    let value = std::mem::take(field);
    if quoted { value } else { value.trim().to_string() }
}

fn render_csv(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        match row.as_slice() {
            // A lone empty cell would read back as a blank row.
            [only] if only.is_empty() => out.push_str("\"\""),
            _ => {
                let fields: Vec<String> = row.iter().map(|f| escape_csv_field(f)).collect();
                out.push_str(&fields.join(","));
            }
        }
        out.push('\n');
    }
    out
}

/// Quote a field when it would not survive a round trip unquoted
fn escape_csv_field(field: &str) -> String {
    if field.contains(',')
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r')
        || field != field.trim()
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
