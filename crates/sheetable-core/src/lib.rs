//! sheetable-core - table engine over pluggable grid stores.

pub mod config;
pub mod error;
pub mod store;
pub mod table;

pub use config::{Credentials, TableConfig};
pub use error::{Result, SheetableError, StoreError, StoreResult};
pub use store::{CsvStore, GridStore, MemoryStore, SheetId, SheetProperties, StoreCall};
pub use table::{ReadOptions, Table};

pub use sheetable_engine::{
    CellAddress, DimensionRange, Filter, GridRange, Record, RowCodec, RowRecord, Scheme,
    SchemeError, record,
};
