//! sheetable_engine - column mapping, row codec and filters for grid tables.

pub mod address;
pub mod codec;
pub mod column;
pub mod filter;
pub mod record;
pub mod scheme;

pub use address::{AddressError, CellAddress, DimensionRange, GridRange};
pub use codec::RowCodec;
pub use filter::Filter;
pub use record::{Record, RowRecord, record};
pub use scheme::{Scheme, SchemeError};
