//! Error types for Sheetable core.

use sheetable_engine::SchemeError;
use thiserror::Error;

/// Failures reported by a [`GridStore`](crate::store::GridStore) backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Errors surfaced by the table engine.
#[derive(Error, Debug)]
pub enum SheetableError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailure(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error(transparent)]
    Scheme(#[from] SchemeError),
}

pub type Result<T> = std::result::Result<T, SheetableError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
