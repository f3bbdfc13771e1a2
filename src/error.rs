use crate::domain::error::LedgerError;
use crate::domain::ids::ParseIdError;
use crate::domain::operation::MissingField;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid identifier: {0}")]
    InvalidId(#[from] ParseIdError),
    #[error("Invalid operation: {0}")]
    InvalidOperation(#[from] MissingField),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    #[error("Ledger service has stopped")]
    ServiceStopped,
}

impl Error {
    /// The ledger failure behind this error, if it is one.
    pub fn ledger_error(&self) -> Option<LedgerError> {
        match self {
            Error::Ledger(err) => Some(*err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
