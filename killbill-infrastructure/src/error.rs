use killbill_application::StorageError;
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed ledger document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ledger store lock poisoned")]
    Poisoned,
}

impl From<InfrastructureError> for StorageError {
    fn from(err: InfrastructureError) -> Self {
        StorageError::Backend(err.to_string())
    }
}
