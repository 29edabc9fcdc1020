use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage engine error: {0}")]
    Sled(#[from] sled::Error),

    #[error("record serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("store task panicked or was cancelled: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("store is shutting down")]
    Closed,
}

impl From<sled::transaction::TransactionError<StoreError>> for StoreError {
    fn from(err: sled::transaction::TransactionError<StoreError>) -> Self {
        match err {
            sled::transaction::TransactionError::Abort(e) => e,
            sled::transaction::TransactionError::Storage(e) => StoreError::Sled(e),
        }
    }
}

