//! Error types for VaultIt.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive creation failed: {0}")]
    ArchiveFailed(String),

    #[error("transport failed: {0}")]
    TransportFailed(String),

    #[error("notification failed: {0}")]
    NotifyFailed(String),

    #[error("invalid retention policy: {0}")]
    InvalidPolicy(String),
}

pub type Result<T> = std::result::Result<T, Error>;
