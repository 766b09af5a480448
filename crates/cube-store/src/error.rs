//! Error types for dataset stores.

use thiserror::Error;

use cube_common::CubeError;

/// Errors that can occur while writing or opening a store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the store or one of its nodes.
    #[error("failed to open store: {0}")]
    OpenFailed(String),

    /// Failed to read array data.
    #[error("failed to read array data: {0}")]
    ReadFailed(String),

    /// Failed to write metadata or array data.
    #[error("failed to write store: {0}")]
    WriteFailed(String),

    /// Invalid metadata in the store.
    #[error("invalid store metadata: {0}")]
    InvalidMetadata(String),

    /// Array data type with no dataset counterpart.
    #[error("unsupported data type '{0}'")]
    UnsupportedDataType(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The stored arrays do not form a consistent dataset.
    #[error(transparent)]
    Dataset(#[from] CubeError),
}

impl StoreError {
    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::OpenFailed(msg.into())
    }

    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    pub fn write_failed(msg: impl Into<String>) -> Self {
        Self::WriteFailed(msg.into())
    }

    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::WriteFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidMetadata(err.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
