//! Storage error types

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid signed URL expiry: {0:?}")]
    InvalidExpiry(Duration),
}
