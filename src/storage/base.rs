use async_trait::async_trait;
use thiserror::Error;

use super::StorageCategory;
use crate::items::ScrapedItem;

#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Operation error: {0}")]
    OperationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid storage config: expected {0}")]
    InvalidConfig(&'static str),

    #[error("No storage registered for {0:?}")]
    MissingStorage(StorageCategory),
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        StorageError::OperationError(error.to_string())
    }
}

impl From<csv::Error> for StorageError {
    fn from(error: csv::Error) -> Self {
        if error.is_io_error() {
            StorageError::OperationError(error.to_string())
        } else {
            StorageError::SerializationError(error.to_string())
        }
    }
}

pub trait StorageConfig: Send + Sync {
    fn as_any(&self) -> &dyn std::any::Any;
    fn destination(&self) -> &str;
}

/// A tabular sink. Each stored item becomes one row of its destination.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn create_config(&self, destination: &str) -> Box<dyn StorageConfig>;

    async fn store(
        &self,
        item: &ScrapedItem,
        config: &dyn StorageConfig,
    ) -> Result<(), StorageError>;

    async fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
