use super::{base::StorageError, CsvStorage, MemoryStorage, StorageBackend, StorageConfig};
use crate::items::ScrapedItem;
use async_trait::async_trait;
use std::path::PathBuf;

pub enum StorageType {
    Csv { path: PathBuf },
    Tsv { path: PathBuf },
    Memory,
}

pub enum Storage {
    Csv(Box<CsvStorage>),
    Memory(MemoryStorage),
}

#[async_trait]
impl StorageBackend for Storage {
    fn create_config(&self, destination: &str) -> Box<dyn StorageConfig> {
        match self {
            Storage::Csv(storage) => storage.create_config(destination),
            Storage::Memory(storage) => storage.create_config(destination),
        }
    }

    async fn store(
        &self,
        item: &ScrapedItem,
        config: &dyn StorageConfig,
    ) -> Result<(), StorageError> {
        match self {
            Storage::Csv(storage) => storage.store(item, config).await,
            Storage::Memory(storage) => storage.store(item, config).await,
        }
    }

    async fn flush(&self) -> Result<(), StorageError> {
        match self {
            Storage::Csv(storage) => storage.flush().await,
            Storage::Memory(storage) => storage.flush().await,
        }
    }
}

pub fn create_storage(storage_type: StorageType) -> Result<Storage, StorageError> {
    match storage_type {
        StorageType::Csv { path } => Ok(Storage::Csv(Box::new(CsvStorage::new(path)?))),
        StorageType::Tsv { path } => Ok(Storage::Csv(Box::new(CsvStorage::tsv(path)?))),
        StorageType::Memory => Ok(Storage::Memory(MemoryStorage::new())),
    }
}
