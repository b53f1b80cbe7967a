pub mod base;
pub mod factory;
pub mod manager;
pub mod memory;
pub mod tabular;
pub mod types;

pub use base::{StorageBackend, StorageConfig, StorageError};
pub use factory::{create_storage, Storage, StorageType};
pub use manager::StorageManager;
pub use memory::MemoryStorage;
pub use tabular::CsvStorage;
pub use types::StorageCategory;
