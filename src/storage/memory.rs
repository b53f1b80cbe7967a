use super::base::{StorageBackend, StorageConfig, StorageError};
use crate::items::ScrapedItem;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Keeps rows in memory, keyed by destination. Clones share the same rows.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    rows: Arc<RwLock<HashMap<String, Vec<ScrapedItem>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, destination: &str) -> Vec<ScrapedItem> {
        self.rows
            .read()
            .get(destination)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self, destination: &str) -> usize {
        self.rows.read().get(destination).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().values().all(Vec::is_empty)
    }
}

#[derive(Debug, Clone)]
pub struct MemoryConfig {
    pub destination: String,
}

impl StorageConfig for MemoryConfig {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn destination(&self) -> &str {
        &self.destination
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn create_config(&self, destination: &str) -> Box<dyn StorageConfig> {
        Box::new(MemoryConfig {
            destination: destination.to_string(),
        })
    }

    async fn store(
        &self,
        item: &ScrapedItem,
        config: &dyn StorageConfig,
    ) -> Result<(), StorageError> {
        self.rows
            .write()
            .entry(config.destination().to_string())
            .or_default()
            .push(item.clone());
        Ok(())
    }
}
