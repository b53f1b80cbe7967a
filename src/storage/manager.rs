use super::{
    base::{StorageError, StorageBackend},
    factory::Storage,
    StorageCategory, StorageConfig,
};
use crate::items::ScrapedItem;
use std::collections::HashMap;
use std::sync::Arc;

/// Routes each item to the storage registered for its category.
#[derive(Clone, Default)]
pub struct StorageManager {
    storages: HashMap<StorageCategory, (Arc<Storage>, Arc<dyn StorageConfig>)>,
}

impl StorageManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_storage(
        mut self,
        category: StorageCategory,
        storage: Arc<Storage>,
        destination: &str,
    ) -> Self {
        let config: Arc<dyn StorageConfig> = Arc::from(storage.create_config(destination));
        self.storages.insert(category, (storage, config));
        self
    }

    /// Registers every category on one storage under its default destination.
    pub fn register_all(self, storage: Storage) -> Self {
        let storage = Arc::new(storage);
        StorageCategory::ALL.iter().fold(self, |manager, category| {
            manager.register_storage(
                category.clone(),
                Arc::clone(&storage),
                category.destination(),
            )
        })
    }

    pub fn has_storage(&self, category: &StorageCategory) -> bool {
        self.storages.contains_key(category)
    }

    pub async fn store(&self, item: &ScrapedItem) -> Result<(), StorageError> {
        let category = item.category();
        let (storage, config) = self
            .storages
            .get(&category)
            .ok_or(StorageError::MissingStorage(category))?;
        storage.store(item, config.as_ref()).await
    }

    pub async fn flush(&self) -> Result<(), StorageError> {
        for (storage, _) in self.storages.values() {
            storage.flush().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{MatchRecord, PlayerRecord};
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_routes_by_category() {
        let memory = MemoryStorage::new();
        let manager = StorageManager::new().register_all(Storage::Memory(memory.clone()));

        let record = MatchRecord::new(
            "Team A",
            "Team B",
            0,
            0,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        );
        manager.store(&ScrapedItem::Match(record)).await.unwrap();
        manager
            .store(&ScrapedItem::Player(PlayerRecord {
                player_id: 7,
                team_id: 1,
                shirt_no: Some(9),
                name: "Striker".to_string(),
                age: Some(27),
                height: Some(185),
                weight: Some(80),
            }))
            .await
            .unwrap();

        assert_eq!(memory.len("matches"), 1);
        assert_eq!(memory.len("players"), 1);
        assert_eq!(memory.len("events"), 0);
    }

    #[tokio::test]
    async fn test_unregistered_category_is_an_error() {
        let memory = MemoryStorage::new();
        let manager = StorageManager::new().register_storage(
            StorageCategory::Matches,
            Arc::new(Storage::Memory(memory)),
            "matches",
        );

        assert!(!manager.has_storage(&StorageCategory::Failures));
        let result = manager
            .store(&ScrapedItem::Player(PlayerRecord {
                player_id: 1,
                team_id: 1,
                shirt_no: None,
                name: "Keeper".to_string(),
                age: None,
                height: None,
                weight: None,
            }))
            .await;
        assert!(matches!(
            result,
            Err(StorageError::MissingStorage(StorageCategory::Players))
        ));
    }
}
