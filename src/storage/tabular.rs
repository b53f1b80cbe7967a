use super::base::{StorageBackend, StorageConfig, StorageError};
use crate::items::ScrapedItem;
use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Delimited-text files under one directory, one file per destination.
///
/// Files are opened in append mode. The header row is written only when the
/// file is new or empty, so re-running a scrape appends rows after the
/// existing ones.
pub struct CsvStorage {
    base_path: PathBuf,
    delimiter: u8,
    extension: &'static str,
    writers: Mutex<HashMap<PathBuf, csv::Writer<File>>>,
}

impl CsvStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, StorageError> {
        Self::with_delimiter(base_path, b',', "csv")
    }

    pub fn tsv<P: AsRef<Path>>(base_path: P) -> Result<Self, StorageError> {
        Self::with_delimiter(base_path, b'\t', "tsv")
    }

    fn with_delimiter<P: AsRef<Path>>(
        base_path: P,
        delimiter: u8,
        extension: &'static str,
    ) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            delimiter,
            extension,
            writers: Mutex::new(HashMap::new()),
        })
    }

    pub fn path_for(&self, destination: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.{}", destination, self.extension))
    }

    fn open(&self, path: &Path) -> Result<csv::Writer<File>, StorageError> {
        let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        debug!(
            "Opened {} (header: {})",
            path.display(),
            if needs_header { "write" } else { "present" }
        );
        Ok(csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(needs_header)
            .from_writer(file))
    }
}

#[derive(Debug, Clone)]
pub struct CsvConfig {
    pub file_stem: String,
}

impl StorageConfig for CsvConfig {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn destination(&self) -> &str {
        &self.file_stem
    }
}

#[async_trait]
impl StorageBackend for CsvStorage {
    fn create_config(&self, destination: &str) -> Box<dyn StorageConfig> {
        Box::new(CsvConfig {
            file_stem: destination.to_string(),
        })
    }

    async fn store(
        &self,
        item: &ScrapedItem,
        config: &dyn StorageConfig,
    ) -> Result<(), StorageError> {
        let config = config
            .as_any()
            .downcast_ref::<CsvConfig>()
            .ok_or(StorageError::InvalidConfig("CsvConfig"))?;
        let path = self.path_for(&config.file_stem);

        let mut writers = self.writers.lock();
        if !writers.contains_key(&path) {
            let writer = self.open(&path)?;
            writers.insert(path.clone(), writer);
        }
        if let Some(writer) = writers.get_mut(&path) {
            writer.serialize(item)?;
            writer.flush()?;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), StorageError> {
        for writer in self.writers.lock().values_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}
