use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::FailureKind;
use crate::storage::StorageCategory;

#[derive(Debug, Clone, Serialize)]
pub struct ScrapingStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub pages_requested: usize,
    pub pages_loaded: usize,
    pub load_failures: usize,
    pub extraction_failures: usize,
    pub retry_count: usize,
    pub bytes_downloaded: usize,
    pub status_codes: HashMap<u16, usize>,
    pub retry_reasons: HashMap<String, usize>,
    pub records_written: HashMap<StorageCategory, usize>,
    pub average_load_time: f64, // in milliseconds
}

impl ScrapingStats {
    pub fn records(&self, category: &StorageCategory) -> usize {
        self.records_written.get(category).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct StatsTracker {
    stats: Arc<RwLock<ScrapingStats>>,
}

impl ScrapingStats {
    fn started_now() -> Self {
        Self {
            start_time: Utc::now(),
            end_time: None,
            pages_requested: 0,
            pages_loaded: 0,
            load_failures: 0,
            extraction_failures: 0,
            retry_count: 0,
            bytes_downloaded: 0,
            status_codes: HashMap::new(),
            retry_reasons: HashMap::new(),
            records_written: HashMap::new(),
            average_load_time: 0.0,
        }
    }
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(ScrapingStats::started_now())),
        }
    }

    /// Clears every counter and restarts the clock.
    pub fn reset(&self) {
        *self.stats.write() = ScrapingStats::started_now();
    }

    pub fn record_page_requested(&self) {
        self.stats.write().pages_requested += 1;
    }

    /// A page that loaded with a usable status.
    pub fn record_load(&self, status: u16, size: usize, duration: Duration) {
        let mut stats = self.stats.write();
        stats.pages_loaded += 1;

        *stats.status_codes.entry(status).or_insert(0) += 1;
        stats.bytes_downloaded += size;

        let current_total = stats.average_load_time * (stats.pages_loaded - 1) as f64;
        let new_duration = duration.num_milliseconds() as f64;
        stats.average_load_time = (current_total + new_duration) / stats.pages_loaded as f64;
    }

    /// A response whose status makes it a failure; counted by status only.
    pub fn record_status(&self, status: u16) {
        *self.stats.write().status_codes.entry(status).or_insert(0) += 1;
    }

    pub fn record_failure(&self, kind: FailureKind) {
        let mut stats = self.stats.write();
        match kind {
            FailureKind::Load => stats.load_failures += 1,
            FailureKind::Extraction => stats.extraction_failures += 1,
            FailureKind::Fatal => {}
        }
    }

    pub fn record_retry(&self, category: String) {
        let mut stats = self.stats.write();
        stats.retry_count += 1;
        *stats.retry_reasons.entry(category).or_insert(0) += 1;
    }

    pub fn record_written(&self, category: StorageCategory) {
        *self
            .stats
            .write()
            .records_written
            .entry(category)
            .or_insert(0) += 1;
    }

    pub fn finish(&self) {
        self.stats.write().end_time = Some(Utc::now());
    }

    pub fn get_stats(&self) -> ScrapingStats {
        self.stats.read().clone()
    }

    pub fn print_summary(&self) {
        let stats = self.stats.read();
        let duration = stats
            .end_time
            .unwrap_or_else(Utc::now)
            .signed_duration_since(stats.start_time);

        println!("\nScraping Statistics:");
        println!("===================");
        println!("Duration: {} seconds", duration.num_seconds());
        println!("Pages Requested: {}", stats.pages_requested);
        println!("Pages Loaded: {}", stats.pages_loaded);
        println!("Load Failures: {}", stats.load_failures);
        println!("Extraction Failures: {}", stats.extraction_failures);
        println!("Retry Count: {}", stats.retry_count);
        println!(
            "Data Downloaded: {:.2} MB",
            stats.bytes_downloaded as f64 / 1_000_000.0
        );
        println!("Average Load Time: {:.2}ms", stats.average_load_time);

        println!("\nRecords Written:");
        for category in StorageCategory::ALL.iter() {
            println!("  {}: {}", category.destination(), stats.records(category));
        }

        if !stats.status_codes.is_empty() {
            println!("\nStatus Codes:");
            for (code, count) in &stats.status_codes {
                println!("  {}: {}", code, count);
            }
        }

        if !stats.retry_reasons.is_empty() {
            println!("\nRetry Reasons:");
            for (reason, count) in &stats.retry_reasons {
                println!("  {}: {}", reason, count);
            }
        }
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
