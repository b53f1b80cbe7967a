use super::types::*;
use super::utils::*;
use crate::ScraperError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_policy: BackoffPolicy::Exponential { factor: 2.0 },
            conditions: Vec::new(),
        }
    }
}

impl CategoryConfig {
    pub fn calculate_delay(&self, attempt: usize) -> Duration {
        calculate_delay(self, attempt)
    }
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryState {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            total_retries: 0,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            categories: Default::default(),
            retry_states: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl RetryConfig {
    /// Bounded retry for page loads: wait timeouts, navigation failures and
    /// transient server errors.
    pub fn page_loads() -> Self {
        Self::default()
            .with_category(
                RetryCategory::Timeout,
                CategoryConfig {
                    max_retries: 2,
                    initial_delay: Duration::from_secs(2),
                    max_delay: Duration::from_secs(20),
                    backoff_policy: BackoffPolicy::Exponential { factor: 2.0 },
                    conditions: vec![RetryCondition::WaitTimeout],
                },
            )
            .with_category(
                RetryCategory::Network,
                CategoryConfig {
                    max_retries: 2,
                    initial_delay: Duration::from_secs(2),
                    max_delay: Duration::from_secs(20),
                    backoff_policy: BackoffPolicy::Exponential { factor: 2.0 },
                    conditions: vec![RetryCondition::LoadError],
                },
            )
            .with_category(
                RetryCategory::ServerError,
                CategoryConfig {
                    max_retries: 3,
                    initial_delay: Duration::from_secs(5),
                    max_delay: Duration::from_secs(60),
                    backoff_policy: BackoffPolicy::Exponential { factor: 2.0 },
                    conditions: [500, 502, 503, 504]
                        .into_iter()
                        .map(RetryCondition::StatusCode)
                        .collect(),
                },
            )
    }

    pub fn with_category(mut self, category: RetryCategory, config: CategoryConfig) -> Self {
        self.categories.insert(category, config);
        self
    }

    pub fn is_enabled(&self) -> bool {
        !self.categories.is_empty()
    }

    pub fn should_retry_response(
        &self,
        key: &str,
        status: u16,
        content: &str,
    ) -> Option<(RetryCategory, Duration)> {
        self.next_retry(key, |condition| {
            retry_response_condition_should_apply(condition, status, content)
        })
    }

    pub fn should_retry_error(
        &self,
        key: &str,
        error: &ScraperError,
    ) -> Option<(RetryCategory, Duration)> {
        self.next_retry(key, |condition| {
            retry_error_condition_should_apply(condition, error)
        })
    }

    fn next_retry<F>(&self, key: &str, applies: F) -> Option<(RetryCategory, Duration)>
    where
        F: Fn(&RetryCondition) -> bool,
    {
        if !self.is_enabled() {
            return None;
        }

        let mut states = self.retry_states.write();
        let state = states.entry(key.to_string()).or_default();

        for (category, config) in &self.categories {
            let current_retries = state.counts.get(category).copied().unwrap_or(0);
            if current_retries >= config.max_retries {
                continue;
            }

            if config.conditions.iter().any(&applies) {
                state.counts.insert(category.clone(), current_retries + 1);
                state.total_retries += 1;
                let delay = calculate_delay(config, current_retries);
                return Some((category.clone(), delay));
            }
        }
        None
    }

    pub fn get_retry_state(&self, key: &str) -> RetryState {
        self.retry_states
            .read()
            .get(key)
            .cloned()
            .unwrap_or_else(RetryState::new)
    }

    pub fn max_retries(&self, category: &RetryCategory) -> usize {
        self.categories
            .get(category)
            .map(|c| c.max_retries)
            .unwrap_or(0)
    }
}
