use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ContentRetryCondition {
    pub pattern: String,
    pub is_regex: bool,
}

#[derive(Debug, Clone)]
pub enum RetryCondition {
    StatusCode(u16),
    Content(ContentRetryCondition),
    /// The page never showed the element it was waiting for.
    WaitTimeout,
    /// Any other page-load failure: network, browser or navigation errors.
    LoadError,
}

#[derive(Debug, Clone, Copy)]
pub enum BackoffPolicy {
    Constant,
    Linear,
    Exponential { factor: f32 },
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum RetryCategory {
    RateLimit,      // 429, rate limiting messages
    ServerError,    // 500-599
    BotDetection,   // Bot detection, captchas
    Timeout,        // Element wait timeouts
    Network,        // Connection and navigation failures
    Custom(String), // Custom category
}

#[derive(Debug, Clone)]
pub struct CategoryConfig {
    pub max_retries: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_policy: BackoffPolicy,
    pub conditions: Vec<RetryCondition>,
}

#[derive(Debug, Clone)]
pub struct RetryState {
    pub counts: HashMap<RetryCategory, usize>,
    pub total_retries: usize,
}

/// Retry policy by category. An empty config never retries.
///
/// State is keyed by request fingerprint and shared between clones, so the
/// budget of a page is spent once no matter which clone sees the failure.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub categories: HashMap<RetryCategory, CategoryConfig>,
    pub(crate) retry_states: Arc<RwLock<HashMap<String, RetryState>>>,
}
