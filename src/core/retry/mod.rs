mod policy;
mod types;
mod utils;

pub use types::{
    BackoffPolicy, CategoryConfig, ContentRetryCondition, RetryCategory, RetryCondition,
    RetryConfig, RetryState,
};
pub use utils::calculate_delay;
