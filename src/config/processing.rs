//! Processing profile configuration
//!
//! Holds the knobs the validator and the recovery engine read: record TTLs,
//! upstream page/chunk sizes, the key namespace, and the per-priority retry
//! table. A profile is selected from the server [`Environment`] and individual
//! numbers can be overridden from the environment.

use serde::Deserialize;
use std::time::Duration;

use crate::domain::webhook::EventPriority;

use super::error::ValidationError;
use super::server::Environment;

/// Largest page the upstream event listing accepts.
pub const MAX_UPSTREAM_PAGE_SIZE: u32 = 100;

/// Backoff guidance for one priority tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before each retry, in milliseconds. The last entry repeats.
    pub delays_ms: Vec<u64>,
    /// Maximum number of retries.
    pub max_retries: u32,
    /// Ceiling on the whole retry window, in seconds.
    pub max_retry_ttl_secs: u64,
}

impl RetryPolicy {
    pub fn new(delays_ms: Vec<u64>, max_retries: u32, max_retry_ttl_secs: u64) -> Self {
        Self {
            delays_ms,
            max_retries,
            max_retry_ttl_secs,
        }
    }

    /// Recommended delay before retry number `attempt` (zero-based).
    ///
    /// Returns `None` once the retry budget is spent, either by count or
    /// because the cumulative delay would pass the retry window ceiling.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries || self.delays_ms.is_empty() {
            return None;
        }

        let last = self.delays_ms.len() - 1;
        let delay_at = |n: u32| self.delays_ms[(n as usize).min(last)];

        let cumulative_ms: u64 = (0..=attempt).map(delay_at).sum();
        if cumulative_ms > self.max_retry_ttl_secs.saturating_mul(1000) {
            return None;
        }

        Some(Duration::from_millis(delay_at(attempt)))
    }

    pub fn max_retry_ttl(&self) -> Duration {
        Duration::from_secs(self.max_retry_ttl_secs)
    }
}

/// Retry table keyed by priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicies {
    pub high: RetryPolicy,
    pub medium: RetryPolicy,
    pub low: RetryPolicy,
}

impl RetryPolicies {
    pub fn for_priority(&self, priority: EventPriority) -> &RetryPolicy {
        match priority {
            EventPriority::High => &self.high,
            EventPriority::Medium => &self.medium,
            EventPriority::Low => &self.low,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        for (name, policy) in [
            ("high", &self.high),
            ("medium", &self.medium),
            ("low", &self.low),
        ] {
            if policy.delays_ms.is_empty() {
                return Err(ValidationError::EmptyRetryPolicy(name));
            }
        }
        Ok(())
    }
}

/// Numeric overrides read from `PAYMENT_WEBHOOKS__PROCESSING__*`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessingOverrides {
    pub chunk_size_secs: Option<u64>,
    pub max_pages: Option<u32>,
    pub page_size: Option<u32>,
    pub event_ttl_secs: Option<u64>,
    pub last_event_ttl_secs: Option<u64>,
    pub namespace: Option<String>,
}

/// Immutable processing profile shared by the validator and recovery engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingConfig {
    /// Width of one recovery chunk, in seconds.
    pub chunk_size_secs: u64,
    /// Upper bound on upstream pages fetched by one chunked recovery run.
    pub max_pages: u32,
    /// Events requested per upstream page.
    pub page_size: u32,
    /// TTL of the processed-event (dedupe) record.
    pub event_ttl_secs: u64,
    /// TTL of the last-event (ordering) record.
    pub last_event_ttl_secs: u64,
    /// Prefix of every store key.
    pub namespace: String,
    pub retry: RetryPolicies,
}

impl ProcessingConfig {
    /// Profile for an environment. Staging runs the production profile.
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self::development(),
            Environment::Staging | Environment::Production => Self::production(),
        }
    }

    pub fn production() -> Self {
        Self {
            chunk_size_secs: 3_600,
            max_pages: 100,
            page_size: 100,
            event_ttl_secs: 7 * 24 * 3_600,
            last_event_ttl_secs: 30 * 24 * 3_600,
            namespace: "stripe_webhooks".to_string(),
            retry: RetryPolicies {
                high: RetryPolicy::new(vec![1_000, 5_000, 30_000, 120_000, 600_000], 5, 86_400),
                medium: RetryPolicy::new(vec![5_000, 60_000, 300_000, 1_800_000], 4, 43_200),
                low: RetryPolicy::new(vec![60_000, 600_000, 3_600_000], 3, 21_600),
            },
        }
    }

    pub fn development() -> Self {
        Self {
            chunk_size_secs: 300,
            max_pages: 10,
            page_size: 25,
            event_ttl_secs: 3_600,
            last_event_ttl_secs: 7_200,
            namespace: "stripe_webhooks_dev".to_string(),
            retry: RetryPolicies {
                high: RetryPolicy::new(vec![200, 1_000, 5_000], 3, 300),
                medium: RetryPolicy::new(vec![1_000, 5_000], 2, 120),
                low: RetryPolicy::new(vec![5_000], 1, 60),
            },
        }
    }

    /// Apply environment overrides on top of the profile.
    pub fn with_overrides(mut self, overrides: &ProcessingOverrides) -> Self {
        if let Some(v) = overrides.chunk_size_secs {
            self.chunk_size_secs = v;
        }
        if let Some(v) = overrides.max_pages {
            self.max_pages = v;
        }
        if let Some(v) = overrides.page_size {
            self.page_size = v;
        }
        if let Some(v) = overrides.event_ttl_secs {
            self.event_ttl_secs = v;
        }
        if let Some(v) = overrides.last_event_ttl_secs {
            self.last_event_ttl_secs = v;
        }
        if let Some(v) = &overrides.namespace {
            self.namespace = v.clone();
        }
        self
    }

    pub fn retry_policy(&self, priority: EventPriority) -> &RetryPolicy {
        self.retry.for_priority(priority)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.chunk_size_secs == 0 {
            return Err(ValidationError::MustBePositive("chunk_size_secs"));
        }
        if self.max_pages == 0 {
            return Err(ValidationError::MustBePositive("max_pages"));
        }
        if self.page_size == 0 {
            return Err(ValidationError::MustBePositive("page_size"));
        }
        if self.page_size > MAX_UPSTREAM_PAGE_SIZE {
            return Err(ValidationError::PageSizeTooLarge(self.page_size));
        }
        if self.event_ttl_secs == 0 {
            return Err(ValidationError::MustBePositive("event_ttl_secs"));
        }
        if self.last_event_ttl_secs == 0 {
            return Err(ValidationError::MustBePositive("last_event_ttl_secs"));
        }
        if self.namespace.is_empty() || self.namespace.contains(':') {
            return Err(ValidationError::InvalidNamespace);
        }
        self.retry.validate()
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self::development()
    }
}
