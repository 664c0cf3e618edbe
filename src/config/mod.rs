//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PAYMENT_WEBHOOKS` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use payment_webhooks::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! let processing = config.processing_config();
//! println!("Chunk size: {}s", processing.chunk_size_secs);
//! ```

mod error;
mod payment;
mod processing;
mod redis;
mod server;

pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use processing::{
    ProcessingConfig, ProcessingOverrides, RetryPolicies, RetryPolicy, MAX_UPSTREAM_PAGE_SIZE,
};
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment profile)
    #[serde(default)]
    pub server: ServerConfig,

    /// Redis configuration (event store)
    pub redis: RedisConfig,

    /// Payment configuration (Stripe)
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Numeric overrides for the selected processing profile
    #[serde(default)]
    pub processing: ProcessingOverrides,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PAYMENT_WEBHOOKS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PAYMENT_WEBHOOKS__SERVER__ENVIRONMENT=production` -> `server.environment`
    /// - `PAYMENT_WEBHOOKS__PROCESSING__PAGE_SIZE=50` -> `processing.page_size`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAYMENT_WEBHOOKS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values, including the resolved profile.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.redis.validate()?;
        self.payment.validate()?;
        self.processing_config().validate()?;
        Ok(())
    }

    /// Resolve the processing profile for the configured environment.
    pub fn processing_config(&self) -> ProcessingConfig {
        ProcessingConfig::for_environment(self.server.environment)
            .with_overrides(&self.processing)
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
