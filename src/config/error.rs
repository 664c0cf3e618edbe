//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid host address")]
    InvalidHost,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Admin token must not be empty when set")]
    EmptyAdminToken,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Invalid Stripe API key format")]
    InvalidStripeKey,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("Live mode is required but the Stripe API key is a test key")]
    LivemodeWithTestKey,

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("Page size {0} exceeds the upstream maximum of 100")]
    PageSizeTooLarge(u32),

    #[error("Key namespace must not be empty or contain ':'")]
    InvalidNamespace,

    #[error("Retry policy for {0} priority has no delays")]
    EmptyRetryPolicy(&'static str),
}
