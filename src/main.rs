//! Payment webhook service entry point.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use payment_webhooks::adapters::event_store::RedisEventStore;
use payment_webhooks::adapters::handlers::LoggingEventHandler;
use payment_webhooks::adapters::http::{app_router, WebhookAppState};
use payment_webhooks::adapters::stripe::{StripeAdapter, StripeConfig};
use payment_webhooks::application::handlers::webhooks::{
    EventDispatcher, EventValidator, ProcessWebhookHandler, RecoveryEngine,
};
use payment_webhooks::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let processing = config.processing_config();
    tracing::info!(
        environment = ?config.server.environment,
        namespace = %processing.namespace,
        chunk_size_secs = processing.chunk_size_secs,
        page_size = processing.page_size,
        "Starting payment webhook service v{}",
        env!("CARGO_PKG_VERSION")
    );

    let client = redis::Client::open(config.redis.url.as_str())?;
    let conn = tokio::time::timeout(
        config.redis.connect_timeout(),
        client.get_multiplexed_tokio_connection(),
    )
    .await??;
    tracing::info!(url = %config.redis.redacted_url(), "Event store connection established");

    tracing::info!(
        stripe_mode = if config.payment.is_live_mode() { "live" } else { "test" },
        require_livemode = config.payment.require_livemode,
        "Stripe adapter configured"
    );
    let stripe = Arc::new(StripeAdapter::new(StripeConfig::from_payment_config(
        &config.payment,
    )));
    let validator = Arc::new(EventValidator::new(
        Arc::new(RedisEventStore::new(conn)),
        &processing,
    ));
    let dispatcher = Arc::new(EventDispatcher::new(Arc::new(LoggingEventHandler::new())));

    if config.server.admin_token.is_none() && config.is_production() {
        tracing::warn!("No admin token configured; the recovery endpoint is unauthenticated");
    }

    let state = WebhookAppState {
        webhook_handler: Arc::new(ProcessWebhookHandler::new(
            stripe.clone(),
            validator.clone(),
            dispatcher.clone(),
        )),
        recovery_engine: Arc::new(RecoveryEngine::new(
            stripe,
            validator,
            dispatcher,
            &processing,
        )),
        retry_policies: Arc::new(processing.retry.clone()),
        admin_token: config
            .server
            .admin_token
            .clone()
            .map(|token| Arc::new(SecretString::new(token))),
    };

    let app = app_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
