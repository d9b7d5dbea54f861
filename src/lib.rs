pub mod clock;
pub mod config;
pub mod gateway;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod redact;
pub mod replies;
pub mod scheduler;
pub mod scoring;
pub mod store;
pub mod triage;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for a host process (webhook handler, cron entry point).
/// Library consumers embedding the core in a larger service should install
/// their own subscriber instead.
pub fn init_telemetry() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("carepulse core v{}", config::APP_VERSION);
}
