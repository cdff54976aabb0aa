//! One-shot logger for external schedulers (cron, systemd timers)
//!
//! Captures the current guest count once and exits non-zero on failure.

use pool_guest_logger::{
    config::AppConfig,
    logging,
    repository::{self, Repository},
    services::Services,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let _log_guard = logging::init(&config.logging);

    let pool = repository::connect(&config.database).await?;
    repository::migrate(&pool).await?;

    let repository = Repository::new(pool, config.history.max_limit);
    let services = Services::new(repository, &config)?;

    match services.fetcher.fetch_and_store().await {
        Ok(sample) => {
            tracing::info!("Logged {} guests at {}", sample.count, sample.recorded_at.to_rfc3339());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Failed to fetch guest count: {}", e);
            std::process::exit(1);
        }
    }
}
