//! Business logic services

pub mod fetcher;
pub mod guest_logs;
pub mod stats;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    repository::Repository,
    scraper::{ChannelClient, LiveSource, RawCapture},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub guest_logs: guest_logs::GuestLogsService,
    pub fetcher: fetcher::Fetcher,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let live: Arc<dyn LiveSource> =
            Arc::new(ChannelClient::new(&config.channel, &config.scraper.user_agent));
        Self::with_live_source(repository, config, live)
    }

    /// Same as [`Services::new`] with an explicit fallback source
    pub fn with_live_source(
        repository: Repository,
        config: &AppConfig,
        live: Arc<dyn LiveSource>,
    ) -> AppResult<Self> {
        let tz = config
            .history
            .reference_timezone()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let raw_capture = RawCapture::new(config.scraper.raw_capture_path.clone());

        Ok(Self {
            guest_logs: guest_logs::GuestLogsService::new(repository.clone(), tz),
            fetcher: fetcher::Fetcher::new(&config.scraper, live, raw_capture, repository)?,
        })
    }
}
