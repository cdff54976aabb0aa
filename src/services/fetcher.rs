//! Fetch-and-store pipeline
//!
//! One page GET, markup extraction, the realtime channel as fallback, then a
//! single insert. Nothing is retried here; the caller decides the cadence.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use std::sync::Arc;

use crate::{
    config::ScraperConfig,
    error::{AppError, AppResult, FetchError},
    models::{Reading, Sample, StoredSample},
    repository::Repository,
    scraper::{extractor, Extraction, LiveSource, RawCapture},
};

#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    target_url: String,
    live: Arc<dyn LiveSource>,
    raw_capture: RawCapture,
    repository: Repository,
}

impl Fetcher {
    pub fn new(
        config: &ScraperConfig,
        live: Arc<dyn LiveSource>,
        raw_capture: RawCapture,
        repository: Repository,
    ) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        let accept_language = HeaderValue::from_str(&config.accept_language)
            .map_err(|e| AppError::Internal(format!("Invalid Accept-Language: {}", e)))?;
        headers.insert(ACCEPT_LANGUAGE, accept_language);

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.request_timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            target_url: config.target_url.clone(),
            live,
            raw_capture,
            repository,
        })
    }

    /// Capture the current guest count and append it to the time series
    pub async fn fetch_and_store(&self) -> Result<StoredSample, FetchError> {
        tracing::debug!("Fetching guest count from {}", self.target_url);
        let body = self.fetch_page().await?;

        let (reading, source) = match extractor::extract(&body) {
            Extraction::Found(reading) => (reading, "markup"),
            Extraction::NotFound => (self.fall_back(&body).await?, "channel"),
        };

        let sample = Sample::captured_now(reading);
        let stored = self.repository.guest_logs.insert(&sample).await?;

        tracing::info!(
            "Logged {} guests (capacity {:?}) from {} at {}",
            stored.count,
            stored.capacity,
            source,
            stored.recorded_at.to_rfc3339()
        );
        Ok(stored)
    }

    async fn fetch_page(&self) -> Result<String, reqwest::Error> {
        let response = self
            .client
            .get(&self.target_url)
            .send()
            .await?
            .error_for_status()?;
        response.text().await
    }

    async fn fall_back(&self, body: &str) -> Result<Reading, FetchError> {
        let uid = extractor::extract_uid(body);
        tracing::debug!("No guest count in markup, falling back to channel (uid={:?})", uid);

        match self.live.fetch_live(uid).await {
            Ok(reading) => Ok(reading),
            Err(fallback) => {
                tracing::warn!("Fallback channel failed: {}", fallback);
                if let Err(e) = self.raw_capture.write(body).await {
                    tracing::error!(
                        "Failed to write raw capture to {}: {}",
                        self.raw_capture.path().display(),
                        e
                    );
                } else {
                    tracing::debug!("Wrote unparseable page to {}", self.raw_capture.path().display());
                }
                Err(FetchError::Unparseable { fallback })
            }
        }
    }
}
