//! Read API over the guest count time series

use chrono_tz::Tz;

use crate::{
    error::StoreError,
    models::{DailyAggregate, StoredSample},
    repository::Repository,
    services::stats,
};

#[derive(Clone)]
pub struct GuestLogsService {
    repository: Repository,
    reference_timezone: Tz,
}

impl GuestLogsService {
    pub fn new(repository: Repository, reference_timezone: Tz) -> Self {
        Self {
            repository,
            reference_timezone,
        }
    }

    /// Most recent sample
    pub async fn latest(&self) -> Result<Option<StoredSample>, StoreError> {
        self.repository.guest_logs.latest().await
    }

    /// Newest-first sample history
    pub async fn history(&self, limit: i64) -> Result<Vec<StoredSample>, StoreError> {
        self.repository.guest_logs.history(limit).await
    }

    /// Per-day statistics for the trailing `days` calendar days
    pub async fn daily_aggregates(&self, days: u32) -> Result<Vec<DailyAggregate>, StoreError> {
        let grouped = self
            .repository
            .guest_logs
            .for_day_range(self.reference_timezone, days)
            .await?;
        Ok(stats::daily_aggregates(&grouped))
    }
}
