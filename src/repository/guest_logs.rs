//! Guest logs repository (append-only sample store)

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use sqlx::{Pool, Sqlite};
use std::collections::BTreeMap;

use crate::{
    error::StoreError,
    models::{Sample, StoredSample},
};

pub type StoreResult<T> = Result<T, StoreError>;

/// Samples partitioned by calendar day, oldest day first
pub type SamplesByDay = BTreeMap<NaiveDate, Vec<StoredSample>>;

#[derive(Clone)]
pub struct GuestLogsRepository {
    pool: Pool<Sqlite>,
    history_cap: i64,
}

impl GuestLogsRepository {
    pub fn new(pool: Pool<Sqlite>, history_cap: i64) -> Self {
        Self {
            pool,
            history_cap: history_cap.max(1),
        }
    }

    /// Append a sample; the store assigns the identifier
    pub async fn insert(&self, sample: &Sample) -> StoreResult<StoredSample> {
        let row = sqlx::query_as::<_, StoredSample>(
            r#"
            INSERT INTO guest_logs (recorded_at, count, capacity)
            VALUES (?, ?, ?)
            RETURNING id, recorded_at, count, capacity
            "#,
        )
        .bind(sample.recorded_at)
        .bind(sample.count)
        .bind(sample.capacity)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Most recent sample; ties on `recorded_at` go to the latest insertion
    pub async fn latest(&self) -> StoreResult<Option<StoredSample>> {
        let row = sqlx::query_as::<_, StoredSample>(
            "SELECT id, recorded_at, count, capacity FROM guest_logs ORDER BY recorded_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Newest-first history, capped at the configured maximum
    pub async fn history(&self, limit: i64) -> StoreResult<Vec<StoredSample>> {
        if limit < 1 {
            return Err(StoreError::InvalidLimit(limit));
        }
        let limit = limit.min(self.history_cap);

        let rows = sqlx::query_as::<_, StoredSample>(
            "SELECT id, recorded_at, count, capacity FROM guest_logs ORDER BY recorded_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Samples of the trailing `days` calendar days (today included) in `tz`
    pub async fn for_day_range(&self, tz: Tz, days: u32) -> StoreResult<SamplesByDay> {
        self.for_day_range_at(tz, days, Utc::now()).await
    }

    pub async fn for_day_range_at(
        &self,
        tz: Tz,
        days: u32,
        now: DateTime<Utc>,
    ) -> StoreResult<SamplesByDay> {
        if days < 1 {
            return Err(StoreError::InvalidRange(days));
        }
        let today = now.with_timezone(&tz).date_naive();
        let first_day = today
            .checked_sub_days(Days::new(u64::from(days) - 1))
            .ok_or(StoreError::InvalidRange(days))?;

        // UTC midnight of the previous day precedes local midnight of
        // `first_day` for every offset; the exact cut happens below.
        let lower_bound = first_day
            .checked_sub_days(Days::new(1))
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let rows = sqlx::query_as::<_, StoredSample>(
            "SELECT id, recorded_at, count, capacity FROM guest_logs WHERE recorded_at >= ? ORDER BY recorded_at ASC, id ASC",
        )
        .bind(lower_bound)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped = SamplesByDay::new();
        for row in rows {
            let day = row.recorded_at.with_timezone(&tz).date_naive();
            if day >= first_day && day <= today {
                grouped.entry(day).or_default().push(row);
            }
        }
        Ok(grouped)
    }
}
