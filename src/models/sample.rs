//! Guest count samples

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// A count/capacity pair read from the facility, before it is timestamped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub count: u32,
    pub capacity: Option<u32>,
}

/// One timestamped guest-count observation, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub recorded_at: DateTime<Utc>,
    pub count: u32,
    pub capacity: Option<u32>,
}

impl Sample {
    /// Timestamp a reading at the moment of capture
    pub fn captured_now(reading: Reading) -> Self {
        Self {
            recorded_at: Utc::now(),
            count: reading.count,
            capacity: reading.capacity,
        }
    }
}

/// Sample row as stored in `guest_logs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StoredSample {
    pub id: i64,
    /// Capture time (UTC)
    pub recorded_at: DateTime<Utc>,
    /// Current number of guests
    pub count: u32,
    /// Maximum number of guests, when the source reports one
    pub capacity: Option<u32>,
}

/// Query parameters for the sample history
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct HistoryQuery {
    /// Number of samples, newest first
    pub limit: Option<i64>,
}

/// Response of a manual fetch
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogResponse {
    pub success: bool,
    pub id: i64,
    pub count: u32,
    pub capacity: Option<u32>,
    pub recorded_at: DateTime<Utc>,
}

impl From<StoredSample> for LogResponse {
    fn from(sample: StoredSample) -> Self {
        Self {
            success: true,
            id: sample.id,
            count: sample.count,
            capacity: sample.capacity,
            recorded_at: sample.recorded_at,
        }
    }
}
