//! Per-day statistics derived from stored samples

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Daily aggregate, computed on read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyAggregate {
    /// Calendar day in the reference timezone
    pub day: NaiveDate,
    pub sample_count: u32,
    /// Mean guest count, rounded to one decimal
    pub avg_count: f64,
    pub min_count: u32,
    pub max_count: u32,
}

/// Query parameters for daily aggregates
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DailyQuery {
    /// Number of trailing calendar days, today included
    pub days: Option<u32>,
}
