//! Daily statistics over stored samples

use crate::{models::DailyAggregate, repository::guest_logs::SamplesByDay};

/// Compute per-day statistics, oldest day first. Empty buckets are omitted.
pub fn daily_aggregates(samples_by_day: &SamplesByDay) -> Vec<DailyAggregate> {
    samples_by_day
        .iter()
        .filter_map(|(day, samples)| {
            let min_count = samples.iter().map(|s| s.count).min()?;
            let max_count = samples.iter().map(|s| s.count).max()?;
            let total: u64 = samples.iter().map(|s| u64::from(s.count)).sum();
            let mean = total as f64 / samples.len() as f64;

            Some(DailyAggregate {
                day: *day,
                sample_count: samples.len() as u32,
                avg_count: round_one_decimal(mean),
                min_count,
                max_count,
            })
        })
        .collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
