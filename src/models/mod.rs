//! Data models for the guest logger

pub mod daily;
pub mod sample;

pub use daily::DailyAggregate;
pub use sample::{Reading, Sample, StoredSample};
