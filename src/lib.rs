//! City Indoor Pool guest logger
//!
//! Periodically captures the live guest count of a public swimming facility,
//! stores it as an append-only time series and serves it raw and aggregated
//! per day over a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod repository;
pub mod scraper;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult, ChannelError, FetchError, StoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
