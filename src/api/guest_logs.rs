//! Guest count API endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        daily::DailyQuery,
        sample::{HistoryQuery, LogResponse},
        DailyAggregate, StoredSample,
    },
};

/// Most recent guest count
#[utoipa::path(
    get,
    path = "/api/latest",
    tag = "guest_logs",
    responses(
        (status = 200, description = "Latest sample, or null when nothing was logged yet", body = StoredSample)
    )
)]
pub async fn latest(State(state): State<crate::AppState>) -> AppResult<Json<Option<StoredSample>>> {
    let sample = state.services.guest_logs.latest().await?;
    Ok(Json(sample))
}

/// Sample history, newest first
#[utoipa::path(
    get,
    path = "/api/history",
    tag = "guest_logs",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Samples, newest first", body = Vec<StoredSample>)
    )
)]
pub async fn history(
    State(state): State<crate::AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<StoredSample>>> {
    let limit = query
        .limit
        .unwrap_or(state.config.history.default_limit)
        .max(1);

    let samples = state.services.guest_logs.history(limit).await?;
    Ok(Json(samples))
}

/// Daily statistics, oldest day first
#[utoipa::path(
    get,
    path = "/api/daily",
    tag = "guest_logs",
    params(DailyQuery),
    responses(
        (status = 200, description = "Per-day aggregates", body = Vec<DailyAggregate>)
    )
)]
pub async fn daily(
    State(state): State<crate::AppState>,
    Query(query): Query<DailyQuery>,
) -> AppResult<Json<Vec<DailyAggregate>>> {
    let history = &state.config.history;
    let days = query
        .days
        .unwrap_or(history.default_days)
        .clamp(1, history.max_days.max(1));

    let aggregates = state.services.guest_logs.daily_aggregates(days).await?;
    Ok(Json(aggregates))
}

/// Fetch the current guest count now and store it
#[utoipa::path(
    post,
    path = "/api/log",
    tag = "guest_logs",
    responses(
        (status = 200, description = "Sample captured and stored", body = LogResponse),
        (status = 502, description = "Page unreachable or guest count not found")
    )
)]
pub async fn log_guest_count(State(state): State<crate::AppState>) -> AppResult<Json<LogResponse>> {
    let stored = state.services.fetcher.fetch_and_store().await?;
    Ok(Json(stored.into()))
}
