use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::decision::ReasonCode;
use crate::dedup::lookback_start;
use crate::history::{round1, BatchRecord, SessionHistory, SessionTotals};
use crate::pipeline::{evaluate_batch, run_batch};
use crate::reducer::{FilteringStats, ReducerHandle};
use crate::store::ArticleStore;
use crate::webhook::parse_payload;

#[derive(Clone)]
pub struct AppState {
    pub reducer: ReducerHandle,
    pub store: Arc<dyn ArticleStore>,
    pub session: Arc<SessionHistory>,
}

impl AppState {
    pub fn new(reducer: ReducerHandle, store: Arc<dyn ArticleStore>) -> Self {
        Self {
            reducer,
            store,
            session: Arc::new(SessionHistory::new()),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/", get(service_info))
        .route("/filtering/stats", get(filtering_stats))
        .route("/webhook/miniflux/filtered", post(filtered_webhook))
        .route("/webhook/miniflux/test-filter", post(test_filter))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Handler errors: malformed payloads are the client's fault, the rest are ours.
#[derive(Debug)]
pub enum ApiError {
    Input(crate::error::Error),
    Internal(anyhow::Error),
}

impl From<crate::error::Error> for ApiError {
    fn from(e: crate::error::Error) -> Self {
        Self::Input(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Input(e) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string(), "kind": e.kind() })),
            )
                .into_response(),
            ApiError::Internal(e) => {
                error!(target: "api", error = ?e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": format!("filtering pipeline failed: {e}") })),
                )
                    .into_response()
            }
        }
    }
}

async fn service_info() -> Json<serde_json::Value> {
    Json(json!({
        "service": "News Volume Reducer",
        "version": env!("CARGO_PKG_VERSION"),
        "features": [
            "wire service filtering",
            "press release detection",
            "low value content filtering",
            "exact and fuzzy deduplication",
            "similarity window check"
        ],
        "status": "running"
    }))
}

#[derive(serde::Serialize)]
struct StatsOut {
    session_stats: SessionTotals,
    filter_config: FilteringStats,
    recent_batches: Vec<BatchRecord>,
}

async fn filtering_stats(State(state): State<AppState>) -> Json<StatsOut> {
    Json(StatsOut {
        session_stats: state.session.totals(),
        filter_config: state.reducer.current().filtering_stats(),
        recent_batches: state.session.snapshot_last_n(10),
    })
}

#[derive(serde::Serialize)]
struct FilteringSummary {
    input_articles: usize,
    filtered_out: usize,
    will_process: usize,
    reduction_percentage: f64,
}

#[derive(serde::Serialize)]
struct FilteredOut {
    status: &'static str,
    filtering_summary: FilteringSummary,
    stored_for_analysis: usize,
    malformed_entries: usize,
    filter_breakdown: BTreeMap<ReasonCode, usize>,
}

async fn filtered_webhook(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let parsed = parse_payload(&body)?;
    if !parsed.rejected.is_empty() {
        counter!("volume_reducer_malformed_total").increment(parsed.rejected.len() as u64);
    }
    if parsed.is_empty() {
        return Ok(Json(json!({ "status": "no_entries", "processed": 0 })).into_response());
    }

    let reducer = state.reducer.current();
    let lookback = reducer.config().lookback_days;
    let (accepted, stats) =
        run_batch(&reducer, state.store.as_ref(), parsed.items, lookback).await?;
    state.session.push(&stats, reducer.clock().now());

    let stored = state.store.store_accepted(&accepted).await?;

    Ok(Json(FilteredOut {
        status: "success",
        filtering_summary: FilteringSummary {
            input_articles: stats.total_input,
            filtered_out: stats.total_filtered,
            will_process: stats.processed,
            reduction_percentage: round1(stats.reduction_percentage()),
        },
        stored_for_analysis: stored,
        malformed_entries: parsed.rejected.len(),
        filter_breakdown: stats.non_zero_reasons(),
    })
    .into_response())
}

#[derive(serde::Serialize)]
struct TestResult {
    id: String,
    title: String,
    will_process: bool,
    filter_reasons: Vec<ReasonCode>,
}

#[derive(serde::Serialize)]
struct TestSummary {
    total_articles: usize,
    would_filter: usize,
    would_process: usize,
    reduction_percentage: f64,
}

#[derive(serde::Serialize)]
struct TestOut {
    test_results: Vec<TestResult>,
    summary: TestSummary,
    filter_breakdown: BTreeMap<ReasonCode, usize>,
}

/// Shows what would be filtered without storing anything or touching the live cache.
async fn test_filter(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let parsed = parse_payload(&body)?;
    if parsed.is_empty() {
        return Ok(Json(json!({ "status": "no_entries" })).into_response());
    }

    let dry = state.reducer.current().dry_run_copy();
    let lookback = dry.config().lookback_days;
    let since = lookback_start(dry.clock().now(), lookback);
    let window = state.store.recent_window(since).await?;
    let (verdicts, stats) = evaluate_batch(&dry, &parsed.items, &window, lookback);

    let test_results = parsed
        .items
        .iter()
        .zip(verdicts)
        .map(|(item, v)| TestResult {
            id: item.id.clone(),
            title: item.short_title(),
            will_process: v.accept,
            filter_reasons: v.reasons,
        })
        .collect();

    Ok(Json(TestOut {
        test_results,
        summary: TestSummary {
            total_articles: stats.total_input,
            would_filter: stats.total_filtered,
            would_process: stats.processed,
            reduction_percentage: round1(stats.reduction_percentage()),
        },
        filter_breakdown: stats.by_reason,
    })
    .into_response())
}
