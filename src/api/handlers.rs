//! API Request Handlers

use axum::{
    extract::{Json, Path, State},
    http::{header::RETRY_AFTER, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use super::middleware::client_key;
use super::types::*;
use crate::core::analyzer::WalletAnalyzer;
use crate::models::errors::AppError;
use crate::models::types::AnalysisOutcome;
use crate::providers::source::ChainDataSource;

/// Shared application state
pub struct AppState<S: ChainDataSource> {
    pub analyzer: Arc<WalletAnalyzer<S>>,
    pub start_time: Instant,
}

impl<S: ChainDataSource> AppState<S> {
    pub fn new(analyzer: Arc<WalletAnalyzer<S>>) -> Self {
        Self {
            analyzer,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Map an AppError to status + envelope (+ Retry-After when rate limited)
pub fn error_response(err: &AppError, latency_ms: f64) -> Response {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (
        status,
        Json(ApiResponse::error(ApiError::from(err), latency_ms)),
    )
        .into_response();

    if let Some(retry_after) = err.retry_after {
        // Header is whole seconds, rounded up
        let secs = (retry_after.as_millis() as u64).div_ceil(1000);
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(secs));
    }
    response
}

// ============================================
// Health Check
// ============================================

pub async fn health_check<S: ChainDataSource>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats<S: ChainDataSource>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();

    let data = StatsData {
        telemetry: state.analyzer.telemetry().get_stats(),
        cache: state.analyzer.cache().stats(),
        uptime_seconds: state.uptime_seconds(),
        api_version: "v1".to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Wallet Analysis
// ============================================

async fn run_analysis<S: ChainDataSource>(
    state: &AppState<S>,
    headers: &HeaderMap,
    address: &str,
) -> Result<Json<ApiResponse<AnalysisOutcome>>, Response> {
    let start = Instant::now();
    let client = client_key(headers);

    match state.analyzer.analyze(&client, address).await {
        Ok(outcome) => Ok(Json(ApiResponse::success(outcome, elapsed_ms(start)))),
        Err(err) => {
            warn!(code = err.code_str(), "Analysis rejected: {}", err.message);
            Err(error_response(&err, elapsed_ms(start)))
        }
    }
}

/// `GET /v1/analyze/:address`
pub async fn analyze_path<S: ChainDataSource>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<AnalysisOutcome>>, Response> {
    run_analysis(&state, &headers, &address).await
}

/// `POST /v1/analyze` with `{"address": "0x..."}`
pub async fn analyze_body<S: ChainDataSource>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalysisOutcome>>, Response> {
    run_analysis(&state, &headers, &req.address).await
}
