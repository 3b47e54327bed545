//! API Request Handlers

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::types::*;
use crate::core::workflow::Scanner;
use crate::models::config::ScannerConfig;
use crate::models::errors::{AppError, ErrorCode};
use crate::utils::constants::APP_VERSION;
use crate::utils::telemetry::ScanTelemetry;

pub type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub scanner: Scanner,
    pub telemetry: Arc<ScanTelemetry>,
    pub scan_timeout: Duration,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(scanner: Scanner, config: &ScannerConfig, telemetry: Arc<ScanTelemetry>) -> Self {
        Self {
            scanner,
            telemetry,
            scan_timeout: config.scan_timeout,
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

fn failure(err: &AppError, start: Instant) -> ApiFailure {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))),
    )
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        fetch_mode: format!("{:?}", state.scanner.fetch_mode()).to_lowercase(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();

    let data = StatsData {
        scans: state.telemetry.snapshot(),
        uptime_seconds: state.uptime_seconds(),
        api_version: APP_VERSION.to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Scan
// ============================================

pub async fn scan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<ApiResponse<ScanData>>, ApiFailure> {
    let start = Instant::now();

    let query = req.query.trim();
    if query.is_empty() {
        return Err(failure(&AppError::bad_request("query must not be empty"), start));
    }

    // Dropping the scan future on timeout cancels in-flight collector calls
    let scan = state.scanner.run_scan(query, req.contract_address.as_deref());
    let scan_state = match tokio::time::timeout(state.scan_timeout, scan).await {
        Ok(scan_state) => scan_state,
        Err(_) => {
            let latency = start.elapsed().as_millis() as u64;
            state.telemetry.record_timeout(latency);
            warn!(query = %query, latency_ms = latency, "⏱️ Scan timed out");
            return Err(failure(
                &AppError::scan_timeout(state.scan_timeout.as_secs()),
                start,
            ));
        }
    };

    let latency = start.elapsed().as_millis() as u64;
    let contract_address = scan_state.contract_address().map(str::to_string);
    let protocol_slug = scan_state.protocol_slug().map(str::to_string);

    match scan_state.into_outcome() {
        Ok(report) => {
            state.telemetry.record_completed(report.risk_level, latency);
            info!(
                query = %query,
                score = report.overall_score,
                level = %report.risk_level,
                latency_ms = latency,
                "✅ Scan served"
            );
            Ok(Json(ApiResponse::success(
                ScanData {
                    query: query.to_string(),
                    contract_address,
                    protocol_slug,
                    report,
                },
                elapsed_ms(start),
            )))
        }
        Err(error) => {
            state.telemetry.record_failed(latency);
            Err(failure(&AppError::new(ErrorCode::ScanUnresolved, error), start))
        }
    }
}
