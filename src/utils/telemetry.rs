//! Scan telemetry
//!
//! Process-wide counters for the HTTP surface: how many scans ran, how they
//! ended and how long they took. Nothing about the query itself is kept.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::types::RiskLevel;

/// Snapshot of the counters
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub total_scans: u64,
    pub completed: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub high_risk: u64,
    pub medium_risk: u64,
    pub low_risk: u64,
    pub avg_latency_ms: f64,
    pub session_start: u64,
}

impl ScanStats {
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{:.2}\n",
            self.session_start,
            self.total_scans,
            self.completed,
            self.failed,
            self.timed_out,
            self.high_risk,
            self.medium_risk,
            self.avg_latency_ms,
        )
    }
}

pub struct ScanTelemetry {
    total_scans: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    high_risk: AtomicU64,
    medium_risk: AtomicU64,
    low_risk: AtomicU64,
    total_latency_ms: AtomicU64,
    session_start: u64,
}

impl Default for ScanTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanTelemetry {
    pub fn new() -> Self {
        Self {
            total_scans: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            timed_out: AtomicU64::new(0),
            high_risk: AtomicU64::new(0),
            medium_risk: AtomicU64::new(0),
            low_risk: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            session_start: current_timestamp(),
        }
    }

    fn record_latency(&self, latency_ms: u64) {
        self.total_scans.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    pub fn record_completed(&self, level: RiskLevel, latency_ms: u64) {
        self.record_latency(latency_ms);
        self.completed.fetch_add(1, Ordering::Relaxed);
        let bucket = match level {
            RiskLevel::High => &self.high_risk,
            RiskLevel::Medium => &self.medium_risk,
            RiskLevel::Low => &self.low_risk,
        };
        bucket.fetch_add(1, Ordering::Relaxed);
    }

    /// Resolution failure
    pub fn record_failed(&self, latency_ms: u64) {
        self.record_latency(latency_ms);
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self, latency_ms: u64) {
        self.record_latency(latency_ms);
        self.timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ScanStats {
        let total = self.total_scans.load(Ordering::Relaxed);
        let latency = self.total_latency_ms.load(Ordering::Relaxed);

        ScanStats {
            total_scans: total,
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            high_risk: self.high_risk.load(Ordering::Relaxed),
            medium_risk: self.medium_risk.load(Ordering::Relaxed),
            low_risk: self.low_risk.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                latency as f64 / total as f64
            } else {
                0.0
            },
            session_start: self.session_start,
        }
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
