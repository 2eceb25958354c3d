//! Telemetry Module for Wallet Scout
//!
//! Process-lifetime counters for monitoring: analyses served, cache hits,
//! rejections by error code, average pipeline latency.
//!
//! Privacy-first: no wallet addresses or client keys are stored.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::models::errors::ErrorCode;

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryStats {
    /// Freshly computed analyses
    pub total_analyzed: u64,
    /// Analyses answered from cache
    pub total_cached: u64,
    /// Failed requests, keyed by error code
    pub failures_by_code: HashMap<String, u64>,
    /// Average latency of fresh analyses (ms)
    pub avg_latency_ms: f64,
    /// Enrichment lookups that came back unknown
    pub unknown_code_lookups: u64,
}

/// Lock-light collector shared by the analyzer and the API
#[derive(Debug, Default)]
pub struct TelemetryCollector {
    analyzed: AtomicU64,
    cached: AtomicU64,
    latency_sum_ms: AtomicU64,
    unknown_lookups: AtomicU64,
    failures: RwLock<HashMap<ErrorCode, u64>>,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly computed analysis
    pub fn record_analysis(&self, latency_ms: u64) {
        self.analyzed.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cached.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unknown_lookups(&self, count: u64) {
        if count > 0 {
            self.unknown_lookups.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn record_failure(&self, code: ErrorCode) {
        if let Ok(mut failures) = self.failures.write() {
            *failures.entry(code).or_insert(0) += 1;
        }
    }

    pub fn get_stats(&self) -> TelemetryStats {
        let total_analyzed = self.analyzed.load(Ordering::Relaxed);
        let latency_sum = self.latency_sum_ms.load(Ordering::Relaxed);
        let avg_latency_ms = if total_analyzed > 0 {
            latency_sum as f64 / total_analyzed as f64
        } else {
            0.0
        };

        let failures_by_code = self
            .failures
            .read()
            .map(|f| f.iter().map(|(code, n)| (code.as_str().to_string(), *n)).collect())
            .unwrap_or_default();

        TelemetryStats {
            total_analyzed,
            total_cached: self.cached.load(Ordering::Relaxed),
            failures_by_code,
            avg_latency_ms,
            unknown_code_lookups: self.unknown_lookups.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_aggregate() {
        let t = TelemetryCollector::new();
        t.record_analysis(100);
        t.record_analysis(300);
        t.record_cache_hit();
        t.record_failure(ErrorCode::RateLimited);
        t.record_failure(ErrorCode::RateLimited);
        t.record_failure(ErrorCode::UpstreamFailure);
        t.record_unknown_lookups(0);
        t.record_unknown_lookups(3);

        let stats = t.get_stats();
        assert_eq!(stats.total_analyzed, 2);
        assert_eq!(stats.total_cached, 1);
        assert!((stats.avg_latency_ms - 200.0).abs() < f64::EPSILON);
        assert_eq!(stats.failures_by_code.get("API_RATE_LIMITED"), Some(&2));
        assert_eq!(stats.failures_by_code.get("UPSTREAM_FAILURE"), Some(&1));
        assert_eq!(stats.unknown_code_lookups, 3);
    }

    #[test]
    fn test_empty_stats() {
        let stats = TelemetryCollector::new().get_stats();
        assert_eq!(stats.total_analyzed, 0);
        assert_eq!(stats.avg_latency_ms, 0.0);
        assert!(stats.failures_by_code.is_empty());
    }
}
