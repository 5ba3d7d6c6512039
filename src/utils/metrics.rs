//! Operational metrics
//!
//! Atomic request counters for the `/api/stats` endpoint and the shutdown
//! summary. No request bodies or identifiers are recorded, only counts and
//! latencies.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Aggregated counters for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetricsSnapshot {
    /// Requests served (any status)
    pub requests_total: u64,
    /// Responses with a 4xx status
    pub client_errors: u64,
    /// Responses with a 5xx status
    pub server_errors: u64,
    /// Rejected logins and bad/expired tokens
    pub auth_failures: u64,
    /// Average handler latency in milliseconds
    pub avg_latency_ms: f64,
    /// Collection period start (unix seconds)
    pub period_start: u64,
    /// Snapshot time (unix seconds)
    pub period_end: u64,
}

/// Lock-free metrics collector shared across handlers and middleware
pub struct MetricsCollector {
    requests_total: AtomicU64,
    client_errors: AtomicU64,
    server_errors: AtomicU64,
    auth_failures: AtomicU64,
    total_latency_ms: AtomicU64,
    session_start: u64,
    export_dir: PathBuf,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::with_export_dir(PathBuf::from("./metrics"))
    }

    pub fn with_export_dir(export_dir: PathBuf) -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            client_errors: AtomicU64::new(0),
            server_errors: AtomicU64::new(0),
            auth_failures: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            session_start: current_timestamp(),
            export_dir,
        }
    }

    /// Record one served request
    pub fn record_request(&self, status: u16, latency_ms: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        match status {
            400..=499 => {
                self.client_errors.fetch_add(1, Ordering::Relaxed);
            }
            500..=599 => {
                self.server_errors.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    /// Record a rejected login or token
    pub fn record_auth_failure(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests_total = self.requests_total.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);
        let avg_latency_ms = if requests_total > 0 {
            total_latency as f64 / requests_total as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            requests_total,
            client_errors: self.client_errors.load(Ordering::Relaxed),
            server_errors: self.server_errors.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
            avg_latency_ms,
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
    }

    /// Write the current snapshot to a timestamped JSON file
    pub fn export_json(&self) -> Result<PathBuf, std::io::Error> {
        let snapshot = self.snapshot();
        fs::create_dir_all(&self.export_dir)?;
        let path = self
            .export_dir
            .join(format!("stats_{}.json", current_timestamp()));
        fs::write(&path, serde_json::to_string_pretty(&snapshot)?)?;
        Ok(path)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = MetricsCollector::new();
        metrics.record_request(200, 10);
        metrics.record_request(404, 20);
        metrics.record_request(500, 30);
        metrics.record_auth_failure();

        let snap = metrics.snapshot();
        assert_eq!(snap.requests_total, 3);
        assert_eq!(snap.client_errors, 1);
        assert_eq!(snap.server_errors, 1);
        assert_eq!(snap.auth_failures, 1);
        assert_eq!(snap.avg_latency_ms, 20.0);
    }

    #[test]
    fn test_empty_snapshot_latency() {
        let snap = MetricsCollector::new().snapshot();
        assert_eq!(snap.avg_latency_ms, 0.0);
        assert_eq!(snap.requests_total, 0);
    }
}
