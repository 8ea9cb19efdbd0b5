// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the document store.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `docstore_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `operation`: find_list, find_paged_list, find_each, get_by_id, create_index, ...
//! - `status`: success, error
//! - `kind`: error kind label from [`crate::DocStoreError::kind`]

use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

/// Record a facade operation outcome
pub fn record_operation(operation: &str, status: &str) {
    counter!(
        "docstore_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record operation latency
pub fn record_latency(operation: &str, duration: Duration) {
    histogram!(
        "docstore_operation_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record an error by kind
pub fn record_error(operation: &str, kind: &str) {
    counter!(
        "docstore_errors_total",
        "operation" => operation.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record compiled query size
pub fn record_query_bytes(bytes: usize) {
    histogram!("docstore_query_bytes").record(bytes as f64);
}

/// Record hits materialized from one page
pub fn record_page_hits(count: usize) {
    histogram!("docstore_page_hits").record(count as f64);
}

// ═══════════════════════════════════════════════════════════════════════════
// SCROLL - cursor lifecycle
// ═══════════════════════════════════════════════════════════════════════════

/// Record a scroll continuation round
pub fn record_scroll_round() {
    counter!("docstore_scroll_rounds_total").increment(1);
}

/// Record records delivered by one scroll session
pub fn record_scroll_records(count: usize) {
    histogram!("docstore_scroll_records").record(count as f64);
}

/// Record a cursor release attempt
pub fn record_cursor_release(count: usize, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "docstore_cursor_releases_total",
        "status" => status
    )
    .increment(1);
    histogram!("docstore_cursors_released").record(count as f64);
}

/// Track a scroll session opening
pub fn record_scroll_opened() {
    gauge!("docstore_open_scrolls").increment(1.0);
}

/// Track a scroll session closing
pub fn record_scroll_closed() {
    gauge!("docstore_open_scrolls").decrement(1.0);
}

/// Record index creation/drop/alias
pub fn record_index_operation(operation: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "docstore_index_operations_total",
        "operation" => operation.to_string(),
        "status" => status
    )
    .increment(1);
}

/// A timing guard that records latency on drop
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.operation, self.start.elapsed());
    }
}

/// Convenience macro for timing operations
#[macro_export]
macro_rules! time_operation {
    ($op:expr) => {
        $crate::metrics::LatencyTimer::new($op)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests verify the API doesn't panic without an installed recorder.

    #[test]
    fn test_record_operation() {
        record_operation("find_list", "success");
        record_operation("get_by_id", "error");
        record_error("get_by_id", "wire_protocol");
    }

    #[test]
    fn test_record_latency() {
        record_latency("find_list", Duration::from_micros(100));
        record_latency("find_each", Duration::from_millis(50));
    }

    #[test]
    fn test_scroll_metrics() {
        record_scroll_round();
        record_scroll_records(250);
        record_cursor_release(3, true);
        record_cursor_release(1, false);
        record_scroll_opened();
        record_scroll_closed();
    }

    #[test]
    fn test_query_and_page_metrics() {
        record_query_bytes(512);
        record_page_hits(100);
        record_index_operation("create", true);
    }

    #[test]
    fn test_latency_timer() {
        {
            let _timer = LatencyTimer::new("find_list");
            std::thread::sleep(Duration::from_micros(10));
        }
        // Timer recorded on drop
        let _timer = time_operation!("get_by_id");
    }
}
