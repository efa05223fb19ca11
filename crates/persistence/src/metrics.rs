//! Gateway request metrics.
//!
//! Provides functions for recording backend request metrics.

use metrics::{counter, histogram};
use std::time::Instant;

/// Record the outcome of one backend request.
pub fn record_request(operation: &str, outcome: &str, duration_secs: f64) {
    counter!(
        "gateway_requests_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// A helper to time backend requests and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = RequestTimer::new("fetch_items");
/// let result = client.get(...).await;
/// timer.finish(if result.is_ok() { "success" } else { "error" });
/// ```
pub struct RequestTimer {
    operation: String,
    start: Instant,
}

impl RequestTimer {
    /// Create a new timer for the given operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration with the given outcome label.
    pub fn finish(self, outcome: &str) {
        let duration = self.start.elapsed().as_secs_f64();
        record_request(&self.operation, outcome, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_timer_creation() {
        let timer = RequestTimer::new("fetch_items");
        assert_eq!(timer.operation, "fetch_items");
    }

    #[test]
    fn test_finish_without_recorder() {
        RequestTimer::new(String::from("delete_item")).finish("success");
    }
}
