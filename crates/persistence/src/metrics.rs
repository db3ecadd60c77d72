//! Store operation timing metrics.

use metrics::histogram;
use std::time::Instant;

/// Times a single store operation and records its duration.
pub struct StoreTimer {
    operation: &'static str,
    start: Instant,
}

impl StoreTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time under `store_operation_duration_seconds`.
    pub fn record(self) {
        histogram!(
            "store_operation_duration_seconds",
            "operation" => self.operation
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_records_without_panic() {
        let timer = StoreTimer::new("test_operation");
        timer.record();
    }
}
