use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::FinalityWaiter`].
#[derive(Metrics, Clone)]
#[metrics(scope = "finality_waiter")]
pub struct WatcherMetrics {
    /// A counter on the awaited conditions that were observed.
    pub observed: Counter,
    /// A counter on the awaited conditions that were not observed in time.
    pub not_observed: Counter,
    /// A histogram of the time spent waiting.
    pub wait_duration: Histogram,
}

impl WatcherMetrics {
    /// Records the result of a wait.
    pub fn record<T, E>(&self, result: &Result<crate::Outcome<T>, E>, elapsed: f64) {
        self.wait_duration.record(elapsed);
        match result {
            Ok(crate::Outcome::Observed(_)) => self.observed.increment(1),
            _ => self.not_observed.increment(1),
        }
    }
}
