use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::TransactionAssembler`].
#[derive(Metrics, Clone)]
#[metrics(scope = "transaction_assembler")]
pub struct AssemblerMetrics {
    /// The number of submissions accepted by the rollup.
    pub submissions: Counter,
    /// The number of submissions rejected by the rollup.
    pub rejections: Counter,
    /// The number of submissions that failed in transport.
    pub transport_failures: Counter,
    /// The duration from intent to submission.
    pub assembly_duration: Histogram,
}
