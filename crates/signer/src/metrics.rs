use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::MessageSigner`].
#[derive(Metrics, Clone)]
#[metrics(scope = "signer")]
pub struct SignerMetrics {
    /// The signing duration.
    pub signing_duration: Histogram,
    /// The number of signing requests rejected by the underlying signer.
    pub signing_failures: Counter,
}
