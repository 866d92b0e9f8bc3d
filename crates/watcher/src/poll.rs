//! Bounded polling of eventually-consistent rollup state.

use crate::WatcherError;

use std::{future::Future, time::Duration};
use tokio::time::Instant;

/// The default polling timeout.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// The default interval between two checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// How long and how often a condition is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// The total time budget.
    pub timeout: Duration,
    /// The delay between two checks.
    pub interval: Duration,
    /// Whether exhausting the budget is an error rather than a [`Outcome::NotObserved`].
    pub fatal_on_timeout: bool,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POLL_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
            fatal_on_timeout: false,
        }
    }
}

impl PollPolicy {
    /// Creates a new non fatal [`PollPolicy`].
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval, fatal_on_timeout: false }
    }

    /// Returns the policy, failing with [`WatcherError::CommitTimeout`] on exhaustion.
    pub const fn fatal(mut self) -> Self {
        self.fatal_on_timeout = true;
        self
    }
}

/// The outcome of a non fatal poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The condition was observed.
    Observed(T),
    /// The time budget was exhausted.
    NotObserved {
        /// The time spent polling.
        elapsed: Duration,
    },
}

impl<T> Outcome<T> {
    /// Returns the observed value, if any.
    pub fn observed(self) -> Option<T> {
        match self {
            Self::Observed(value) => Some(value),
            Self::NotObserved { .. } => None,
        }
    }

    /// Maps the observed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Observed(value) => Outcome::Observed(f(value)),
            Self::NotObserved { elapsed } => Outcome::NotObserved { elapsed },
        }
    }

    /// Returns true if the condition was observed.
    pub const fn is_observed(&self) -> bool {
        matches!(self, Self::Observed(_))
    }
}

/// Calls `check` until it returns a value, sleeping `policy.interval` between calls and giving up
/// once `policy.timeout` has elapsed.
///
/// Each check is bounded by the remaining budget, so a stalled check ends the poll at the timeout.
/// Errors returned by `check` are propagated without retrying. Dropping the returned future stops
/// the polling.
pub async fn poll<F, Fut, T, E>(
    policy: &PollPolicy,
    operation: &'static str,
    mut check: F,
) -> Result<Outcome<T>, WatcherError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    WatcherError: From<E>,
{
    let start = Instant::now();
    let mut attempt: usize = 0;

    loop {
        attempt += 1;
        let remaining = policy.timeout.saturating_sub(start.elapsed());
        match tokio::time::timeout(remaining, check()).await {
            Ok(res) => {
                if let Some(value) = res? {
                    return Ok(Outcome::Observed(value));
                }
            }
            Err(_) => {
                tracing::debug!(target: "rollup_client::watcher", operation, attempt, "Check stalled past the poll budget");
            }
        }

        let elapsed = start.elapsed();
        if elapsed >= policy.timeout {
            tracing::debug!(target: "rollup_client::watcher", operation, attempt, ?elapsed, "Poll budget exhausted");
            if policy.fatal_on_timeout {
                return Err(WatcherError::CommitTimeout { operation, elapsed });
            }
            return Ok(Outcome::NotObserved { elapsed });
        }

        tracing::trace!(target: "rollup_client::watcher", operation, attempt, "Condition not observed yet");
        tokio::time::sleep(policy.interval.min(policy.timeout - elapsed)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[tokio::test(start_paused = true)]
    async fn test_observed_after_misses() {
        let attempt = RefCell::new(0);
        let policy = PollPolicy::new(Duration::from_secs(10), Duration::from_secs(1));
        let start = Instant::now();

        let outcome = poll(&policy, "test_operation", || {
            *attempt.borrow_mut() += 1;
            let current_attempt = *attempt.borrow();
            async move { Ok::<_, WatcherError>((current_attempt > 3).then_some(42)) }
        })
        .await
        .unwrap();

        assert_eq!(outcome, Outcome::Observed(42));
        assert_eq!(*attempt.borrow(), 4);
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_observed_at_timeout() {
        let attempt = RefCell::new(0);
        let policy = PollPolicy::new(Duration::from_secs(10), Duration::from_secs(3));

        let outcome = poll(&policy, "test_operation", || {
            *attempt.borrow_mut() += 1;
            async move { Ok::<Option<u32>, WatcherError>(None) }
        })
        .await
        .unwrap();

        let Outcome::NotObserved { elapsed } = outcome else { panic!("expected exhaustion") };
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_secs(11));
        // checks at 0, 3, 6, 9 and 10 seconds.
        assert_eq!(*attempt.borrow(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_timeout() {
        let policy = PollPolicy::new(Duration::from_secs(2), Duration::from_secs(1)).fatal();
        let res = poll(&policy, "commit", || async { Ok::<Option<u32>, WatcherError>(None) }).await;

        assert!(matches!(
            res,
            Err(WatcherError::CommitTimeout { operation: "commit", elapsed })
                if elapsed >= Duration::from_secs(2)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_check_is_bounded_by_timeout() {
        let policy = PollPolicy::new(Duration::from_secs(2), Duration::from_secs(1));
        let start = Instant::now();

        let outcome = poll(&policy, "test_operation", || {
            std::future::pending::<Result<Option<u32>, WatcherError>>()
        })
        .await
        .unwrap();

        let Outcome::NotObserved { elapsed } = outcome else { panic!("expected exhaustion") };
        assert_eq!(elapsed, Duration::from_secs(2));
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_check_fatal_timeout() {
        let policy = PollPolicy::new(Duration::from_secs(2), Duration::from_secs(1)).fatal();

        let res = poll(&policy, "commit", || {
            std::future::pending::<Result<Option<u32>, WatcherError>>()
        })
        .await;

        assert!(matches!(res, Err(WatcherError::CommitTimeout { operation: "commit", .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_error_is_propagated() {
        let attempt = RefCell::new(0);
        let policy = PollPolicy::default();

        let res = poll(&policy, "test_operation", || {
            *attempt.borrow_mut() += 1;
            async {
                Err::<Option<u32>, _>(WatcherError::L1TransactionRejected(Default::default()))
            }
        })
        .await;

        assert!(res.is_err());
        assert_eq!(*attempt.borrow(), 1);
    }
}
