use std::fmt::Display;
use std::future::Future;

use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;

const RETRY_DELAY_MS: u64 = 100;

/// Runs `attempt`, and runs it a second time when the first error is
/// classified as transient. Never more than two attempts.
pub async fn retry_once<T, E, F, Fut, P>(
    upstream: &str,
    is_transient: P,
    attempt: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let strategy = FixedInterval::from_millis(RETRY_DELAY_MS).take(1);
    let mut failures = 0u32;
    let condition = |err: &E| {
        failures += 1;
        let transient = is_transient(err);
        if transient && failures == 1 {
            tracing::warn!(upstream, error = %err, "transient upstream failure, retrying once");
        }
        transient
    };

    RetryIf::spawn(strategy, attempt, condition).await
}
