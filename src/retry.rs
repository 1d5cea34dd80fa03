//! Bounded-retry attempt loop.
//!
//! All polling DOM operations are built on [`run_attempts`]: run an action,
//! test its result against a success predicate, sleep, repeat until the
//! predicate accepts or the deadline elapses.
//!
//! The loop always resolves with a value of the action's result type. On
//! timeout it resolves with the **last observed result** rather than a
//! distinct timeout error; the caller inspects the returned value to infer
//! success or failure. `check_existence` returning `0` therefore does not
//! distinguish "no elements ever existed" from "elements never appeared in
//! time".

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::time::{Instant, sleep};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout budget for a polling DOM operation (10 seconds).
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Delay between consecutive attempts.
pub const ATTEMPT_INTERVAL: Duration = Duration::from_millis(200);

// ============================================================================
// Attempt Loop
// ============================================================================

/// Runs `action` until `success` accepts its result or `timeout` elapses.
///
/// The first attempt always happens, even for a zero timeout. The deadline is
/// measured on a monotonic clock and checked only between attempts; an attempt
/// already in progress is never interrupted. Once started the loop cannot be
/// cancelled by the caller.
///
/// # Example
///
/// ```ignore
/// let count = run_attempts(
///     || document.lock().count_matching(&selector),
///     |count| *count > 0,
///     ATTEMPT_INTERVAL,
///     DEFAULT_OPERATION_TIMEOUT,
/// )
/// .await;
/// ```
pub async fn run_attempts<R, A, P>(mut action: A, success: P, interval: Duration, timeout: Duration) -> R
where
    A: FnMut() -> R,
    P: Fn(&R) -> bool,
{
    let start = Instant::now();
    let mut last = action();

    loop {
        if success(&last) {
            return last;
        }
        sleep(interval).await;
        last = action();
        if start.elapsed() >= timeout {
            return last;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
