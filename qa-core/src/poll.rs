//! Shared retry-via-timer pattern: both the scheduler and the AI job queue wait for an
//! account to free up by polling on a fixed cadence rather than queuing on the lock
//! registry, so a stopped run or a cancelled job always notices promptly instead of
//! waiting on a FIFO behind unrelated work.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready,
    Cancelled,
    TimedOut,
}

/// Polls `is_ready` every `interval` until it returns true, `cancel` fires, or `deadline`
/// elapses (if given). Never busy-loops: always sleeps at least one `interval` between checks.
pub async fn wait_until<F>(
    mut is_ready: F,
    interval: Duration,
    cancel: &CancellationToken,
    deadline: Option<Duration>,
) -> WaitOutcome
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    loop {
        if is_ready() {
            return WaitOutcome::Ready;
        }
        if cancel.is_cancelled() {
            return WaitOutcome::Cancelled;
        }
        if let Some(deadline) = deadline {
            if start.elapsed() >= deadline {
                return WaitOutcome::TimedOut;
            }
        }
        tokio::select! {
            _ = sleep(interval) => {}
            _ = cancel.cancelled() => return WaitOutcome::Cancelled,
        }
    }
}
