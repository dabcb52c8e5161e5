//! Tuning constants for the scheduler, AI job queue, and rate limiter.
//!
//! Each has a `*_env()` accessor that reads an override from the environment and falls
//! back to the constant, so operators can tune them without a rebuild while the defaults
//! stay the documented contract.

use std::time::Duration;

/// Minimum and maximum persisted parallelism.
pub const PARALLELISM_MIN: u32 = 1;
pub const PARALLELISM_MAX: u32 = 250;
pub const PARALLELISM_DEFAULT: u32 = 3;

/// Accounts per project cap.
pub const MAX_ACCOUNTS_PER_PROJECT: usize = 20;

/// Retained test runs per project, newest first.
pub const MAX_RETAINED_RUNS_PER_PROJECT: usize = 50;

/// Retained AI jobs per project, newest first.
pub const MAX_AI_JOBS_PER_PROJECT: usize = 30;

/// Scheduler's wait-for-account retry cadence.
pub const SCHEDULER_RETRY_INTERVAL: Duration = Duration::from_millis(350);

/// AI pipeline's per-job account-wait poll interval.
pub const AI_ACCOUNT_POLL_INTERVAL: Duration = Duration::from_millis(350);

/// Threshold after which a `running` AI job is considered stale and reclaimable.
/// Treated as a configurable constant rather than a fixed contract.
pub const STALE_JOB_THRESHOLD: Duration = Duration::from_secs(10 * 60);

/// Same deadline, used as the account-wait timeout in `run_claimed_job`.
pub const AI_ACCOUNT_WAIT_DEADLINE: Duration = STALE_JOB_THRESHOLD;

/// Exploration candidate bounds: 1 to 10 synthesized drafts per job.
pub const MIN_SYNTHESIZED_DRAFTS: usize = 1;
pub const MAX_SYNTHESIZED_DRAFTS: usize = 10;

/// Jaccard similarity thresholds for draft deduplication.
pub const DEDUPE_NEAR_DUPLICATE_THRESHOLD: f64 = 0.88;
pub const DEDUPE_POTENTIAL_OVERLAP_THRESHOLD: f64 = 0.72;

/// Opportunistic drain size for `GET /v1/generate/status`.
pub const STATUS_DRAIN_LIMIT: usize = 2;

/// Per-caller sliding-window rate limits.
pub const RATE_LIMIT_EXECUTE_PER_MINUTE: u32 = 20;
pub const RATE_LIMIT_STOP_PER_MINUTE: u32 = 30;
pub const RATE_LIMIT_GENERATE_PER_MINUTE: u32 = 20;
pub const RATE_LIMIT_GENERATE_STATUS_PER_MINUTE: u32 = 120;

fn env_duration_ms(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

/// Reads `QA_STALE_JOB_THRESHOLD_MS` if set, else the documented 10-minute default.
pub fn stale_job_threshold() -> Duration {
    env_duration_ms("QA_STALE_JOB_THRESHOLD_MS", STALE_JOB_THRESHOLD)
}

/// Reads `QA_SCHEDULER_RETRY_INTERVAL_MS` if set, else the documented 350ms default.
pub fn scheduler_retry_interval() -> Duration {
    env_duration_ms("QA_SCHEDULER_RETRY_INTERVAL_MS", SCHEDULER_RETRY_INTERVAL)
}

/// Reads `QA_RATE_LIMIT_EXECUTE_PER_MINUTE` if set, else the documented default.
pub fn rate_limit_execute_per_minute() -> u32 {
    env_u32(
        "QA_RATE_LIMIT_EXECUTE_PER_MINUTE",
        RATE_LIMIT_EXECUTE_PER_MINUTE,
    )
}

/// Clamps a requested parallelism value to `[PARALLELISM_MIN, PARALLELISM_MAX]`,
/// defaulting non-numeric/missing input to `PARALLELISM_DEFAULT`.
pub fn clamp_parallelism(value: Option<u32>) -> u32 {
    match value {
        None => PARALLELISM_DEFAULT,
        Some(v) => v.clamp(PARALLELISM_MIN, PARALLELISM_MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_parallelism_defaults_when_missing() {
        assert_eq!(clamp_parallelism(None), PARALLELISM_DEFAULT);
    }

    #[test]
    fn clamp_parallelism_clamps_bounds() {
        assert_eq!(clamp_parallelism(Some(0)), PARALLELISM_MIN);
        assert_eq!(clamp_parallelism(Some(1000)), PARALLELISM_MAX);
        assert_eq!(clamp_parallelism(Some(42)), 42);
    }
}
