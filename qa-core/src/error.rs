//! Error taxonomy for the execution core, mapped to HTTP status at the `qa-serve`
//! boundary rather than here — this crate stays transport-agnostic.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider does not support this operation: {0}")]
    Unsupported(&'static str),
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider returned an unusable response: {0}")]
    BadResponse(String),
}

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("unknown test case: {0}")]
    UnknownTestCase(String),
    #[error("account {0} does not exist on this project")]
    UnknownAccount(String),
    #[error("no account satisfies the requirement for test case {0}")]
    NoEligibleAccount(String),
    #[error("run {0} was stopped")]
    Stopped(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Error, Debug)]
pub enum AiJobError {
    #[error("project {0} already has {1} queued/running AI jobs, the cap is {2}")]
    QueueFull(String, usize, usize),
    #[error("job {0} was not claimable (already running or completed)")]
    NotClaimable(String),
    #[error("account {0} did not become available before the deadline")]
    AccountWaitTimedOut(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
