//! Concurrent test execution core: the account-aware scheduler, the browser provider
//! abstraction, the AI generation job queue, and draft deduplication.
//!
//! This crate holds no persistence and no HTTP surface — those live in `qa-store` and
//! `qa-serve` respectively.

pub mod ai_jobs;
pub mod dedupe;
pub mod error;
pub mod llm;
pub mod locks;
pub mod model;
pub mod poll;
pub mod prompt;
pub mod provider;
pub mod runs;
pub mod scheduler;

pub use error::{AiJobError, ProviderError, SchedulerError};
pub use locks::{AccountLockGuard, AccountLockRegistry};
pub use runs::{ActiveRunRegistry, CancellationHandle};
pub use scheduler::{run_schedule, ResolvedAccount, SchedulerInput};
