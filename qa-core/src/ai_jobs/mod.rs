//! AI generation job queue: claim → run → synthesize → dedupe.
//!
//! This module is deliberately store-agnostic: callers (`qa-store`/`qa-serve`) own the
//! `TeamState` document and persist it; these functions take the pieces they need, mutate
//! or return what changed, and the caller writes it back through the store's single-row
//! upsert, which is the only serialization point the queue relies on.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use qa_config::constants::{AI_ACCOUNT_POLL_INTERVAL, AI_ACCOUNT_WAIT_DEADLINE, STATUS_DRAIN_LIMIT};
use qa_protocol::AccountRequirement;
use tokio_util::sync::CancellationToken;

use crate::dedupe::{self, DedupeClassification, ExistingDraft};
use crate::error::AiJobError;
use crate::llm::{DraftCandidate, LlmGenerator};
use crate::locks::AccountLockRegistry;
use crate::model::{
    AiGenerationJob, DraftStatus, GeneratedTestDraft, JobStatus, ProviderKey, TestCase,
};
use crate::poll::{wait_until, WaitOutcome};
use crate::provider::{BrowserProvider, ExecuteTestInput, ProviderCallbacks};
use crate::scheduler::{scan_pool_for_free, ResolvedAccount};

/// A claimed job paired with the index it occupied, so the caller can write it back.
pub struct ClaimedJob {
    pub job: AiGenerationJob,
}

/// Finds the first claimable job — `Queued`, or `Running` and stale — preferring
/// `target_job_id` if given and itself claimable, else earliest `created_at`. Mutates the
/// queue in place and returns the claimed job.
pub fn claim_next_job(
    jobs: &mut VecDeque<AiGenerationJob>,
    target_job_id: Option<&str>,
    stale_threshold: Duration,
) -> Option<ClaimedJob> {
    let now = Utc::now();
    let threshold = chrono::Duration::from_std(stale_threshold).unwrap_or(chrono::Duration::zero());

    let index = if let Some(target) = target_job_id {
        jobs.iter()
            .position(|j| j.id == target && j.is_claimable(now, threshold))
    } else {
        jobs.iter()
            .enumerate()
            .filter(|(_, j)| j.is_claimable(now, threshold))
            .min_by_key(|(_, j)| j.created_at)
            .map(|(i, _)| i)
    }?;

    let job = jobs.get_mut(index)?;
    job.status = JobStatus::Running;
    job.started_at = Some(now);
    job.progress_message =
        Some("AI is now checking your app to determine best test cases.".to_string());
    Some(ClaimedJob { job: job.clone() })
}

/// Everything `run_claimed_job` needs besides the job itself. Grouped into one struct of
/// read-only lookups the caller already has loaded.
pub struct RunClaimedJobContext<'a> {
    pub website_url: String,
    pub provider: Arc<dyn BrowserProvider>,
    pub generator: Arc<dyn LlmGenerator>,
    pub registry: AccountLockRegistry,
    pub cancel: CancellationToken,
    pub accounts: &'a [ResolvedAccount],
    /// Accounts with an authenticated provider profile already in place — preferred for
    /// `Any`-requirement jobs over the rest of the pool, same as the scheduler.
    pub preferred_account_ids: &'a [String],
    pub existing_test_cases: &'a [TestCase],
    pub existing_drafts: &'a [GeneratedTestDraft],
}

pub struct RunClaimedJobOutcome {
    pub job: AiGenerationJob,
    pub new_drafts: Vec<GeneratedTestDraft>,
}

struct NoopCallbacks;

#[async_trait::async_trait]
impl ProviderCallbacks for NoopCallbacks {
    async fn on_streaming_url(&self, _streaming_url: &str, _recording_url: Option<&str>) {}
    async fn on_task_created(&self, _task_id: &str, _session_id: &str) {}
    async fn on_step(&self, _current_step: u32, _total_steps: u32, _description: &str) {}
}

/// Runs a claimed job end to end. If the job requires a specific or any account and none
/// becomes free before the deadline, fails
/// the job rather than hanging indefinitely.
pub async fn run_claimed_job(
    mut job: AiGenerationJob,
    ctx: RunClaimedJobContext<'_>,
) -> RunClaimedJobOutcome {
    let mut held_account: Option<crate::locks::AccountLockGuard> = None;
    let mut resolved_account_id: Option<String> = None;

    let account_map: HashMap<String, ResolvedAccount> = ctx
        .accounts
        .iter()
        .map(|a| (a.id.clone(), a.clone()))
        .collect();
    let all_account_ids: Vec<String> = ctx.accounts.iter().map(|a| a.id.clone()).collect();

    if !matches!(job.account_requirement, AccountRequirement::None) {
        let wait_result = match &job.account_requirement {
            AccountRequirement::Specific(id) => {
                let id = id.clone();
                wait_until(
                    || {
                        ctx.registry
                            .try_acquire(&id)
                            .map(|g| {
                                held_account = Some(g);
                                resolved_account_id = Some(id.clone());
                            })
                            .is_some()
                    },
                    AI_ACCOUNT_POLL_INTERVAL,
                    &ctx.cancel,
                    Some(AI_ACCOUNT_WAIT_DEADLINE),
                )
                .await
            }
            AccountRequirement::Any => {
                // Round robin like the scheduler's preferred-then-fallback draw, but the
                // cursor is seeded from the job's created_at rather than persisted, so
                // concurrently-polling workers don't all start their scan at the same slot.
                let seed = job.created_at.timestamp_millis().unsigned_abs() as usize;
                wait_until(
                    || {
                        let candidate = scan_pool_for_free(ctx.preferred_account_ids, seed, &ctx.registry)
                            .or_else(|| scan_pool_for_free(&all_account_ids, seed, &ctx.registry))
                            .map(|(_, id)| id);
                        match candidate.and_then(|id| ctx.registry.try_acquire(&id).map(|g| (id, g))) {
                            Some((id, guard)) => {
                                held_account = Some(guard);
                                resolved_account_id = Some(id);
                                true
                            }
                            None => false,
                        }
                    },
                    AI_ACCOUNT_POLL_INTERVAL,
                    &ctx.cancel,
                    Some(AI_ACCOUNT_WAIT_DEADLINE),
                )
                .await
            }
            AccountRequirement::None => unreachable!(),
        };

        match wait_result {
            WaitOutcome::Ready => {}
            WaitOutcome::Cancelled => {
                return fail_job(job, "The run was stopped before an account became available.");
            }
            WaitOutcome::TimedOut => {
                return fail_job(job, "Timed out waiting for an account to become available.");
            }
        }
    }

    let resolved_account = resolved_account_id.as_ref().and_then(|id| account_map.get(id));
    let input = ExecuteTestInput {
        test_case_id: job.id.clone(),
        title: "Exploration".to_string(),
        description: job.raw_text.clone(),
        expected_outcome: None,
        website_url: ctx.website_url.clone(),
        account_email: resolved_account.map(|a| a.email.clone()),
        account_password: resolved_account.map(|a| a.password.clone()),
        profile_id: resolved_account.and_then(|a| a.profile_id.clone()),
        metadata: resolved_account.map(|a| a.metadata.clone()).unwrap_or_default(),
    };

    let outcome = ctx.provider.execute_test(input, &NoopCallbacks).await;
    let exploration = match outcome {
        Ok(outcome) if outcome.reason.is_empty() => {
            drop(held_account);
            return fail_job(job, "Browser provider returned no verdict.");
        }
        Ok(outcome) => outcome,
        Err(err) => {
            drop(held_account);
            return fail_job(job, &err.to_string());
        }
    };

    let candidates = match ctx
        .generator
        .generate_drafts(&ctx.website_url, &exploration.reason)
        .await
    {
        Ok(candidates) => candidates,
        Err(err) => {
            drop(held_account);
            return fail_job(job, &err.to_string());
        }
    };

    drop(held_account);

    let existing: Vec<ExistingDraft<'_>> = ctx
        .existing_test_cases
        .iter()
        .map(|tc| ExistingDraft {
            title: &tc.title,
            description: &tc.description,
            expected_outcome: tc.expected_outcome.as_deref().unwrap_or(""),
        })
        .chain(
            ctx.existing_drafts
                .iter()
                .filter(|d| d.status == DraftStatus::Draft)
                .map(|d| ExistingDraft {
                    title: &d.title,
                    description: &d.description,
                    expected_outcome: d.expected_outcome.as_deref().unwrap_or(""),
                }),
        )
        .collect();

    let mut accepted_signatures = HashSet::new();
    let mut new_drafts = Vec::with_capacity(candidates.len());
    let mut accepted_count = 0u32;
    let mut duplicate_skipped_count = 0u32;

    for candidate in candidates {
        let expected = candidate.expected_outcome.clone().unwrap_or_default();
        let classification = dedupe::classify_candidate(
            &candidate.title,
            &candidate.description,
            &expected,
            &existing,
            &accepted_signatures,
        );

        let draft = match classification {
            DedupeClassification::DuplicateSkipped { reason } => {
                duplicate_skipped_count += 1;
                build_draft(&job, candidate, DraftStatus::DuplicateSkipped, Some(reason))
            }
            DedupeClassification::PotentialOverlap { reason } => {
                accepted_signatures.insert(dedupe::signature(
                    &candidate_title(&candidate),
                    &candidate_description(&candidate),
                    &expected,
                ));
                accepted_count += 1;
                build_draft(&job, candidate, DraftStatus::Draft, Some(reason))
            }
            DedupeClassification::Accepted => {
                accepted_signatures.insert(dedupe::signature(
                    &candidate_title(&candidate),
                    &candidate_description(&candidate),
                    &expected,
                ));
                accepted_count += 1;
                build_draft(&job, candidate, DraftStatus::Draft, None)
            }
        };
        new_drafts.push(draft);
    }

    job.status = JobStatus::Completed;
    job.completed_at = Some(Utc::now());
    job.progress_message = None;
    job.live_url = None;
    job.recording_url = exploration.recording_url;
    job.draft_counts.accepted = accepted_count;
    job.draft_counts.duplicate_skipped = duplicate_skipped_count;

    RunClaimedJobOutcome { job, new_drafts }
}

fn candidate_title(candidate: &DraftCandidate) -> String {
    candidate.title.clone()
}

fn candidate_description(candidate: &DraftCandidate) -> String {
    candidate.description.clone()
}

fn build_draft(
    job: &AiGenerationJob,
    candidate: DraftCandidate,
    status: DraftStatus,
    duplicate_reason: Option<String>,
) -> GeneratedTestDraft {
    GeneratedTestDraft {
        id: format!("draft-{}", uuid::Uuid::new_v4()),
        project_id: job.project_id.clone(),
        job_id: job.id.clone(),
        title: candidate.title,
        description: candidate.description,
        expected_outcome: candidate.expected_outcome,
        account_requirement: job.account_requirement.clone(),
        group_name: job.group_name.clone(),
        status: status.clone(),
        duplicate_of: None,
        duplicate_reason,
    }
}

fn fail_job(mut job: AiGenerationJob, message: &str) -> RunClaimedJobOutcome {
    job.status = JobStatus::Failed;
    job.completed_at = Some(Utc::now());
    job.error = Some(message.to_string());
    job.progress_message = None;
    job.live_url = None;
    RunClaimedJobOutcome {
        job,
        new_drafts: Vec::new(),
    }
}

/// `GET /v1/generate/status` opportunistically drains up to
/// [`STATUS_DRAIN_LIMIT`] claimable jobs, since there is no dedicated background daemon.
pub fn claimable_count(jobs: &VecDeque<AiGenerationJob>, stale_threshold: Duration) -> usize {
    let now = Utc::now();
    let threshold = chrono::Duration::from_std(stale_threshold).unwrap_or(chrono::Duration::zero());
    jobs.iter()
        .filter(|j| j.is_claimable(now, threshold))
        .take(STATUS_DRAIN_LIMIT)
        .count()
}

/// Rejects a `generate` request once a project already has `queue_cap` queued/running jobs.
pub fn check_queue_capacity(
    jobs: &VecDeque<AiGenerationJob>,
    project_id: &str,
    queue_cap: usize,
) -> Result<(), AiJobError> {
    let in_flight = jobs
        .iter()
        .filter(|j| matches!(j.status, JobStatus::Queued | JobStatus::Running))
        .count();
    if in_flight >= queue_cap {
        Err(AiJobError::QueueFull(project_id.to_string(), in_flight, queue_cap))
    } else {
        Ok(())
    }
}
