//! Account-aware concurrent batch scheduler: a bounded-concurrency dispatcher with
//! per-run counters and guaranteed cleanup on every exit path.

pub mod events;

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use qa_config::constants::scheduler_retry_interval;
use qa_protocol::{AccountRequirement, ProtocolEvent};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::llm::LlmSummarizer;
use crate::locks::AccountLockRegistry;
use crate::model::{ResultStatus, TestCase, TestResult};
use crate::provider::{
    BrowserProvider, ExecuteTestInput, ExecuteTestOutcome, ProviderCallbacks,
};

/// An account resolved and ready to back a test, independent of how it was chosen
/// (specific request, round-robin "any", or fallback pool).
#[derive(Clone, Debug)]
pub struct ResolvedAccount {
    pub id: String,
    pub email: String,
    pub password: String,
    pub profile_id: Option<String>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Scans `pool` starting at `start` (wrapping once), returning the first id not currently
/// locked along with the index it was found at so a caller can advance a cursor past it.
/// Shared between the scheduler's per-run cursor and the AI job queue's per-poll draw, so
/// both honor the same preferred-then-fallback fairness rule.
pub(crate) fn scan_pool_for_free(
    pool: &[String],
    start: usize,
    registry: &AccountLockRegistry,
) -> Option<(usize, String)> {
    if pool.is_empty() {
        return None;
    }
    let len = pool.len();
    for step in 0..len {
        let idx = (start + step) % len;
        let candidate = &pool[idx];
        if !registry.is_in_use(candidate) {
            return Some((idx, candidate.clone()));
        }
    }
    None
}

pub struct SchedulerInput {
    pub test_cases: Vec<TestCase>,
    pub website_url: String,
    pub parallel_limit: u32,
    pub accounts: Vec<ResolvedAccount>,
    /// Accounts with an authenticated provider profile already in place — preferred for
    /// `Any`-requirement tests over the rest of the pool.
    pub preferred_account_ids: Vec<String>,
}

/// Mutable scheduling state for one run, built fresh per `run_schedule` call.
struct SchedulerState {
    pending: VecDeque<TestCase>,
    running: Arc<AtomicUsize>,
    account_map: HashMap<String, ResolvedAccount>,
    all_account_ids: Vec<String>,
    preferred_account_ids: Vec<String>,
    preferred_cursor: usize,
    fallback_cursor: usize,
    locked_accounts_by_run: Arc<Mutex<HashSet<String>>>,
}

impl SchedulerState {
    fn new(input: &SchedulerInput) -> Self {
        let account_map: HashMap<String, ResolvedAccount> = input
            .accounts
            .iter()
            .map(|a| (a.id.clone(), a.clone()))
            .collect();
        let all_account_ids: Vec<String> = input.accounts.iter().map(|a| a.id.clone()).collect();
        Self {
            pending: input.test_cases.clone().into(),
            running: Arc::new(AtomicUsize::new(0)),
            account_map,
            all_account_ids,
            preferred_account_ids: input.preferred_account_ids.clone(),
            preferred_cursor: 0,
            fallback_cursor: 0,
            locked_accounts_by_run: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Advances the round-robin cursor over `pool`, skipping ids currently locked, and
    /// returns the next free candidate without mutating the registry. Fair round robin:
    /// every free account gets a turn before one repeats.
    fn next_free_in_pool(
        &mut self,
        pool_is_preferred: bool,
        registry: &AccountLockRegistry,
    ) -> Option<String> {
        let (pool, cursor_start) = if pool_is_preferred {
            (&self.preferred_account_ids, self.preferred_cursor)
        } else {
            (&self.all_account_ids, self.fallback_cursor)
        };
        let (idx, id) = scan_pool_for_free(pool, cursor_start, registry)?;
        let next_cursor = (idx + 1) % pool.len();
        if pool_is_preferred {
            self.preferred_cursor = next_cursor;
        } else {
            self.fallback_cursor = next_cursor;
        }
        Some(id)
    }
}

/// One test case paired with the account id it resolved to (if any).
struct ReadyTest {
    test_case: TestCase,
    resolved_account_id: Option<String>,
}

/// Scans `pending` for the first test eligible to run right now, removes and returns it
/// with its resolved account. Returns `None` if nothing is currently runnable.
fn pick_next_ready(state: &mut SchedulerState, registry: &AccountLockRegistry) -> Option<ReadyTest> {
    let len = state.pending.len();
    for i in 0..len {
        let requirement = state.pending[i].account_requirement.clone();
        let resolved = match &requirement {
            AccountRequirement::None => Some(None),
            AccountRequirement::Specific(id) => {
                if !state.account_map.contains_key(id) {
                    // Missing account: "eligible" immediately, to surface the error (step 3).
                    Some(Some(id.clone()))
                } else if registry.is_in_use(id) {
                    None
                } else {
                    Some(Some(id.clone()))
                }
            }
            AccountRequirement::Any => {
                if let Some(id) = state.next_free_in_pool(true, registry) {
                    Some(Some(id))
                } else {
                    state.next_free_in_pool(false, registry).map(Some)
                }
            }
        };
        if let Some(resolved_account_id) = resolved {
            let test_case = state.pending.remove(i).expect("index within bounds");
            return Some(ReadyTest {
                test_case,
                resolved_account_id,
            });
        }
    }
    None
}

/// Tests that can never run: `Any` with an empty account pool, or a `Specific` id absent
/// from `account_map`.
fn is_impossible(test_case: &TestCase, state: &SchedulerState) -> bool {
    match &test_case.account_requirement {
        AccountRequirement::None => false,
        AccountRequirement::Any => state.all_account_ids.is_empty(),
        AccountRequirement::Specific(id) => !state.account_map.contains_key(id),
    }
}

/// Runs the full batch against `provider`, emitting events on `events` and honoring
/// `cancel`. Returns once every test has reached a terminal state or the run was cancelled
/// with nothing in flight.
pub async fn run_schedule(
    input: SchedulerInput,
    provider: Arc<dyn BrowserProvider>,
    registry: AccountLockRegistry,
    cancel: CancellationToken,
    events: mpsc::Sender<ProtocolEvent>,
    summarizer: Arc<dyn LlmSummarizer>,
) -> Vec<TestResult> {
    let parallel_limit = input.parallel_limit.max(1) as usize;
    let mut state = SchedulerState::new(&input);
    let started_at = tokio::time::Instant::now();

    let mut results: Vec<TestResult> = Vec::with_capacity(state.pending.len());
    let (result_tx, mut result_rx) = mpsc::channel::<TestResult>(parallel_limit.max(1));

    loop {
        // Step 1
        if cancel.is_cancelled() && state.running.load(Ordering::SeqCst) == 0 {
            break;
        }

        // Step 2-5
        while state.running.load(Ordering::SeqCst) < parallel_limit && !state.pending.is_empty() {
            let Some(ready) = pick_next_ready(&mut state, &registry) else {
                break;
            };

            let Some(account_id) = ready.resolved_account_id.clone() else {
                state.running.fetch_add(1, Ordering::SeqCst);
                spawn_no_account_test(
                    ready.test_case,
                    input.website_url.clone(),
                    provider.clone(),
                    events.clone(),
                    result_tx.clone(),
                    state.running.clone(),
                    summarizer.clone(),
                );
                continue;
            };

            let Some(account) = state.account_map.get(&account_id).cloned() else {
                // Step 3: resolved to an id we don't actually have.
                let result = TestResult::synthetic_error(
                    ready.test_case.id.clone(),
                    Some(account_id.clone()),
                    format!("Assigned account '{account_id}' was not found in shared team state."),
                );
                let _ = events
                    .send(events::test_error(
                        &ready.test_case.id,
                        result.error.clone().unwrap_or_default(),
                        serde_json::to_value(&result).ok(),
                    ))
                    .await;
                results.push(result);
                continue;
            };

            // Step 4
            let Some(guard) = registry.try_acquire(&account_id) else {
                state.pending.push_back(ready.test_case);
                continue;
            };

            // Step 5
            state
                .locked_accounts_by_run
                .lock()
                .expect("lock set poisoned")
                .insert(account_id.clone());
            state.running.fetch_add(1, Ordering::SeqCst);

            let provider = provider.clone();
            let events_tx = events.clone();
            let result_tx = result_tx.clone();
            let running = state.running.clone();
            let locked_set = state.locked_accounts_by_run.clone();
            let website_url = input.website_url.clone();
            let test_case = ready.test_case.clone();
            let child_cancel = cancel.child_token();
            let summarizer = summarizer.clone();

            tokio::spawn(async move {
                let _guard = guard;
                let fallback_test_id = test_case.id.clone();
                let fallback_account_id = account.id.clone();
                let result = futures::FutureExt::catch_unwind(futures::future::AssertUnwindSafe(
                    execute_test_case(
                        &test_case,
                        &website_url,
                        Some(&account),
                        provider.as_ref(),
                        &events_tx,
                        &child_cancel,
                        summarizer.as_ref(),
                    ),
                ))
                .await
                .unwrap_or_else(|_| {
                    TestResult::synthetic_error(
                        fallback_test_id,
                        Some(fallback_account_id),
                        "Test execution panicked.",
                    )
                });

                locked_set.lock().expect("lock set poisoned").remove(&account.id);
                running.fetch_sub(1, Ordering::SeqCst);
                let _ = result_tx.send(result).await;
            });
        }

        // Drain any results that have arrived without blocking the scheduling loop forever.
        while let Ok(result) = result_rx.try_recv() {
            results.push(result);
        }

        // Step 6
        if state.running.load(Ordering::SeqCst) == 0 && !state.pending.is_empty() {
            let mut still_pending = VecDeque::new();
            while let Some(test_case) = state.pending.pop_front() {
                if is_impossible(&test_case, &state) {
                    let reason = match &test_case.account_requirement {
                        AccountRequirement::Any => {
                            "No accounts are configured for this project.".to_string()
                        }
                        AccountRequirement::Specific(id) => {
                            format!("Assigned account '{id}' was not found in shared team state.")
                        }
                        AccountRequirement::None => unreachable!(),
                    };
                    let result =
                        TestResult::synthetic_error(test_case.id.clone(), None, reason.clone());
                    let _ = events
                        .send(events::test_error(&test_case.id, reason, serde_json::to_value(&result).ok()))
                        .await;
                    results.push(result);
                } else {
                    still_pending.push_back(test_case);
                }
            }
            state.pending = still_pending;

            if state.pending.is_empty() {
                break;
            }

            tokio::select! {
                _ = sleep(scheduler_retry_interval()) => {}
                _ = cancel.cancelled() => {
                    if state.running.load(Ordering::SeqCst) == 0 {
                        break;
                    }
                }
            }
            continue;
        }

        // Step 7
        if state.running.load(Ordering::SeqCst) == 0 && state.pending.is_empty() {
            break;
        }

        // Nothing else to do right now; give spawned tasks a chance to make progress.
        tokio::task::yield_now().await;
        if state.running.load(Ordering::SeqCst) > 0 {
            if let Some(result) = result_rx.recv().await {
                results.push(result);
            }
        }
    }

    // Drain any stragglers delivered after the loop's terminal check.
    drop(result_tx);
    while let Some(result) = result_rx.recv().await {
        results.push(result);
    }

    let duration_ms = started_at.elapsed().as_millis() as u64;
    let total = results.len() as u32;
    let passed = results.iter().filter(|r| r.status == ResultStatus::Passed).count() as u32;
    let failed = results
        .iter()
        .filter(|r| matches!(r.status, ResultStatus::Failed | ResultStatus::Error))
        .count() as u32;
    let skipped = results.iter().filter(|r| r.status == ResultStatus::Skipped).count() as u32;
    let _ = events
        .send(events::all_complete(total, passed, failed, skipped, duration_ms))
        .await;

    results
}

/// Tests with `AccountRequirement::None` need no lock; run them with the same concurrency
/// accounting as locked tests so `parallel_limit` still bounds total in-flight work.
fn spawn_no_account_test(
    test_case: TestCase,
    website_url: String,
    provider: Arc<dyn BrowserProvider>,
    events: mpsc::Sender<ProtocolEvent>,
    result_tx: mpsc::Sender<TestResult>,
    running: Arc<AtomicUsize>,
    summarizer: Arc<dyn LlmSummarizer>,
) {
    tokio::spawn(async move {
        let result = execute_test_case(
            &test_case,
            &website_url,
            None,
            provider.as_ref(),
            &events,
            &CancellationToken::new(),
            summarizer.as_ref(),
        )
        .await;
        running.fetch_sub(1, Ordering::SeqCst);
        let _ = result_tx.send(result).await;
    });
}

struct ChannelCallbacks {
    test_case_id: String,
    resolved_account_id: Option<String>,
    events: mpsc::Sender<ProtocolEvent>,
}

#[async_trait::async_trait]
impl ProviderCallbacks for ChannelCallbacks {
    async fn on_streaming_url(&self, streaming_url: &str, recording_url: Option<&str>) {
        let _ = self
            .events
            .send(events::streaming_url(
                &self.test_case_id,
                streaming_url.to_string(),
                recording_url.map(str::to_string),
            ))
            .await;
    }

    async fn on_task_created(&self, task_id: &str, session_id: &str) {
        let _ = self
            .events
            .send(events::task_created(
                &self.test_case_id,
                task_id.to_string(),
                session_id.to_string(),
                self.resolved_account_id.clone(),
            ))
            .await;
    }

    async fn on_step(&self, current_step: u32, total_steps: u32, description: &str) {
        let _ = self
            .events
            .send(events::step_progress(
                &self.test_case_id,
                current_step,
                total_steps,
                description.to_string(),
            ))
            .await;
    }
}

/// Runs one test case end to end: emits `TestStart`, calls the provider, translates its
/// outcome into a terminal `TestResult`, and emits the matching terminal event.
async fn execute_test_case(
    test_case: &TestCase,
    website_url: &str,
    account: Option<&ResolvedAccount>,
    provider: &dyn BrowserProvider,
    events: &mpsc::Sender<ProtocolEvent>,
    _cancel: &CancellationToken,
    summarizer: &dyn LlmSummarizer,
) -> TestResult {
    let resolved_account_id = account.map(|a| a.id.clone());
    let _ = events
        .send(events::test_start(&test_case.id, resolved_account_id.clone()))
        .await;

    let callbacks = ChannelCallbacks {
        test_case_id: test_case.id.clone(),
        resolved_account_id: resolved_account_id.clone(),
        events: events.clone(),
    };

    let input = ExecuteTestInput {
        test_case_id: test_case.id.clone(),
        title: test_case.title.clone(),
        description: test_case.description.clone(),
        expected_outcome: test_case.expected_outcome.clone(),
        website_url: website_url.to_string(),
        account_email: account.map(|a| a.email.clone()),
        account_password: account.map(|a| a.password.clone()),
        profile_id: account.and_then(|a| a.profile_id.clone()),
        metadata: account.map(|a| a.metadata.clone()).unwrap_or_default(),
    };

    let outcome = provider.execute_test(input, &callbacks).await;
    let mut result = TestResult::pending(test_case.id.clone());
    result.resolved_account_id = resolved_account_id;

    match outcome {
        Err(err) => {
            result.status = ResultStatus::Error;
            result.error = Some(err.to_string());
            result.reason = err.to_string();
        }
        Ok(ExecuteTestOutcome {
            success,
            reason,
            mut extracted_data,
            recording_url,
            raw_provider_data,
        }) => {
            if let Some(raw) = raw_provider_data {
                match extracted_data.as_object_mut() {
                    Some(obj) => {
                        obj.insert("provider".to_string(), raw);
                    }
                    None => {
                        extracted_data = serde_json::json!({ "provider": raw });
                    }
                }
            }

            result.status = if success {
                ResultStatus::Passed
            } else {
                ResultStatus::Failed
            };
            result.reason = if !reason.is_empty() {
                reason
            } else {
                summarize_empty_reason(test_case, &extracted_data, summarizer).await
            };
            result.extracted_data = extracted_data;
            result.recording_url = recording_url;
        }
    }

    result.completed_at = Some(chrono::Utc::now());
    result.duration_ms = Some(
        (result.completed_at.unwrap() - result.started_at)
            .num_milliseconds()
            .max(0) as u64,
    );

    let value = serde_json::to_value(&result).ok();
    let event = if matches!(result.status, ResultStatus::Error) {
        events::test_error(&test_case.id, result.error.clone().unwrap_or_default(), value)
    } else {
        events::test_complete(&test_case.id, value.unwrap_or(serde_json::Value::Null))
    };
    let _ = events.send(event).await;

    result
}

/// A provider's verdict extraction can come back with an empty `reason` when the agent's
/// response didn't include one. Falls back to asking the summarizer to read the transcript
/// evidence we do have; if that also fails, falls back to a fixed placeholder.
async fn summarize_empty_reason(
    test_case: &TestCase,
    extracted_data: &serde_json::Value,
    summarizer: &dyn LlmSummarizer,
) -> String {
    let expected = test_case
        .expected_outcome
        .as_deref()
        .unwrap_or("No explicit expected outcome was provided; use your judgment.");
    let transcript = serde_json::to_string(extracted_data).unwrap_or_default();
    let prompt = crate::prompt::build_verification_prompt(&test_case.title, expected, &transcript);
    match summarizer.verify(&prompt).await {
        Ok(verdict) if !verdict.reason.is_empty() => verdict.reason,
        _ => "No summary available.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockLlmSummarizer;
    use crate::provider::mock::MockProvider;
    use qa_protocol::AccountRequirement;
    use std::time::Duration as StdDuration;

    fn no_op_summarizer() -> Arc<dyn LlmSummarizer> {
        Arc::new(MockLlmSummarizer { success: true })
    }

    fn test_case(id: &str, requirement: AccountRequirement) -> TestCase {
        TestCase {
            id: id.to_string(),
            project_id: "proj-1".to_string(),
            title: format!("Test {id}"),
            description: "do the thing".to_string(),
            expected_outcome: None,
            created_by: "tester".to_string(),
            account_requirement: requirement,
            status: crate::model::TestStatus::Pending,
            last_result: None,
        }
    }

    #[tokio::test]
    async fn runs_no_account_tests_to_completion() {
        let provider: Arc<dyn BrowserProvider> =
            Arc::new(MockProvider::new(true).with_step_delay(StdDuration::ZERO));
        let registry = AccountLockRegistry::new();
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(32);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let input = SchedulerInput {
            test_cases: vec![test_case("tc-1", AccountRequirement::None)],
            website_url: "https://example.com".to_string(),
            parallel_limit: 2,
            accounts: vec![],
            preferred_account_ids: vec![],
        };
        let results = run_schedule(input, provider, registry, cancel, tx, no_op_summarizer()).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ResultStatus::Passed);
    }

    #[tokio::test]
    async fn specific_account_not_configured_errors_without_running() {
        let provider: Arc<dyn BrowserProvider> = Arc::new(MockProvider::new(true));
        let registry = AccountLockRegistry::new();
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(32);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let input = SchedulerInput {
            test_cases: vec![test_case(
                "tc-1",
                AccountRequirement::Specific("ghost-account".to_string()),
            )],
            website_url: "https://example.com".to_string(),
            parallel_limit: 2,
            accounts: vec![],
            preferred_account_ids: vec![],
        };
        let results = run_schedule(input, provider, registry, cancel, tx, no_op_summarizer()).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ResultStatus::Error);
    }

    #[tokio::test]
    async fn two_tests_sharing_one_account_run_sequentially() {
        let provider: Arc<dyn BrowserProvider> =
            Arc::new(MockProvider::new(true).with_step_delay(StdDuration::from_millis(5)));
        let registry = AccountLockRegistry::new();
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(32);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let account = ResolvedAccount {
            id: "acct-1".to_string(),
            email: "a@example.com".to_string(),
            password: "pw".to_string(),
            profile_id: None,
            metadata: Default::default(),
        };
        let input = SchedulerInput {
            test_cases: vec![
                test_case("tc-1", AccountRequirement::Specific("acct-1".to_string())),
                test_case("tc-2", AccountRequirement::Specific("acct-1".to_string())),
            ],
            website_url: "https://example.com".to_string(),
            parallel_limit: 5,
            accounts: vec![account],
            preferred_account_ids: vec![],
        };
        let results = run_schedule(input, provider, registry, cancel, tx, no_op_summarizer()).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.status == ResultStatus::Passed));
    }

    #[tokio::test]
    async fn empty_reason_falls_back_to_summarizer() {
        struct EmptyReasonProvider;

        #[async_trait::async_trait]
        impl BrowserProvider for EmptyReasonProvider {
            fn key(&self) -> crate::model::ProviderKey {
                crate::model::ProviderKey::Hyperbrowser
            }

            async fn execute_test(
                &self,
                _input: ExecuteTestInput,
                _callbacks: &(dyn ProviderCallbacks + Send + Sync),
            ) -> Result<ExecuteTestOutcome, crate::error::ProviderError> {
                Ok(ExecuteTestOutcome {
                    success: true,
                    reason: String::new(),
                    extracted_data: serde_json::Value::Null,
                    recording_url: None,
                    raw_provider_data: None,
                })
            }

            async fn login_with_profile(
                &self,
                _input: super::super::provider::LoginInput,
            ) -> Result<super::super::provider::LoginOutcome, crate::error::ProviderError> {
                unreachable!()
            }

            async fn delete_profile(
                &self,
                _profile_id: &str,
            ) -> Result<super::super::provider::DeleteProfileOutcome, crate::error::ProviderError> {
                unreachable!()
            }
        }

        let provider: Arc<dyn BrowserProvider> = Arc::new(EmptyReasonProvider);
        let registry = AccountLockRegistry::new();
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(32);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let input = SchedulerInput {
            test_cases: vec![test_case("tc-1", AccountRequirement::None)],
            website_url: "https://example.com".to_string(),
            parallel_limit: 1,
            accounts: vec![],
            preferred_account_ids: vec![],
        };
        let summarizer: Arc<dyn LlmSummarizer> = Arc::new(MockLlmSummarizer { success: true });
        let results = run_schedule(input, provider, registry, cancel, tx, summarizer).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].reason, "mock verification");
    }

    #[tokio::test]
    async fn raw_provider_data_merges_under_extracted_data_provider() {
        struct RawDataProvider;

        #[async_trait::async_trait]
        impl BrowserProvider for RawDataProvider {
            fn key(&self) -> crate::model::ProviderKey {
                crate::model::ProviderKey::Hyperbrowser
            }

            async fn execute_test(
                &self,
                _input: ExecuteTestInput,
                _callbacks: &(dyn ProviderCallbacks + Send + Sync),
            ) -> Result<ExecuteTestOutcome, crate::error::ProviderError> {
                Ok(ExecuteTestOutcome {
                    success: true,
                    reason: "looked good".to_string(),
                    extracted_data: serde_json::json!({"checkoutTotal": 42}),
                    recording_url: None,
                    raw_provider_data: Some(serde_json::json!({"taskId": "task-1"})),
                })
            }

            async fn login_with_profile(
                &self,
                _input: super::super::provider::LoginInput,
            ) -> Result<super::super::provider::LoginOutcome, crate::error::ProviderError> {
                unreachable!()
            }

            async fn delete_profile(
                &self,
                _profile_id: &str,
            ) -> Result<super::super::provider::DeleteProfileOutcome, crate::error::ProviderError> {
                unreachable!()
            }
        }

        let provider: Arc<dyn BrowserProvider> = Arc::new(RawDataProvider);
        let registry = AccountLockRegistry::new();
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(32);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let input = SchedulerInput {
            test_cases: vec![test_case("tc-1", AccountRequirement::None)],
            website_url: "https://example.com".to_string(),
            parallel_limit: 1,
            accounts: vec![],
            preferred_account_ids: vec![],
        };
        let results = run_schedule(input, provider, registry, cancel, tx, no_op_summarizer()).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].extracted_data["checkoutTotal"], 42);
        assert_eq!(results[0].extracted_data["provider"]["taskId"], "task-1");
    }
}
