//! `POST /v1/execute`: SSE stream of the batch scheduler's events. Prepares the request,
//! spawns the scheduler run in the background, and streams events back over one
//! consistent path whether the client disconnects or calls `/v1/stop` explicitly.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::Stream;
use qa_core::model::{ProviderProfile, TestCase, TestRun, RunStatus, RunTotals, TestStatus};
use qa_core::scheduler::{run_schedule, ResolvedAccount, SchedulerInput};
use qa_protocol::{EnvelopeState, ExecuteRequest, ProtocolEvent};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::app::AppState;
use crate::response::{bad_request, rate_limited, unauthorized};

const EVENT_QUEUE_CAPACITY: usize = 64;

pub async fn execute_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ExecuteRequest>,
) -> Response {
    let caller = match state.authorizer.authorize(&headers).await {
        Ok(c) => c,
        Err(_) => return unauthorized(),
    };
    if !state.execute_limiter.check(&caller.0) {
        return rate_limited();
    }
    if request.test_cases.is_empty() {
        return bad_request("test_cases must not be empty");
    }

    let project_id = request.test_cases[0].project_id.clone();
    let team_state = match state.store.get_or_create(&caller.0).await {
        Ok(s) => s,
        Err(e) => return bad_request(e.to_string()),
    };

    let test_cases: Vec<TestCase> = request
        .test_cases
        .iter()
        .map(|input| TestCase {
            id: input.id.clone(),
            project_id: input.project_id.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            expected_outcome: input.expected_outcome.clone(),
            created_by: caller.0.clone(),
            account_requirement: input.account_requirement.clone(),
            status: TestStatus::Pending,
            last_result: None,
        })
        .collect();
    let test_case_ids: Vec<String> = test_cases.iter().map(|t| t.id.clone()).collect();

    let provider_key = team_state.settings.browser_provider;
    let accounts: Vec<ResolvedAccount> = team_state
        .user_accounts
        .get(&project_id)
        .into_iter()
        .flatten()
        .map(|a| ResolvedAccount {
            id: a.id.clone(),
            email: a.email.clone(),
            password: a.password.clone(),
            profile_id: a
                .provider_profiles
                .get(&provider_key)
                .and_then(|p: &ProviderProfile| p.profile_id.clone()),
            metadata: a.metadata.clone(),
        })
        .collect();
    let preferred_account_ids: Vec<String> = team_state
        .user_accounts
        .get(&project_id)
        .into_iter()
        .flatten()
        .filter(|a| {
            a.provider_profiles
                .get(&provider_key)
                .map(|p| p.status == qa_core::model::ProfileStatus::Authenticated)
                .unwrap_or(false)
        })
        .map(|a| a.id.clone())
        .collect();

    let parallel_limit = qa_config::constants::clamp_parallelism(
        request.parallel_limit.or(Some(team_state.settings.parallelism)),
    );

    let run_id = request.run_id.clone().unwrap_or_else(|| format!("run-{}", Uuid::new_v4()));
    let handle = state.active_runs.register(&run_id);
    let cancel = handle.child_token();

    let (events_tx, events_rx) = mpsc::channel::<ProtocolEvent>(EVENT_QUEUE_CAPACITY);

    let scheduler_input = SchedulerInput {
        test_cases,
        website_url: request.website_url.clone(),
        parallel_limit,
        accounts,
        preferred_account_ids,
    };
    let provider = state.provider.clone();
    let summarizer = state.summarizer.clone();
    let registry = state.account_locks.clone();
    let store = state.store.clone();
    let active_runs = state.active_runs.clone();
    let team_id = caller.0.clone();
    let run_id_for_task = run_id.clone();
    let project_id_for_task = project_id.clone();
    let started_at = chrono::Utc::now();

    tokio::spawn(async move {
        let results =
            run_schedule(scheduler_input, provider, registry, cancel, events_tx, summarizer).await;

        if let Ok(mut state) = store.get_or_create(&team_id).await {
            let mut totals = RunTotals::default();
            for r in &results {
                match r.status {
                    qa_core::model::ResultStatus::Passed => totals.passed += 1,
                    qa_core::model::ResultStatus::Failed | qa_core::model::ResultStatus::Error => {
                        totals.failed += 1
                    }
                    qa_core::model::ResultStatus::Skipped => totals.skipped += 1,
                    _ => {}
                }
            }
            totals.total = results.len() as u32;
            let run = TestRun {
                id: run_id_for_task.clone(),
                project_id: project_id_for_task.clone(),
                started_at,
                completed_at: Some(chrono::Utc::now()),
                status: RunStatus::Completed,
                test_case_ids,
                parallel_limit,
                totals,
                results,
            };
            let runs = state.test_runs.entry(project_id_for_task).or_default();
            runs.push_front(run);
            runs.truncate(qa_config::constants::MAX_RETAINED_RUNS_PER_PROJECT);
            let _ = store.save(&team_id, "scheduler", state).await;
        }

        active_runs.unregister(&run_id_for_task);
    });

    let envelope = EnvelopeState::new(run_id.clone());
    let stream = EnvelopeEventStream {
        inner: ReceiverStream::new(events_rx),
        envelope,
        run_id,
        active_runs: state.active_runs.clone(),
        closed: AtomicBool::new(false),
    };

    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

/// Wraps the raw event receiver, injecting the envelope on every item and, on `Drop`
/// (client disconnected before the stream ended), signalling the same stop path as the
/// explicit `/v1/stop` endpoint.
struct EnvelopeEventStream {
    inner: ReceiverStream<ProtocolEvent>,
    envelope: EnvelopeState,
    run_id: String,
    active_runs: qa_core::ActiveRunRegistry,
    closed: AtomicBool,
}

impl Stream for EnvelopeEventStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.closed.load(Ordering::SeqCst) {
            return Poll::Ready(None);
        }
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(event)) => {
                let terminal = matches!(event, ProtocolEvent::AllComplete { .. });
                let value = this.envelope.to_json(&event).unwrap_or_else(|_| serde_json::json!({}));
                if terminal {
                    this.closed.store(true, Ordering::SeqCst);
                }
                Poll::Ready(Some(Ok(Event::default().data(value.to_string()))))
            }
            Poll::Ready(None) => {
                this.closed.store(true, Ordering::SeqCst);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for EnvelopeEventStream {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.active_runs.stop(&self.run_id);
        }
    }
}
