//! `POST /v1/generate` and `GET /v1/generate/status`: queue an AI draft-generation job and
//! opportunistically drain the claimable queue when status is polled.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use qa_core::ai_jobs::{self, RunClaimedJobContext};
use qa_core::model::{AiGenerationJob, DraftStatus, JobStatus, ProviderProfile};
use qa_core::scheduler::ResolvedAccount;
use qa_protocol::{
    AccountRequirement, DraftSummary, GenerateRequest, GenerateResponse, GenerateStatusQuery,
    GenerateStatusResponse, JobSummary, NotificationSummary,
};
use tokio_util::sync::CancellationToken;

use crate::app::AppState;
use crate::response::{bad_request, rate_limited, unauthorized};

pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let caller = match state.authorizer.authorize(&headers).await {
        Ok(c) => c,
        Err(_) => return unauthorized(),
    };
    if !state.generate_limiter.check(&caller.0) {
        return rate_limited();
    }
    if request.raw_text.trim().is_empty() {
        return bad_request("raw_text must not be empty");
    }

    let mut team_state = match state.store.get_or_create(&caller.0).await {
        Ok(s) => s,
        Err(e) => return bad_request(e.to_string()),
    };

    let jobs = team_state.ai_jobs.entry(request.project_id.clone()).or_default();
    if let Err(e) = ai_jobs::check_queue_capacity(
        jobs,
        &request.project_id,
        qa_config::constants::MAX_AI_JOBS_PER_PROJECT,
    ) {
        return (StatusCode::TOO_MANY_REQUESTS, Json(GenerateResponse {
            success: false,
            job_id: String::new(),
            message: e.to_string(),
        }))
            .into_response();
    }

    let job_id = format!("job-{}", uuid::Uuid::new_v4());
    let job = AiGenerationJob {
        id: job_id.clone(),
        project_id: request.project_id.clone(),
        raw_text: request.raw_text.clone(),
        website_url: request.website_url.clone(),
        group_name: request.group_name.clone(),
        user_account_id: request.user_account_id.clone(),
        account_requirement: AccountRequirement::from_wire(request.user_account_id.as_deref()),
        provider: team_state.settings.browser_provider,
        llm_model: request.ai_model.clone(),
        status: JobStatus::Queued,
        created_at: chrono::Utc::now(),
        started_at: None,
        completed_at: None,
        progress_message: None,
        live_url: None,
        recording_url: None,
        error: None,
        draft_counts: Default::default(),
    };

    jobs.push_front(job);
    jobs.truncate(qa_config::constants::MAX_AI_JOBS_PER_PROJECT);

    if let Err(e) = state.store.save(&caller.0, "generate", team_state).await {
        return bad_request(e.to_string());
    }

    let worker_state = state.clone();
    let team_id = caller.0.clone();
    let project_id = request.project_id.clone();
    let job_id_for_task = job_id.clone();
    tokio::spawn(async move {
        process_one_job(&worker_state, &team_id, &project_id, Some(&job_id_for_task)).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(GenerateResponse {
            success: true,
            job_id,
            message: "Job queued.".to_string(),
        }),
    )
        .into_response()
}

pub async fn generate_status_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<GenerateStatusQuery>,
) -> Response {
    let caller = match state.authorizer.authorize(&headers).await {
        Ok(c) => c,
        Err(_) => return unauthorized(),
    };
    if !state.generate_status_limiter.check(&caller.0) {
        return rate_limited();
    }

    for _ in 0..qa_config::constants::STATUS_DRAIN_LIMIT {
        let drained = process_one_job(&state, &caller.0, &query.project_id, None).await;
        if !drained {
            break;
        }
    }

    let team_state = match state.store.get_or_create(&caller.0).await {
        Ok(s) => s,
        Err(e) => return bad_request(e.to_string()),
    };

    let jobs: Vec<JobSummary> = team_state
        .ai_jobs
        .get(&query.project_id)
        .into_iter()
        .flatten()
        .map(job_summary)
        .collect();
    let drafts: Vec<DraftSummary> = team_state
        .ai_drafts
        .get(&query.project_id)
        .into_iter()
        .flatten()
        .map(draft_summary)
        .collect();
    let notification = team_state
        .unseen_draft_notifications
        .get(&query.project_id)
        .map(|n| NotificationSummary {
            has_unseen_drafts: n.has_unseen,
            last_seen_at: n.last_seen_at.map(|t| t.to_rfc3339()),
        })
        .unwrap_or_default();

    Json(GenerateStatusResponse { jobs, drafts, notification }).into_response()
}

/// Claims and runs one job for `project_id` if one is claimable, persisting the result.
/// Returns whether a job was actually claimed and processed.
async fn process_one_job(
    state: &AppState,
    team_id: &str,
    project_id: &str,
    target_job_id: Option<&str>,
) -> bool {
    let mut team_state = match state.store.get_or_create(team_id).await {
        Ok(s) => s,
        Err(_) => return false,
    };

    let jobs = team_state.ai_jobs.entry(project_id.to_string()).or_default();
    let claimed = ai_jobs::claim_next_job(jobs, target_job_id, qa_config::constants::stale_job_threshold());
    let Some(claimed) = claimed else {
        return false;
    };
    if let Err(e) = state.store.save(team_id, "generate-claim", team_state.clone()).await {
        tracing::warn!(error = %e, "failed to persist claimed job");
    }

    let provider_key = team_state.settings.browser_provider;
    let accounts: Vec<ResolvedAccount> = team_state
        .user_accounts
        .get(project_id)
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
        .get(project_id)
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

    let existing_test_cases = team_state.test_cases.get(project_id).cloned().unwrap_or_default();
    let existing_drafts = team_state.ai_drafts.get(project_id).cloned().unwrap_or_default();

    let ctx = RunClaimedJobContext {
        website_url: claimed.job.website_url.clone(),
        provider: state.provider.clone(),
        generator: state.generator.clone(),
        registry: state.account_locks.clone(),
        cancel: CancellationToken::new(),
        accounts: &accounts,
        preferred_account_ids: &preferred_account_ids,
        existing_test_cases: &existing_test_cases,
        existing_drafts: &existing_drafts,
    };

    let outcome = ai_jobs::run_claimed_job(claimed.job, ctx).await;

    let mut team_state = match state.store.get_or_create(team_id).await {
        Ok(s) => s,
        Err(_) => return true,
    };

    if let Some(jobs) = team_state.ai_jobs.get_mut(project_id) {
        if let Some(slot) = jobs.iter_mut().find(|j| j.id == outcome.job.id) {
            *slot = outcome.job;
        }
    }

    let has_new_drafts = outcome
        .new_drafts
        .iter()
        .any(|d| d.status == DraftStatus::Draft);
    team_state
        .ai_drafts
        .entry(project_id.to_string())
        .or_default()
        .extend(outcome.new_drafts);
    if has_new_drafts {
        team_state
            .unseen_draft_notifications
            .entry(project_id.to_string())
            .or_default()
            .has_unseen = true;
    }

    let _ = state.store.save(team_id, "generate-complete", team_state).await;
    true
}

fn status_wire_string<T: serde::Serialize>(status: &T) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn job_summary(job: &AiGenerationJob) -> JobSummary {
    JobSummary {
        id: job.id.clone(),
        project_id: job.project_id.clone(),
        status: status_wire_string(&job.status),
        progress_message: job.progress_message.clone(),
        live_url: job.live_url.clone(),
        recording_url: job.recording_url.clone(),
        error: job.error.clone(),
        accepted_count: job.draft_counts.accepted,
        duplicate_skipped_count: job.draft_counts.duplicate_skipped,
    }
}

fn draft_summary(draft: &qa_core::model::GeneratedTestDraft) -> DraftSummary {
    DraftSummary {
        id: draft.id.clone(),
        job_id: draft.job_id.clone(),
        title: draft.title.clone(),
        description: draft.description.clone(),
        expected_outcome: draft.expected_outcome.clone(),
        status: status_wire_string(&draft.status),
        duplicate_of: draft.duplicate_of.clone(),
        duplicate_reason: draft.duplicate_reason.clone(),
    }
}
