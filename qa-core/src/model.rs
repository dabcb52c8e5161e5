//! Domain types: test cases, results, runs, accounts, groups, AI jobs and drafts,
//! and the team state document that holds them all.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use qa_protocol::AccountRequirement;
use serde::{Deserialize, Serialize};

pub type ProjectId = String;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Draft,
    Published,
    Discarded,
    DuplicateSkipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKey {
    Hyperbrowser,
    BrowserUseCloud,
}

impl ProviderKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKey::Hyperbrowser => "hyperbrowser",
            ProviderKey::BrowserUseCloud => "browser-use-cloud",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    None,
    Authenticating,
    Authenticated,
    Expired,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub profile_id: Option<String>,
    pub status: ProfileStatus,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for ProviderProfile {
    fn default() -> Self {
        Self {
            profile_id: None,
            status: ProfileStatus::None,
            updated_at: None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IssueTrackerRef {
    pub provider: String,
    pub issue_id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,
    pub test_case_id: String,
    pub resolved_account_id: Option<String>,
    pub status: ResultStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    pub live_url: Option<String>,
    pub recording_url: Option<String>,
    pub error: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub extracted_data: serde_json::Value,
    #[serde(default)]
    pub issue_tracker_ref: Option<IssueTrackerRef>,
}

impl TestResult {
    /// A fresh `pending` result shell for `test_case_id`, timestamped now.
    pub fn pending(test_case_id: impl Into<String>) -> Self {
        Self {
            id: format!("result-{}", uuid::Uuid::new_v4()),
            test_case_id: test_case_id.into(),
            resolved_account_id: None,
            status: ResultStatus::Pending,
            started_at: Utc::now(),
            completed_at: None,
            duration_ms: None,
            live_url: None,
            recording_url: None,
            error: None,
            reason: String::new(),
            extracted_data: serde_json::Value::Null,
            issue_tracker_ref: None,
        }
    }

    /// Builds a synthetic `error` result with the given reason/error text, already terminal.
    pub fn synthetic_error(
        test_case_id: impl Into<String>,
        resolved_account_id: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        let error = error.into();
        let now = Utc::now();
        Self {
            id: format!("result-{}", uuid::Uuid::new_v4()),
            test_case_id: test_case_id.into(),
            resolved_account_id,
            status: ResultStatus::Error,
            started_at: now,
            completed_at: Some(now),
            duration_ms: Some(0),
            live_url: None,
            recording_url: None,
            error: Some(error.clone()),
            reason: error,
            extracted_data: serde_json::Value::Null,
            issue_tracker_ref: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.status, ResultStatus::Pending | ResultStatus::Running)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub expected_outcome: Option<String>,
    pub created_by: String,
    pub account_requirement: AccountRequirement,
    pub status: TestStatus,
    pub last_result: Option<TestResult>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunTotals {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestRun {
    pub id: String,
    pub project_id: ProjectId,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub test_case_ids: Vec<String>,
    pub parallel_limit: u32,
    pub totals: RunTotals,
    pub results: Vec<TestResult>,
}

impl TestRun {
    /// Invariant: `passed + failed + skipped <= total`, and `==` once terminal.
    pub fn totals_consistent(&self) -> bool {
        let sum = self.totals.passed + self.totals.failed + self.totals.skipped;
        if sum > self.totals.total {
            return false;
        }
        if self.status != RunStatus::Running {
            return sum == self.totals.total;
        }
        true
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub project_id: ProjectId,
    pub label: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub provider_profiles: HashMap<ProviderKey, ProviderProfile>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestGroup {
    pub id: String,
    pub project_id: ProjectId,
    pub name: String,
    pub test_case_ids: Vec<String>,
    pub last_run_status: Option<RunStatus>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub last_run_status: Option<RunStatus>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DraftCounts {
    pub accepted: u32,
    pub duplicate_skipped: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AiGenerationJob {
    pub id: String,
    pub project_id: ProjectId,
    pub raw_text: String,
    pub website_url: String,
    pub group_name: Option<String>,
    pub user_account_id: Option<String>,
    pub account_requirement: AccountRequirement,
    pub provider: ProviderKey,
    pub llm_model: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress_message: Option<String>,
    pub live_url: Option<String>,
    pub recording_url: Option<String>,
    pub error: Option<String>,
    pub draft_counts: DraftCounts,
}

impl AiGenerationJob {
    /// A job is stale if `running` and started more than `threshold` ago.
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: chrono::Duration) -> bool {
        self.status == JobStatus::Running
            && self
                .started_at
                .map(|s| now - s > threshold)
                .unwrap_or(false)
    }

    pub fn is_claimable(&self, now: DateTime<Utc>, threshold: chrono::Duration) -> bool {
        self.status == JobStatus::Queued || self.is_stale(now, threshold)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratedTestDraft {
    pub id: String,
    pub project_id: ProjectId,
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub expected_outcome: Option<String>,
    pub account_requirement: AccountRequirement,
    pub group_name: Option<String>,
    pub status: DraftStatus,
    pub duplicate_of: Option<String>,
    pub duplicate_reason: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DraftNotification {
    pub has_unseen: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub parallelism: u32,
    pub hyperbrowser_enabled: bool,
    pub browser_provider: ProviderKey,
    pub default_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parallelism: qa_config::constants::PARALLELISM_DEFAULT,
            hyperbrowser_enabled: true,
            browser_provider: ProviderKey::Hyperbrowser,
            default_timeout_secs: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveRunMeta {
    pub project_id: ProjectId,
    pub started_at: DateTime<Utc>,
}

/// One team's full state document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TeamState {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub test_cases: HashMap<ProjectId, Vec<TestCase>>,
    #[serde(default)]
    pub test_runs: HashMap<ProjectId, VecDeque<TestRun>>,
    #[serde(default)]
    pub test_groups: HashMap<ProjectId, Vec<TestGroup>>,
    #[serde(default)]
    pub user_accounts: HashMap<ProjectId, Vec<UserAccount>>,
    #[serde(default)]
    pub ai_jobs: HashMap<ProjectId, VecDeque<AiGenerationJob>>,
    #[serde(default)]
    pub ai_drafts: HashMap<ProjectId, Vec<GeneratedTestDraft>>,
    #[serde(default)]
    pub unseen_draft_notifications: HashMap<ProjectId, DraftNotification>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub active_test_runs: HashMap<String, ActiveRunMeta>,
    /// Legacy singular field, migrated into `active_test_runs` on sanitize.
    #[serde(default)]
    pub active_test_run: Option<(String, ActiveRunMeta)>,
}

impl TeamState {
    /// Removes `account_id` from every test case's account requirement in `project_id`,
    /// so deleting an account never leaves a dangling reference behind.
    pub fn clear_account_references(&mut self, project_id: &str, account_id: &str) {
        if let Some(cases) = self.test_cases.get_mut(project_id) {
            for case in cases.iter_mut() {
                if case.account_requirement == AccountRequirement::Specific(account_id.to_string())
                {
                    case.account_requirement = AccountRequirement::None;
                }
            }
        }
    }

    /// Removes `test_case_id` from any group it currently belongs to in `project_id`, so
    /// publishing or regrouping never leaves it in its previous group.
    pub fn remove_from_all_groups(&mut self, project_id: &str, test_case_id: &str) {
        if let Some(groups) = self.test_groups.get_mut(project_id) {
            for group in groups.iter_mut() {
                group.test_case_ids.retain(|id| id != test_case_id);
            }
        }
    }

    /// Distinct account ids configured for a project.
    pub fn account_ids(&self, project_id: &str) -> HashSet<String> {
        self.user_accounts
            .get(project_id)
            .map(|accounts| accounts.iter().map(|a| a.id.clone()).collect())
            .unwrap_or_default()
    }
}
