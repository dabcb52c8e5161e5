//! Stale-run sweeper: pure and idempotent. Never touches the store — the caller re-saves
//! the swept state only if it chooses to.

use qa_core::model::{
    JobStatus, ResultStatus, RunStatus, TeamState, TestCase, TestResult, TestStatus,
};

const LOST_CONNECTION_MESSAGE: &str = "Connection lost before result was received";

/// Rewrites any run/result/test-case/project/group left in a non-terminal state to a
/// terminal error, recomputes totals from remaining evidence, and clears
/// `active_test_runs`. Calling `sweep` twice in a row is a no-op (property A8).
pub fn sweep(state: &mut TeamState) {
    for runs in state.test_runs.values_mut() {
        for run in runs.iter_mut() {
            let mut touched = false;
            for result in run.results.iter_mut() {
                if matches!(result.status, ResultStatus::Running | ResultStatus::Pending) {
                    mark_lost(result);
                    touched = true;
                }
            }
            if run.status == RunStatus::Running {
                run.status = RunStatus::Failed;
                run.completed_at = run.completed_at.or_else(|| Some(chrono::Utc::now()));
                touched = true;
            }
            if touched {
                recompute_totals(run);
            }
        }
    }

    for cases in state.test_cases.values_mut() {
        for case in cases.iter_mut() {
            if matches!(case.status, TestStatus::Running | TestStatus::Pending) {
                case.status = TestStatus::Failed;
            }
            if let Some(last_result) = case.last_result.as_mut() {
                if matches!(last_result.status, ResultStatus::Running | ResultStatus::Pending) {
                    mark_lost(last_result);
                }
            }
        }
    }

    for project in state.projects.iter_mut() {
        if project.last_run_status == Some(RunStatus::Running) {
            project.last_run_status = Some(RunStatus::Failed);
        }
    }

    for groups in state.test_groups.values_mut() {
        for group in groups.iter_mut() {
            if group.last_run_status == Some(RunStatus::Running) {
                group.last_run_status = Some(RunStatus::Failed);
            }
        }
    }

    for jobs in state.ai_jobs.values_mut() {
        for job in jobs.iter_mut() {
            if job.status == JobStatus::Running {
                job.status = JobStatus::Failed;
                job.error.get_or_insert_with(|| LOST_CONNECTION_MESSAGE.to_string());
                job.completed_at = job.completed_at.or_else(|| Some(chrono::Utc::now()));
            }
        }
    }

    state.active_test_runs.clear();
    state.active_test_run = None;
}

fn mark_lost(result: &mut TestResult) {
    result.status = ResultStatus::Error;
    result.error = Some(LOST_CONNECTION_MESSAGE.to_string());
    result.reason = LOST_CONNECTION_MESSAGE.to_string();
    result.completed_at = result.completed_at.or_else(|| Some(chrono::Utc::now()));
}

fn recompute_totals(run: &mut qa_core::model::TestRun) {
    run.totals.passed = run
        .results
        .iter()
        .filter(|r| r.status == ResultStatus::Passed)
        .count() as u32;
    run.totals.failed = run
        .results
        .iter()
        .filter(|r| matches!(r.status, ResultStatus::Failed | ResultStatus::Error))
        .count() as u32;
    run.totals.skipped = run
        .results
        .iter()
        .filter(|r| r.status == ResultStatus::Skipped)
        .count() as u32;
    run.totals.total = run.results.len() as u32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use qa_core::model::{RunTotals, TestRun};
    use qa_protocol::AccountRequirement;
    use std::collections::VecDeque;

    fn running_case() -> TestCase {
        TestCase {
            id: "tc-1".to_string(),
            project_id: "proj-1".to_string(),
            title: "Checkout flow".to_string(),
            description: "Add to cart and check out".to_string(),
            expected_outcome: None,
            created_by: "tester".to_string(),
            account_requirement: AccountRequirement::None,
            status: TestStatus::Running,
            last_result: Some(TestResult::pending("tc-1")),
        }
    }

    fn running_run() -> TestRun {
        TestRun {
            id: "run-1".to_string(),
            project_id: "proj-1".to_string(),
            started_at: chrono::Utc::now(),
            completed_at: None,
            status: RunStatus::Running,
            test_case_ids: vec!["tc-1".to_string()],
            parallel_limit: 1,
            totals: RunTotals::default(),
            results: vec![TestResult::pending("tc-1")],
        }
    }

    #[test]
    fn sweep_terminates_running_run() {
        let mut state = TeamState::default();
        state
            .test_runs
            .insert("proj-1".to_string(), VecDeque::from(vec![running_run()]));
        sweep(&mut state);
        let run = &state.test_runs["proj-1"][0];
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.results[0].status, ResultStatus::Error);
        assert_eq!(run.totals.failed, 1);
        assert_eq!(run.totals.total, 1);
    }

    #[test]
    fn sweep_clears_active_runs() {
        let mut state = TeamState::default();
        state.active_test_runs.insert(
            "run-1".to_string(),
            qa_core::model::ActiveRunMeta {
                project_id: "proj-1".to_string(),
                started_at: chrono::Utc::now(),
            },
        );
        sweep(&mut state);
        assert!(state.active_test_runs.is_empty());
    }

    #[test]
    fn sweep_rewrites_stale_last_result() {
        let mut state = TeamState::default();
        state
            .test_cases
            .insert("proj-1".to_string(), vec![running_case()]);
        sweep(&mut state);
        let case = &state.test_cases["proj-1"][0];
        assert_eq!(case.status, TestStatus::Failed);
        let last_result = case.last_result.as_ref().unwrap();
        assert_eq!(last_result.status, ResultStatus::Error);
        assert_eq!(last_result.reason, LOST_CONNECTION_MESSAGE);
    }

    #[test]
    fn sweep_is_idempotent() {
        let mut state = TeamState::default();
        state
            .test_runs
            .insert("proj-1".to_string(), VecDeque::from(vec![running_run()]));
        sweep(&mut state);
        let once = serde_json::to_string(&state).unwrap();
        sweep(&mut state);
        let twice = serde_json::to_string(&state).unwrap();
        assert_eq!(once, twice);
    }
}
