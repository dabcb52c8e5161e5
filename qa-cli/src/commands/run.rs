//! `qa run`: execute one ad hoc test case locally and print its event stream as NDJSON.

use std::sync::Arc;

use qa_core::model::{TestCase, TestStatus};
use qa_core::{AccountLockRegistry, SchedulerInput};
use qa_protocol::{AccountRequirement, EnvelopeState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::provider::{resolve_provider, ProviderChoice};

const EVENT_QUEUE_CAPACITY: usize = 64;

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Website URL to exercise
    #[arg(long)]
    pub website_url: String,

    /// Test case title
    #[arg(long)]
    pub title: String,

    /// Test case description (what to do / verify)
    #[arg(long)]
    pub description: String,

    /// Expected outcome, if known
    #[arg(long)]
    pub expected_outcome: Option<String>,

    /// Browser provider to use
    #[arg(long, value_enum, default_value = "mock")]
    pub provider: ProviderChoice,

    /// API key for a real provider (ignored for `mock`)
    #[arg(long, env = "QA_PROVIDER_API_KEY")]
    pub api_key: Option<String>,
}

pub async fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let provider = resolve_provider(&args.provider, args.api_key.as_deref());
    let registry = AccountLockRegistry::new();
    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

    let run_id = format!("run-{}", Uuid::new_v4());
    let test_case = TestCase {
        id: format!("tc-{}", Uuid::new_v4()),
        project_id: "local".to_string(),
        title: args.title,
        description: args.description,
        expected_outcome: args.expected_outcome,
        created_by: "qa-cli".to_string(),
        account_requirement: AccountRequirement::None,
        status: TestStatus::Pending,
        last_result: None,
    };

    let scheduler_input = SchedulerInput {
        test_cases: vec![test_case],
        website_url: args.website_url,
        parallel_limit: 1,
        accounts: Vec::new(),
        preferred_account_ids: Vec::new(),
    };

    let mut envelope = EnvelopeState::new(run_id);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Ok(value) = envelope.to_json(&event) {
                println!("{}", value);
            }
        }
    });

    let summarizer: Arc<dyn qa_core::llm::LlmSummarizer> =
        Arc::new(qa_core::llm::mock::MockLlmSummarizer { success: true });
    let results =
        qa_core::run_schedule(scheduler_input, provider, registry, cancel, tx, summarizer).await;
    printer.await.ok();

    for result in &results {
        eprintln!(
            "{}: {:?} ({})",
            result.test_case_id, result.status, result.reason
        );
    }
    Ok(())
}
