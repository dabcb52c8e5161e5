//! Deterministic `LlmGenerator`/`LlmSummarizer` implementations for tests and the CLI demo.

use async_trait::async_trait;

use crate::provider::verdict::Verdict;

use super::{DraftCandidate, LlmError, LlmGenerator, LlmSummarizer};

/// Returns a fixed set of drafts regardless of input, scripted at construction time.
pub struct MockLlmGenerator {
    drafts: Vec<DraftCandidate>,
}

impl MockLlmGenerator {
    pub fn new(drafts: Vec<DraftCandidate>) -> Self {
        Self { drafts }
    }

    pub fn single(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(vec![DraftCandidate {
            title: title.into(),
            description: description.into(),
            expected_outcome: None,
        }])
    }
}

#[async_trait]
impl LlmGenerator for MockLlmGenerator {
    async fn generate_drafts(
        &self,
        _website_url: &str,
        _raw_text: &str,
    ) -> Result<Vec<DraftCandidate>, LlmError> {
        Ok(self.drafts.clone())
    }
}

pub struct MockLlmSummarizer {
    pub success: bool,
}

#[async_trait]
impl LlmSummarizer for MockLlmSummarizer {
    async fn verify(&self, _prompt: &str) -> Result<Verdict, LlmError> {
        Ok(Verdict {
            success: self.success,
            reason: "mock verification".to_string(),
            extracted_data: serde_json::Value::Null,
        })
    }
}
