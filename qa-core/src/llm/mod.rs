//! LLM client abstraction for the AI generation pipeline: one trait, a mock implementation
//! for tests, and a thin seam where a real provider (OpenAI/Anthropic-shaped) would plug in.

pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("llm request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("llm response could not be parsed: {0}")]
    BadResponse(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftCandidate {
    pub title: String,
    pub description: String,
    #[serde(rename = "expectedOutcome")]
    pub expected_outcome: Option<String>,
}

/// Generates candidate test case drafts from a free-text description and a website to
/// explore. Implementations decide how "exploration" actually happens (e.g. a live browser
/// session feeding the model screenshots); this crate only needs the resulting drafts.
#[async_trait]
pub trait LlmGenerator: Send + Sync {
    async fn generate_drafts(
        &self,
        website_url: &str,
        raw_text: &str,
    ) -> Result<Vec<DraftCandidate>, LlmError>;
}

/// Produces a pass/fail verdict from a free-text transcript, used as the verification
/// fallback when a provider's own verdict extraction is ambiguous.
#[async_trait]
pub trait LlmSummarizer: Send + Sync {
    async fn verify(&self, prompt: &str) -> Result<crate::provider::verdict::Verdict, LlmError>;
}
