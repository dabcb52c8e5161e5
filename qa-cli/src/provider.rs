//! Resolves a `BrowserProvider` from CLI flags/env: pick an implementation by name,
//! everything else reads it through the trait.

use std::sync::Arc;

use qa_core::provider::browser_use_cloud::BrowserUseCloudProvider;
use qa_core::provider::hyperbrowser::HyperbrowserProvider;
use qa_core::provider::mock::MockProvider;
use qa_core::provider::BrowserProvider;

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum ProviderChoice {
    Mock,
    Hyperbrowser,
    BrowserUseCloud,
}

/// Builds the provider named by `choice`. The two real providers report
/// `ProviderError::Unsupported` on every call until wired to a live API key and endpoint
/// (browser automation is an external collaborator this crate does not implement); `mock`
/// is what `run`/`serve` use by default.
pub fn resolve_provider(choice: &ProviderChoice, api_key: Option<&str>) -> Arc<dyn BrowserProvider> {
    match choice {
        ProviderChoice::Mock => Arc::new(MockProvider::new(true)),
        ProviderChoice::Hyperbrowser => {
            Arc::new(HyperbrowserProvider::new(api_key.unwrap_or_default().to_string()))
        }
        ProviderChoice::BrowserUseCloud => {
            Arc::new(BrowserUseCloudProvider::new(api_key.unwrap_or_default().to_string()))
        }
    }
}
