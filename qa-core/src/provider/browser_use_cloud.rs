//! Browser Use Cloud-backed provider. Same external-collaborator scoping as
//! [`super::hyperbrowser`]: the trait is fully implemented, the HTTP calls are stubbed.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::ProviderError;
use crate::model::ProviderKey;

use super::{
    BrowserProvider, DeleteProfileOutcome, ExecuteTestInput, ExecuteTestOutcome, LoginInput,
    LoginOutcome, ProviderCallbacks,
};

pub struct BrowserUseCloudProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl BrowserUseCloudProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.browser-use.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl BrowserProvider for BrowserUseCloudProvider {
    fn key(&self) -> ProviderKey {
        ProviderKey::BrowserUseCloud
    }

    async fn execute_test(
        &self,
        _input: ExecuteTestInput,
        _callbacks: &(dyn ProviderCallbacks + Send + Sync),
    ) -> Result<ExecuteTestOutcome, ProviderError> {
        let _ = (&self.client, &self.api_key, &self.base_url);
        Err(ProviderError::Unsupported(
            "browser-use-cloud session execution is not wired to a live API in this deployment",
        ))
    }

    async fn login_with_profile(&self, _input: LoginInput) -> Result<LoginOutcome, ProviderError> {
        Err(ProviderError::Unsupported(
            "browser-use-cloud profile login is not wired to a live API in this deployment",
        ))
    }

    async fn delete_profile(&self, _profile_id: &str) -> Result<DeleteProfileOutcome, ProviderError> {
        Err(ProviderError::Unsupported(
            "browser-use-cloud profile deletion is not wired to a live API in this deployment",
        ))
    }
}
