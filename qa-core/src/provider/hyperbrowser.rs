//! Hyperbrowser-backed provider. Hyperbrowser itself is an external collaborator out of
//! scope for this repo; this implements the trait's full shape against its documented REST
//! surface so the scheduler never special-cases the provider identity, but the network
//! calls are stubs that report `ProviderError::Unsupported` until wired to a real API key
//! and endpoint.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::ProviderError;
use crate::model::ProviderKey;

use super::{
    BrowserProvider, DeleteProfileOutcome, ExecuteTestInput, ExecuteTestOutcome, LoginInput,
    LoginOutcome, ProviderCallbacks,
};

pub struct HyperbrowserProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl HyperbrowserProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.hyperbrowser.ai".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl BrowserProvider for HyperbrowserProvider {
    fn key(&self) -> ProviderKey {
        ProviderKey::Hyperbrowser
    }

    async fn execute_test(
        &self,
        _input: ExecuteTestInput,
        _callbacks: &(dyn ProviderCallbacks + Send + Sync),
    ) -> Result<ExecuteTestOutcome, ProviderError> {
        let _ = (&self.client, &self.api_key, &self.base_url);
        Err(ProviderError::Unsupported(
            "hyperbrowser session execution is not wired to a live API in this deployment",
        ))
    }

    async fn login_with_profile(&self, _input: LoginInput) -> Result<LoginOutcome, ProviderError> {
        Err(ProviderError::Unsupported(
            "hyperbrowser profile login is not wired to a live API in this deployment",
        ))
    }

    async fn delete_profile(&self, _profile_id: &str) -> Result<DeleteProfileOutcome, ProviderError> {
        Err(ProviderError::Unsupported(
            "hyperbrowser profile deletion is not wired to a live API in this deployment",
        ))
    }
}
