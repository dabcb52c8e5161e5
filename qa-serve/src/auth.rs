//! Pluggable request authorization: one trait, every backend implements the same single
//! total operation.

use async_trait::async_trait;
use axum::http::HeaderMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallerId(pub String);

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing or invalid credentials")]
    Unauthorized,
}

/// Resolves an inbound request's headers to a caller id, or rejects it.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, headers: &HeaderMap) -> Result<CallerId, AuthError>;
}

/// Accepts any request bearing an `Authorization: Bearer <token>` header, using the token
/// itself as the caller id for rate-limiting purposes. A real deployment would validate the
/// token against a team/session store; this crate's contract stops at "a caller is identified".
pub struct BearerTokenAuthorizer;

#[async_trait]
impl Authorizer for BearerTokenAuthorizer {
    async fn authorize(&self, headers: &HeaderMap) -> Result<CallerId, AuthError> {
        let token = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthorized)?;
        Ok(CallerId(token.to_string()))
    }
}

/// Authorizes every request as a fixed caller id, for tests and local `qa-cli serve`.
pub struct AllowAllAuthorizer;

#[async_trait]
impl Authorizer for AllowAllAuthorizer {
    async fn authorize(&self, _headers: &HeaderMap) -> Result<CallerId, AuthError> {
        Ok(CallerId("local".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bearer_authorizer_extracts_token() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        let caller = BearerTokenAuthorizer.authorize(&headers).await.unwrap();
        assert_eq!(caller.0, "abc123");
    }

    #[tokio::test]
    async fn bearer_authorizer_rejects_missing_header() {
        let headers = HeaderMap::new();
        assert!(BearerTokenAuthorizer.authorize(&headers).await.is_err());
    }

    #[tokio::test]
    async fn allow_all_always_succeeds() {
        let headers = HeaderMap::new();
        assert!(AllowAllAuthorizer.authorize(&headers).await.is_ok());
    }
}
