//! Token lifecycle orchestration.
//!
//! [`TokenService`] glues the pieces together per request: take the raw
//! token string the handler pulled out of the query parameters, resolve
//! the signing secret, verify, and map the claims into a typed payload.
//! It also fronts the external token-issuing service for the reissue flow.

use std::sync::Arc;

use atf_core::{CORRELATION_HEADER, CorrelationId, TokenPayload};

use crate::config::TokenConfig;
use crate::error::{SecretError, TokenError};
use crate::secrets::{SecretProvider, provider_from_config};
use crate::verify::verify_token;

pub struct TokenService {
    provider: Arc<dyn SecretProvider>,
    client: reqwest::Client,
    generate_token_url: String,
}

impl TokenService {
    /// Wires the service from config, selecting the secret provider the
    /// config calls for.
    pub fn from_config(config: &TokenConfig) -> Result<Self, SecretError> {
        let provider = provider_from_config(config)?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            provider,
            client,
            generate_token_url: config.generate_token_url.clone(),
        })
    }

    /// Builds the service from explicit parts. Used by tests to swap the
    /// secret provider.
    pub fn new(
        provider: Arc<dyn SecretProvider>,
        client: reqwest::Client,
        generate_token_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            client,
            generate_token_url: generate_token_url.into(),
        }
    }

    /// Verifies the token and returns its typed payload.
    ///
    /// A request without a token fails immediately with
    /// [`TokenError::Missing`]; no secret resolution or verification is
    /// attempted. With `ignore_expiration` an expired token still yields
    /// its payload, so the reissue flow can read the facility id out of it.
    pub async fn extract_token_payload(
        &self,
        correlation_id: &CorrelationId,
        token: Option<&str>,
        ignore_expiration: bool,
    ) -> Result<TokenPayload, TokenError> {
        let Some(token) = token else {
            tracing::warn!(%correlation_id, "token missing from query params");
            return Err(TokenError::Missing);
        };

        tracing::info!(%correlation_id, token, "extracting token payload");

        let secret = self.provider.resolve_secret().await.map_err(|e| {
            tracing::error!(%correlation_id, error = %e, "failed to resolve signing secret");
            e
        })?;

        let claims = verify_token(token, &secret, ignore_expiration).map_err(|e| {
            if e.is_expired() {
                tracing::warn!(%correlation_id, token, "expired token provided");
            } else {
                tracing::warn!(%correlation_id, token, error = %e, "invalid token provided");
            }
            e
        })?;

        claims.into_payload().map_err(|e| {
            tracing::warn!(%correlation_id, token, error = %e, "invalid token provided");
            e
        })
    }

    /// Asks the external issuing service for a fresh token for `atf_id`.
    ///
    /// Failures are logged and swallowed: reissue backs the expired-token
    /// recovery page, and a failed reissue must not turn that page into an
    /// error page. One attempt, no retry.
    pub async fn reissue_token(&self, correlation_id: &CorrelationId, atf_id: &str) {
        tracing::info!(%correlation_id, atf_id, "requesting new ATF token");

        let result = self
            .client
            .post(&self.generate_token_url)
            .header(CORRELATION_HEADER, correlation_id.as_str())
            .json(&serde_json::json!({ "atfId": atf_id }))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        if let Err(e) = result {
            tracing::warn!(%correlation_id, atf_id, error = %e, "failed to generate new ATF token");
        }
    }
}
