//! Shared signing secret resolution.
//!
//! Deployments either configure the plaintext secret directly or configure
//! base64 ciphertext plus a managed key service (KMS) that decrypts it. The
//! decrypt call uses the KMS JSON wire shape, so the endpoint can be the
//! real service or a local stand-in.
//!
//! Resolution happens per request and is never cached here; a failure is
//! fatal for the current request only and is not retried.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

use crate::config::TokenConfig;
use crate::error::SecretError;

/// Resolves the secret the token signatures are verified against.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    async fn resolve_secret(&self) -> Result<String, SecretError>;
}

/// Provider for deployments that configure the plaintext secret directly.
pub struct EnvSecretProvider {
    secret: String,
}

impl EnvSecretProvider {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn resolve_secret(&self) -> Result<String, SecretError> {
        Ok(self.secret.clone())
    }
}

#[derive(Serialize)]
struct DecryptRequest<'a> {
    #[serde(rename = "KeyId")]
    key_id: &'a str,
    #[serde(rename = "CiphertextBlob")]
    ciphertext_blob: &'a str,
}

#[derive(Deserialize)]
struct DecryptResponse {
    #[serde(rename = "Plaintext")]
    plaintext: String,
}

/// Provider that decrypts base64 ciphertext through a managed key service.
pub struct KmsSecretProvider {
    client: reqwest::Client,
    endpoint: String,
    key_id: String,
    ciphertext: String,
}

impl KmsSecretProvider {
    pub fn new(
        endpoint: impl Into<String>,
        key_id: impl Into<String>,
        ciphertext: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, SecretError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            key_id: key_id.into(),
            ciphertext: ciphertext.into(),
        })
    }
}

#[async_trait]
impl SecretProvider for KmsSecretProvider {
    async fn resolve_secret(&self) -> Result<String, SecretError> {
        // Fail fast on malformed ciphertext before going to the network.
        BASE64.decode(&self.ciphertext)?;

        tracing::info!(key_id = %self.key_id, "decrypting signing secret");

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Amz-Target", "TrentService.Decrypt")
            .header("Content-Type", "application/x-amz-json-1.1")
            .json(&DecryptRequest {
                key_id: &self.key_id,
                ciphertext_blob: &self.ciphertext,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(key_id = %self.key_id, status = %status, "failed to decrypt signing secret");
            return Err(SecretError::Status {
                status: status.as_u16(),
            });
        }

        let decrypted: DecryptResponse = response.json().await?;
        let plaintext = BASE64.decode(decrypted.plaintext)?;
        Ok(String::from_utf8(plaintext)?)
    }
}

/// Builds the provider the given config calls for.
pub fn provider_from_config(config: &TokenConfig) -> Result<Arc<dyn SecretProvider>, SecretError> {
    match config.kms {
        Some(ref kms) => Ok(Arc::new(KmsSecretProvider::new(
            kms.endpoint.clone(),
            kms.key_id.clone(),
            config.jwt_secret.clone(),
            config.request_timeout(),
        )?)),
        None => Ok(Arc::new(EnvSecretProvider::new(config.jwt_secret.clone()))),
    }
}
