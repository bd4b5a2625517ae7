//! Token module configuration.
//!
//! Built once at startup from the environment and handed to
//! [`crate::TokenService`]; immutable afterwards.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for token verification and reissuance.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Shared signing secret. When [`Self::kms`] is set this is base64
    /// ciphertext to be decrypted through the key service; otherwise it is
    /// the plaintext secret material.
    pub jwt_secret: String,

    /// Endpoint of the external token-issuing service.
    pub generate_token_url: String,

    /// Fixed timeout applied to every outbound call.
    pub request_timeout_ms: u64,

    /// Managed key service settings. Absent means the secret is plaintext.
    pub kms: Option<KmsConfig>,
}

/// Managed key service (KMS) decrypt settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KmsConfig {
    /// Key service endpoint the decrypt call is posted to.
    pub endpoint: String,
    /// Identifier of the key the ciphertext was encrypted under.
    pub key_id: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            generate_token_url: String::new(),
            request_timeout_ms: 10_000,
            kms: None,
        }
    }
}

impl TokenConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.is_empty() {
            return Err("token.jwt_secret must not be empty".into());
        }
        if self.generate_token_url.is_empty() {
            return Err("token.generate_token_url must not be empty".into());
        }
        if self.request_timeout_ms == 0 {
            return Err("token.request_timeout_ms must be > 0".into());
        }
        if let Some(ref kms) = self.kms {
            if kms.endpoint.is_empty() {
                return Err("token.kms.endpoint must not be empty".into());
            }
            if kms.key_id.is_empty() {
                return Err("token.kms.key_id must not be empty".into());
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
