//! Token verification and lifecycle.
//!
//! An availability link carries a signed HS256 token encoding a facility id
//! and an availability window. This crate resolves the shared signing
//! secret (optionally decrypting it through a managed key service),
//! verifies tokens, converts their claims into a typed [`atf_core::TokenPayload`],
//! and requests reissuance of expired tokens from the external issuing
//! service.
//!
//! The outcome of a verification attempt is the [`error::TokenError`]
//! variant set: callers `match` on it to pick the next action (render,
//! redirect to the reissue flow, or fail the request). There is no retry
//! loop; every outcome is terminal within one request.

pub mod config;
pub mod error;
pub mod secrets;
pub mod service;
pub mod verify;

pub use config::{KmsConfig, TokenConfig};
pub use error::{SecretError, TokenError};
pub use secrets::{EnvSecretProvider, KmsSecretProvider, SecretProvider};
pub use service::TokenService;
pub use verify::{TokenClaims, verify_token};
