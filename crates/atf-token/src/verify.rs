//! Signature and claim-shape verification.
//!
//! Verification order: signature and structure first (honouring
//! `ignore_expiration`), then presence of the required claim set
//! `{sub, startDate, endDate, iss}`. A signature-valid token missing any
//! required claim is an invalid token naming that claim, and expiry is
//! only reported for tokens whose signature checked out.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use atf_core::{TokenPayload, epoch_seconds_to_iso};

use crate::error::TokenError;

/// Raw claims of a verified token, before the required-claim check.
///
/// Every field is optional at this stage so the check can name the exact
/// claim that is missing.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub sub: Option<String>,
    pub iss: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<i64>,
    #[serde(rename = "endDate")]
    pub end_date: Option<i64>,
    #[serde(rename = "isAvailable")]
    pub is_available: Option<bool>,
}

impl TokenClaims {
    /// Enforces the required-claim set and converts epoch-second dates to
    /// the ISO-8601 strings the data API and templates consume.
    pub fn into_payload(self) -> Result<TokenPayload, TokenError> {
        let atf_id = self.sub.ok_or_else(|| TokenError::missing_claim("sub"))?;
        if self.iss.is_none() {
            return Err(TokenError::missing_claim("iss"));
        }
        let start_date = self
            .start_date
            .ok_or_else(|| TokenError::missing_claim("startDate"))?;
        let end_date = self
            .end_date
            .ok_or_else(|| TokenError::missing_claim("endDate"))?;

        Ok(TokenPayload {
            atf_id,
            is_available: self.is_available,
            start_date: epoch_seconds_to_iso(start_date)
                .map_err(|e| TokenError::invalid(format!("bad startDate claim: {e}")))?,
            end_date: epoch_seconds_to_iso(end_date)
                .map_err(|e| TokenError::invalid(format!("bad endDate claim: {e}")))?,
        })
    }
}

/// Verifies a token's signature against the shared secret and returns its
/// raw claims.
///
/// With `ignore_expiration` the signature and structure are still checked
/// but an expired token is accepted; the reissue and expired-token flows
/// use this to read the facility id out of an otherwise-expired token.
pub fn verify_token(
    token: &str,
    secret: &str,
    ignore_expiration: bool,
) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = !ignore_expiration;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp"]);

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}
