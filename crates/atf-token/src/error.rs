use thiserror::Error;

/// Errors resolving the shared signing secret.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The key service call failed in transport or while reading the body.
    #[error("key service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The key service answered with a non-success status.
    #[error("key service returned status {status}")]
    Status { status: u16 },

    /// Ciphertext or plaintext was not valid base64.
    #[error("invalid base64 in key material: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The decrypted secret was not valid UTF-8.
    #[error("decrypted secret is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// The outcome of a token-validation attempt.
///
/// `Missing`, `Invalid` and `MissingClaim` are all invalid-token outcomes;
/// `Expired` is the designed recovery path (the caller redirects into the
/// reissue flow); `Secret` is a server-side failure unrelated to the token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// No token in the request's query parameters. Verification is never
    /// attempted in this case.
    #[error("Token is undefined")]
    Missing,

    /// Signature-valid but past expiry.
    #[error("token is expired")]
    Expired,

    /// Unparsable, signature-invalid, or malformed token.
    #[error("invalid token: {reason}")]
    Invalid {
        /// Description of why the token is invalid. Logged, never rendered.
        reason: String,
    },

    /// Signature-valid token lacking one of the required claims.
    #[error("missing required claim: {claim}")]
    MissingClaim {
        /// Name of the missing claim.
        claim: String,
    },

    /// The signing secret could not be resolved.
    #[error("failed to resolve signing secret: {0}")]
    Secret(#[from] SecretError),
}

impl TokenError {
    /// Creates a new `Invalid` error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    /// Creates a new `MissingClaim` error.
    #[must_use]
    pub fn missing_claim(claim: impl Into<String>) -> Self {
        Self::MissingClaim {
            claim: claim.into(),
        }
    }

    /// Returns `true` for the expired outcome, which routes into the
    /// reissue flow rather than an error page.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Returns `true` for every invalid-token outcome (missing, unparsable,
    /// bad signature, missing claim).
    #[must_use]
    pub fn is_invalid_token(&self) -> bool {
        matches!(
            self,
            Self::Missing | Self::Invalid { .. } | Self::MissingClaim { .. }
        )
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::MissingRequiredClaim(claim) => Self::missing_claim(claim.clone()),
            _ => Self::invalid(err.to_string()),
        }
    }
}
