use std::fmt;

use serde::{Deserialize, Serialize};

/// Header used to thread the correlation id through the full call chain.
///
/// Redirects drop headers, so the same id is also carried as the
/// `correlationId` query parameter on every redirect this service issues.
pub const CORRELATION_HEADER: &str = "X-Correlation-Id";

/// Identifier joining this service's logs with the external APIs' logs for
/// one logical request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh id for requests that arrived without one.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
