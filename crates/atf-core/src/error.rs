use thiserror::Error;

/// Core error types shared across the ATF availability crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid epoch timestamp: {0}")]
    InvalidTimestamp(#[from] time::error::ComponentRange),

    #[error("Invalid date-time: {0}")]
    InvalidDateTime(String),

    #[error("Date formatting error: {0}")]
    FormatError(#[from] time::error::Format),
}

impl CoreError {
    /// Create a new InvalidDateTime error
    pub fn invalid_date_time(message: impl Into<String>) -> Self {
        Self::InvalidDateTime(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
