//! Error taxonomy shared by the patient and appointment services.

/// Failures surfaced to the API layer.
///
/// `NotFound` maps to 404, `Validation` to 400, everything else to 500.
/// There are no retries; every failure is returned directly to the caller.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Store(#[from] sqlx::Error),
    #[error("corrupt stored record: {0}")]
    Corrupt(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Corrupt(err.to_string())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }
}
