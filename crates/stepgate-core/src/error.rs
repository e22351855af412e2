use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateCoreError {
    #[error("invalid authentication requirement: {0}")]
    InvalidRequirement(String),

    #[error("invalid decision: {0}")]
    InvalidDecision(String),

    #[error("invalid authenticator status: {0}")]
    InvalidStatus(String),
}

pub type GateCoreResult<T> = Result<T, GateCoreError>;
