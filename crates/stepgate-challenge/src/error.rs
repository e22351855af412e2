use thiserror::Error;

/// Error type for the stepgate-challenge crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("challenge abandoned by authenticator")]
    Abandoned,

    #[error("challenge timed out")]
    TimedOut,

    #[error("invalid prompt: {0}")]
    InvalidPrompt(String),
}

pub type ChallengeResult<T> = Result<T, ChallengeError>;
