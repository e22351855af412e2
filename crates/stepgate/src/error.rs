use thiserror::Error;

/// Top-level error for the gate and its binary.
///
/// Evaluation itself never fails; these cover configuration, the challenge
/// round trip, and I/O around them.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("core error: {0}")]
    Core(#[from] stepgate_core::GateCoreError),

    #[error("challenge error: {0}")]
    Challenge(#[from] stepgate_challenge::ChallengeError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for GateError {
    fn from(e: serde_json::Error) -> Self {
        GateError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for GateError {
    fn from(e: toml::de::Error) -> Self {
        GateError::Config(format!("TOML parse error: {}", e))
    }
}

pub type GateResult<T> = Result<T, GateError>;
