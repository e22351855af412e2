//! Challenge responder/handle pair (move-only).
//!
//! The authenticator receives a [`ChallengeResponder`] and consumes it with
//! exactly one outcome. The caller holds the [`ChallengeHandle`] and consumes
//! it by awaiting that outcome.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::{ChallengeError, ChallengeResult};

// ---------------------------------------------------------------------------
// ChallengeId: 128-bit random, hex encoded
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChallengeId {
    value: String,
}

impl ChallengeId {
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self {
            value: hex::encode(bytes),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// ---------------------------------------------------------------------------
// ChallengeOutcome: what the user did with the prompt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChallengeOutcome {
    Success,
    Failure { code: i32, message: String },
}

impl ChallengeOutcome {
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self::Failure {
            code,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Create a connected responder/handle pair for one challenge.
pub fn challenge_channel() -> (ChallengeResponder, ChallengeHandle) {
    let challenge_id = ChallengeId::generate();
    let (tx, rx) = oneshot::channel();
    (
        ChallengeResponder {
            challenge_id: challenge_id.clone(),
            tx,
        },
        ChallengeHandle {
            challenge_id,
            rx: Some(rx),
        },
    )
}

// ---------------------------------------------------------------------------
// ChallengeResponder: authenticator side
// ---------------------------------------------------------------------------

/// Single-use reply channel handed to the authenticator.
///
/// Dropping it without answering abandons the challenge.
#[derive(Debug)]
pub struct ChallengeResponder {
    challenge_id: ChallengeId,
    tx: oneshot::Sender<ChallengeOutcome>,
}

impl ChallengeResponder {
    pub fn challenge_id(&self) -> &ChallengeId {
        &self.challenge_id
    }

    pub fn succeed(self) {
        self.respond(ChallengeOutcome::Success);
    }

    pub fn fail(self, code: i32, message: impl Into<String>) {
        self.respond(ChallengeOutcome::failure(code, message));
    }

    pub fn respond(self, outcome: ChallengeOutcome) {
        if self.tx.send(outcome).is_err() {
            tracing::debug!(
                challenge_id = %self.challenge_id,
                "Challenge outcome delivered after handle was dropped"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// ChallengeHandle: caller side
// ---------------------------------------------------------------------------

/// Caller's handle to a started challenge. Consumed by awaiting it.
pub struct ChallengeHandle {
    challenge_id: ChallengeId,
    rx: Option<oneshot::Receiver<ChallengeOutcome>>,
}

impl fmt::Debug for ChallengeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChallengeHandle")
            .field("challenge_id", &self.challenge_id)
            .field("resolved", &self.rx.is_none())
            .finish()
    }
}

impl ChallengeHandle {
    pub fn challenge_id(&self) -> &ChallengeId {
        &self.challenge_id
    }

    /// Wait for the authenticator's answer.
    pub async fn outcome(mut self) -> ChallengeResult<ChallengeOutcome> {
        let rx = self.rx.take().ok_or(ChallengeError::Abandoned)?;
        match rx.await {
            Ok(outcome) => {
                tracing::info!(
                    challenge_id = %self.challenge_id,
                    success = outcome.is_success(),
                    "Challenge completed"
                );
                Ok(outcome)
            }
            Err(_) => {
                tracing::warn!(
                    challenge_id = %self.challenge_id,
                    "Authenticator dropped the challenge without answering"
                );
                Err(ChallengeError::Abandoned)
            }
        }
    }

    /// Wait for the answer, giving up after `limit`.
    pub async fn outcome_within(self, limit: Duration) -> ChallengeResult<ChallengeOutcome> {
        let challenge_id = self.challenge_id.clone();
        match tokio::time::timeout(limit, self.outcome()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(challenge_id = %challenge_id, "Challenge timed out");
                Err(ChallengeError::TimedOut)
            }
        }
    }
}

impl Drop for ChallengeHandle {
    fn drop(&mut self) {
        if self.rx.is_some() {
            tracing::warn!(
                challenge_id = %self.challenge_id,
                "ChallengeHandle dropped without awaiting the outcome"
            );
        }
    }
}
