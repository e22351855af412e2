//! Stepgate
//!
//! Composition root for the step-up authentication gate. Wires the decision
//! policy, the per-session prompt flag, the lifecycle bridge and a platform
//! authenticator into a single [`Gate`].
//!
//! # Flow
//!
//! The caller asks the gate once per access attempt. The policy answers
//! synchronously; only an `Authenticate` decision starts the platform
//! challenge, whose outcome is awaited asynchronously. The session flag is
//! settled before the challenge starts and no lock is held across it.

pub mod config;
pub mod error;
pub mod simulated;

pub use config::{GateConfig, PromptConfig};
pub use error::{GateError, GateResult};
pub use simulated::SimulatedAuthenticator;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use stepgate_challenge::{start_challenge, ChallengeAuthenticator, ChallengeOutcome, PromptInfo};
use stepgate_core::{BiometricDecision, BypassSource, RequirementSource};
use stepgate_policy::{
    DecisionAuditSink, DecisionPolicy, ForegroundLifecycleBridge, SessionPromptState,
};

/// Result of one full access attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AccessOutcome {
    /// The policy settled the attempt without a challenge.
    Decided(BiometricDecision),
    /// A challenge ran; this is what the user did with it.
    Challenged(ChallengeOutcome),
}

impl AccessOutcome {
    /// Whether the caller may proceed to the protected action.
    ///
    /// `SecurityNotPresent` is left to the caller and is not granted here.
    pub fn is_granted(&self) -> bool {
        match self {
            AccessOutcome::Decided(decision) => {
                matches!(decision, BiometricDecision::Bypass | BiometricDecision::PromptSkipped)
            }
            AccessOutcome::Challenged(outcome) => outcome.is_success(),
        }
    }
}

/// The gate in front of a protected action.
pub struct Gate {
    policy: DecisionPolicy,
    authenticator: Arc<dyn ChallengeAuthenticator>,
    prompt: PromptInfo,
    challenge_timeout: Duration,
}

impl Gate {
    pub fn new(
        requirement: impl RequirementSource + 'static,
        bypass: impl BypassSource + 'static,
        authenticator: Arc<dyn ChallengeAuthenticator>,
        prompt: PromptInfo,
        challenge_timeout: Duration,
    ) -> Self {
        let session = Arc::new(SessionPromptState::new());
        Self {
            policy: DecisionPolicy::new(requirement, bypass, session),
            authenticator,
            prompt,
            challenge_timeout,
        }
    }

    /// Build a gate whose tier and override come from `config`.
    pub fn from_config(
        config: &GateConfig,
        authenticator: Arc<dyn ChallengeAuthenticator>,
    ) -> GateResult<Self> {
        config.validate()?;
        let prompt = config.prompt.to_prompt()?;
        let requirement = config.requirement;
        let bypass = config.bypass;

        tracing::info!(
            requirement = %requirement,
            bypass,
            "Gate initialized"
        );

        Ok(Self::new(
            move || requirement,
            move || bypass,
            authenticator,
            prompt,
            config.challenge_timeout(),
        ))
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn DecisionAuditSink>) -> Self {
        self.policy = self.policy.with_audit_sink(sink);
        self
    }

    pub fn session(&self) -> &Arc<SessionPromptState> {
        self.policy.session()
    }

    /// Bridge that re-arms this gate's session flag on lost foreground.
    pub fn lifecycle_bridge(&self) -> ForegroundLifecycleBridge {
        ForegroundLifecycleBridge::new(Arc::clone(self.policy.session()))
    }

    /// Run the policy only. Never starts a challenge.
    pub fn decide(&self) -> BiometricDecision {
        self.policy.evaluate(&self.authenticator)
    }

    /// Run the policy and, on `Authenticate`, the challenge.
    pub async fn access(&self) -> GateResult<AccessOutcome> {
        let decision = self.decide();
        if !decision.requires_challenge() {
            return Ok(AccessOutcome::Decided(decision));
        }

        let handle = start_challenge(self.authenticator.as_ref(), &self.prompt);
        let outcome = handle.outcome_within(self.challenge_timeout).await?;
        Ok(AccessOutcome::Challenged(outcome))
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("policy", &self.policy)
            .field("prompt", &self.prompt)
            .field("challenge_timeout", &self.challenge_timeout)
            .finish()
    }
}
