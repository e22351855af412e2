use std::sync::{Arc, Mutex};

use stepgate_core::{
    AuthenticationRequirement, BiometricDecision, BypassSource, CapabilityFacts, DecisionRecord,
    RequirementSource, Timestamp,
};

use crate::session::SessionPromptState;

// ---------------------------------------------------------------------------
// DecisionAuditSink: per-evaluation audit records
// ---------------------------------------------------------------------------

/// Receives one record per evaluation.
///
/// A failing sink is logged and never changes the decision.
pub trait DecisionAuditSink: Send + Sync {
    fn record(&self, record: &DecisionRecord) -> Result<(), String>;
}

/// In-memory decision sink for testing.
#[derive(Default)]
pub struct InMemoryDecisionSink {
    records: Mutex<Vec<DecisionRecord>>,
}

impl InMemoryDecisionSink {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<DecisionRecord> {
        self.records
            .lock()
            .expect("decision sink lock poisoned")
            .clone()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .expect("decision sink lock poisoned")
            .clear();
    }
}

impl DecisionAuditSink for InMemoryDecisionSink {
    fn record(&self, record: &DecisionRecord) -> Result<(), String> {
        self.records
            .lock()
            .map_err(|_| "decision sink lock poisoned".to_string())?
            .push(record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

struct Evaluation {
    requirement: Option<AuthenticationRequirement>,
    decision: BiometricDecision,
    consulted_session_flag: bool,
}

impl Evaluation {
    fn settled(requirement: Option<AuthenticationRequirement>, decision: BiometricDecision) -> Self {
        Self {
            requirement,
            decision,
            consulted_session_flag: false,
        }
    }
}

fn decide(
    requirement: &dyn RequirementSource,
    bypass: &dyn BypassSource,
    capability: &dyn CapabilityFacts,
    session: &SessionPromptState,
) -> Evaluation {
    // The override wins over everything, including the tier.
    if bypass.bypass() {
        return Evaluation::settled(None, BiometricDecision::Bypass);
    }

    let tier = requirement.requirement();
    match tier {
        AuthenticationRequirement::Disabled => {
            Evaluation::settled(Some(tier), BiometricDecision::Bypass)
        }
        AuthenticationRequirement::EnabledOptional | AuthenticationRequirement::EnabledMandatory => {
            if !capability.security_feature_present() {
                return Evaluation::settled(Some(tier), BiometricDecision::SecurityNotPresent);
            }

            let enrolled = capability.available_and_enrolled();
            let not_set = capability.available_but_not_set();

            // Contradictory report: fail open rather than block the user.
            if enrolled && not_set {
                tracing::warn!(
                    requirement = %tier,
                    "Capability provider reported both enrolled and not set; bypassing"
                );
                return Evaluation::settled(Some(tier), BiometricDecision::Bypass);
            }

            if tier == AuthenticationRequirement::EnabledMandatory && not_set {
                return Evaluation::settled(Some(tier), BiometricDecision::SetupRequired);
            }

            if !enrolled {
                return Evaluation::settled(Some(tier), BiometricDecision::PromptSkipped);
            }

            let decision = if session.test_and_clear() {
                BiometricDecision::Authenticate
            } else {
                BiometricDecision::PromptSkipped
            };
            Evaluation {
                requirement: Some(tier),
                decision,
                consulted_session_flag: true,
            }
        }
    }
}

/// Evaluate one access attempt.
///
/// `requirement` and `bypass` are resolved here, at most once each; the
/// tier is not read at all when the override is set. The session flag is
/// read (and cleared) only when the capability checks all pass.
pub fn evaluate(
    requirement: &dyn RequirementSource,
    bypass: &dyn BypassSource,
    capability: &dyn CapabilityFacts,
    session: &SessionPromptState,
) -> BiometricDecision {
    decide(requirement, bypass, capability, session).decision
}

// ---------------------------------------------------------------------------
// DecisionPolicy: composed policy with its own session state
// ---------------------------------------------------------------------------

/// Decision policy bound to its requirement and bypass sources and to the
/// session state it was composed with.
pub struct DecisionPolicy {
    requirement: Arc<dyn RequirementSource>,
    bypass: Arc<dyn BypassSource>,
    session: Arc<SessionPromptState>,
    audit_sink: Option<Arc<dyn DecisionAuditSink>>,
}

impl DecisionPolicy {
    pub fn new(
        requirement: impl RequirementSource + 'static,
        bypass: impl BypassSource + 'static,
        session: Arc<SessionPromptState>,
    ) -> Self {
        Self {
            requirement: Arc::new(requirement),
            bypass: Arc::new(bypass),
            session,
            audit_sink: None,
        }
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn DecisionAuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    pub fn session(&self) -> &Arc<SessionPromptState> {
        &self.session
    }

    /// Evaluate one access attempt against fresh capability facts.
    pub fn evaluate(&self, capability: &dyn CapabilityFacts) -> BiometricDecision {
        let evaluation = decide(
            self.requirement.as_ref(),
            self.bypass.as_ref(),
            capability,
            &self.session,
        );

        tracing::debug!(
            decision = %evaluation.decision,
            requirement = ?evaluation.requirement,
            consulted_session_flag = evaluation.consulted_session_flag,
            "Gate decision"
        );

        if let Some(sink) = &self.audit_sink {
            let record = DecisionRecord {
                requirement: evaluation.requirement,
                decision: evaluation.decision,
                consulted_session_flag: evaluation.consulted_session_flag,
                decided_at: Timestamp::now(),
            };
            if let Err(e) = sink.record(&record) {
                tracing::warn!(error = %e, "Failed to record gate decision");
            }
        }

        evaluation.decision
    }
}

impl std::fmt::Debug for DecisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionPolicy")
            .field("session", &self.session)
            .field("audit_sink", &self.audit_sink.is_some())
            .finish()
    }
}
