//! End-to-end tests for the gate.
//!
//! Covers the decision scenario table through a configured gate, the
//! once-per-session prompt across foreground transitions, and the full
//! challenge round trip including abandoned and timed-out challenges.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stepgate::{AccessOutcome, Gate, GateConfig, GateError, SimulatedAuthenticator};
use stepgate_challenge::{
    AuthenticatorStatus, ChallengeAuthenticator, ChallengeError, ChallengeOutcome,
    ChallengeResponder, PromptInfo,
};
use stepgate_core::{
    AuthenticationRequirement, BiometricDecision, CapabilityFacts, CapabilitySnapshot,
};
use stepgate_policy::{ForegroundEvent, InMemoryDecisionSink};

static CONFIG_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Authenticator whose facts are set directly, including contradictory ones.
struct FactsAuthenticator {
    facts: Mutex<CapabilitySnapshot>,
    parked: Mutex<Vec<ChallengeResponder>>,
    drop_responders: bool,
}

impl FactsAuthenticator {
    fn new(present: bool, enrolled: bool, not_set: bool) -> Self {
        Self {
            facts: Mutex::new(CapabilitySnapshot::new(present, enrolled, not_set)),
            parked: Mutex::new(Vec::new()),
            drop_responders: false,
        }
    }

    fn dropping(mut self) -> Self {
        self.drop_responders = true;
        self
    }

    fn snapshot(&self) -> CapabilitySnapshot {
        *self.facts.lock().unwrap()
    }
}

impl CapabilityFacts for FactsAuthenticator {
    fn security_feature_present(&self) -> bool {
        self.snapshot().security_feature_present
    }

    fn available_and_enrolled(&self) -> bool {
        self.snapshot().available_and_enrolled
    }

    fn available_but_not_set(&self) -> bool {
        self.snapshot().available_but_not_set
    }
}

impl ChallengeAuthenticator for FactsAuthenticator {
    fn trigger_challenge(&self, _prompt: &PromptInfo, responder: ChallengeResponder) {
        if !self.drop_responders {
            self.parked.lock().unwrap().push(responder);
        }
    }
}

fn prompt() -> PromptInfo {
    PromptInfo::builder("Unlock").build().unwrap()
}

fn gate_with(
    tier: AuthenticationRequirement,
    bypass: bool,
    authenticator: Arc<dyn ChallengeAuthenticator>,
) -> Gate {
    Gate::new(
        move || tier,
        move || bypass,
        authenticator,
        prompt(),
        Duration::from_secs(5),
    )
}

fn facts_gate(
    tier: AuthenticationRequirement,
    bypass: bool,
    present: bool,
    enrolled: bool,
    not_set: bool,
) -> Gate {
    gate_with(
        tier,
        bypass,
        Arc::new(FactsAuthenticator::new(present, enrolled, not_set)),
    )
}

// ============================================================================
// Scenario table
// ============================================================================

#[test]
fn test_scenario_bypass_override() {
    for bits in 0..8u8 {
        let gate = facts_gate(
            AuthenticationRequirement::EnabledMandatory,
            true,
            bits & 1 != 0,
            bits & 2 != 0,
            bits & 4 != 0,
        );
        assert_eq!(gate.decide(), BiometricDecision::Bypass);
    }
}

#[test]
fn test_scenario_disabled_tier() {
    for bits in 0..8u8 {
        let gate = facts_gate(
            AuthenticationRequirement::Disabled,
            false,
            bits & 1 != 0,
            bits & 2 != 0,
            bits & 4 != 0,
        );
        assert_eq!(gate.decide(), BiometricDecision::Bypass);
    }
}

#[test]
fn test_scenario_security_not_present() {
    let gate = facts_gate(AuthenticationRequirement::EnabledMandatory, false, false, false, false);
    assert_eq!(gate.decide(), BiometricDecision::SecurityNotPresent);
}

#[test]
fn test_scenario_setup_required() {
    let gate = facts_gate(AuthenticationRequirement::EnabledMandatory, false, true, false, true);
    assert_eq!(gate.decide(), BiometricDecision::SetupRequired);
}

#[test]
fn test_scenario_authenticate_then_skip() {
    let gate = facts_gate(AuthenticationRequirement::EnabledMandatory, false, true, true, false);
    assert_eq!(gate.decide(), BiometricDecision::Authenticate);
    assert_eq!(gate.decide(), BiometricDecision::PromptSkipped);
}

#[test]
fn test_scenario_optional_not_enrolled_skips() {
    let gate = facts_gate(AuthenticationRequirement::EnabledOptional, false, true, false, false);
    assert_eq!(gate.decide(), BiometricDecision::PromptSkipped);
    // The flag was left armed.
    assert!(gate.session().is_armed());
}

#[test]
fn test_scenario_inconsistent_facts_bypass() {
    let gate = facts_gate(AuthenticationRequirement::EnabledMandatory, false, true, true, true);
    assert_eq!(gate.decide(), BiometricDecision::Bypass);
    assert!(gate.session().is_armed());
}

#[test]
fn test_every_combination_yields_a_decision() {
    let tiers = [
        AuthenticationRequirement::Disabled,
        AuthenticationRequirement::EnabledOptional,
        AuthenticationRequirement::EnabledMandatory,
    ];
    for tier in tiers {
        for bits in 0..16u8 {
            let gate = facts_gate(tier, bits & 8 != 0, bits & 1 != 0, bits & 2 != 0, bits & 4 != 0);
            let decision = gate.decide();
            assert!(BiometricDecision::ALL.contains(&decision));
        }
    }
}

// ============================================================================
// Session lifecycle
// ============================================================================

#[test]
fn test_prompt_once_per_foreground_session() {
    let sim = Arc::new(SimulatedAuthenticator::new(AuthenticatorStatus::Success));
    let gate = gate_with(AuthenticationRequirement::EnabledOptional, false, sim);
    let bridge = gate.lifecycle_bridge();

    assert_eq!(gate.decide(), BiometricDecision::Authenticate);
    assert_eq!(gate.decide(), BiometricDecision::PromptSkipped);

    bridge.handle(ForegroundEvent::Entered);
    assert_eq!(gate.decide(), BiometricDecision::PromptSkipped);

    bridge.handle(ForegroundEvent::Lost);
    bridge.handle(ForegroundEvent::Entered);
    assert_eq!(gate.decide(), BiometricDecision::Authenticate);
    assert_eq!(gate.decide(), BiometricDecision::PromptSkipped);
}

#[tokio::test]
async fn test_lifecycle_events_over_channel() {
    let sim = Arc::new(SimulatedAuthenticator::new(AuthenticatorStatus::Success));
    let gate = gate_with(AuthenticationRequirement::EnabledMandatory, false, sim);

    assert_eq!(gate.decide(), BiometricDecision::Authenticate);

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let task = gate.lifecycle_bridge().spawn(rx);
    tx.send(ForegroundEvent::Lost).unwrap();
    drop(tx);
    task.await.unwrap();

    assert_eq!(gate.decide(), BiometricDecision::Authenticate);
}

#[test]
fn test_enrollment_completed_mid_session() {
    let sim = Arc::new(SimulatedAuthenticator::new(AuthenticatorStatus::NoneEnrolled));
    let gate = gate_with(AuthenticationRequirement::EnabledMandatory, false, sim.clone());

    assert_eq!(gate.decide(), BiometricDecision::SetupRequired);
    sim.set_status(AuthenticatorStatus::Success);
    assert_eq!(gate.decide(), BiometricDecision::Authenticate);
}

#[test]
fn test_concurrent_attempts_authenticate_once() {
    let sim = Arc::new(SimulatedAuthenticator::new(AuthenticatorStatus::Success));
    let gate = Arc::new(gate_with(AuthenticationRequirement::EnabledMandatory, false, sim));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let gate = Arc::clone(&gate);
            std::thread::spawn(move || gate.decide())
        })
        .collect();

    let decisions: Vec<BiometricDecision> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();
    let authenticated = decisions
        .iter()
        .filter(|d| **d == BiometricDecision::Authenticate)
        .count();
    assert_eq!(authenticated, 1);
    assert!(decisions
        .iter()
        .all(|d| matches!(d, BiometricDecision::Authenticate | BiometricDecision::PromptSkipped)));
}

// ============================================================================
// Challenge round trip
// ============================================================================

#[tokio::test]
async fn test_access_success_and_failure() {
    let sim = Arc::new(SimulatedAuthenticator::new(AuthenticatorStatus::Success));
    sim.push_outcome(ChallengeOutcome::failure(7, "Too many attempts"));
    let gate = gate_with(AuthenticationRequirement::EnabledMandatory, false, sim.clone());

    let outcome = gate.access().await.unwrap();
    assert_eq!(
        outcome,
        AccessOutcome::Challenged(ChallengeOutcome::failure(7, "Too many attempts"))
    );
    assert!(!outcome.is_granted());

    gate.lifecycle_bridge().on_lost_foreground();
    let outcome = gate.access().await.unwrap();
    assert_eq!(outcome, AccessOutcome::Challenged(ChallengeOutcome::Success));
    assert!(outcome.is_granted());
    assert_eq!(sim.triggered_count(), 2);
    assert_eq!(sim.prompts()[0].title, "Unlock");
}

#[tokio::test]
async fn test_access_without_challenge_for_other_decisions() {
    let sim = Arc::new(SimulatedAuthenticator::new(AuthenticatorStatus::NoHardware));
    let gate = gate_with(AuthenticationRequirement::EnabledMandatory, false, sim.clone());

    let outcome = gate.access().await.unwrap();
    assert_eq!(
        outcome,
        AccessOutcome::Decided(BiometricDecision::SecurityNotPresent)
    );
    assert!(!outcome.is_granted());
    assert_eq!(sim.triggered_count(), 0);
}

#[tokio::test]
async fn test_access_abandoned_challenge() {
    let authenticator = Arc::new(FactsAuthenticator::new(true, true, false).dropping());
    let gate = gate_with(AuthenticationRequirement::EnabledMandatory, false, authenticator);

    let result = gate.access().await;
    assert!(matches!(
        result,
        Err(GateError::Challenge(ChallengeError::Abandoned))
    ));
}

#[tokio::test]
async fn test_access_timed_out_challenge() {
    let authenticator = Arc::new(FactsAuthenticator::new(true, true, false));
    let gate = Gate::new(
        || AuthenticationRequirement::EnabledMandatory,
        || false,
        authenticator.clone(),
        prompt(),
        Duration::from_millis(20),
    );

    let result = gate.access().await;
    assert!(matches!(
        result,
        Err(GateError::Challenge(ChallengeError::TimedOut))
    ));
    // The flag was spent when the challenge started.
    assert_eq!(gate.decide(), BiometricDecision::PromptSkipped);
    assert_eq!(authenticator.parked.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_lost_foreground_does_not_cancel_inflight_challenge() {
    let authenticator = Arc::new(FactsAuthenticator::new(true, true, false));
    let gate = Arc::new(gate_with(
        AuthenticationRequirement::EnabledMandatory,
        false,
        authenticator.clone(),
    ));

    let access = {
        let gate = Arc::clone(&gate);
        tokio::spawn(async move { gate.access().await })
    };

    // Wait for the challenge to reach the authenticator.
    while authenticator.parked.lock().unwrap().is_empty() {
        tokio::task::yield_now().await;
    }

    gate.lifecycle_bridge().on_lost_foreground();
    assert!(gate.session().is_armed());

    let responder = authenticator.parked.lock().unwrap().pop().unwrap();
    responder.succeed();

    let outcome = access.await.unwrap().unwrap();
    assert_eq!(outcome, AccessOutcome::Challenged(ChallengeOutcome::Success));
}

// ============================================================================
// Configuration and audit
// ============================================================================

fn temp_config_path() -> std::path::PathBuf {
    let id = CONFIG_COUNTER.fetch_add(1, Ordering::SeqCst);
    let tid = std::thread::current().id();
    std::env::temp_dir()
        .join(format!("stepgate-e2e-{:?}-{}", tid, id))
        .join("config.toml")
}

#[tokio::test]
async fn test_gate_from_saved_config() {
    let path = temp_config_path();
    let config = GateConfig {
        requirement: AuthenticationRequirement::EnabledMandatory,
        ..GateConfig::default()
    };
    config.save(&path).unwrap();

    let loaded = GateConfig::load(&path).unwrap();
    let sim = Arc::new(SimulatedAuthenticator::new(AuthenticatorStatus::NoneEnrolled));
    let gate = Gate::from_config(&loaded, sim).unwrap();
    assert_eq!(gate.decide(), BiometricDecision::SetupRequired);

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[test]
fn test_config_bypass_lets_everything_through() {
    let config = GateConfig {
        requirement: AuthenticationRequirement::EnabledMandatory,
        bypass: true,
        ..GateConfig::default()
    };
    let sim = Arc::new(SimulatedAuthenticator::new(AuthenticatorStatus::NoHardware));
    let gate = Gate::from_config(&config, sim).unwrap();
    assert_eq!(gate.decide(), BiometricDecision::Bypass);
}

#[test]
fn test_audit_sink_sees_gate_decisions() {
    let sink = Arc::new(InMemoryDecisionSink::new());
    let sim = Arc::new(SimulatedAuthenticator::new(AuthenticatorStatus::Success));
    let gate = gate_with(AuthenticationRequirement::EnabledMandatory, false, sim)
        .with_audit_sink(sink.clone());

    gate.decide();
    gate.decide();

    let decisions: Vec<_> = sink.records().into_iter().map(|r| r.decision).collect();
    assert_eq!(
        decisions,
        vec![BiometricDecision::Authenticate, BiometricDecision::PromptSkipped]
    );
}
