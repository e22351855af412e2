use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use stepgate_challenge::{
    AuthenticatorStatus, ChallengeAuthenticator, ChallengeOutcome, ChallengeResponder, PromptInfo,
};
use stepgate_core::CapabilityFacts;

/// Authenticator with a settable status and scripted challenge outcomes.
///
/// Answers every challenge immediately with the next scripted outcome, or
/// `Success` when the script is empty.
pub struct SimulatedAuthenticator {
    status: Mutex<AuthenticatorStatus>,
    script: Mutex<VecDeque<ChallengeOutcome>>,
    prompts: Mutex<Vec<PromptInfo>>,
    triggered: AtomicUsize,
}

impl SimulatedAuthenticator {
    pub fn new(status: AuthenticatorStatus) -> Self {
        Self {
            status: Mutex::new(status),
            script: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            triggered: AtomicUsize::new(0),
        }
    }

    pub fn status(&self) -> AuthenticatorStatus {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_status(&self, status: AuthenticatorStatus) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }

    pub fn push_outcome(&self, outcome: ChallengeOutcome) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome);
    }

    pub fn triggered_count(&self) -> usize {
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<PromptInfo> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl CapabilityFacts for SimulatedAuthenticator {
    fn security_feature_present(&self) -> bool {
        self.status().security_feature_present()
    }

    fn available_and_enrolled(&self) -> bool {
        self.status().available_and_enrolled()
    }

    fn available_but_not_set(&self) -> bool {
        self.status().available_but_not_set()
    }
}

impl ChallengeAuthenticator for SimulatedAuthenticator {
    fn trigger_challenge(&self, prompt: &PromptInfo, responder: ChallengeResponder) {
        self.triggered.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.clone());

        let outcome = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(ChallengeOutcome::Success);
        responder.respond(outcome);
    }
}
