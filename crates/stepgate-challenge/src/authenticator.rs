use stepgate_core::CapabilityFacts;

use crate::challenge::{challenge_channel, ChallengeHandle, ChallengeResponder};
use crate::prompt::PromptInfo;

/// Platform authenticator: reports capability facts and runs the challenge.
///
/// `trigger_challenge` must return promptly; the outcome is delivered later
/// through the responder, from any thread.
pub trait ChallengeAuthenticator: CapabilityFacts {
    fn trigger_challenge(&self, prompt: &PromptInfo, responder: ChallengeResponder);
}

/// Start a challenge on `authenticator` and return the handle to await.
///
/// Call only after the policy returned `Authenticate`.
pub fn start_challenge(
    authenticator: &dyn ChallengeAuthenticator,
    prompt: &PromptInfo,
) -> ChallengeHandle {
    let (responder, handle) = challenge_channel();
    tracing::info!(
        challenge_id = %handle.challenge_id(),
        title = %prompt.title,
        "Starting challenge"
    );
    authenticator.trigger_challenge(prompt, responder);
    handle
}
