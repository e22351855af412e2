//! Stepgate Challenge
//!
//! Plumbing for the user-facing challenge that the policy only decides to
//! start. The platform authenticator reports its status, shows the prompt
//! and answers through a move-only [`ChallengeResponder`]; the caller awaits
//! the tagged [`ChallengeOutcome`] on the matching [`ChallengeHandle`].
//!
//! Key features:
//! - Oneshot-backed responder/handle pair; each side is consumed on use
//! - Abandoned challenges (responder dropped) surface as an error, not a hang
//! - Optional deadline on the caller side
//! - Status-code capability adapter that re-queries the platform every time

pub mod authenticator;
pub mod challenge;
pub mod error;
pub mod prompt;
pub mod status;

pub use authenticator::{start_challenge, ChallengeAuthenticator};
pub use challenge::{
    challenge_channel, ChallengeHandle, ChallengeId, ChallengeOutcome, ChallengeResponder,
};
pub use error::{ChallengeError, ChallengeResult};
pub use prompt::{AllowedAuthenticators, PromptInfo, PromptInfoBuilder};
pub use status::{AuthenticatorStatus, StatusCapability};
