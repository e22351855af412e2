use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GateCoreError;
use crate::traits::CapabilityFacts;

// ---------------------------------------------------------------------------
// AuthenticationRequirement: configured policy tier
// ---------------------------------------------------------------------------

/// Configured strictness of the authentication requirement.
///
/// Owned by the caller's configuration and read-only to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationRequirement {
    Disabled,
    #[default]
    EnabledOptional,
    EnabledMandatory,
}

impl AuthenticationRequirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::EnabledOptional => "enabled_optional",
            Self::EnabledMandatory => "enabled_mandatory",
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl fmt::Display for AuthenticationRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthenticationRequirement {
    type Err = GateCoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "disabled" => Ok(Self::Disabled),
            "enabled_optional" => Ok(Self::EnabledOptional),
            "enabled_mandatory" => Ok(Self::EnabledMandatory),
            _ => Err(GateCoreError::InvalidRequirement(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// BiometricDecision: the sole output of an evaluation
// ---------------------------------------------------------------------------

/// Outcome of one access attempt against the gate.
///
/// `SecurityNotPresent` and `SetupRequired` are the domain-level signals for
/// unmet preconditions; there is no separate error decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiometricDecision {
    /// Let the caller through without a challenge.
    Bypass,
    /// A challenge would apply but is not shown for this attempt.
    PromptSkipped,
    /// The platform lacks the required security capability entirely.
    SecurityNotPresent,
    /// The user must enroll a biometric or credential first.
    SetupRequired,
    /// Start the challenge.
    Authenticate,
}

impl BiometricDecision {
    pub const ALL: [BiometricDecision; 5] = [
        Self::Bypass,
        Self::PromptSkipped,
        Self::SecurityNotPresent,
        Self::SetupRequired,
        Self::Authenticate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bypass => "bypass",
            Self::PromptSkipped => "prompt_skipped",
            Self::SecurityNotPresent => "security_not_present",
            Self::SetupRequired => "setup_required",
            Self::Authenticate => "authenticate",
        }
    }

    pub fn requires_challenge(&self) -> bool {
        matches!(self, Self::Authenticate)
    }
}

impl fmt::Display for BiometricDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BiometricDecision {
    type Err = GateCoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| GateCoreError::InvalidDecision(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CapabilitySnapshot: fixed capability facts
// ---------------------------------------------------------------------------

/// Point-in-time capability facts held as plain values.
///
/// Useful where facts were resolved immediately before the call; live
/// providers should implement [`CapabilityFacts`] directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilitySnapshot {
    pub security_feature_present: bool,
    pub available_and_enrolled: bool,
    pub available_but_not_set: bool,
}

impl CapabilitySnapshot {
    pub fn new(present: bool, enrolled: bool, not_set: bool) -> Self {
        Self {
            security_feature_present: present,
            available_and_enrolled: enrolled,
            available_but_not_set: not_set,
        }
    }

    /// Capture the current answers of a live provider.
    pub fn capture(facts: &dyn CapabilityFacts) -> Self {
        Self {
            security_feature_present: facts.security_feature_present(),
            available_and_enrolled: facts.available_and_enrolled(),
            available_but_not_set: facts.available_but_not_set(),
        }
    }

    /// Enrolled and enrollable-but-not-set cannot both hold.
    pub fn is_inconsistent(&self) -> bool {
        self.available_and_enrolled && self.available_but_not_set
    }
}

impl CapabilityFacts for CapabilitySnapshot {
    fn security_feature_present(&self) -> bool {
        self.security_feature_present
    }

    fn available_and_enrolled(&self) -> bool {
        self.available_and_enrolled
    }

    fn available_but_not_set(&self) -> bool {
        self.available_but_not_set
    }
}

// ---------------------------------------------------------------------------
// Timestamp: canonical time representation (seconds + nanoseconds)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds_since_epoch: u64,
    pub nanoseconds: u32,
}

impl Timestamp {
    pub fn now() -> Self {
        let now = chrono::Utc::now();
        Self {
            seconds_since_epoch: now.timestamp() as u64,
            nanoseconds: now.timestamp_subsec_nanos(),
        }
    }

    pub fn from_seconds(seconds: u64) -> Self {
        Self {
            seconds_since_epoch: seconds,
            nanoseconds: 0,
        }
    }

    pub fn to_rfc3339(&self) -> String {
        let dt =
            chrono::DateTime::from_timestamp(self.seconds_since_epoch as i64, self.nanoseconds);
        dt.map(|d| d.to_rfc3339())
            .unwrap_or_else(|| "invalid".to_string())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// DecisionRecord: audit trail entry for one evaluation
// ---------------------------------------------------------------------------

/// One evaluation, as reported to a decision audit sink.
///
/// `requirement` is `None` when the bypass override short-circuited the
/// evaluation before the tier was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub requirement: Option<AuthenticationRequirement>,
    pub decision: BiometricDecision,
    pub consulted_session_flag: bool,
    pub decided_at: Timestamp,
}
