//! Platform authenticator status and its mapping to capability facts.
//!
//! A platform answers "can I authenticate with strong biometrics or device
//! credential?" with a single status code. The three capability facts are
//! all derived from that code:
//!
//! | status          | present | enrolled | not set |
//! |-----------------|---------|----------|---------|
//! | `Success`       | yes     | yes      | no      |
//! | `NoneEnrolled`  | yes     | no       | yes     |
//! | anything else   | no      | no       | no      |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stepgate_core::{CapabilityFacts, GateCoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticatorStatus {
    Success,
    NoneEnrolled,
    NoHardware,
    HardwareUnavailable,
    SecurityUpdateRequired,
    Unsupported,
    Unknown,
}

impl AuthenticatorStatus {
    pub const ALL: [AuthenticatorStatus; 7] = [
        Self::Success,
        Self::NoneEnrolled,
        Self::NoHardware,
        Self::HardwareUnavailable,
        Self::SecurityUpdateRequired,
        Self::Unsupported,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoneEnrolled => "none_enrolled",
            Self::NoHardware => "no_hardware",
            Self::HardwareUnavailable => "hardware_unavailable",
            Self::SecurityUpdateRequired => "security_update_required",
            Self::Unsupported => "unsupported",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AuthenticatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthenticatorStatus {
    type Err = GateCoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| GateCoreError::InvalidStatus(s.to_string()))
    }
}

impl CapabilityFacts for AuthenticatorStatus {
    fn security_feature_present(&self) -> bool {
        matches!(self, Self::Success | Self::NoneEnrolled)
    }

    fn available_and_enrolled(&self) -> bool {
        matches!(self, Self::Success)
    }

    fn available_but_not_set(&self) -> bool {
        matches!(self, Self::NoneEnrolled)
    }
}

/// Capability facts backed by a live status query.
///
/// Every fact query calls the status source again; nothing is cached.
pub struct StatusCapability<F> {
    query: F,
}

impl<F> StatusCapability<F>
where
    F: Fn() -> AuthenticatorStatus + Send + Sync,
{
    pub fn new(query: F) -> Self {
        Self { query }
    }

    pub fn status(&self) -> AuthenticatorStatus {
        (self.query)()
    }
}

impl<F> CapabilityFacts for StatusCapability<F>
where
    F: Fn() -> AuthenticatorStatus + Send + Sync,
{
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
