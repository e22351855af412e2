use serde::{Deserialize, Serialize};

use crate::error::{ChallengeError, ChallengeResult};

/// Which kinds of verification the prompt accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowedAuthenticators {
    BiometricStrong,
    DeviceCredential,
    #[default]
    BiometricStrongOrDeviceCredential,
}

impl AllowedAuthenticators {
    pub fn allows_biometric(&self) -> bool {
        !matches!(self, Self::DeviceCredential)
    }

    pub fn allows_device_credential(&self) -> bool {
        !matches!(self, Self::BiometricStrong)
    }
}

/// What the authenticator shows when a challenge starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptInfo {
    pub title: String,
    pub subtitle: String,
    pub allowed: AllowedAuthenticators,
}

impl PromptInfo {
    pub fn builder(title: impl Into<String>) -> PromptInfoBuilder {
        PromptInfoBuilder {
            title: title.into(),
            subtitle: String::new(),
            allowed: AllowedAuthenticators::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptInfoBuilder {
    title: String,
    subtitle: String,
    allowed: AllowedAuthenticators,
}

impl PromptInfoBuilder {
    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn allowed(mut self, allowed: AllowedAuthenticators) -> Self {
        self.allowed = allowed;
        self
    }

    pub fn build(self) -> ChallengeResult<PromptInfo> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ChallengeError::InvalidPrompt(
                "title must not be empty".into(),
            ));
        }
        Ok(PromptInfo {
            title: title.to_string(),
            subtitle: self.subtitle,
            allowed: self.allowed,
        })
    }
}
