use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use stepgate_challenge::{AllowedAuthenticators, PromptInfo};
use stepgate_core::AuthenticationRequirement;

use crate::error::{GateError, GateResult};

/// What the challenge prompt shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_subtitle")]
    pub subtitle: String,

    #[serde(default)]
    pub allowed_authenticators: AllowedAuthenticators,
}

fn default_title() -> String {
    "Verify it's you".to_string()
}

fn default_subtitle() -> String {
    "Confirm your identity to continue".to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
            allowed_authenticators: AllowedAuthenticators::default(),
        }
    }
}

impl PromptConfig {
    pub fn to_prompt(&self) -> GateResult<PromptInfo> {
        Ok(PromptInfo::builder(self.title.clone())
            .subtitle(self.subtitle.clone())
            .allowed(self.allowed_authenticators)
            .build()?)
    }
}

/// Gate configuration.
///
/// Loaded from a TOML file (typically `~/.stepgate/config.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Configured requirement tier.
    #[serde(default)]
    pub requirement: AuthenticationRequirement,

    /// Let every attempt through without a challenge.
    #[serde(default)]
    pub bypass: bool,

    /// How long to wait for the user to answer a challenge.
    #[serde(default = "default_challenge_timeout")]
    pub challenge_timeout_secs: u64,

    #[serde(default)]
    pub prompt: PromptConfig,
}

fn default_challenge_timeout() -> u64 {
    60
}

/// Returns `$HOME/<suffix>` if HOME is available, otherwise `./<suffix>`.
fn dirs_or_default(suffix: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(suffix))
        .unwrap_or_else(|_| PathBuf::from(suffix))
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            requirement: AuthenticationRequirement::default(),
            bypass: false,
            challenge_timeout_secs: default_challenge_timeout(),
            prompt: PromptConfig::default(),
        }
    }
}

impl GateConfig {
    /// Load configuration from a TOML file. If the file does not exist,
    /// returns a default configuration.
    pub fn load(path: &Path) -> GateResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: GateConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> GateResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| GateError::Config(format!("TOML serialize error: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> GateResult<()> {
        if self.challenge_timeout_secs == 0 {
            return Err(GateError::Config(
                "challenge_timeout_secs must be > 0".into(),
            ));
        }
        if self.prompt.title.trim().is_empty() {
            return Err(GateError::Config("prompt.title must not be empty".into()));
        }
        Ok(())
    }

    pub fn challenge_timeout(&self) -> Duration {
        Duration::from_secs(self.challenge_timeout_secs)
    }

    pub fn default_config_path() -> PathBuf {
        dirs_or_default(".stepgate/config.toml")
    }
}
