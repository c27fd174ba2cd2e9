use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Banner registration page. The operator still logs in manually.
pub const DEFAULT_REGISTER_URL: &str =
    "https://registration.banner.gatech.edu/StudentRegistrationSsb/ssb/classRegistration/classRegistration";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunables for one camping campaign. All durations are explicit so tests
/// can zero the settling waits and drive the scheduler deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CampConfig {
    /// Reservation-entry page the executor positions the session on.
    pub register_url: String,
    /// Substring of the current URL that marks the session as already
    /// positioned, making navigation a no-op.
    pub url_hint: String,
    /// Inclusive bounds of the randomized inter-attempt delay, in seconds.
    pub min_delay_s: u64,
    pub max_delay_s: u64,
    /// Phrases (matched case-insensitively against the joined diagnostics)
    /// that mean the section is closed. A bare "closed" is not trusted; it
    /// false-positives on unrelated UI text such as date-range labels.
    pub closed_phrases: Vec<String>,
    /// Wait for the optional "Enter CRNs" tab before assuming it is absent.
    pub tab_timeout_ms: u64,
    /// Wait for required controls (CRN input, buttons) to become usable.
    pub control_timeout_ms: u64,
    /// Settle after each code is added to the pending set.
    pub entry_settle_ms: u64,
    /// Settle after the final submit, before reading result messages.
    pub submit_settle_ms: u64,
    /// Settle after the inter-attempt page refresh.
    pub refresh_settle_ms: u64,
}

impl Default for CampConfig {
    fn default() -> Self {
        Self {
            register_url: DEFAULT_REGISTER_URL.to_string(),
            url_hint: "classRegistration".to_string(),
            min_delay_s: 45,
            max_delay_s: 90,
            closed_phrases: vec![
                "closed section".to_string(),
                "section is closed".to_string(),
            ],
            tab_timeout_ms: 5_000,
            control_timeout_ms: 20_000,
            entry_settle_ms: 600,
            submit_settle_ms: 1_200,
            refresh_settle_ms: 2_000,
        }
    }
}

impl CampConfig {
    pub fn tab_timeout(&self) -> Duration {
        Duration::from_millis(self.tab_timeout_ms)
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_millis(self.control_timeout_ms)
    }

    pub fn entry_settle(&self) -> Duration {
        Duration::from_millis(self.entry_settle_ms)
    }

    pub fn submit_settle(&self) -> Duration {
        Duration::from_millis(self.submit_settle_ms)
    }

    pub fn refresh_settle(&self) -> Duration {
        Duration::from_millis(self.refresh_settle_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_delay_s > self.max_delay_s {
            return Err(ConfigError::Invalid(format!(
                "min_delay_s ({}) exceeds max_delay_s ({})",
                self.min_delay_s, self.max_delay_s
            )));
        }
        Ok(())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./seatcamp.yaml
    /// 2. ~/.seatcamp/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<CampConfig, ConfigError> {
        let local_config = PathBuf::from("./seatcamp.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".seatcamp").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(CampConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<CampConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: CampConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}
