//! Workspace configuration. Defaults mirror `constants`; tests override
//! individual knobs.

mod provider_config;
mod research_config;

pub use provider_config::ProviderConfig;
pub use research_config::ResearchConfig;

use serde::{Deserialize, Serialize};

/// Top-level Sonar configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SonarConfig {
    pub providers: ProviderConfig,
    pub research: ResearchConfig,
}

impl SonarConfig {
    /// Build a config from process environment variables, with defaults for
    /// everything else.
    pub fn from_env() -> Self {
        Self {
            providers: ProviderConfig::from_env(),
            research: ResearchConfig::default(),
        }
    }
}
