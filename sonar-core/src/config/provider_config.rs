use serde::{Deserialize, Serialize};

/// Env var carrying the fast-provider API key.
pub const ENV_FAST_API_KEY: &str = "SONAR_FAST_API_KEY";
/// Env var carrying the research/web-provider API key.
pub const ENV_RESEARCH_API_KEY: &str = "SONAR_RESEARCH_API_KEY";
/// Env var carrying the reasoning-provider API key.
pub const ENV_REASONING_API_KEY: &str = "SONAR_REASONING_API_KEY";
/// Env var carrying the internal-intelligence endpoint URL.
pub const ENV_INTEL_ENDPOINT: &str = "SONAR_INTEL_ENDPOINT";

/// Provider credentials and endpoints. A `None` key means the provider is
/// not configured and the route table must downgrade around it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub fast_api_key: Option<String>,
    pub research_api_key: Option<String>,
    pub reasoning_api_key: Option<String>,
    pub intel_endpoint: Option<String>,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self {
            fast_api_key: non_empty(std::env::var(ENV_FAST_API_KEY).ok()),
            research_api_key: non_empty(std::env::var(ENV_RESEARCH_API_KEY).ok()),
            reasoning_api_key: non_empty(std::env::var(ENV_REASONING_API_KEY).ok()),
            intel_endpoint: non_empty(std::env::var(ENV_INTEL_ENDPOINT).ok()),
        }
    }

    pub fn has_fast(&self) -> bool {
        self.fast_api_key.is_some()
    }

    pub fn has_research(&self) -> bool {
        self.research_api_key.is_some()
    }

    pub fn has_reasoning(&self) -> bool {
        self.reasoning_api_key.is_some()
    }

    pub fn has_intel(&self) -> bool {
        self.intel_endpoint.is_some()
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}
