use serde::{Deserialize, Serialize};

use crate::constants;

/// Deep-research pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Global wall-clock budget for one job (seconds).
    pub global_timeout_secs: u64,
    /// Research agents in flight at once.
    pub agent_concurrency: usize,
    /// Report sections synthesized at once.
    pub section_concurrency: usize,
    /// Section regeneration budget per job.
    pub max_regen_calls: u32,
    /// Trailing-edge progress throttle window (milliseconds).
    pub progress_throttle_ms: u64,
    /// Synthesis heartbeat interval (seconds).
    pub heartbeat_secs: u64,
    /// Intake refinement LLM timeout (seconds).
    pub intake_llm_timeout_secs: u64,
    /// Reasoning LLM timeout (seconds).
    pub synthesis_timeout_secs: u64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            global_timeout_secs: constants::GLOBAL_RESEARCH_TIMEOUT_SECS,
            agent_concurrency: constants::AGENT_CONCURRENCY,
            section_concurrency: constants::SECTION_CONCURRENCY,
            max_regen_calls: constants::MAX_REGEN_CALLS,
            progress_throttle_ms: constants::PROGRESS_THROTTLE_MS,
            heartbeat_secs: constants::HEARTBEAT_SECS,
            intake_llm_timeout_secs: constants::INTAKE_LLM_TIMEOUT_SECS,
            synthesis_timeout_secs: constants::SYNTHESIS_TIMEOUT_SECS,
        }
    }
}
