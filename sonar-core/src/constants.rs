/// Sonar system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Credit cost per study type.
pub const CREDITS_MARKET_ANALYSIS: u32 = 500;
pub const CREDITS_COST_MODEL: u32 = 600;
pub const CREDITS_SOURCING_STUDY: u32 = 750;
pub const CREDITS_SUPPLIER_ASSESSMENT: u32 = 400;
pub const CREDITS_RISK_ASSESSMENT: u32 = 450;
pub const CREDITS_CUSTOM: u32 = 500;

/// Maximum research agents in flight at once.
pub const AGENT_CONCURRENCY: usize = 3;

/// Maximum report sections synthesized at once.
pub const SECTION_CONCURRENCY: usize = 2;

/// Section regeneration budget per job, shared across all sections.
pub const MAX_REGEN_CALLS: u32 = 2;

/// Trailing-edge throttle window for progress emissions.
pub const PROGRESS_THROTTLE_MS: u64 = 300;

/// Interval between synthesizing-in-progress heartbeat insights.
pub const HEARTBEAT_SECS: u64 = 5;

/// Global wall-clock budget for a deep-research job.
pub const GLOBAL_RESEARCH_TIMEOUT_SECS: u64 = 180;

/// Per-call timeout for the intake refinement LLM.
pub const INTAKE_LLM_TIMEOUT_SECS: u64 = 10;

/// Per-call timeout for the reasoning (synthesis) LLM.
pub const SYNTHESIS_TIMEOUT_SECS: u64 = 120;

/// Bounded insight stream length; oldest entries are evicted.
pub const INSIGHT_STREAM_CAP: usize = 50;

/// Jaccard token similarity above which a decomposed agent is a duplicate.
pub const JACCARD_DEDUP_THRESHOLD: f64 = 0.85;

/// Minimum length for a history message to count as a substantive topic.
pub const MIN_SUBSTANTIVE_QUERY_LEN: usize = 11;

/// Minimum snippet length for a source snippet to become an insight.
pub const SNIPPET_INSIGHT_MIN_LEN: usize = 20;

/// Snippet prefix length used in the source identity key fallback.
pub const IDENTITY_SNIPPET_PREFIX_LEN: usize = 80;

/// Maximum follow-up suggestions per turn.
pub const MAX_SUGGESTIONS: usize = 3;

/// Maximum optional intake questions retained after relevance ranking.
pub const MAX_OPTIONAL_QUESTIONS: usize = 2;

/// Minimum length for a usable executive summary.
pub const MIN_SUMMARY_LEN: usize = 50;

/// Fallback summary length taken from the first substantial section.
pub const SUMMARY_FALLBACK_LEN: usize = 1000;
