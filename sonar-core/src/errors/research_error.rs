/// Deep-research pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("insufficient credits: required {required}, available {available}")]
    InsufficientCredits { required: u32, available: u32 },

    #[error("deep research timed out after {secs}s")]
    GlobalTimeout { secs: u64 },

    #[error("query decomposition failed: {reason}")]
    Decomposition { reason: String },

    #[error("synthesis failed for section '{section}': {reason}")]
    Synthesis { section: String, reason: String },
}
