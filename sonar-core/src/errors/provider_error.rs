/// Provider client errors. All of these downgrade the route; none of them
/// reach the caller of the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider {provider} is not configured")]
    NotConfigured { provider: String },

    #[error("provider {provider} timed out after {secs}s")]
    Timeout { provider: String, secs: u64 },

    #[error("provider {provider} returned HTTP {status}")]
    Http { provider: String, status: u16 },

    #[error("network error talking to {provider}: {reason}")]
    Network { provider: String, reason: String },

    #[error("malformed provider output: {reason}")]
    MalformedOutput { reason: String },
}
