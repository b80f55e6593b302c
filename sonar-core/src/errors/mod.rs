//! Error types for every Sonar subsystem.
//!
//! Each subsystem declares its own `thiserror` enum; `SonarError` wraps them
//! so cross-crate call chains can use a single `SonarResult<T>`.

mod intake_error;
mod provider_error;
mod research_error;

pub use intake_error::IntakeError;
pub use provider_error::ProviderError;
pub use research_error::ResearchError;

/// Top-level error for the Sonar workspace.
#[derive(Debug, thiserror::Error)]
pub enum SonarError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Research(#[from] ResearchError),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used across the workspace.
pub type SonarResult<T> = Result<T, SonarError>;
