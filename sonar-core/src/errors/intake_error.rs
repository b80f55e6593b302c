/// Intake engine errors. Refinement failures are soft: the deterministic
/// question set is always a valid fallback.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("intake refinement failed: {reason}")]
    Refinement { reason: String },

    #[error("unknown study type: {name}")]
    UnknownStudyType { name: String },
}
