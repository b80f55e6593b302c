//! # sonar-research
//!
//! The deep-research pipeline: meta-query resolution, credit gating,
//! intake handoff, and the staged plan → research → synthesis → delivery
//! execution with a throttled progress bus, bounded agent fan-out, cited
//! section synthesis, and a global wall-clock budget.

mod assemble;
mod controller;
mod decompose;
pub mod progress;
mod resolve;
mod scheduler;
pub mod synthesis;

pub use controller::{
    execute_job, prepare_job, DeepResearchRequest, ResearchProviders, ERR_INSUFFICIENT_CREDITS,
    ERR_INTERNAL, ERR_TIMEOUT,
};
pub use progress::{JobState, ProgressBus, ProgressSink};
pub use resolve::resolve_query;
