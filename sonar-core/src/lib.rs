//! # sonar-core
//!
//! Foundation crate for the Sonar orchestration core.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod citations;
pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::SonarConfig;
pub use errors::{SonarError, SonarResult};
pub use models::intent::{Intent, IntentCategory};
pub use models::response::ChatResponse;
pub use models::source::{Source, SourcePool, SourceType};
