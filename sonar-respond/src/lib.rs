//! # sonar-respond
//!
//! Everything that turns a path's intermediate output into the canonical
//! render-ready response: the builder and validator, the per-intent widget
//! builders, escalation and value-ladder derivation, and the suggestion
//! engine.

pub mod builder;
pub mod ladder;
pub mod suggest;
pub mod widgets;

pub use builder::{build_response, validate_and_repair, Draft};
pub use suggest::{SuggestionContext, SuggestionEngine};
pub use widgets::build_widget_for_intent;
