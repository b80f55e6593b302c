//! # sonar-intake
//!
//! The dynamic intake engine. Before a deep-research run starts, this crate
//! turns the resolved query, recent conversation, and a portfolio snapshot
//! into a set of clarifying questions with prefilled answers. The question
//! set is fully deterministic; an optional LLM pass may refine wording and
//! option ordering but can never change question ids, and any refinement
//! failure falls back to the deterministic set.

mod context;
mod questions;
mod refine;
mod slots;

pub use context::IntakeContext;
pub use questions::build_questions;
pub use slots::{slot_specs_for, SlotFill, SlotSpec};

use sonar_catalog::Catalog;
use sonar_core::models::intake::{IntakePayload, SlotConfidence};
use sonar_core::models::research::StudyType;
use sonar_core::traits::providers::{ChatTurn, FastProvider};
use tracing::{debug, warn};

/// Produce the intake payload for a study. When `fast` is configured and at
/// least two required questions remain unfilled, a refinement pass runs with
/// a hard per-call timeout.
pub async fn generate_intake(
    catalog: &Catalog,
    study_type: StudyType,
    resolved_query: &str,
    history: &[ChatTurn],
    fast: Option<&dyn FastProvider>,
) -> IntakePayload {
    let ctx = IntakeContext::build(catalog, resolved_query, history);
    let specs = slot_specs_for(study_type);
    let fills: Vec<SlotFill> = specs.iter().map(|s| s.fill(&ctx)).collect();
    let mut payload = build_questions(catalog, study_type, &ctx, specs, &fills);

    let unfilled_required = specs
        .iter()
        .zip(&fills)
        .filter(|(s, f)| s.required && f.confidence == SlotConfidence::Low)
        .count();
    match fast {
        Some(provider) if provider.is_configured() && unfilled_required >= 2 => {
            match refine::refine_questions(provider, &payload).await {
                Ok(refined) => payload = refined,
                Err(err) => {
                    warn!(%err, "intake refinement failed, keeping deterministic questions");
                }
            }
        }
        _ => debug!(unfilled_required, "skipping intake refinement"),
    }
    payload
}
