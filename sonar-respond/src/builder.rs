//! Canonical response assembly and validation-repair.
//!
//! Every path funnels its intermediate output through [`Draft`] into
//! [`build_response`], and every outgoing payload passes
//! [`validate_and_repair`] last. Repair is idempotent: a valid response
//! comes back unchanged.

use std::collections::BTreeMap;

use tracing::debug;
use uuid::Uuid;

use sonar_catalog::Catalog;
use sonar_core::citations;
use sonar_core::models::intent::{Intent, IntentCategory};
use sonar_core::models::research::DeepResearchResponse;
use sonar_core::models::response::{
    ChatResponse, Escalation, GroupedSources, Handoff, Insight, Milestone, ResponseType, SourceMix,
};
use sonar_core::models::source::{CitationTier, Source, SourceType};
use sonar_core::models::suggestion::Suggestion;
use sonar_core::models::widget::{Widget, WidgetData};

use crate::ladder::value_ladder_for;
use crate::suggest::default_suggestions;
use crate::widgets::build_widget_for_intent;

const FALLBACK_CONTENT: &str =
    "I couldn't put together an answer for that. Try rephrasing, or ask about your \
     portfolio, a supplier, or a commodity.";

/// A path's intermediate output, before canonicalization.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub content: String,
    pub acknowledgement: Option<String>,
    pub insight: Option<Insight>,
    /// Provider- or path-supplied widget; when absent the per-intent
    /// builder fills the gap.
    pub widget: Option<Widget>,
    /// Result count behind a path-supplied widget.
    pub result_count: Option<u32>,
    pub sources: Vec<Source>,
    pub citations: BTreeMap<String, Source>,
    pub handoff: Option<Handoff>,
    pub deep_research: Option<DeepResearchResponse>,
    pub milestones: Vec<Milestone>,
    pub duration_ms: u64,
}

impl Draft {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// Canonicalize a draft: fill the widget, decide rendering and escalation,
/// group sources, attach the value ladder, then validate.
pub fn build_response(
    catalog: &Catalog,
    intent: &Intent,
    draft: Draft,
    suggestions: Vec<Suggestion>,
) -> ChatResponse {
    let (widget, result_count) = match draft.widget {
        Some(w) => {
            let count = draft.result_count.unwrap_or(1);
            (Some(w), count)
        }
        None => build_widget_for_intent(catalog, intent),
    };

    let response_type = if draft.handoff.is_some() {
        ResponseType::Handoff
    } else {
        render_type(widget.as_ref())
    };

    let escalation = decide_escalation(intent.category, result_count);
    let artifact = if escalation.expand_to_artifact {
        widget.as_ref().map(|w| sonar_core::models::response::Artifact {
            id: Uuid::new_v4().to_string(),
            title: w.title.clone().unwrap_or_else(|| "Full results".to_string()),
            artifact_type: w.kind().to_string(),
        })
    } else {
        None
    };

    let response = ChatResponse {
        id: Uuid::new_v4().to_string(),
        content: draft.content,
        acknowledgement: draft.acknowledgement,
        response_type,
        insight: draft.insight,
        widget,
        artifact,
        sources: group_sources(draft.sources),
        citations: draft.citations,
        suggestions,
        escalation,
        value_ladder: value_ladder_for(intent),
        source_mix: SourceMix::default(),
        milestones: draft.milestones,
        handoff: draft.handoff,
        deep_research: draft.deep_research,
        duration_ms: draft.duration_ms,
    };
    validate_and_repair(response)
}

/// Repair an outgoing payload into a shape the renderer can always handle.
///
/// Rules, in order: non-empty content; handoff and render type agree; a
/// widget-shaped render type requires a widget; citation entries match the
/// markers actually used in `content` (unbacked markers are stripped, unused
/// entries dropped); at least three suggestions; a sane escalation
/// threshold; source mix recomputed from the grouped sources.
pub fn validate_and_repair(mut response: ChatResponse) -> ChatResponse {
    if response.content.trim().is_empty() {
        debug!(id = %response.id, "empty content repaired with fallback");
        response.content = FALLBACK_CONTENT.to_string();
    }

    if response.handoff.is_some() {
        response.response_type = ResponseType::Handoff;
    } else if response.response_type == ResponseType::Handoff {
        response.response_type = ResponseType::Summary;
    }
    if response.widget.is_none()
        && matches!(
            response.response_type,
            ResponseType::Widget | ResponseType::Table | ResponseType::Alert
        )
    {
        response.response_type = ResponseType::Summary;
    }

    // Markers without a backing source are stripped; entries nothing cites
    // are dropped.
    let stripped =
        citations::strip_markers(&response.content, |id| response.citations.contains_key(id));
    if stripped != response.content {
        debug!(id = %response.id, "stripped citation markers with no backing source");
        response.content = stripped;
    }
    let used = citations::extract_citation_ids(&response.content);
    response.citations.retain(|id, _| used.contains(id));

    if response.suggestions.is_empty() {
        response.suggestions = default_suggestions();
    }
    if response.escalation.threshold == 0 {
        response.escalation.threshold = Escalation::default().threshold;
    }
    response.source_mix = source_mix(&response.sources);
    response
}

fn render_type(widget: Option<&Widget>) -> ResponseType {
    match widget.map(|w| &w.data) {
        Some(WidgetData::AlertCard(_)) => ResponseType::Alert,
        Some(WidgetData::SupplierTable(_))
        | Some(WidgetData::ComparisonTable(_))
        | Some(WidgetData::ScenarioTable(_)) => ResponseType::Table,
        Some(_) => ResponseType::Widget,
        None => ResponseType::Summary,
    }
}

/// Inline-vs-artifact decision. Small result sets render inline; mid-size
/// ones get a side-panel artifact too; past the threshold the inline view
/// collapses to a summary and the artifact carries the full set.
fn decide_escalation(category: IntentCategory, result_count: u32) -> Escalation {
    let threshold = Escalation::default().threshold;
    let (show_inline, expand_to_artifact) = match category {
        IntentCategory::SupplierDeepDive | IntentCategory::PortfolioOverview => (true, true),
        _ if result_count <= 3 => (true, false),
        _ if result_count <= threshold => (true, true),
        _ => (false, true),
    };
    Escalation {
        show_inline,
        expand_to_artifact,
        result_count,
        threshold,
    }
}

fn group_sources(sources: Vec<Source>) -> GroupedSources {
    let mut grouped = GroupedSources::default();
    for s in sources {
        match s.source_type.citation_tier() {
            CitationTier::Internal => grouped.internal.push(s),
            CitationTier::Web => grouped.web.push(s),
        }
    }
    grouped
}

fn source_mix(sources: &GroupedSources) -> SourceMix {
    let mut mix = SourceMix::default();
    for s in sources.iter() {
        match s.source_type {
            SourceType::InternalIntelligence | SourceType::SupplierData => mix.decision_grade += 1,
            SourceType::FinancialPartner | SourceType::SustainabilityPartner => {
                mix.verified_partner += 1
            }
            SourceType::Web | SourceType::News => mix.web += 1,
        }
    }
    mix
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sonar_core::models::intent::ExtractedEntities;

    fn intent(category: IntentCategory) -> Intent {
        Intent {
            category,
            sub_intent: None,
            confidence: 0.9,
            entities: ExtractedEntities::default(),
            requires_research: false,
            requires_discovery: false,
            requires_handoff: false,
        }
    }

    #[test]
    fn escalation_tiers_for_discovery() {
        let small = decide_escalation(IntentCategory::FilteredDiscovery, 2);
        assert!(small.show_inline && !small.expand_to_artifact);

        let mid = decide_escalation(IntentCategory::FilteredDiscovery, 5);
        assert!(mid.show_inline && mid.expand_to_artifact);

        let large = decide_escalation(IntentCategory::FilteredDiscovery, 9);
        assert!(!large.show_inline && large.expand_to_artifact);
    }

    #[test]
    fn deep_dive_always_offers_artifact() {
        let e = decide_escalation(IntentCategory::SupplierDeepDive, 1);
        assert!(e.show_inline && e.expand_to_artifact);
    }

    #[test]
    fn build_fills_widget_and_ladder() {
        let catalog = Catalog::builtin();
        let intent = intent(IntentCategory::PortfolioOverview);
        let response = build_response(
            &catalog,
            &intent,
            Draft::text("Your portfolio at a glance."),
            Vec::new(),
        );
        assert_eq!(response.widget.as_ref().map(|w| w.kind()), Some("risk_distribution"));
        assert!(response.value_ladder.is_some());
        assert!(response.artifact.is_some());
        assert_eq!(response.suggestions.len(), 3);
    }

    #[test]
    fn handoff_forces_handoff_render_type() {
        let catalog = Catalog::builtin();
        let intent = intent(IntentCategory::Restricted);
        let mut draft = Draft::text("This needs a specialist.");
        draft.handoff = Some(Handoff {
            reason: "restricted topic".to_string(),
            team: "category-management".to_string(),
        });
        let response = build_response(&catalog, &intent, draft, Vec::new());
        assert_eq!(response.response_type, ResponseType::Handoff);
    }

    #[test]
    fn repair_strips_unbacked_markers_and_unused_entries() {
        let mut response = ChatResponse::minimal("Demand rose [B1] sharply [W7].");
        response.citations.insert(
            "B1".to_string(),
            Source::new("Quarterly intel brief", SourceType::InternalIntelligence),
        );
        response.citations.insert(
            "W2".to_string(),
            Source::new("Stale entry", SourceType::Web),
        );
        let repaired = validate_and_repair(response);
        assert_eq!(repaired.content, "Demand rose [B1] sharply .");
        assert_eq!(repaired.citations.len(), 1);
        assert!(repaired.citations.contains_key("B1"));
    }

    #[test]
    fn empty_content_gets_fallback() {
        let repaired = validate_and_repair(ChatResponse::minimal("   "));
        assert_eq!(repaired.content, FALLBACK_CONTENT);
    }

    proptest! {
        #[test]
        fn repair_is_idempotent(content in ".{0,200}") {
            let mut response = ChatResponse::minimal(content);
            response.citations.insert(
                "B1".to_string(),
                Source::new("Intel", SourceType::InternalIntelligence),
            );
            let once = validate_and_repair(response);
            let twice = validate_and_repair(once.clone());
            prop_assert_eq!(once, twice);
        }
    }
}
