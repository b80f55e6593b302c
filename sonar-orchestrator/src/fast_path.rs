//! Fast path: one structured fast-provider call, enriched from the catalog.

use sonar_catalog::{Catalog, SupplierFilter};
use sonar_core::models::intent::{Intent, IntentCategory};
use sonar_core::models::response::{Handoff, MilestoneEvent};
use sonar_core::traits::providers::{ChatTurn, FastProvider};
use sonar_core::SonarResult;
use sonar_respond::Draft;

use crate::milestones::MilestoneBuffer;

pub async fn run(
    catalog: &Catalog,
    provider: &dyn FastProvider,
    message: &str,
    history: &[ChatTurn],
    intent: &Intent,
    prompt_template: Option<&str>,
    buffer: &mut MilestoneBuffer<'_>,
) -> SonarResult<Draft> {
    let reply = provider
        .generate(message, history, intent, prompt_template)
        .await?;
    buffer.record(MilestoneEvent::DataRetrieved, "fast-provider");
    if !reply.sources.is_empty() {
        buffer.record_with_value(
            MilestoneEvent::SourcesFound,
            "fast-provider",
            Some(reply.sources.len().to_string()),
        );
    }

    let mut draft = Draft::text(reply.content);
    draft.insight = reply.insight.map(|i| i.into_insight());
    draft.widget = reply.widget;
    draft.sources = reply.sources;
    if draft.widget.is_some() {
        draft.result_count = Some(1);
    }
    enrich(catalog, intent, &mut draft);
    Ok(draft)
}

/// Catalog enrichment by intent: data-backed result counts for escalation,
/// and the handoff block for restricted turns. Widget gaps are filled later
/// by the response builder.
fn enrich(catalog: &Catalog, intent: &Intent, draft: &mut Draft) {
    match intent.category {
        IntentCategory::FilteredDiscovery | IntentCategory::Comparison => {
            let filter = SupplierFilter::from_entities(catalog, &intent.entities);
            let hits = catalog.filter_suppliers(&filter).len() as u32;
            let count = if intent.category == IntentCategory::Comparison {
                hits.min(3)
            } else {
                hits
            };
            draft.result_count = Some(count);
        }
        IntentCategory::SupplierDeepDive => {
            draft.result_count = Some(u32::from(
                intent
                    .entities
                    .supplier
                    .as_deref()
                    .and_then(|n| catalog.find_supplier(n))
                    .is_some(),
            ));
        }
        IntentCategory::TrendDetection => {
            draft.result_count = Some(catalog.recent_risk_changes().len() as u32);
        }
        IntentCategory::Restricted => {
            draft.widget = None;
            if draft.handoff.is_none() {
                draft.handoff = Some(Handoff {
                    reason: "restricted procurement topic".to_string(),
                    team: "category-management".to_string(),
                });
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sonar_core::models::intent::ExtractedEntities;
    use sonar_core::models::source::{Source, SourceType};
    use sonar_core::traits::providers::{FastReply, InsightReply};

    struct CannedFast(FastReply);

    #[async_trait]
    impl FastProvider for CannedFast {
        fn is_configured(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            _message: &str,
            _history: &[ChatTurn],
            _intent: &Intent,
            _prompt_template: Option<&str>,
        ) -> SonarResult<FastReply> {
            Ok(self.0.clone())
        }
    }

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

    #[tokio::test]
    async fn reply_fields_map_onto_the_draft() {
        let catalog = Catalog::builtin();
        let provider = CannedFast(FastReply {
            content: "Here is the overview.".to_string(),
            insight: Some(InsightReply::Text("Spend is concentrated".to_string())),
            sources: vec![Source::new("Intel brief", SourceType::InternalIntelligence)],
            ..FastReply::default()
        });
        let mut buffer = MilestoneBuffer::new(None);
        let draft = run(
            &catalog,
            &provider,
            "show my portfolio",
            &[],
            &intent(IntentCategory::PortfolioOverview),
            None,
            &mut buffer,
        )
        .await
        .unwrap();
        assert_eq!(draft.content, "Here is the overview.");
        assert_eq!(
            draft.insight.as_ref().map(|i| i.headline.as_str()),
            Some("Spend is concentrated")
        );
        assert_eq!(draft.sources.len(), 1);
        let milestones = buffer.into_milestones();
        assert!(milestones
            .iter()
            .any(|m| m.event == MilestoneEvent::SourcesFound));
    }

    #[tokio::test]
    async fn restricted_turn_gets_a_handoff_and_no_widget() {
        let catalog = Catalog::builtin();
        let provider = CannedFast(FastReply {
            content: "I cannot help with that.".to_string(),
            ..FastReply::default()
        });
        let mut buffer = MilestoneBuffer::new(None);
        let draft = run(
            &catalog,
            &provider,
            "cancel the contract with our supplier",
            &[],
            &intent(IntentCategory::Restricted),
            None,
            &mut buffer,
        )
        .await
        .unwrap();
        assert!(draft.handoff.is_some());
        assert!(draft.widget.is_none());
    }
}
