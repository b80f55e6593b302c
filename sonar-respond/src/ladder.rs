//! Value-ladder derivation: the per-intent upsell hint pointing at the
//! deep-research study that would extend the answer.

use sonar_core::models::intent::{Intent, IntentCategory};
use sonar_core::models::research::StudyType;
use sonar_core::models::response::ValueLadder;

/// The follow-up study hint for this intent, if one applies. Conversational
/// and restricted intents carry none.
pub fn value_ladder_for(intent: &Intent) -> Option<ValueLadder> {
    let subject = intent
        .entities
        .supplier
        .clone()
        .or_else(|| intent.entities.commodity.clone());

    let (study, hint) = match intent.category {
        IntentCategory::SupplierDeepDive => (
            StudyType::SupplierAssessment,
            match &subject {
                Some(s) => format!("Run a full supplier assessment on {s} for audited financials and capacity data."),
                None => "Run a full supplier assessment for audited financials and capacity data.".to_string(),
            },
        ),
        IntentCategory::FilteredDiscovery | IntentCategory::Comparison => (
            StudyType::SourcingStudy,
            "A sourcing study can qualify these suppliers against your award criteria.".to_string(),
        ),
        IntentCategory::PortfolioOverview | IntentCategory::TrendDetection => (
            StudyType::RiskAssessment,
            "A portfolio risk assessment quantifies exposure and mitigation options.".to_string(),
        ),
        IntentCategory::MarketContext => (
            StudyType::MarketAnalysis,
            match &subject {
                Some(c) => format!("A market analysis covers the {c} supply/demand balance in depth."),
                None => "A market analysis covers the supply/demand balance in depth.".to_string(),
            },
        ),
        IntentCategory::InflationSummary
        | IntentCategory::InflationDrivers
        | IntentCategory::InflationImpact
        | IntentCategory::InflationJustification
        | IntentCategory::InflationScenarios => (
            StudyType::CostModel,
            match &subject {
                Some(c) => format!("A should-cost model breaks {c} pricing down to its cost drivers."),
                None => "A should-cost model breaks pricing down to its cost drivers.".to_string(),
            },
        ),
        IntentCategory::Explanation
        | IntentCategory::Action
        | IntentCategory::Restricted
        | IntentCategory::General => return None,
    };

    Some(ValueLadder {
        intent: study.as_str().to_string(),
        hint,
        cta: Some(format!("Start study ({} credits)", study.credit_cost())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn deep_dive_ladders_to_supplier_assessment() {
        let ladder = value_ladder_for(&intent(IntentCategory::SupplierDeepDive)).unwrap();
        assert_eq!(ladder.intent, "supplier-assessment");
        assert!(ladder.cta.unwrap().contains("400"));
    }

    #[test]
    fn conversational_intents_have_no_ladder() {
        assert!(value_ladder_for(&intent(IntentCategory::General)).is_none());
        assert!(value_ladder_for(&intent(IntentCategory::Restricted)).is_none());
    }
}
