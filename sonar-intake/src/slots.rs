//! Per-study slot declarations and fill predicates.

use sonar_core::models::intake::{QuestionInput, SlotConfidence};
use sonar_core::models::intent::ExtractedEntities;
use sonar_core::models::research::StudyType;

use crate::context::IntakeContext;

/// A declared intake slot for a study type.
pub struct SlotSpec {
    /// Stable slot id; doubles as the question id.
    pub id: &'static str,
    pub prompt: &'static str,
    pub input: QuestionInput,
    pub required: bool,
    pub help: Option<&'static str>,
    /// Keywords that raise an optional slot's relevance score.
    pub keywords: &'static [&'static str],
    /// Base relevance weight for optional-slot ranking.
    pub weight: u32,
    extract: fn(&ExtractedEntities) -> Option<String>,
}

/// The outcome of testing one slot against the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotFill {
    pub value: Option<String>,
    pub confidence: SlotConfidence,
}

impl SlotSpec {
    /// Fill from the query alone is `high`; fill that needs chat history is
    /// `medium`; no fill is `low`.
    pub fn fill(&self, ctx: &IntakeContext) -> SlotFill {
        if let Some(value) = (self.extract)(&ctx.from_query) {
            return SlotFill {
                value: Some(value),
                confidence: SlotConfidence::High,
            };
        }
        if let Some(value) = (self.extract)(&ctx.from_conversation) {
            return SlotFill {
                value: Some(value),
                confidence: SlotConfidence::Medium,
            };
        }
        SlotFill {
            value: None,
            confidence: SlotConfidence::Low,
        }
    }

    /// Relevance score for optional-slot ranking: base weight plus one per
    /// keyword hit in the conversation summary.
    pub fn relevance(&self, summary: &str) -> u32 {
        let hits = self
            .keywords
            .iter()
            .filter(|k| summary.contains(*k))
            .count() as u32;
        self.weight + hits
    }
}

fn extract_category(e: &ExtractedEntities) -> Option<String> {
    e.category_id.clone()
}

fn extract_regions(e: &ExtractedEntities) -> Option<String> {
    if e.regions.is_empty() {
        None
    } else {
        Some(
            e.regions
                .iter()
                .map(|r| r.code())
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

fn extract_timeframe(e: &ExtractedEntities) -> Option<String> {
    e.timeframe.map(|t| t.code().to_string())
}

fn extract_supplier(e: &ExtractedEntities) -> Option<String> {
    e.supplier.clone()
}

fn extract_commodity(e: &ExtractedEntities) -> Option<String> {
    e.commodity.clone()
}

fn extract_never(_: &ExtractedEntities) -> Option<String> {
    None
}

macro_rules! slot {
    ($id:literal, $prompt:literal, $input:expr, required, $extract:path) => {
        SlotSpec {
            id: $id,
            prompt: $prompt,
            input: $input,
            required: true,
            help: None,
            keywords: &[],
            weight: 0,
            extract: $extract,
        }
    };
    ($id:literal, $prompt:literal, $input:expr, required, $extract:path, help = $help:literal) => {
        SlotSpec {
            id: $id,
            prompt: $prompt,
            input: $input,
            required: true,
            help: Some($help),
            keywords: &[],
            weight: 0,
            extract: $extract,
        }
    };
    ($id:literal, $prompt:literal, $input:expr, optional($weight:literal, $keywords:expr), $extract:path) => {
        SlotSpec {
            id: $id,
            prompt: $prompt,
            input: $input,
            required: false,
            help: None,
            keywords: $keywords,
            weight: $weight,
            extract: $extract,
        }
    };
}

static MARKET_ANALYSIS: &[SlotSpec] = &[
    slot!(
        "category",
        "Which category or commodity should the analysis cover?",
        QuestionInput::CategoryPicker,
        required,
        extract_category
    ),
    slot!(
        "region",
        "Which regions are in scope?",
        QuestionInput::Multiselect,
        required,
        extract_regions
    ),
    slot!(
        "timeframe",
        "What horizon should the analysis look at?",
        QuestionInput::Select,
        optional(2, &["trend", "forecast", "outlook", "history", "horizon"]),
        extract_timeframe
    ),
    slot!(
        "volume",
        "Roughly how much do you buy annually?",
        QuestionInput::FreeText,
        optional(1, &["volume", "demand", "tons", "capacity", "units"]),
        extract_never
    ),
];

static SOURCING_STUDY: &[SlotSpec] = &[
    slot!(
        "category",
        "Which category are you sourcing?",
        QuestionInput::CategoryPicker,
        required,
        extract_category
    ),
    slot!(
        "region",
        "Which supply regions should be considered?",
        QuestionInput::Multiselect,
        required,
        extract_regions
    ),
    slot!(
        "volume",
        "What annual volume are you sourcing?",
        QuestionInput::FreeText,
        required,
        extract_never,
        help = "An estimate is fine; it anchors the capacity screening."
    ),
    slot!(
        "timeframe",
        "When do you need supply in place?",
        QuestionInput::Select,
        optional(1, &["deadline", "contract", "award", "ramp"]),
        extract_timeframe
    ),
    slot!(
        "incumbents",
        "Who are your current suppliers, if any?",
        QuestionInput::FreeText,
        optional(2, &["current", "incumbent", "existing", "switch", "replace"]),
        extract_never
    ),
];

static COST_MODEL: &[SlotSpec] = &[
    slot!(
        "commodity",
        "Which commodity or product should be cost-modeled?",
        QuestionInput::FreeText,
        required,
        extract_commodity
    ),
    slot!(
        "region",
        "Which production region applies?",
        QuestionInput::Multiselect,
        optional(2, &["region", "country", "plant", "local"]),
        extract_regions
    ),
    slot!(
        "volume",
        "What annual volume should the model assume?",
        QuestionInput::FreeText,
        optional(1, &["volume", "tons", "units", "batch"]),
        extract_never
    ),
];

static SUPPLIER_ASSESSMENT: &[SlotSpec] = &[
    slot!(
        "supplier",
        "Which supplier should be assessed?",
        QuestionInput::FreeText,
        required,
        extract_supplier
    ),
    slot!(
        "focus",
        "Any particular assessment focus?",
        QuestionInput::Multiselect,
        optional(2, &["financial", "esg", "capacity", "quality", "compliance"]),
        extract_never
    ),
    slot!(
        "region",
        "Which of their sites or regions matter most?",
        QuestionInput::Multiselect,
        optional(1, &["site", "plant", "region"]),
        extract_regions
    ),
];

static RISK_ASSESSMENT: &[SlotSpec] = &[
    slot!(
        "category",
        "Which category or portfolio slice is in scope?",
        QuestionInput::CategoryPicker,
        required,
        extract_category
    ),
    slot!(
        "region",
        "Restrict to specific regions?",
        QuestionInput::Multiselect,
        optional(1, &["region", "country", "geography"]),
        extract_regions
    ),
    slot!(
        "risk-focus",
        "Which risk dimensions matter most?",
        QuestionInput::Multiselect,
        optional(2, &["geopolitical", "financial", "climate", "concentration", "cyber"]),
        extract_never
    ),
];

static CUSTOM: &[SlotSpec] = &[
    slot!(
        "objective",
        "What should this study accomplish?",
        QuestionInput::FreeText,
        required,
        extract_never,
        help = "One or two sentences on the decision this research supports."
    ),
    slot!(
        "category",
        "Is a specific category involved?",
        QuestionInput::CategoryPicker,
        optional(2, &["category", "commodity", "material"]),
        extract_category
    ),
    slot!(
        "region",
        "Any regional focus?",
        QuestionInput::Multiselect,
        optional(1, &["region", "country", "geography"]),
        extract_regions
    ),
];

/// The declared slot set for a study type.
pub fn slot_specs_for(study_type: StudyType) -> &'static [SlotSpec] {
    match study_type {
        StudyType::MarketAnalysis => MARKET_ANALYSIS,
        StudyType::SourcingStudy => SOURCING_STUDY,
        StudyType::CostModel => COST_MODEL,
        StudyType::SupplierAssessment => SUPPLIER_ASSESSMENT,
        StudyType::RiskAssessment => RISK_ASSESSMENT,
        StudyType::Custom => CUSTOM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonar_catalog::Catalog;

    #[test]
    fn every_study_declares_a_required_slot() {
        for study in StudyType::ALL {
            let specs = slot_specs_for(study);
            assert!(specs.iter().any(|s| s.required), "{study:?}");
        }
    }

    #[test]
    fn query_fill_is_high_confidence() {
        let catalog = Catalog::builtin();
        let ctx = crate::IntakeContext::build(&catalog, "market analysis for lithium in apac", &[]);
        let specs = slot_specs_for(StudyType::MarketAnalysis);
        let category = specs.iter().find(|s| s.id == "category").unwrap().fill(&ctx);
        assert_eq!(category.confidence, SlotConfidence::High);
        assert_eq!(category.value.as_deref(), Some("cat-battery-materials"));
        let region = specs.iter().find(|s| s.id == "region").unwrap().fill(&ctx);
        assert_eq!(region.confidence, SlotConfidence::High);
        assert_eq!(region.value.as_deref(), Some("apac"));
    }

    #[test]
    fn history_fill_is_medium_confidence() {
        use sonar_core::traits::providers::ChatTurn;
        let catalog = Catalog::builtin();
        let history = vec![ChatTurn::user("we discussed lithium earlier")];
        let ctx = crate::IntakeContext::build(&catalog, "run the market analysis", &history);
        let specs = slot_specs_for(StudyType::MarketAnalysis);
        let category = specs.iter().find(|s| s.id == "category").unwrap().fill(&ctx);
        assert_eq!(category.confidence, SlotConfidence::Medium);
    }
}
