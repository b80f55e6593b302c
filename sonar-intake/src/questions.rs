//! Question construction, optional-slot ranking, and skip conditions.

use std::collections::BTreeMap;

use sonar_catalog::Catalog;
use sonar_core::constants::MAX_OPTIONAL_QUESTIONS;
use sonar_core::models::intake::{
    IntakePayload, IntakeQuestion, QuestionInput, QuestionOption, SlotConfidence,
};
use sonar_core::models::intent::{Region, Timeframe};
use sonar_core::models::research::StudyType;

use crate::context::IntakeContext;
use crate::slots::{SlotFill, SlotSpec};

/// Build the deterministic intake payload: questions for unfilled and
/// medium-confidence slots, prefills for everything already known, the top
/// optional slots by relevance, and the skip decision.
pub fn build_questions(
    catalog: &Catalog,
    study_type: StudyType,
    ctx: &IntakeContext,
    specs: &[SlotSpec],
    fills: &[SlotFill],
) -> IntakePayload {
    let mut prefilled: BTreeMap<String, String> = BTreeMap::new();
    for (spec, fill) in specs.iter().zip(fills) {
        if let Some(value) = &fill.value {
            prefilled.insert(spec.id.to_string(), value.clone());
        }
    }

    let mut questions: Vec<IntakeQuestion> = Vec::new();
    for (spec, fill) in specs.iter().zip(fills) {
        if spec.required && fill.confidence != SlotConfidence::High {
            questions.push(make_question(catalog, spec, fill));
        }
    }

    // Optional slots compete for at most two places.
    let summary = ctx.summary_text();
    let mut optional: Vec<(&SlotSpec, &SlotFill, u32)> = specs
        .iter()
        .zip(fills)
        .filter(|(s, f)| !s.required && f.confidence != SlotConfidence::High)
        .map(|(s, f)| (s, f, s.relevance(&summary)))
        .collect();
    optional.sort_by(|a, b| b.2.cmp(&a.2));
    let retained_optional = optional.len().min(MAX_OPTIONAL_QUESTIONS);
    for (spec, fill, _) in optional.into_iter().take(MAX_OPTIONAL_QUESTIONS) {
        questions.push(make_question(catalog, spec, fill));
    }

    let unfilled_required = specs
        .iter()
        .zip(fills)
        .filter(|(s, f)| s.required && f.confidence == SlotConfidence::Low)
        .count();
    let all_required_high = specs
        .iter()
        .zip(fills)
        .filter(|(s, _)| s.required)
        .all(|(_, f)| f.confidence == SlotConfidence::High);

    if all_required_high && retained_optional == 0 {
        return IntakePayload {
            questions: Vec::new(),
            prefilled,
            can_skip: true,
            guidance: None,
            soft_repaired: false,
        };
    }

    let filled_required = specs
        .iter()
        .zip(fills)
        .filter(|(s, f)| s.required && f.confidence != SlotConfidence::Low)
        .count();

    // Skipping needs most required slots filled: at most one missing, and
    // at least one actually present.
    let (can_skip, guidance) = if unfilled_required <= 1 && filled_required > 0 {
        (
            true,
            Some(format!(
                "Most details for the {} are already filled in; you can skip and run with \
                 sensible defaults.",
                study_type.as_str().replace('-', " ")
            )),
        )
    } else {
        (false, None)
    };

    IntakePayload {
        questions,
        prefilled,
        can_skip,
        guidance,
        soft_repaired: false,
    }
}

fn make_question(catalog: &Catalog, spec: &SlotSpec, fill: &SlotFill) -> IntakeQuestion {
    let mut options = options_for(catalog, spec.id, spec.input);
    if let Some(value) = &fill.value {
        promote_options(&mut options, value);
    }
    IntakeQuestion {
        id: spec.id.to_string(),
        prompt: spec.prompt.to_string(),
        input: spec.input,
        options,
        default: fill.value.clone(),
        help: spec.help.map(|h| h.to_string()),
        required: spec.required,
    }
}

/// Fixed option lists per slot. Free-text slots carry none.
fn options_for(catalog: &Catalog, slot_id: &str, input: QuestionInput) -> Vec<QuestionOption> {
    match (slot_id, input) {
        ("category", QuestionInput::CategoryPicker) => catalog
            .categories()
            .iter()
            .map(|c| QuestionOption::new(c.id.clone(), c.name.clone()))
            .collect(),
        ("region", _) => vec![
            QuestionOption::new(Region::Na.code(), "North America"),
            QuestionOption::new(Region::Eu.code(), "Europe"),
            QuestionOption::new(Region::Apac.code(), "Asia-Pacific"),
            QuestionOption::new(Region::Latam.code(), "Latin America"),
            QuestionOption::new(Region::Mea.code(), "Middle East & Africa"),
            QuestionOption::new(Region::Global.code(), "Global"),
        ],
        ("timeframe", _) => vec![
            QuestionOption::new(Timeframe::SixMonths.code(), "Next 6 months"),
            QuestionOption::new(Timeframe::TwelveMonths.code(), "Next 12 months"),
            QuestionOption::new(Timeframe::TwoYears.code(), "Next 2 years"),
            QuestionOption::new(Timeframe::FiveYears.code(), "Next 5 years"),
        ],
        ("focus", _) => vec![
            QuestionOption::new("financial", "Financial health"),
            QuestionOption::new("esg", "ESG & sustainability"),
            QuestionOption::new("capacity", "Capacity & delivery"),
            QuestionOption::new("quality", "Quality & compliance"),
        ],
        ("risk-focus", _) => vec![
            QuestionOption::new("geopolitical", "Geopolitical"),
            QuestionOption::new("financial", "Financial"),
            QuestionOption::new("climate", "Climate & environment"),
            QuestionOption::new("concentration", "Concentration"),
        ],
        _ => Vec::new(),
    }
}

/// Move already-extracted values to the front of the option list. For a
/// multiselect prefill the value is a comma-joined code list.
fn promote_options(options: &mut Vec<QuestionOption>, value: &str) {
    let wanted: Vec<&str> = value.split(',').map(str::trim).collect();
    options.sort_by_key(|o| {
        wanted
            .iter()
            .position(|w| *w == o.value)
            .unwrap_or(usize::MAX)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::slot_specs_for;

    fn payload_for(query: &str, study: StudyType) -> IntakePayload {
        let catalog = Catalog::builtin();
        let ctx = IntakeContext::build(&catalog, query, &[]);
        let specs = slot_specs_for(study);
        let fills: Vec<SlotFill> = specs.iter().map(|s| s.fill(&ctx)).collect();
        build_questions(&catalog, study, &ctx, specs, &fills)
    }

    #[test]
    fn fully_specified_query_can_skip_with_empty_questions_or_guidance() {
        let p = payload_for(
            "market analysis for lithium in apac over the next 12 months",
            StudyType::MarketAnalysis,
        );
        assert!(p.can_skip);
        assert_eq!(p.prefilled.get("category").map(String::as_str), Some("cat-battery-materials"));
        assert_eq!(p.prefilled.get("region").map(String::as_str), Some("apac"));
        assert!(!p.questions.iter().any(|q| q.required));
    }

    #[test]
    fn bare_query_asks_required_questions_first() {
        let p = payload_for("run a sourcing study", StudyType::SourcingStudy);
        assert!(!p.can_skip);
        let required: Vec<&str> = p
            .questions
            .iter()
            .filter(|q| q.required)
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(required, vec!["category", "region", "volume"]);
        let optional = p.questions.iter().filter(|q| !q.required).count();
        assert!(optional <= MAX_OPTIONAL_QUESTIONS);
    }

    #[test]
    fn lone_unfilled_required_slot_blocks_skip() {
        // Custom's only required slot is the free-text objective; with
        // nothing filled there is no basis for "run with defaults".
        let p = payload_for("look into this for me", StudyType::Custom);
        assert!(!p.can_skip);
        assert!(p.guidance.is_none());
        assert!(p.questions.iter().any(|q| q.id == "objective" && q.required));
    }

    #[test]
    fn optional_ranking_prefers_keyword_hits() {
        // "incumbent" boosts the incumbents slot past the timeframe slot.
        let p = payload_for(
            "sourcing study to replace our incumbent supplier",
            StudyType::SourcingStudy,
        );
        let optional_ids: Vec<&str> = p
            .questions
            .iter()
            .filter(|q| !q.required)
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(optional_ids.first(), Some(&"incumbents"));
    }

    #[test]
    fn extracted_value_becomes_default_and_leads_options() {
        let catalog = Catalog::builtin();
        use sonar_core::traits::providers::ChatTurn;
        let history = vec![ChatTurn::user("the battery materials category in europe")];
        let ctx = IntakeContext::build(&catalog, "run a risk assessment", &history);
        let specs = slot_specs_for(StudyType::RiskAssessment);
        let fills: Vec<SlotFill> = specs.iter().map(|s| s.fill(&ctx)).collect();
        let p = build_questions(&catalog, StudyType::RiskAssessment, &ctx, specs, &fills);
        let category = p.questions.iter().find(|q| q.id == "category").unwrap();
        assert_eq!(category.default.as_deref(), Some("cat-battery-materials"));
        assert_eq!(category.options[0].value, "cat-battery-materials");
    }
}
