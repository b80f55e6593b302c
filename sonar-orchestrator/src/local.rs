//! Local fallback: catalog-only answers for every intent category.
//!
//! This path has no external dependencies and always produces a draft, so
//! it is the floor every other route downgrades to.

use sonar_catalog::{Catalog, SupplierFilter};
use sonar_core::models::intent::{Intent, IntentCategory, RiskLevel};
use sonar_core::models::response::{Handoff, Insight, MilestoneEvent, Sentiment};
use sonar_respond::Draft;

use crate::milestones::MilestoneBuffer;

pub fn run(catalog: &Catalog, intent: &Intent, buffer: &mut MilestoneBuffer) -> Draft {
    buffer.record(MilestoneEvent::DataRetrieved, "catalog");
    match intent.category {
        IntentCategory::PortfolioOverview => portfolio(catalog),
        IntentCategory::FilteredDiscovery => discovery(catalog, intent),
        IntentCategory::SupplierDeepDive => deep_dive(catalog, intent),
        IntentCategory::TrendDetection => trends(catalog),
        IntentCategory::Comparison => comparison(catalog, intent),
        IntentCategory::MarketContext => market_context(catalog, intent),
        IntentCategory::InflationSummary
        | IntentCategory::InflationDrivers
        | IntentCategory::InflationImpact
        | IntentCategory::InflationJustification => inflation(catalog, intent),
        IntentCategory::InflationScenarios => scenarios(catalog, intent),
        IntentCategory::Explanation => explanation(),
        IntentCategory::Action => action(intent),
        IntentCategory::Restricted => restricted(),
        IntentCategory::General => general(),
    }
}

fn commodity_of(intent: &Intent) -> String {
    intent
        .entities
        .commodity
        .clone()
        .unwrap_or_else(|| "steel".to_string())
}

fn portfolio(catalog: &Catalog) -> Draft {
    let p = catalog.portfolio_summary();
    let attention = p.high + p.critical;
    let top = p
        .top_categories
        .iter()
        .take(3)
        .map(|(name, spend)| format!("{name} (${spend:.0}M)"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut draft = Draft::text(format!(
        "You manage {} suppliers with ${:.0}M annual spend. Risk split: {} low, \
         {} medium, {} high, {} critical. Largest categories: {}.",
        p.total_suppliers, p.total_spend_musd, p.low, p.medium, p.high, p.critical, top,
    ));
    draft.insight = Some(Insight {
        headline: if attention > 0 {
            format!("{attention} suppliers need attention")
        } else {
            "Portfolio risk is under control".to_string()
        },
        summary: None,
        sentiment: if attention > 0 {
            Sentiment::Negative
        } else {
            Sentiment::Positive
        },
        factors: Vec::new(),
    });
    draft
}

fn discovery(catalog: &Catalog, intent: &Intent) -> Draft {
    let filter = SupplierFilter::from_entities(catalog, &intent.entities);
    let hits = catalog.filter_suppliers(&filter);
    if hits.is_empty() {
        return Draft::text(
            "No suppliers match those filters. Try widening the region or \
             dropping the risk floor.",
        );
    }
    let lines: Vec<String> = hits
        .iter()
        .take(5)
        .map(|s| {
            format!(
                "- **{}** ({}, risk {} / score {})",
                s.name,
                s.region.code(),
                risk_word(s.risk_level),
                s.risk_score
            )
        })
        .collect();
    let mut draft = Draft::text(format!(
        "{} suppliers match, sorted by risk:\n{}",
        hits.len(),
        lines.join("\n")
    ));
    draft.result_count = Some(hits.len() as u32);
    draft
}

fn deep_dive(catalog: &Catalog, intent: &Intent) -> Draft {
    let Some(name) = intent.entities.supplier.as_deref() else {
        return Draft::text("Which supplier should I look at? Give me a name.");
    };
    let Some(s) = catalog.find_supplier(name) else {
        return Draft::text(format!(
            "I couldn't find a supplier matching \"{name}\" in your portfolio."
        ));
    };
    let category = catalog
        .category_by_id(&s.category_id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| s.category_id.clone());
    let factors = if s.risk_factors.is_empty() {
        "none on record".to_string()
    } else {
        s.risk_factors.join("; ")
    };
    let mut draft = Draft::text(format!(
        "**{}** supplies {} from {}. Risk: {} (score {}), trend {}. Annual \
         spend ${:.0}M. Key factors: {}.",
        s.name,
        category,
        s.region.code(),
        risk_word(s.risk_level),
        s.risk_score,
        s.trend,
        s.spend_musd,
        factors,
    ));
    draft.insight = Some(Insight {
        headline: format!("{} is trending {}", s.name, s.trend),
        summary: None,
        sentiment: match s.trend.as_str() {
            "deteriorating" => Sentiment::Negative,
            "improving" => Sentiment::Positive,
            _ => Sentiment::Neutral,
        },
        factors: s.risk_factors.clone(),
    });
    draft.result_count = Some(1);
    draft
}

fn trends(catalog: &Catalog) -> Draft {
    let changes = catalog.recent_risk_changes();
    if changes.is_empty() {
        return Draft::text("No supplier risk movements in the trailing window.");
    }
    let lines: Vec<String> = changes
        .iter()
        .take(5)
        .map(|c| {
            format!(
                "- **{}**: {} → {} ({})",
                c.supplier,
                risk_word(c.previous),
                risk_word(c.current),
                c.reason
            )
        })
        .collect();
    let mut draft = Draft::text(format!(
        "{} risk movements detected:\n{}",
        changes.len(),
        lines.join("\n")
    ));
    draft.insight = Some(Insight {
        headline: format!("{} suppliers deteriorated recently", changes.len()),
        summary: None,
        sentiment: Sentiment::Negative,
        factors: Vec::new(),
    });
    draft.result_count = Some(changes.len() as u32);
    draft
}

fn comparison(catalog: &Catalog, intent: &Intent) -> Draft {
    let filter = SupplierFilter::from_entities(catalog, &intent.entities);
    let picks: Vec<_> = catalog.filter_suppliers(&filter).into_iter().take(3).collect();
    if picks.len() < 2 {
        return Draft::text(
            "I need at least two suppliers to compare. Name them or give me a \
             category to pull candidates from.",
        );
    }
    let lines: Vec<String> = picks
        .iter()
        .map(|s| {
            format!(
                "- **{}**: risk {} (score {}), trend {}, ${:.0}M spend",
                s.name,
                risk_word(s.risk_level),
                s.risk_score,
                s.trend,
                s.spend_musd
            )
        })
        .collect();
    let mut draft = Draft::text(format!(
        "Comparing {} candidates:\n{}",
        picks.len(),
        lines.join("\n")
    ));
    draft.result_count = Some(picks.len() as u32);
    draft
}

fn market_context(catalog: &Catalog, intent: &Intent) -> Draft {
    let commodity = commodity_of(intent);
    let inflation = catalog.inflation_summary(&commodity);
    Draft::text(format!(
        "From internal data: {} inflation runs at {:.1}% ({:+.1}% year over \
         year). For a fuller market picture with external evidence, run a \
         market analysis study.",
        inflation.commodity, inflation.current_rate_pct, inflation.yoy_change_pct,
    ))
}

fn inflation(catalog: &Catalog, intent: &Intent) -> Draft {
    let commodity = commodity_of(intent);
    let summary = catalog.inflation_summary(&commodity);
    let drivers: Vec<String> = summary
        .drivers
        .iter()
        .map(|d| format!("- {} ({:.0}% contribution, {})", d.name, d.contribution_pct, d.direction))
        .collect();
    let mut draft = Draft::text(format!(
        "{} inflation is {:.1}%, {:+.1}% year over year. Main drivers:\n{}",
        summary.commodity,
        summary.current_rate_pct,
        summary.yoy_change_pct,
        drivers.join("\n"),
    ));
    draft.insight = Some(Insight {
        headline: format!(
            "{} inflation at {:.1}%",
            summary.commodity, summary.current_rate_pct
        ),
        summary: None,
        sentiment: if summary.yoy_change_pct > 0.0 {
            Sentiment::Negative
        } else {
            Sentiment::Positive
        },
        factors: summary.drivers.iter().map(|d| d.name.clone()).collect(),
    });
    draft
}

fn scenarios(catalog: &Catalog, intent: &Intent) -> Draft {
    let commodity = commodity_of(intent);
    let deltas = catalog.scenario_deltas(&commodity);
    let lines: Vec<String> = deltas
        .iter()
        .map(|d| {
            format!(
                "- **{}** ({}): {:+.0}% price, ${:+.1}M impact",
                d.name, d.assumption, d.delta_pct, d.impact_musd
            )
        })
        .collect();
    let mut draft = Draft::text(format!(
        "What-if scenarios for {commodity}:\n{}",
        lines.join("\n")
    ));
    draft.result_count = Some(deltas.len() as u32);
    draft
}

fn explanation() -> Draft {
    Draft::text(
        "Risk scores run 0-100 and combine financial health, concentration, \
         geography, and ESG signals. Levels map as: low < 40, medium 40-59, \
         high 60-79, critical 80+. Trend reflects the score's direction over \
         the trailing quarter.",
    )
}

fn action(intent: &Intent) -> Draft {
    let verb = intent
        .entities
        .action_verb
        .as_deref()
        .unwrap_or("that action");
    Draft::text(format!(
        "I can't execute {verb} directly, but I can prep the groundwork: \
         pull the supplier data, draft the comparison, or start a sourcing \
         study you can hand to the category team.",
    ))
}

fn restricted() -> Draft {
    let mut draft = Draft::text(
        "That touches contract or pricing terms I can't act on. I've flagged \
         it for the category management team.",
    );
    draft.handoff = Some(Handoff {
        reason: "restricted procurement topic".to_string(),
        team: "category-management".to_string(),
    });
    draft
}

fn general() -> Draft {
    Draft::text(
        "I can summarize your portfolio, dig into a supplier, track risk \
         movements, explain inflation for a commodity, or launch a deep \
         research study. What would you like to look at?",
    )
}

fn risk_word(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "low",
        RiskLevel::Medium => "medium",
        RiskLevel::High => "high",
        RiskLevel::Critical => "critical",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonar_core::models::intent::ExtractedEntities;
    use sonar_core::models::response::MilestoneEvent;

    fn intent(category: IntentCategory, entities: ExtractedEntities) -> Intent {
        Intent {
            category,
            sub_intent: None,
            confidence: 0.9,
            entities,
            requires_research: false,
            requires_discovery: false,
            requires_handoff: category == IntentCategory::Restricted,
        }
    }

    #[test]
    fn every_category_produces_nonempty_content() {
        let catalog = Catalog::builtin();
        let categories = [
            IntentCategory::PortfolioOverview,
            IntentCategory::FilteredDiscovery,
            IntentCategory::SupplierDeepDive,
            IntentCategory::TrendDetection,
            IntentCategory::Comparison,
            IntentCategory::MarketContext,
            IntentCategory::InflationSummary,
            IntentCategory::InflationScenarios,
            IntentCategory::Explanation,
            IntentCategory::Action,
            IntentCategory::Restricted,
            IntentCategory::General,
        ];
        for category in categories {
            let mut buffer = MilestoneBuffer::new(None);
            let draft = run(
                &catalog,
                &intent(category, ExtractedEntities::default()),
                &mut buffer,
            );
            assert!(!draft.content.trim().is_empty(), "{category:?}");
            assert!(buffer
                .into_milestones()
                .iter()
                .any(|m| m.event == MilestoneEvent::DataRetrieved));
        }
    }

    #[test]
    fn restricted_carries_handoff() {
        let catalog = Catalog::builtin();
        let mut buffer = MilestoneBuffer::new(None);
        let draft = run(
            &catalog,
            &intent(IntentCategory::Restricted, ExtractedEntities::default()),
            &mut buffer,
        );
        assert!(draft.handoff.is_some());
    }

    #[test]
    fn deep_dive_resolves_fuzzy_supplier_names() {
        let catalog = Catalog::builtin();
        let entities = ExtractedEntities {
            supplier: Some("titan".to_string()),
            ..Default::default()
        };
        let mut buffer = MilestoneBuffer::new(None);
        let draft = run(
            &catalog,
            &intent(IntentCategory::SupplierDeepDive, entities),
            &mut buffer,
        );
        assert!(draft.content.contains("Titan"));
        assert_eq!(draft.result_count, Some(1));
    }
}
