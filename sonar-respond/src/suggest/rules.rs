//! The static suggestion rule registry. Ordered by priority; the engine
//! walks it top to bottom and keeps the first three that fire.

use sonar_core::models::intent::IntentCategory;
use sonar_core::models::suggestion::Suggestion;

use super::SuggestionContext;

pub(super) struct Rule {
    pub id: &'static str,
    /// Turns a rule sits out after firing in a session.
    pub cooldown: u32,
    pub applies: fn(&SuggestionContext) -> bool,
    pub build: fn(&SuggestionContext) -> Suggestion,
}

fn subject(ctx: &SuggestionContext) -> Option<&str> {
    ctx.intent
        .entities
        .supplier
        .as_deref()
        .or(ctx.intent.entities.commodity.as_deref())
}

fn is(ctx: &SuggestionContext, category: IntentCategory) -> bool {
    ctx.intent.category == category
}

macro_rules! rule {
    ($id:literal, $cooldown:literal, $applies:expr, $build:expr) => {
        Rule {
            id: $id,
            cooldown: $cooldown,
            applies: $applies,
            build: $build,
        }
    };
}

pub(super) static REGISTRY: &[Rule] = &[
    // Portfolio
    rule!(
        "portfolio-drill-high-risk",
        3,
        |c| is(c, IntentCategory::PortfolioOverview),
        |_| Suggestion::new("portfolio-drill-high-risk", "Show only high and critical risk suppliers")
            .targeting(IntentCategory::FilteredDiscovery)
    ),
    rule!(
        "portfolio-recent-changes",
        3,
        |c| is(c, IntentCategory::PortfolioOverview),
        |_| Suggestion::new("portfolio-recent-changes", "What changed in the last two weeks?")
            .targeting(IntentCategory::TrendDetection)
    ),
    rule!(
        "portfolio-spend-concentration",
        4,
        |c| is(c, IntentCategory::PortfolioOverview),
        |_| Suggestion::new("portfolio-spend-concentration", "Where is my spend most concentrated?")
            .targeting(IntentCategory::PortfolioOverview)
    ),
    // Discovery
    rule!(
        "discovery-compare-top",
        3,
        |c| is(c, IntentCategory::FilteredDiscovery) && c.result_count >= 2,
        |_| Suggestion::new("discovery-compare-top", "Compare the top matches side by side")
            .targeting(IntentCategory::Comparison)
    ),
    rule!(
        "discovery-widen-region",
        4,
        |c| is(c, IntentCategory::FilteredDiscovery) && !c.intent.entities.regions.is_empty(),
        |_| Suggestion::new("discovery-widen-region", "Widen the search to all regions")
            .targeting(IntentCategory::FilteredDiscovery)
    ),
    rule!(
        "discovery-deep-dive-first",
        3,
        |c| is(c, IntentCategory::FilteredDiscovery) && c.result_count >= 1,
        |_| Suggestion::new("discovery-deep-dive-first", "Deep dive on the riskiest match")
            .targeting(IntentCategory::SupplierDeepDive)
    ),
    rule!(
        "discovery-no-hits-relax",
        2,
        |c| is(c, IntentCategory::FilteredDiscovery) && c.result_count == 0,
        |_| Suggestion::new("discovery-no-hits-relax", "Relax the filters and search again")
            .targeting(IntentCategory::FilteredDiscovery)
    ),
    // Deep dive
    rule!(
        "dive-alternatives",
        3,
        |c| is(c, IntentCategory::SupplierDeepDive),
        |c| {
            let text = match subject(c) {
                Some(s) => format!("Find alternatives to {s}"),
                None => "Find alternative suppliers in this category".to_string(),
            };
            Suggestion::new("dive-alternatives", text).targeting(IntentCategory::FilteredDiscovery)
        }
    ),
    rule!(
        "dive-risk-history",
        3,
        |c| is(c, IntentCategory::SupplierDeepDive),
        |c| {
            let text = match subject(c) {
                Some(s) => format!("How has {s}'s risk trended?"),
                None => "How has this supplier's risk trended?".to_string(),
            };
            Suggestion::new("dive-risk-history", text).targeting(IntentCategory::TrendDetection)
        }
    ),
    rule!(
        "dive-compare-peers",
        4,
        |c| is(c, IntentCategory::SupplierDeepDive),
        |_| Suggestion::new("dive-compare-peers", "Compare against category peers")
            .targeting(IntentCategory::Comparison)
    ),
    // Trends & alerts
    rule!(
        "trend-explain-worst",
        3,
        |c| is(c, IntentCategory::TrendDetection) && c.result_count >= 1,
        |_| Suggestion::new("trend-explain-worst", "Why did the biggest mover deteriorate?")
            .targeting(IntentCategory::SupplierDeepDive)
    ),
    rule!(
        "trend-portfolio-impact",
        3,
        |c| is(c, IntentCategory::TrendDetection),
        |_| Suggestion::new("trend-portfolio-impact", "Show the portfolio-level risk picture")
            .targeting(IntentCategory::PortfolioOverview)
    ),
    // Comparison
    rule!(
        "compare-winner-dive",
        3,
        |c| is(c, IntentCategory::Comparison) && c.result_count >= 2,
        |_| Suggestion::new("compare-winner-dive", "Deep dive on the strongest option")
            .targeting(IntentCategory::SupplierDeepDive)
    ),
    rule!(
        "compare-add-criteria",
        4,
        |c| is(c, IntentCategory::Comparison),
        |_| Suggestion::new("compare-add-criteria", "Add spend and trend to the comparison")
            .targeting(IntentCategory::Comparison)
    ),
    // Market context
    rule!(
        "market-price-history",
        3,
        |c| is(c, IntentCategory::MarketContext),
        |c| {
            let text = match subject(c) {
                Some(s) => format!("Show the {s} price trend over 2 years"),
                None => "Show the price trend over 2 years".to_string(),
            };
            Suggestion::new("market-price-history", text).targeting(IntentCategory::MarketContext)
        }
    ),
    rule!(
        "market-exposure",
        3,
        |c| is(c, IntentCategory::MarketContext),
        |_| Suggestion::new("market-exposure", "Which of my suppliers are exposed to this market?")
            .targeting(IntentCategory::FilteredDiscovery)
    ),
    // Inflation ladder: summary -> drivers -> impact -> justification -> scenarios
    rule!(
        "inflation-next-drivers",
        2,
        |c| is(c, IntentCategory::InflationSummary),
        |_| Suggestion::new("inflation-next-drivers", "What is driving this inflation?")
            .targeting(IntentCategory::InflationDrivers)
    ),
    rule!(
        "inflation-next-impact",
        2,
        |c| is(c, IntentCategory::InflationSummary) || is(c, IntentCategory::InflationDrivers),
        |_| Suggestion::new("inflation-next-impact", "What does this mean for my spend?")
            .targeting(IntentCategory::InflationImpact)
    ),
    rule!(
        "inflation-next-justify",
        2,
        |c| is(c, IntentCategory::InflationImpact),
        |_| Suggestion::new("inflation-next-justify", "Is a supplier price increase justified?")
            .targeting(IntentCategory::InflationJustification)
    ),
    rule!(
        "inflation-next-scenarios",
        2,
        |c| {
            is(c, IntentCategory::InflationImpact) || is(c, IntentCategory::InflationJustification)
        },
        |_| Suggestion::new("inflation-next-scenarios", "Model best and worst case scenarios")
            .targeting(IntentCategory::InflationScenarios)
    ),
    rule!(
        "inflation-scenario-compare",
        3,
        |c| is(c, IntentCategory::InflationScenarios),
        |_| Suggestion::new("inflation-scenario-compare", "Which suppliers soften the downside?")
            .targeting(IntentCategory::FilteredDiscovery)
    ),
    // Explanation & action
    rule!(
        "explain-show-example",
        3,
        |c| is(c, IntentCategory::Explanation),
        |_| Suggestion::new("explain-show-example", "Show this on my own portfolio")
            .targeting(IntentCategory::PortfolioOverview)
    ),
    rule!(
        "action-review-targets",
        3,
        |c| is(c, IntentCategory::Action),
        |_| Suggestion::new("action-review-targets", "Review the suppliers this would affect")
            .targeting(IntentCategory::FilteredDiscovery)
    ),
    // General / cross-cutting
    rule!(
        "general-capabilities",
        5,
        |c| is(c, IntentCategory::General),
        |_| Suggestion::new("general-capabilities", "What can you help me with?")
            .targeting(IntentCategory::Explanation)
    ),
    rule!(
        "research-open-report",
        2,
        |c| c.deep_research_ran,
        |_| Suggestion::new("research-open-report", "Walk me through the key findings")
            .targeting(IntentCategory::Explanation)
    ),
    rule!(
        "widget-expand-artifact",
        4,
        |c| c.has_widget && c.result_count > 5,
        |_| Suggestion::new("widget-expand-artifact", "Open the full result set")
            .targeting(IntentCategory::FilteredDiscovery)
    ),
];

/// The three fixed fallbacks used to pad the suggestion list.
pub fn default_suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion::new("default", "Show my portfolio risk overview")
            .targeting(IntentCategory::PortfolioOverview),
        Suggestion::new("default", "What changed in my supply base recently?")
            .targeting(IntentCategory::TrendDetection),
        Suggestion::new("default", "Explain how risk scores are calculated")
            .targeting(IntentCategory::Explanation),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_ids_are_unique() {
        for (i, a) in REGISTRY.iter().enumerate() {
            for b in &REGISTRY[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn defaults_are_three_and_distinct() {
        let d = default_suggestions();
        assert_eq!(d.len(), 3);
        assert!(d.iter().all(|s| s.rule_id == "default"));
        assert_ne!(d[0].text, d[1].text);
        assert_ne!(d[1].text, d[2].text);
    }
}
