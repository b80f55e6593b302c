//! The category rule cascade. Rules are tested in priority order; the first
//! match wins and fixes the category, sub-intent, confidence, and routing
//! flags.

use regex::Regex;
use std::sync::LazyLock;

use sonar_core::models::intent::{ExtractedEntities, Intent, IntentCategory};

macro_rules! re {
    ($name:ident, $pattern:literal) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($pattern).expect("static pattern"));
    };
}

re!(RESTRICTED_RE, r"(?i)\b(terminate|cancel)\b.*\bcontract|\b(legal advice|lawsuit|litigation|salar(y|ies)|compensation|confidential)\b");
re!(SCENARIO_RE, r"(?i)\b(scenario|what\s+if|simulate|stress\s*test)\b");
re!(JUSTIFY_RE, r"(?i)\b(justif(y|ication|ied)|defend|validate)\b.*\b(price|increase|quote|cost)|\b(price|cost)\s+increase\s+justif");
re!(DRIVERS_RE, r"(?i)\b(driver|driving|why)\b.*\b(inflation|price|cost)|\binflation\s+drivers?\b");
re!(IMPACT_RE, r"(?i)\b(price|inflation|cost)\b.*\b(impact|affect|hit|exposure)|\bimpact\b.*\b(price|inflation)\b");
re!(INFLATION_RE, r"(?i)\binflation\b");
re!(COMPARISON_RE, r"(?i)\b(compare|comparison|versus|vs\.?|side\s*by\s*side)\b");
re!(TREND_RE, r"(?i)\b(trend|trending|recent(ly)?\s+(change|movement)|what'?s\s+(new|changed)|alerts?|risk\s+changes?)\b");
re!(DEEP_DIVE_RE, r"(?i)\b(tell\s+me\s+about|deep\s*dive|profile|drill\s+into|detail(s)?\s+on)\b");
re!(DISCOVERY_RE, r"(?i)\b(find|show|list|which|top|search)\b.*\b(suppliers?|vendors?)\b");
re!(PORTFOLIO_RE, r"(?i)\b(portfolio|my\s+risk|risk\s+overview|overview|dashboard|how\s+exposed)\b");
re!(MARKET_RE, r"(?i)\b(market|outlook|forecast|news|industry|macro)\b");
re!(EXPLAIN_RE, r"(?i)\b(what\s+is|what\s+are|explain|how\s+does\b.*\bwork|define)\b");
re!(ACTION_RE, r"(?i)\b(create|draft|set\s+up|schedule|generate|kick\s+off|start)\b");

/// Apply the cascade to a message with its extracted entities.
pub fn categorize(message: &str, entities: ExtractedEntities) -> Intent {
    let mut intent = Intent {
        category: IntentCategory::General,
        sub_intent: None,
        confidence: 0.3,
        entities,
        requires_research: false,
        requires_discovery: false,
        requires_handoff: false,
    };

    if RESTRICTED_RE.is_match(message) {
        intent.category = IntentCategory::Restricted;
        intent.confidence = 0.95;
        intent.requires_handoff = true;
        return intent;
    }
    if SCENARIO_RE.is_match(message) {
        intent.category = IntentCategory::InflationScenarios;
        intent.sub_intent = Some("what_if".to_string());
        intent.confidence = 0.85;
        return intent;
    }
    if JUSTIFY_RE.is_match(message) {
        intent.category = IntentCategory::InflationJustification;
        intent.confidence = 0.85;
        return intent;
    }
    if IMPACT_RE.is_match(message) {
        intent.category = IntentCategory::InflationImpact;
        intent.confidence = 0.85;
        return intent;
    }
    if DRIVERS_RE.is_match(message) {
        intent.category = IntentCategory::InflationDrivers;
        intent.confidence = 0.85;
        return intent;
    }
    if INFLATION_RE.is_match(message) {
        intent.category = IntentCategory::InflationSummary;
        intent.confidence = 0.8;
        return intent;
    }
    if COMPARISON_RE.is_match(message) {
        intent.category = IntentCategory::Comparison;
        intent.confidence = 0.85;
        return intent;
    }
    if TREND_RE.is_match(message) {
        intent.category = IntentCategory::TrendDetection;
        intent.confidence = 0.8;
        return intent;
    }
    // A named supplier plus a deep-dive phrasing beats discovery.
    if intent.entities.supplier.is_some() && DEEP_DIVE_RE.is_match(message) {
        intent.category = IntentCategory::SupplierDeepDive;
        intent.confidence = 0.9;
        return intent;
    }
    if DISCOVERY_RE.is_match(message) {
        intent.category = IntentCategory::FilteredDiscovery;
        intent.confidence = 0.85;
        intent.requires_discovery = true;
        return intent;
    }
    if intent.entities.supplier.is_some() {
        intent.category = IntentCategory::SupplierDeepDive;
        intent.confidence = 0.75;
        return intent;
    }
    if PORTFOLIO_RE.is_match(message) {
        intent.category = IntentCategory::PortfolioOverview;
        intent.confidence = 0.85;
        return intent;
    }
    if MARKET_RE.is_match(message) {
        intent.category = IntentCategory::MarketContext;
        intent.confidence = 0.75;
        intent.requires_research = true;
        return intent;
    }
    if EXPLAIN_RE.is_match(message) {
        intent.category = IntentCategory::Explanation;
        intent.confidence = 0.7;
        return intent;
    }
    if ACTION_RE.is_match(message) {
        intent.category = IntentCategory::Action;
        intent.confidence = 0.7;
        intent.sub_intent = intent.entities.action_verb.clone();
        return intent;
    }
    intent
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonar_core::models::intent::ExtractedEntities;

    fn cat(message: &str) -> IntentCategory {
        categorize(message, ExtractedEntities::default()).category
    }

    #[test]
    fn cascade_priority_first_match_wins() {
        assert_eq!(cat("show my risk overview"), IntentCategory::PortfolioOverview);
        assert_eq!(cat("find high risk suppliers in europe"), IntentCategory::FilteredDiscovery);
        assert_eq!(cat("compare our steel vendors"), IntentCategory::Comparison);
        assert_eq!(cat("what's new in my alerts"), IntentCategory::TrendDetection);
        assert_eq!(cat("inflation outlook"), IntentCategory::InflationSummary);
        assert_eq!(cat("what is driving inflation in copper"), IntentCategory::InflationDrivers);
        assert_eq!(cat("what if lithium supply tightens, run a scenario"), IntentCategory::InflationScenarios);
        assert_eq!(cat("terminate the contract with our vendor"), IntentCategory::Restricted);
        assert_eq!(cat("hello there"), IntentCategory::General);
    }

    #[test]
    fn price_impact_routes_to_inflation_impact() {
        assert_eq!(
            cat("how does lithium price impact battery suppliers"),
            IntentCategory::InflationImpact
        );
    }

    #[test]
    fn named_supplier_with_deep_dive_phrasing() {
        let entities = ExtractedEntities {
            supplier: Some("Titan Steelworks".to_string()),
            ..Default::default()
        };
        let intent = categorize("tell me about Titan Steelworks", entities);
        assert_eq!(intent.category, IntentCategory::SupplierDeepDive);
        assert!(intent.confidence >= 0.9);
    }

    #[test]
    fn restricted_sets_handoff_flag() {
        let intent = categorize("I need legal advice on this supplier", ExtractedEntities::default());
        assert_eq!(intent.category, IntentCategory::Restricted);
        assert!(intent.requires_handoff);
    }

    #[test]
    fn market_context_requires_research() {
        let intent = categorize("what's the market outlook for semiconductors", ExtractedEntities::default());
        assert_eq!(intent.category, IntentCategory::MarketContext);
        assert!(intent.requires_research);
    }
}
