//! Commodity-price query patterns.
//!
//! Messages matching any of these resolve against internal price data, so
//! the orchestrator clears `requires_research` even when the category rule
//! asked for it.

use regex::Regex;
use std::sync::LazyLock;

static PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)price\s*(movement|impact|trend|change|forecast|outlook)",
        r"(?i)(lithium|rare\s*earth|cobalt|nickel|battery|steel|aluminum|copper)\s*(price|cost|movement|impact)",
        r"(?i)how\s*(does|do|will|would).*price.*impact",
        r"(?i)analyze.*price.*movement",
        r"(?i)commodity\s*(price|cost).*impact",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

/// True when the message is a commodity-price data query.
pub fn is_price_data_query(message: &str) -> bool {
    PRICE_PATTERNS.iter().any(|re| re.is_match(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_price_queries_match() {
        assert!(is_price_data_query("how does lithium price impact battery suppliers"));
        assert!(is_price_data_query("show price movement for copper"));
        assert!(is_price_data_query("analyze the price movement this quarter"));
        assert!(is_price_data_query("commodity cost impact on margins"));
    }

    #[test]
    fn unrelated_queries_do_not_match() {
        assert!(!is_price_data_query("show my risk overview"));
        assert!(!is_price_data_query("compare Titan Steelworks and Ferro Dynamics"));
    }
}
