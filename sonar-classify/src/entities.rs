//! Dictionary-based entity extraction.
//!
//! The message is normalized once (lowercased, punctuation to spaces) and
//! scanned against each dictionary with whole-word phrase matching.

use sonar_catalog::Catalog;
use sonar_core::models::intent::{ExtractedEntities, Region, RiskLevel, Timeframe};

/// Curated commodity dictionary. Multi-word phrases are matched on word
/// boundaries after normalization.
pub const COMMODITIES: &[&str] = &[
    "lithium",
    "cobalt",
    "nickel",
    "graphite",
    "manganese",
    "rare earth",
    "steel",
    "aluminum",
    "aluminium",
    "copper",
    "zinc",
    "tin",
    "lead",
    "iron ore",
    "titanium",
    "magnesium",
    "silver",
    "gold",
    "platinum",
    "palladium",
    "semiconductor",
    "silicon",
    "memory",
    "pcb",
    "battery",
    "resin",
    "polyethylene",
    "polypropylene",
    "pvc",
    "cardboard",
    "glass",
    "paper pulp",
    "ammonia",
    "methanol",
    "chlorine",
    "sulfuric acid",
    "ethylene",
    "benzene",
    "natural gas",
    "electricity",
    "crude oil",
    "diesel",
    "coal",
    "jet fuel",
    "ocean freight",
    "air freight",
    "trucking",
    "wheat",
    "corn",
    "sugar",
    "palm oil",
    "soybean",
    "coffee",
    "cocoa",
    "cotton",
    "rubber",
    "lumber",
    "cement",
    "fertilizer",
    "solar panel",
];

/// Extract every entity kind from one message. Managed-category names take
/// precedence over commodity phrases they overlap with.
pub fn extract_entities(catalog: &Catalog, message: &str) -> ExtractedEntities {
    let normalized = normalize(message);
    let mut out = ExtractedEntities::default();

    // Managed categories first: the more specific dictionary wins.
    let mut matched_category_name: Option<String> = None;
    for cat in catalog.categories() {
        let cat_name = normalize(&cat.name);
        if contains_phrase(&normalized, &cat_name) {
            out.category_id = Some(cat.id.clone());
            matched_category_name = Some(cat_name);
            break;
        }
    }

    // Commodities, skipping phrases swallowed by a matched category name.
    for commodity in COMMODITIES {
        if contains_phrase(&normalized, commodity) {
            let shadowed = matched_category_name
                .as_deref()
                .map(|cat| contains_phrase(cat, commodity))
                .unwrap_or(false);
            if !shadowed {
                out.commodity = Some(canonical_commodity(commodity).to_string());
                break;
            }
        }
    }

    // Supplier names: exact substring, case-insensitive.
    let lower = message.to_lowercase();
    for supplier in catalog.suppliers() {
        if lower.contains(&supplier.name.to_lowercase()) {
            out.supplier = Some(supplier.name.clone());
            break;
        }
    }

    out.regions = extract_regions(&normalized);
    out.timeframe = extract_timeframe(&normalized);
    out.risk_level = extract_risk_level(&normalized);
    out.action_verb = extract_action_verb(&normalized);
    out
}

/// Lowercase and fold punctuation to single spaces.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            for lc in c.to_lowercase() {
                out.push(lc);
            }
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    out.trim().to_string()
}

/// Whole-word phrase containment over a normalized haystack.
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let padded_hay = format!(" {haystack} ");
    let padded_needle = format!(" {phrase} ");
    padded_hay.contains(&padded_needle)
}

/// Spelling variants fold to one canonical name.
fn canonical_commodity(raw: &str) -> &str {
    match raw {
        "aluminium" => "aluminum",
        other => other,
    }
}

fn extract_regions(normalized: &str) -> Vec<Region> {
    let table: &[(&[&str], Region)] = &[
        (
            &["north america", "united states", "usa", "canada", "mexico"],
            Region::Na,
        ),
        (&["europe", "european", "germany", "france"], Region::Eu),
        (
            &["apac", "asia pacific", "asia", "china", "japan", "korea", "india"],
            Region::Apac,
        ),
        (
            &["latam", "latin america", "south america", "brazil", "chile", "argentina"],
            Region::Latam,
        ),
        (
            &["middle east", "mea", "africa", "gulf"],
            Region::Mea,
        ),
        (&["global", "worldwide", "world"], Region::Global),
    ];
    let mut out = Vec::new();
    for (phrases, region) in table {
        if phrases.iter().any(|p| contains_phrase(normalized, p)) && !out.contains(region) {
            out.push(*region);
        }
    }
    out
}

fn extract_timeframe(normalized: &str) -> Option<Timeframe> {
    let table: &[(&[&str], Timeframe)] = &[
        (
            &["6 months", "six months", "half year", "h2", "h1"],
            Timeframe::SixMonths,
        ),
        (
            &["12 months", "twelve months", "last year", "past year", "1 year", "one year", "annual"],
            Timeframe::TwelveMonths,
        ),
        (
            &["2 years", "two years", "24 months"],
            Timeframe::TwoYears,
        ),
        (
            &["5 years", "five years", "long term"],
            Timeframe::FiveYears,
        ),
    ];
    for (phrases, tf) in table {
        if phrases.iter().any(|p| contains_phrase(normalized, p)) {
            return Some(*tf);
        }
    }
    None
}

fn extract_risk_level(normalized: &str) -> Option<RiskLevel> {
    // Most severe mention wins.
    if contains_phrase(normalized, "critical") {
        Some(RiskLevel::Critical)
    } else if contains_phrase(normalized, "high risk") || contains_phrase(normalized, "highest risk")
    {
        Some(RiskLevel::High)
    } else if contains_phrase(normalized, "medium risk") || contains_phrase(normalized, "moderate risk")
    {
        Some(RiskLevel::Medium)
    } else if contains_phrase(normalized, "low risk") {
        Some(RiskLevel::Low)
    } else {
        None
    }
}

fn extract_action_verb(normalized: &str) -> Option<String> {
    const VERBS: &[&str] = &[
        "research", "analyze", "compare", "draft", "create", "schedule", "monitor", "review",
        "negotiate", "source", "escalate", "summarize",
    ];
    VERBS
        .iter()
        .find(|v| contains_phrase(normalized, v))
        .map(|v| (*v).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonar_catalog::Catalog;

    #[test]
    fn multiword_phrases_match_across_punctuation() {
        let catalog = Catalog::builtin();
        let e = extract_entities(&catalog, "What's driving rare-earth pricing in Asia?");
        assert_eq!(e.commodity.as_deref(), Some("rare earth"));
        assert_eq!(e.regions, vec![Region::Apac]);
    }

    #[test]
    fn category_name_shadows_overlapping_commodity() {
        let catalog = Catalog::builtin();
        let e = extract_entities(&catalog, "show battery materials suppliers");
        assert_eq!(e.category_id.as_deref(), Some("cat-battery-materials"));
        // "battery" is part of the category name occurrence, not a commodity hit.
        assert_eq!(e.commodity, None);
    }

    #[test]
    fn commodity_still_extracted_next_to_category() {
        let catalog = Catalog::builtin();
        let e = extract_entities(&catalog, "lithium exposure in battery materials");
        assert_eq!(e.category_id.as_deref(), Some("cat-battery-materials"));
        assert_eq!(e.commodity.as_deref(), Some("lithium"));
    }

    #[test]
    fn multiple_regions_are_retained() {
        let catalog = Catalog::builtin();
        let e = extract_entities(&catalog, "compare europe and china supply");
        assert!(e.regions.contains(&Region::Eu));
        assert!(e.regions.contains(&Region::Apac));
    }

    #[test]
    fn supplier_matched_by_substring() {
        let catalog = Catalog::builtin();
        let e = extract_entities(&catalog, "tell me about Helix Semiconductors capacity");
        assert_eq!(e.supplier.as_deref(), Some("Helix Semiconductors"));
    }

    #[test]
    fn timeframe_normalizes_to_bucket() {
        let catalog = Catalog::builtin();
        let e = extract_entities(&catalog, "lithium market over the last 12 months");
        assert_eq!(e.timeframe, Some(Timeframe::TwelveMonths));
    }
}
