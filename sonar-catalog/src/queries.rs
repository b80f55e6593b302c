//! Read queries over the catalog: summaries, filters, fuzzy lookup,
//! risk changes, inflation figures, scenario deltas.

use chrono::{DateTime, Duration, Utc};
use sonar_core::models::intent::{ExtractedEntities, Region, RiskLevel};

use crate::data::{Catalog, Supplier};

/// Aggregate portfolio view.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub total_suppliers: u32,
    pub total_spend_musd: f64,
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
    /// (category name, spend) sorted by spend descending.
    pub top_categories: Vec<(String, f64)>,
}

/// A recent supplier risk-level movement.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskChange {
    pub supplier: String,
    pub previous: RiskLevel,
    pub current: RiskLevel,
    pub reason: String,
    pub detected_at: DateTime<Utc>,
}

/// Commodity inflation snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct InflationSummary {
    pub commodity: String,
    pub current_rate_pct: f64,
    pub yoy_change_pct: f64,
    pub drivers: Vec<InflationDriverShare>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InflationDriverShare {
    pub name: String,
    pub contribution_pct: f64,
    /// "up" or "down".
    pub direction: String,
}

/// A what-if scenario delta for a commodity.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioDelta {
    pub name: String,
    pub assumption: String,
    pub delta_pct: f64,
    pub impact_musd: f64,
}

/// Discovery filter derived from extracted entities. Empty filter matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierFilter {
    pub category_id: Option<String>,
    pub regions: Vec<Region>,
    pub min_risk: Option<RiskLevel>,
    pub commodity: Option<String>,
}

impl SupplierFilter {
    /// Derive a filter from classifier entities.
    pub fn from_entities(catalog: &Catalog, entities: &ExtractedEntities) -> Self {
        let category_id = entities.category_id.clone().or_else(|| {
            entities.commodity.as_deref().and_then(|c| {
                catalog
                    .categories()
                    .iter()
                    .find(|cat| cat.commodities.iter().any(|x| x == c))
                    .map(|cat| cat.id.clone())
            })
        });
        Self {
            category_id,
            regions: entities.regions.clone(),
            min_risk: entities.risk_level,
            commodity: entities.commodity.clone(),
        }
    }

    fn matches(&self, s: &Supplier) -> bool {
        if let Some(cat) = &self.category_id {
            if &s.category_id != cat {
                return false;
            }
        }
        if !self.regions.is_empty()
            && !self.regions.contains(&s.region)
            && s.region != Region::Global
        {
            return false;
        }
        if let Some(min) = self.min_risk {
            if s.risk_level < min {
                return false;
            }
        }
        true
    }
}

impl Catalog {
    /// Portfolio-wide rollup.
    pub fn portfolio_summary(&self) -> PortfolioSummary {
        let mut summary = PortfolioSummary {
            total_suppliers: self.suppliers.len() as u32,
            total_spend_musd: 0.0,
            low: 0,
            medium: 0,
            high: 0,
            critical: 0,
            top_categories: Vec::new(),
        };
        let mut by_category: Vec<(String, f64)> = Vec::new();
        for s in &self.suppliers {
            summary.total_spend_musd += s.spend_musd;
            match s.risk_level {
                RiskLevel::Low => summary.low += 1,
                RiskLevel::Medium => summary.medium += 1,
                RiskLevel::High => summary.high += 1,
                RiskLevel::Critical => summary.critical += 1,
            }
            let name = self
                .category_by_id(&s.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| s.category_id.clone());
            match by_category.iter_mut().find(|(n, _)| *n == name) {
                Some((_, spend)) => *spend += s.spend_musd,
                None => by_category.push((name, s.spend_musd)),
            }
        }
        by_category.sort_by(|a, b| b.1.total_cmp(&a.1));
        summary.top_categories = by_category;
        summary
    }

    /// Fuzzy supplier lookup: case-insensitive substring match in either
    /// direction ("titan" finds "Titan Steelworks"; "Titan Steelworks Inc"
    /// finds "Titan Steelworks").
    pub fn find_supplier(&self, name: &str) -> Option<&Supplier> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.suppliers.iter().find(|s| {
            let hay = s.name.to_lowercase();
            hay.contains(&needle) || needle.contains(&hay)
        })
    }

    /// Filtered discovery. Results sorted by risk score descending.
    pub fn filter_suppliers(&self, filter: &SupplierFilter) -> Vec<&Supplier> {
        let mut out: Vec<&Supplier> = self
            .suppliers
            .iter()
            .filter(|s| filter.matches(s))
            .collect();
        out.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
        out
    }

    /// Risk-level movements over the trailing window. Derived from the
    /// deteriorating/improving trend flags on the mock data.
    pub fn recent_risk_changes(&self) -> Vec<RiskChange> {
        let now = Utc::now();
        self.suppliers
            .iter()
            .filter(|s| s.trend == "deteriorating")
            .enumerate()
            .map(|(i, s)| RiskChange {
                supplier: s.name.clone(),
                previous: step_down(s.risk_level),
                current: s.risk_level,
                reason: s
                    .risk_factors
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "Composite risk score increase".to_string()),
                detected_at: now - Duration::days((i as i64 % 14) + 1),
            })
            .collect()
    }

    /// Inflation snapshot for a commodity. Figures are deterministic mock
    /// values keyed off the commodity name.
    pub fn inflation_summary(&self, commodity: &str) -> InflationSummary {
        let c = commodity.trim().to_lowercase();
        let seed = c.bytes().map(u64::from).sum::<u64>();
        let current = 2.0 + (seed % 90) as f64 / 10.0;
        let yoy = -1.5 + (seed % 70) as f64 / 10.0;
        InflationSummary {
            commodity: c,
            current_rate_pct: current,
            yoy_change_pct: yoy,
            drivers: vec![
                InflationDriverShare {
                    name: "Energy input costs".to_string(),
                    contribution_pct: 30.0 + (seed % 20) as f64,
                    direction: "up".to_string(),
                },
                InflationDriverShare {
                    name: "Freight & logistics".to_string(),
                    contribution_pct: 15.0 + (seed % 10) as f64,
                    direction: "up".to_string(),
                },
                InflationDriverShare {
                    name: "Demand softening".to_string(),
                    contribution_pct: 10.0 + (seed % 8) as f64,
                    direction: "down".to_string(),
                },
            ],
        }
    }

    /// What-if deltas for a commodity, scaled by portfolio spend exposure.
    pub fn scenario_deltas(&self, commodity: &str) -> Vec<ScenarioDelta> {
        let exposure: f64 = self
            .suppliers
            .iter()
            .filter(|s| {
                self.category_by_id(&s.category_id)
                    .map(|cat| cat.commodities.iter().any(|x| x == &commodity.to_lowercase()))
                    .unwrap_or(false)
            })
            .map(|s| s.spend_musd)
            .sum();
        let base = if exposure > 0.0 { exposure } else { 25.0 };
        vec![
            ScenarioDelta {
                name: "Base case".to_string(),
                assumption: "Prices follow current forward curve".to_string(),
                delta_pct: 0.0,
                impact_musd: 0.0,
            },
            ScenarioDelta {
                name: "Supply squeeze".to_string(),
                assumption: "10% supply reduction over 2 quarters".to_string(),
                delta_pct: 12.0,
                impact_musd: base * 0.12,
            },
            ScenarioDelta {
                name: "Demand shock".to_string(),
                assumption: "Demand falls 8% on slower EV adoption".to_string(),
                delta_pct: -6.0,
                impact_musd: base * -0.06,
            },
        ]
    }
}

fn step_down(level: RiskLevel) -> RiskLevel {
    match level {
        RiskLevel::Low => RiskLevel::Low,
        RiskLevel::Medium => RiskLevel::Low,
        RiskLevel::High => RiskLevel::Medium,
        RiskLevel::Critical => RiskLevel::High,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portfolio_summary_counts_every_supplier() {
        let catalog = Catalog::builtin();
        let p = catalog.portfolio_summary();
        assert_eq!(
            p.low + p.medium + p.high + p.critical,
            p.total_suppliers,
            "risk buckets must partition the supplier base"
        );
        assert!(p.total_spend_musd > 0.0);
        assert!(!p.top_categories.is_empty());
    }

    #[test]
    fn fuzzy_lookup_matches_either_direction() {
        let catalog = Catalog::builtin();
        assert!(catalog.find_supplier("titan").is_some());
        assert!(catalog.find_supplier("Titan Steelworks Incorporated").is_some());
        assert!(catalog.find_supplier("no such vendor").is_none());
    }

    #[test]
    fn filter_respects_category_and_risk_floor() {
        let catalog = Catalog::builtin();
        let filter = SupplierFilter {
            category_id: Some("cat-battery-materials".to_string()),
            min_risk: Some(RiskLevel::High),
            ..Default::default()
        };
        let hits = catalog.filter_suppliers(&filter);
        assert!(!hits.is_empty());
        for s in hits {
            assert_eq!(s.category_id, "cat-battery-materials");
            assert!(s.risk_level >= RiskLevel::High);
        }
    }

    #[test]
    fn commodity_maps_to_category_filter() {
        let catalog = Catalog::builtin();
        let entities = ExtractedEntities {
            commodity: Some("lithium".to_string()),
            ..Default::default()
        };
        let filter = SupplierFilter::from_entities(&catalog, &entities);
        assert_eq!(filter.category_id.as_deref(), Some("cat-battery-materials"));
    }
}
