//! Per-intent widget builders over the catalog. Each builder is a pure
//! function of (intent, catalog); provider-supplied widgets take precedence
//! and these only fill the gap.

use sonar_catalog::{Catalog, SupplierFilter};
use sonar_core::models::intent::{Intent, IntentCategory};
use sonar_core::models::widget::{
    AlertCardData, ChartData, ChartPoint, ChartSeries, ComparisonColumn, ComparisonTableData,
    InflationBreakdownData, InflationDriver, RiskAlert, RiskDistributionData, Scenario,
    ScenarioTableData, SupplierRiskCardData, SupplierRow, SupplierTableData, Widget, WidgetData,
};

/// The widget a response should carry for this intent, plus the result
/// count feeding the escalation decision.
pub fn build_widget_for_intent(catalog: &Catalog, intent: &Intent) -> (Option<Widget>, u32) {
    match intent.category {
        IntentCategory::PortfolioOverview => {
            let p = catalog.portfolio_summary();
            let widget = Widget::titled(
                "Portfolio risk distribution",
                WidgetData::RiskDistribution(RiskDistributionData {
                    low: p.low,
                    medium: p.medium,
                    high: p.high,
                    critical: p.critical,
                }),
            );
            (Some(widget), p.total_suppliers)
        }
        IntentCategory::FilteredDiscovery => {
            let filter = SupplierFilter::from_entities(catalog, &intent.entities);
            let hits = catalog.filter_suppliers(&filter);
            let rows: Vec<SupplierRow> = hits
                .iter()
                .map(|s| SupplierRow {
                    name: s.name.clone(),
                    category: category_name(catalog, &s.category_id),
                    region: s.region,
                    risk_level: s.risk_level,
                    spend_musd: s.spend_musd,
                    trend: s.trend.clone(),
                })
                .collect();
            let count = rows.len() as u32;
            (
                Some(Widget::titled(
                    "Matching suppliers",
                    WidgetData::SupplierTable(SupplierTableData { rows }),
                )),
                count,
            )
        }
        IntentCategory::SupplierDeepDive => {
            let found = intent
                .entities
                .supplier
                .as_deref()
                .and_then(|name| catalog.find_supplier(name));
            match found {
                Some(s) => {
                    let widget = Widget::titled(
                        s.name.clone(),
                        WidgetData::SupplierRiskCard(SupplierRiskCardData {
                            name: s.name.clone(),
                            category: category_name(catalog, &s.category_id),
                            region: s.region,
                            risk_level: s.risk_level,
                            risk_score: s.risk_score,
                            trend: s.trend.clone(),
                            factors: s.risk_factors.clone(),
                            spend_musd: s.spend_musd,
                        }),
                    );
                    (Some(widget), 1)
                }
                None => (None, 0),
            }
        }
        IntentCategory::TrendDetection => {
            let changes = catalog.recent_risk_changes();
            let count = changes.len() as u32;
            let alerts: Vec<RiskAlert> = changes
                .into_iter()
                .map(|c| RiskAlert {
                    supplier: c.supplier,
                    previous: c.previous,
                    current: c.current,
                    reason: c.reason,
                    detected_at: c.detected_at,
                })
                .collect();
            (
                Some(Widget::titled(
                    "Recent risk changes",
                    WidgetData::AlertCard(AlertCardData { alerts }),
                )),
                count,
            )
        }
        IntentCategory::Comparison => {
            let filter = SupplierFilter::from_entities(catalog, &intent.entities);
            let hits = catalog.filter_suppliers(&filter);
            // Up to 3 columns; strengths/weaknesses derived from risk + trend.
            let columns: Vec<ComparisonColumn> = hits
                .iter()
                .take(3)
                .map(|s| ComparisonColumn {
                    supplier: s.name.clone(),
                    risk_level: s.risk_level,
                    trend: s.trend.clone(),
                    strengths: derive_strengths(s),
                    weaknesses: derive_weaknesses(s),
                })
                .collect();
            let count = columns.len() as u32;
            (
                Some(Widget::titled(
                    "Supplier comparison",
                    WidgetData::ComparisonTable(ComparisonTableData { columns }),
                )),
                count,
            )
        }
        IntentCategory::InflationSummary | IntentCategory::InflationImpact => {
            let commodity = commodity_or_default(intent);
            let inf = catalog.inflation_summary(&commodity);
            let widget = Widget::titled(
                format!("{commodity} inflation"),
                WidgetData::InflationBreakdown(inflation_data(&inf)),
            );
            (Some(widget), 1)
        }
        IntentCategory::InflationDrivers | IntentCategory::InflationJustification => {
            let commodity = commodity_or_default(intent);
            let inf = catalog.inflation_summary(&commodity);
            let widget = Widget::titled(
                format!("What is moving {commodity}"),
                WidgetData::InflationDrivers(inflation_data(&inf)),
            );
            (Some(widget), 1)
        }
        IntentCategory::InflationScenarios => {
            let commodity = commodity_or_default(intent);
            let scenarios: Vec<Scenario> = catalog
                .scenario_deltas(&commodity)
                .into_iter()
                .map(|s| Scenario {
                    name: s.name,
                    assumption: s.assumption,
                    delta_pct: s.delta_pct,
                    impact_musd: s.impact_musd,
                })
                .collect();
            let count = scenarios.len() as u32;
            (
                Some(Widget::titled(
                    format!("{commodity} scenarios"),
                    WidgetData::ScenarioTable(ScenarioTableData { scenarios }),
                )),
                count,
            )
        }
        IntentCategory::MarketContext => {
            let commodity = commodity_or_default(intent);
            let inf = catalog.inflation_summary(&commodity);
            let points = vec![
                ChartPoint { x: "-12m".to_string(), y: inf.current_rate_pct - inf.yoy_change_pct },
                ChartPoint { x: "now".to_string(), y: inf.current_rate_pct },
            ];
            let widget = Widget::titled(
                format!("{commodity} price trend"),
                WidgetData::PriceTrend(ChartData {
                    series: vec![ChartSeries {
                        label: commodity.clone(),
                        points,
                    }],
                    unit: Some("% y/y".to_string()),
                }),
            );
            (Some(widget), 1)
        }
        // Restricted responses hand off; explanation/action/general render prose.
        IntentCategory::Restricted
        | IntentCategory::Explanation
        | IntentCategory::Action
        | IntentCategory::General => (None, 0),
    }
}

fn category_name(catalog: &Catalog, id: &str) -> String {
    catalog
        .category_by_id(id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn commodity_or_default(intent: &Intent) -> String {
    intent
        .entities
        .commodity
        .clone()
        .unwrap_or_else(|| "commodity basket".to_string())
}

fn inflation_data(inf: &sonar_catalog::InflationSummary) -> InflationBreakdownData {
    InflationBreakdownData {
        commodity: inf.commodity.clone(),
        current_rate_pct: inf.current_rate_pct,
        drivers: inf
            .drivers
            .iter()
            .map(|d| InflationDriver {
                name: d.name.clone(),
                contribution_pct: d.contribution_pct,
                direction: d.direction.clone(),
            })
            .collect(),
    }
}

fn derive_strengths(s: &sonar_catalog::Supplier) -> Vec<String> {
    let mut out = Vec::new();
    if s.risk_score <= 40 {
        out.push("Low composite risk".to_string());
    }
    if s.trend == "improving" {
        out.push("Improving trend".to_string());
    }
    if s.trend == "stable" {
        out.push("Stable performance".to_string());
    }
    if out.is_empty() {
        out.push("Established spend relationship".to_string());
    }
    out
}

fn derive_weaknesses(s: &sonar_catalog::Supplier) -> Vec<String> {
    let mut out: Vec<String> = s.risk_factors.clone();
    if s.trend == "deteriorating" {
        out.push("Deteriorating trend".to_string());
    }
    if s.risk_score > 70 {
        out.push("High composite risk".to_string());
    }
    if out.is_empty() {
        out.push("No material weaknesses on file".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonar_core::models::intent::ExtractedEntities;

    fn intent(category: IntentCategory, entities: ExtractedEntities) -> Intent {
        Intent {
            category,
            sub_intent: None,
            confidence: 0.9,
            entities,
            requires_research: false,
            requires_discovery: false,
            requires_handoff: false,
        }
    }

    #[test]
    fn portfolio_overview_builds_risk_distribution() {
        let catalog = Catalog::builtin();
        let (widget, count) = build_widget_for_intent(
            &catalog,
            &intent(IntentCategory::PortfolioOverview, ExtractedEntities::default()),
        );
        let widget = widget.unwrap();
        assert_eq!(widget.kind(), "risk_distribution");
        assert!(count > 0);
    }

    #[test]
    fn comparison_caps_at_three_columns() {
        let catalog = Catalog::builtin();
        let (widget, count) = build_widget_for_intent(
            &catalog,
            &intent(IntentCategory::Comparison, ExtractedEntities::default()),
        );
        match widget.unwrap().data {
            WidgetData::ComparisonTable(t) => {
                assert!(t.columns.len() <= 3);
                assert_eq!(t.columns.len() as u32, count);
                for col in &t.columns {
                    assert!(!col.strengths.is_empty());
                    assert!(!col.weaknesses.is_empty());
                }
            }
            other => panic!("unexpected widget {other:?}"),
        }
    }

    #[test]
    fn deep_dive_resolves_fuzzy_supplier_name() {
        let catalog = Catalog::builtin();
        let entities = ExtractedEntities {
            supplier: Some("helix".to_string()),
            ..Default::default()
        };
        let (widget, count) =
            build_widget_for_intent(&catalog, &intent(IntentCategory::SupplierDeepDive, entities));
        assert_eq!(count, 1);
        assert_eq!(widget.unwrap().kind(), "supplier_risk_card");
    }

    #[test]
    fn restricted_builds_no_widget() {
        let catalog = Catalog::builtin();
        let (widget, _) = build_widget_for_intent(
            &catalog,
            &intent(IntentCategory::Restricted, ExtractedEntities::default()),
        );
        assert!(widget.is_none());
    }
}
