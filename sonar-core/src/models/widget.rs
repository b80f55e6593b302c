use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::intent::{Region, RiskLevel};

/// A typed visualization directive. The `data` shape is fixed per `type`;
/// consumers may assume the schema holds.
///
/// Serialized as `{title?, type, data}`, the same tagged-enum encoding the
/// rest of the render-facing model uses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Widget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub data: WidgetData,
}

impl Widget {
    pub fn new(data: WidgetData) -> Self {
        Self { title: None, data }
    }

    pub fn titled(title: impl Into<String>, data: WidgetData) -> Self {
        Self {
            title: Some(title.into()),
            data,
        }
    }

    /// The wire name of the widget type, e.g. `risk_distribution`.
    pub fn kind(&self) -> &'static str {
        self.data.kind()
    }
}

/// Typed widget payloads; each widget kind has its own content struct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum WidgetData {
    // Portfolio & risk
    RiskDistribution(RiskDistributionData),
    RiskMatrix(TableData),
    PortfolioSummary(KpiGridData),
    CategorySpend(ChartData),
    SavingsWaterfall(ChartData),
    KpiGrid(KpiGridData),
    // Suppliers
    SupplierTable(SupplierTableData),
    SupplierRiskCard(SupplierRiskCardData),
    SupplierScorecard(SupplierRiskCardData),
    ComparisonTable(ComparisonTableData),
    ContractList(TableData),
    CapacityGauge(KpiGridData),
    EsgPanel(TableData),
    // Alerts & trends
    AlertCard(AlertCardData),
    TrendLine(ChartData),
    PriceTrend(ChartData),
    DemandForecast(ChartData),
    NewsFeed(NewsFeedData),
    Timeline(TimelineData),
    // Inflation
    InflationBreakdown(InflationBreakdownData),
    InflationDrivers(InflationBreakdownData),
    ScenarioTable(ScenarioTableData),
    CostStructure(ChartData),
    TariffTable(TableData),
    // Market
    MarketShare(ChartData),
    RegionMap(RegionMapData),
    BarChart(ChartData),
    PieChart(ChartData),
    // Generic
    SourceList(SourceListData),
    TextPanel(TextPanelData),
    NegotiationBrief(TextPanelData),
}

impl WidgetData {
    /// Wire name of this widget kind.
    pub fn kind(&self) -> &'static str {
        match self {
            WidgetData::RiskDistribution(_) => "risk_distribution",
            WidgetData::RiskMatrix(_) => "risk_matrix",
            WidgetData::PortfolioSummary(_) => "portfolio_summary",
            WidgetData::CategorySpend(_) => "category_spend",
            WidgetData::SavingsWaterfall(_) => "savings_waterfall",
            WidgetData::KpiGrid(_) => "kpi_grid",
            WidgetData::SupplierTable(_) => "supplier_table",
            WidgetData::SupplierRiskCard(_) => "supplier_risk_card",
            WidgetData::SupplierScorecard(_) => "supplier_scorecard",
            WidgetData::ComparisonTable(_) => "comparison_table",
            WidgetData::ContractList(_) => "contract_list",
            WidgetData::CapacityGauge(_) => "capacity_gauge",
            WidgetData::EsgPanel(_) => "esg_panel",
            WidgetData::AlertCard(_) => "alert_card",
            WidgetData::TrendLine(_) => "trend_line",
            WidgetData::PriceTrend(_) => "price_trend",
            WidgetData::DemandForecast(_) => "demand_forecast",
            WidgetData::NewsFeed(_) => "news_feed",
            WidgetData::Timeline(_) => "timeline",
            WidgetData::InflationBreakdown(_) => "inflation_breakdown",
            WidgetData::InflationDrivers(_) => "inflation_drivers",
            WidgetData::ScenarioTable(_) => "scenario_table",
            WidgetData::CostStructure(_) => "cost_structure",
            WidgetData::TariffTable(_) => "tariff_table",
            WidgetData::MarketShare(_) => "market_share",
            WidgetData::RegionMap(_) => "region_map",
            WidgetData::BarChart(_) => "bar_chart",
            WidgetData::PieChart(_) => "pie_chart",
            WidgetData::SourceList(_) => "source_list",
            WidgetData::TextPanel(_) => "text_panel",
            WidgetData::NegotiationBrief(_) => "negotiation_brief",
        }
    }
}

/// Count of suppliers per risk level.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct RiskDistributionData {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRow {
    pub name: String,
    pub category: String,
    pub region: Region,
    pub risk_level: RiskLevel,
    /// Annual spend in millions USD.
    pub spend_musd: f64,
    pub trend: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct SupplierTableData {
    pub rows: Vec<SupplierRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRiskCardData {
    pub name: String,
    pub category: String,
    pub region: Region,
    pub risk_level: RiskLevel,
    /// 0–100, higher is riskier.
    pub risk_score: u32,
    pub trend: String,
    pub factors: Vec<String>,
    pub spend_musd: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonColumn {
    pub supplier: String,
    pub risk_level: RiskLevel,
    pub trend: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct ComparisonTableData {
    pub columns: Vec<ComparisonColumn>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RiskAlert {
    pub supplier: String,
    pub previous: RiskLevel,
    pub current: RiskLevel,
    pub reason: String,
    pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct AlertCardData {
    pub alerts: Vec<RiskAlert>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct ChartPoint {
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct ChartData {
    pub series: Vec<ChartSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Kpi {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct KpiGridData {
    pub kpis: Vec<Kpi>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InflationDriver {
    pub name: String,
    pub contribution_pct: f64,
    pub direction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InflationBreakdownData {
    pub commodity: String,
    pub current_rate_pct: f64,
    pub drivers: Vec<InflationDriver>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,
    pub assumption: String,
    pub delta_pct: f64,
    pub impact_musd: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct ScenarioTableData {
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct NewsItem {
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct NewsFeedData {
    pub items: Vec<NewsItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct TimelineEvent {
    pub at: DateTime<Utc>,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct TimelineData {
    pub events: Vec<TimelineEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct RegionValue {
    pub region: Region,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct RegionMapData {
    pub values: Vec<RegionValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct SourceListData {
    pub sources: Vec<super::source::Source>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct TextPanelData {
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_serializes_with_tagged_type() {
        let w = Widget::titled(
            "Risk overview",
            WidgetData::RiskDistribution(RiskDistributionData {
                low: 10,
                medium: 5,
                high: 2,
                critical: 1,
            }),
        );
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["type"], "risk_distribution");
        assert_eq!(v["data"]["high"], 2);
        assert_eq!(v["title"], "Risk overview");
        assert_eq!(w.kind(), "risk_distribution");
    }
}
