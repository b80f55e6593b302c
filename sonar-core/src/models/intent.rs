use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The enumerated query categories the classifier can produce.
///
/// First match in the rule cascade wins; `General` is the fall-through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    PortfolioOverview,
    FilteredDiscovery,
    SupplierDeepDive,
    TrendDetection,
    Comparison,
    MarketContext,
    InflationSummary,
    InflationDrivers,
    InflationImpact,
    InflationJustification,
    InflationScenarios,
    Explanation,
    Action,
    Restricted,
    General,
}

/// Geographic regions, stored as short codes on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Na,
    Eu,
    Apac,
    Latam,
    Mea,
    Global,
}

impl Region {
    /// Wire/short code for the region.
    pub fn code(self) -> &'static str {
        match self {
            Region::Na => "na",
            Region::Eu => "eu",
            Region::Apac => "apac",
            Region::Latam => "latam",
            Region::Mea => "mea",
            Region::Global => "global",
        }
    }
}

/// Normalized timeframe buckets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export)]
pub enum Timeframe {
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "12m")]
    TwelveMonths,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl Timeframe {
    pub fn code(self) -> &'static str {
        match self {
            Timeframe::SixMonths => "6m",
            Timeframe::TwelveMonths => "12m",
            Timeframe::TwoYears => "2y",
            Timeframe::FiveYears => "5y",
        }
    }
}

/// Supplier risk levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Entities pulled out of the user message by the dictionary scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedEntities {
    pub commodity: Option<String>,
    pub supplier: Option<String>,
    /// Canonical managed-category id, not the display name.
    pub category_id: Option<String>,
    pub regions: Vec<Region>,
    pub timeframe: Option<Timeframe>,
    pub risk_level: Option<RiskLevel>,
    pub action_verb: Option<String>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.commodity.is_none()
            && self.supplier.is_none()
            && self.category_id.is_none()
            && self.regions.is_empty()
            && self.timeframe.is_none()
            && self.risk_level.is_none()
            && self.action_verb.is_none()
    }
}

/// The classifier's output for one user message. Immutable once produced;
/// a caller-supplied deterministic route may replace category/sub-intent
/// before routing, but entity extraction always runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub category: IntentCategory,
    pub sub_intent: Option<String>,
    /// Classification confidence in [0, 1]. Deterministic routes carry 1.0.
    pub confidence: f64,
    pub entities: ExtractedEntities,
    pub requires_research: bool,
    pub requires_discovery: bool,
    pub requires_handoff: bool,
}

impl Intent {
    /// A low-confidence general intent with no entities.
    pub fn general() -> Self {
        Self {
            category: IntentCategory::General,
            sub_intent: None,
            confidence: 0.3,
            entities: ExtractedEntities::default(),
            requires_research: false,
            requires_discovery: false,
            requires_handoff: false,
        }
    }
}
