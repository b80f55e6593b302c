//! The built-in mock datasets. Process-wide read-only state.

use sonar_core::models::intent::{Region, RiskLevel};

/// A supplier record in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Supplier {
    pub name: String,
    pub category_id: String,
    pub region: Region,
    pub risk_level: RiskLevel,
    /// 0–100, higher is riskier.
    pub risk_score: u32,
    /// "improving", "stable", or "deteriorating".
    pub trend: String,
    /// Annual spend in millions USD.
    pub spend_musd: f64,
    pub risk_factors: Vec<String>,
}

/// A managed spend category.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedCategory {
    /// Canonical id, e.g. `cat-battery-materials`.
    pub id: String,
    pub name: String,
    /// Commodities the category covers, lowercased.
    pub commodities: Vec<String>,
}

/// The catalog handle. Cheap to clone conceptually but handed around by
/// reference; all methods are pure reads.
#[derive(Debug)]
pub struct Catalog {
    pub(crate) suppliers: Vec<Supplier>,
    pub(crate) categories: Vec<ManagedCategory>,
}

impl Catalog {
    /// The built-in dataset used by the mock deployment and by tests.
    pub fn builtin() -> Self {
        Self {
            suppliers: builtin_suppliers(),
            categories: builtin_categories(),
        }
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn categories(&self) -> &[ManagedCategory] {
        &self.categories
    }

    pub fn category_by_id(&self, id: &str) -> Option<&ManagedCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// All regions present in the supplier base.
    pub fn regions(&self) -> Vec<Region> {
        let mut out: Vec<Region> = Vec::new();
        for s in &self.suppliers {
            if !out.contains(&s.region) {
                out.push(s.region);
            }
        }
        out
    }
}

fn sup(
    name: &str,
    category_id: &str,
    region: Region,
    risk_level: RiskLevel,
    risk_score: u32,
    trend: &str,
    spend_musd: f64,
    factors: &[&str],
) -> Supplier {
    Supplier {
        name: name.to_string(),
        category_id: category_id.to_string(),
        region,
        risk_level,
        risk_score,
        trend: trend.to_string(),
        spend_musd,
        risk_factors: factors.iter().map(|f| (*f).to_string()).collect(),
    }
}

fn builtin_suppliers() -> Vec<Supplier> {
    vec![
        sup("Voltaic Materials", "cat-battery-materials", Region::Apac, RiskLevel::High, 78, "deteriorating", 42.5, &["Single-source lithium exposure", "Port congestion"]),
        sup("NordCell", "cat-battery-materials", Region::Eu, RiskLevel::Medium, 55, "stable", 31.0, &["Energy price sensitivity"]),
        sup("Andes Lithium SA", "cat-battery-materials", Region::Latam, RiskLevel::Medium, 52, "improving", 18.3, &["Water-use permits under review"]),
        sup("Ferro Dynamics", "cat-metals", Region::Eu, RiskLevel::Low, 22, "stable", 64.0, &[]),
        sup("Titan Steelworks", "cat-metals", Region::Na, RiskLevel::Medium, 48, "deteriorating", 88.7, &["Tariff exposure", "Labor negotiations"]),
        sup("Pacific Alloys", "cat-metals", Region::Apac, RiskLevel::High, 71, "deteriorating", 27.9, &["Export license uncertainty"]),
        sup("Helix Semiconductors", "cat-electronics", Region::Apac, RiskLevel::Critical, 91, "deteriorating", 120.4, &["Capacity allocation", "Geopolitical concentration"]),
        sup("Quanta Components", "cat-electronics", Region::Na, RiskLevel::Low, 18, "improving", 45.2, &[]),
        sup("Circuitree", "cat-electronics", Region::Eu, RiskLevel::Medium, 50, "stable", 22.8, &["Single fab dependency"]),
        sup("AgriChem Partners", "cat-chemicals", Region::Na, RiskLevel::Low, 25, "stable", 36.1, &[]),
        sup("Rhine Chemie", "cat-chemicals", Region::Eu, RiskLevel::Medium, 46, "stable", 51.6, &["Feedstock volatility"]),
        sup("Meridian Polymers", "cat-packaging", Region::Mea, RiskLevel::Medium, 44, "improving", 15.0, &["Resin price pass-through"]),
        sup("BoxWorks Global", "cat-packaging", Region::Global, RiskLevel::Low, 20, "stable", 12.4, &[]),
        sup("TransArc Logistics", "cat-logistics", Region::Global, RiskLevel::High, 69, "deteriorating", 58.9, &["Red Sea rerouting", "Fuel surcharges"]),
        sup("Cobalt Ridge Mining", "cat-battery-materials", Region::Mea, RiskLevel::Critical, 88, "deteriorating", 24.7, &["Artisanal sourcing audit open", "Export quota risk"]),
    ]
}

fn builtin_categories() -> Vec<ManagedCategory> {
    let cat = |id: &str, name: &str, commodities: &[&str]| ManagedCategory {
        id: id.to_string(),
        name: name.to_string(),
        commodities: commodities.iter().map(|c| (*c).to_string()).collect(),
    };
    vec![
        cat("cat-battery-materials", "Battery Materials", &["lithium", "cobalt", "nickel", "graphite", "manganese"]),
        cat("cat-metals", "Metals & Mining", &["steel", "aluminum", "copper", "zinc", "iron ore", "rare earth"]),
        cat("cat-electronics", "Electronics & Semiconductors", &["semiconductor", "silicon", "pcb", "memory"]),
        cat("cat-chemicals", "Industrial Chemicals", &["ammonia", "methanol", "chlorine", "sulfuric acid"]),
        cat("cat-packaging", "Packaging", &["resin", "cardboard", "glass", "polyethylene"]),
        cat("cat-logistics", "Logistics & Freight", &["ocean freight", "air freight", "diesel", "trucking"]),
        cat("cat-energy", "Energy", &["natural gas", "electricity", "crude oil", "coal"]),
        cat("cat-agri", "Agricultural Inputs", &["wheat", "corn", "sugar", "palm oil", "soybean"]),
    ]
}
