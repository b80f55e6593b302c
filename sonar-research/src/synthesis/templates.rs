//! Report templates: the ordered section plan per study type.

use sonar_core::models::research::StudyType;

/// One planned report section.
pub struct SectionTemplate {
    pub id: &'static str,
    pub title: &'static str,
    /// What the section is for; goes into the synthesis prompt.
    pub purpose: &'static str,
    pub hints: &'static [&'static str],
    /// Citation floor. The validator flags the section when the actual
    /// count falls below half of this.
    pub min_citations: u32,
}

pub struct ReportTemplate {
    pub title_prefix: &'static str,
    pub sections: &'static [SectionTemplate],
}

pub const EXECUTIVE_SUMMARY_ID: &str = "executive-summary";

macro_rules! section {
    ($id:literal, $title:literal, $purpose:literal, $min:literal, [$($hint:literal),*]) => {
        SectionTemplate {
            id: $id,
            title: $title,
            purpose: $purpose,
            hints: &[$($hint),*],
            min_citations: $min,
        }
    };
}

static MARKET_ANALYSIS: &[SectionTemplate] = &[
    section!(
        "executive-summary",
        "Executive Summary",
        "Condense the whole report into the findings a category manager acts on.",
        0,
        ["lead with the decision-relevant conclusion", "quantify where possible"]
    ),
    section!(
        "market-overview",
        "Market Overview",
        "Size, growth, and demand drivers of the market in scope.",
        3,
        ["market size and growth rate", "demand segments", "regional split"]
    ),
    section!(
        "supply-landscape",
        "Supply Landscape",
        "Who supplies this market, with what capacity and concentration.",
        3,
        ["top producers and shares", "capacity additions", "concentration risk"]
    ),
    section!(
        "price-dynamics",
        "Price Dynamics",
        "Recent price history and the forces moving it.",
        2,
        ["price trend over the requested horizon", "cost drivers", "forward indicators"]
    ),
    section!(
        "outlook",
        "Outlook & Implications",
        "What the buyer should expect and do next.",
        2,
        ["12-24 month outlook", "negotiation windows", "actions"]
    ),
];

static SOURCING_STUDY: &[SectionTemplate] = &[
    section!(
        "executive-summary",
        "Executive Summary",
        "Condense the whole report into the findings a category manager acts on.",
        0,
        ["lead with the recommended shortlist"]
    ),
    section!(
        "requirements",
        "Requirements & Scope",
        "Restate the sourcing need: volumes, regions, constraints.",
        1,
        ["volume and specification", "regional constraints"]
    ),
    section!(
        "supplier-landscape",
        "Supplier Landscape",
        "Candidate suppliers with capacity, footprint, and track record.",
        3,
        ["candidate list", "capacity fit", "regional coverage"]
    ),
    section!(
        "evaluation",
        "Evaluation & Shortlist",
        "Score candidates against the award criteria.",
        2,
        ["scoring rationale", "shortlist with strengths and gaps"]
    ),
    section!(
        "negotiation-strategy",
        "Negotiation Strategy",
        "Leverage points and recommended commercial approach.",
        2,
        ["leverage and BATNA", "pricing mechanisms", "timeline"]
    ),
];

static COST_MODEL: &[SectionTemplate] = &[
    section!(
        "executive-summary",
        "Executive Summary",
        "Condense the whole report into the findings a category manager acts on.",
        0,
        ["lead with the should-cost headline"]
    ),
    section!(
        "cost-structure",
        "Cost Structure",
        "Break the product down into its cost components.",
        3,
        ["raw material share", "conversion cost", "logistics and overhead"]
    ),
    section!(
        "driver-analysis",
        "Cost Driver Analysis",
        "Which inputs move the total cost and by how much.",
        2,
        ["index-linked inputs", "sensitivity"]
    ),
    section!(
        "benchmark",
        "Should-Cost Benchmark",
        "Compare the modeled cost against paid prices.",
        2,
        ["gap to market price", "negotiation implications"]
    ),
];

static SUPPLIER_ASSESSMENT: &[SectionTemplate] = &[
    section!(
        "executive-summary",
        "Executive Summary",
        "Condense the whole report into the findings a category manager acts on.",
        0,
        ["lead with the overall assessment verdict"]
    ),
    section!(
        "company-profile",
        "Company Profile",
        "Who the supplier is: ownership, footprint, products.",
        2,
        ["ownership and history", "sites and capacity"]
    ),
    section!(
        "financial-health",
        "Financial Health",
        "Solvency, profitability, and trajectory.",
        2,
        ["revenue and margin trend", "leverage", "red flags"]
    ),
    section!(
        "operational-risk",
        "Operational & ESG Risk",
        "Delivery, quality, and sustainability exposure.",
        2,
        ["quality record", "esg ratings", "single-site dependencies"]
    ),
    section!(
        "recommendation",
        "Recommendation",
        "Whether and how to engage this supplier.",
        1,
        ["engage/monitor/avoid", "mitigations"]
    ),
];

static RISK_ASSESSMENT: &[SectionTemplate] = &[
    section!(
        "executive-summary",
        "Executive Summary",
        "Condense the whole report into the findings a category manager acts on.",
        0,
        ["lead with the top three risks"]
    ),
    section!(
        "risk-inventory",
        "Risk Inventory",
        "Enumerate the material risks across the scope.",
        3,
        ["supply, price, geopolitical, ESG", "probability and impact"]
    ),
    section!(
        "exposure",
        "Exposure Analysis",
        "Quantify spend and volume at risk.",
        2,
        ["spend at risk", "concentration", "single points of failure"]
    ),
    section!(
        "mitigation",
        "Mitigation Plan",
        "Actions that reduce the identified exposure.",
        2,
        ["dual sourcing", "contractual protections", "monitoring triggers"]
    ),
];

static CUSTOM: &[SectionTemplate] = &[
    section!(
        "executive-summary",
        "Executive Summary",
        "Condense the whole report into the findings a category manager acts on.",
        0,
        ["lead with the answer to the stated objective"]
    ),
    section!(
        "findings",
        "Findings",
        "Everything the research surfaced, organized by theme.",
        3,
        ["group by theme", "cite every claim"]
    ),
    section!(
        "analysis",
        "Analysis",
        "Interpret the findings against the stated objective.",
        2,
        ["implications", "confidence and gaps"]
    ),
    section!(
        "recommendations",
        "Recommendations",
        "Concrete next steps.",
        1,
        ["prioritized actions"]
    ),
];

/// Resolve the template for a study type.
pub fn report_template(study_type: StudyType) -> ReportTemplate {
    let (title_prefix, sections) = match study_type {
        StudyType::MarketAnalysis => ("Market Analysis", MARKET_ANALYSIS),
        StudyType::SourcingStudy => ("Sourcing Study", SOURCING_STUDY),
        StudyType::CostModel => ("Cost Model", COST_MODEL),
        StudyType::SupplierAssessment => ("Supplier Assessment", SUPPLIER_ASSESSMENT),
        StudyType::RiskAssessment => ("Risk Assessment", RISK_ASSESSMENT),
        StudyType::Custom => ("Research Study", CUSTOM),
    };
    ReportTemplate {
        title_prefix,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_opens_with_the_executive_summary() {
        for study in StudyType::ALL {
            let t = report_template(study);
            assert_eq!(t.sections[0].id, EXECUTIVE_SUMMARY_ID, "{study:?}");
            assert_eq!(t.sections[0].min_citations, 0);
            assert!(t.sections.len() >= 4);
        }
    }
}
