use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::intake::IntakePayload;
use super::report::Report;
use super::source::Source;
use crate::constants;

/// Deep-research presets. Each selects a report template, a credit cost,
/// and a default slot set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum StudyType {
    MarketAnalysis,
    SourcingStudy,
    CostModel,
    SupplierAssessment,
    RiskAssessment,
    Custom,
}

impl StudyType {
    pub fn credit_cost(self) -> u32 {
        match self {
            StudyType::MarketAnalysis => constants::CREDITS_MARKET_ANALYSIS,
            StudyType::SourcingStudy => constants::CREDITS_SOURCING_STUDY,
            StudyType::CostModel => constants::CREDITS_COST_MODEL,
            StudyType::SupplierAssessment => constants::CREDITS_SUPPLIER_ASSESSMENT,
            StudyType::RiskAssessment => constants::CREDITS_RISK_ASSESSMENT,
            StudyType::Custom => constants::CREDITS_CUSTOM,
        }
    }

    /// Kebab-case wire name, identical to the serde encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            StudyType::MarketAnalysis => "market-analysis",
            StudyType::SourcingStudy => "sourcing-study",
            StudyType::CostModel => "cost-model",
            StudyType::SupplierAssessment => "supplier-assessment",
            StudyType::RiskAssessment => "risk-assessment",
            StudyType::Custom => "custom",
        }
    }

    pub const ALL: [StudyType; 6] = [
        StudyType::MarketAnalysis,
        StudyType::SourcingStudy,
        StudyType::CostModel,
        StudyType::SupplierAssessment,
        StudyType::RiskAssessment,
        StudyType::Custom,
    ];
}

/// Lifecycle phase of a deep-research job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Intake,
    Processing,
    Complete,
    Error,
}

/// Ordered pipeline stages. Transitions are monotonic; a job never moves
/// to a lower-indexed stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Plan,
    Research,
    Synthesis,
    Delivery,
    Complete,
}

impl Stage {
    /// Position in the stage order.
    pub fn index(self) -> usize {
        match self {
            Stage::Plan => 0,
            Stage::Research => 1,
            Stage::Synthesis => 2,
            Stage::Delivery => 3,
            Stage::Complete => 4,
        }
    }

    /// The ordered phase ids for this stage.
    pub fn phase_ids(self) -> &'static [&'static str] {
        match self {
            Stage::Plan => &["decomposition", "deduplication", "assignment"],
            Stage::Research => &["internal", "web", "consolidation"],
            Stage::Synthesis => &["template", "writing", "quality", "visuals"],
            Stage::Delivery => &["assembly", "presentation", "export"],
            Stage::Complete => &[],
        }
    }

    pub const ORDER: [Stage; 5] = [
        Stage::Plan,
        Stage::Research,
        Stage::Synthesis,
        Stage::Delivery,
        Stage::Complete,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Pending,
    Active,
    Complete,
}

/// One phase record inside the current stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct StagePhase {
    pub id: String,
    pub status: PhaseStatus,
}

/// Status of a single fan-out research agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Queued,
    Researching,
    Complete,
    Error,
}

/// A single fan-out research task within a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ResearchAgent {
    pub id: String,
    pub name: String,
    pub query: String,
    pub category: String,
    pub status: AgentStatus,
    /// Raw count of sources the provider returned.
    pub sources_found: u32,
    /// Sources that were new to the job-wide dedup pool.
    pub unique_sources_found: u32,
    pub sources: Vec<Source>,
    pub insights: Vec<String>,
    /// The agent's own synthesized text, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResearchAgent {
    pub fn queued(
        id: impl Into<String>,
        name: impl Into<String>,
        query: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            query: query.into(),
            category: category.into(),
            status: AgentStatus::Queued,
            sources_found: 0,
            unique_sources_found: 0,
            sources: Vec::new(),
            insights: Vec::new(),
            findings: None,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }
}

/// Section-level synthesis progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisProgress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_section: Option<String>,
    pub sections_complete: u32,
    pub total_sections: u32,
}

/// Aggregated deep-research state streamed to the operator view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CommandCenterProgress {
    pub stage: Stage,
    /// Ordered phase records for the current stage.
    pub phases: Vec<StagePhase>,
    pub completed_stages: Vec<Stage>,
    pub agents: Vec<ResearchAgent>,
    /// Bounded stream of extracted insight snippets, oldest evicted.
    pub insight_stream: Vec<String>,
    pub tags: Vec<String>,
    /// Size of the job-wide dedup set.
    pub total_sources: u32,
    pub total_sources_raw: u32,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<SynthesisProgress>,
}

impl CommandCenterProgress {
    pub fn at_stage(stage: Stage) -> Self {
        Self {
            stage,
            phases: stage
                .phase_ids()
                .iter()
                .map(|id| StagePhase {
                    id: (*id).to_string(),
                    status: PhaseStatus::Pending,
                })
                .collect(),
            completed_stages: Vec::new(),
            agents: Vec::new(),
            insight_stream: Vec::new(),
            tags: Vec::new(),
            total_sources: 0,
            total_sources_raw: 0,
            elapsed_ms: 0,
            synthesis: None,
        }
    }
}

/// Structured terminal error for a deep-research job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeepResearchError {
    pub code: String,
    pub message: String,
    pub can_retry: bool,
}

/// The deep-research payload carried on a canonical response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeepResearchResponse {
    pub job_id: String,
    /// The resolved query (after meta-query resolution).
    pub query: String,
    pub study_type: StudyType,
    pub phase: JobPhase,
    pub credits_required: u32,
    pub credits_available: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intake: Option<IntakePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<CommandCenterProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DeepResearchError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_is_monotonic() {
        let indices: Vec<usize> = Stage::ORDER.iter().map(|s| s.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn credit_costs_match_the_table() {
        assert_eq!(StudyType::MarketAnalysis.credit_cost(), 500);
        assert_eq!(StudyType::CostModel.credit_cost(), 600);
        assert_eq!(StudyType::SourcingStudy.credit_cost(), 750);
        assert_eq!(StudyType::SupplierAssessment.credit_cost(), 400);
        assert_eq!(StudyType::RiskAssessment.credit_cost(), 450);
        assert_eq!(StudyType::Custom.credit_cost(), 500);
    }
}
