//! Data model for the orchestration core.

pub mod intake;
pub mod intent;
pub mod report;
pub mod research;
pub mod response;
pub mod source;
pub mod suggestion;
pub mod widget;

pub use intake::{IntakePayload, IntakeQuestion, QuestionInput, QuestionOption, SlotConfidence};
pub use intent::{ExtractedEntities, Intent, IntentCategory, Region, RiskLevel, Timeframe};
pub use report::{Citation, QualityMetrics, Report, ReportSection, TocEntry};
pub use research::{
    AgentStatus, CommandCenterProgress, DeepResearchError, DeepResearchResponse, JobPhase,
    PhaseStatus, ResearchAgent, Stage, StagePhase, StudyType, SynthesisProgress,
};
pub use response::{
    Artifact, ChatResponse, Escalation, GroupedSources, Handoff, Insight, Milestone,
    MilestoneEvent, ResponseType, Sentiment, SourceMix, ValueLadder,
};
pub use source::{CitationTier, Source, SourcePool, SourceType};
pub use suggestion::Suggestion;
pub use widget::{Widget, WidgetData};
