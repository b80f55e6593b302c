use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::research::DeepResearchResponse;
use super::source::Source;
use super::suggestion::Suggestion;
use super::widget::Widget;

/// How a canonical response should render.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Widget,
    Table,
    Summary,
    Alert,
    Handoff,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

/// A headline takeaway attached to a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub sentiment: Sentiment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub factors: Vec<String>,
}

impl Insight {
    /// Coerce a bare string into the structured shape (neutral sentiment).
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            headline: text.into(),
            summary: None,
            sentiment: Sentiment::Neutral,
            factors: Vec::new(),
        }
    }
}

/// Pointer to an expanded side-panel view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: String,
    pub title: String,
    pub artifact_type: String,
}

/// Inline-vs-artifact rendering decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Escalation {
    pub show_inline: bool,
    pub expand_to_artifact: bool,
    pub result_count: u32,
    pub threshold: u32,
}

impl Default for Escalation {
    fn default() -> Self {
        Self {
            show_inline: true,
            expand_to_artifact: false,
            result_count: 0,
            threshold: 5,
        }
    }
}

/// Upsell-style follow-up hint keyed by intent and extracted entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ValueLadder {
    pub intent: String,
    pub hint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
}

/// Tier counts over the response's sources.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SourceMix {
    pub decision_grade: u32,
    pub verified_partner: u32,
    pub web: u32,
}

/// Handoff block for restricted intents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Handoff {
    pub reason: String,
    pub team: String,
}

/// Observability event kinds emitted during a chat turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneEvent {
    IntentClassified,
    ProviderSelected,
    DataRetrieved,
    SourcesFound,
    WidgetSelected,
    ResponseReady,
}

/// A timestamped progress event. `timestamp_ms` is milliseconds since the
/// request started.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub event: MilestoneEvent,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub timestamp_ms: u64,
}

/// Response sources partitioned by origin.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct GroupedSources {
    pub internal: Vec<Source>,
    pub web: Vec<Source>,
}

impl GroupedSources {
    pub fn is_empty(&self) -> bool {
        self.internal.is_empty() && self.web.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.internal.iter().chain(self.web.iter())
    }
}

/// The render-ready output every path converges on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub id: String,
    /// Markdown prose, possibly carrying `[B#]`/`[W#]` citation markers.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledgement: Option<String>,
    pub response_type: ResponseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<Insight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget: Option<Widget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
    pub sources: GroupedSources,
    /// Citation id → source, for every marker used in `content`.
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub citations: std::collections::BTreeMap<String, Source>,
    pub suggestions: Vec<Suggestion>,
    pub escalation: Escalation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_ladder: Option<ValueLadder>,
    pub source_mix: SourceMix,
    pub milestones: Vec<Milestone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff: Option<Handoff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_research: Option<DeepResearchResponse>,
    /// Wall-clock duration of the turn.
    pub duration_ms: u64,
}

impl ChatResponse {
    /// A minimal safe response used when validation cannot repair a payload.
    pub fn minimal(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            acknowledgement: None,
            response_type: ResponseType::Summary,
            insight: None,
            widget: None,
            artifact: None,
            sources: GroupedSources::default(),
            citations: std::collections::BTreeMap::new(),
            suggestions: Vec::new(),
            escalation: Escalation::default(),
            value_ladder: None,
            source_mix: SourceMix::default(),
            milestones: Vec::new(),
            handoff: None,
            deep_research: None,
            duration_ms: 0,
        }
    }
}
