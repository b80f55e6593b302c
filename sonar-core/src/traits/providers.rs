//! Provider contracts. The orchestrator and research pipeline only ever see
//! these traits; HTTP clients and test mocks both implement them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::SonarResult;
use crate::models::intent::Intent;
use crate::models::research::StudyType;
use crate::models::response::{Artifact, Insight};
use crate::models::source::Source;
use crate::models::widget::Widget;

/// Role of one conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One turn of conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }
}

/// Insight as returned by the fast provider: either a bare headline string
/// or the structured shape. Coerced during response normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InsightReply {
    Text(String),
    Structured(Insight),
}

impl InsightReply {
    pub fn into_insight(self) -> Insight {
        match self {
            InsightReply::Text(text) => Insight::from_text(text),
            InsightReply::Structured(insight) => insight,
        }
    }
}

/// Structured reply from the fast LLM provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FastReply {
    pub content: String,
    pub widget: Option<Widget>,
    pub insight: Option<InsightReply>,
    pub suggestions: Vec<String>,
    pub sources: Vec<Source>,
    pub artifact: Option<Artifact>,
}

/// Reply from the research/web-search provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WebReply {
    pub content: String,
    pub sources: Vec<Source>,
    pub suggestions: Vec<String>,
    pub artifact: Option<Artifact>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Reply from the reasoning (synthesis) provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReasoningReply {
    pub content: String,
    pub reasoning: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// Reply from the internal-intelligence endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IntelReply {
    pub content: String,
    pub sources: Vec<Source>,
}

/// Fast LLM provider: single-call structured chat replies.
#[async_trait]
pub trait FastProvider: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn generate(
        &self,
        message: &str,
        history: &[ChatTurn],
        intent: &Intent,
        prompt_template: Option<&str>,
    ) -> SonarResult<FastReply>;
}

/// Research LLM provider with web search.
#[async_trait]
pub trait WebProvider: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn research(&self, query: &str, history: &[ChatTurn]) -> SonarResult<WebReply>;
}

/// Reasoning LLM provider used for synthesis. 120 s per-call timeout.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn complete(&self, messages: &[ChatTurn]) -> SonarResult<ReasoningReply>;
}

/// Internal-intelligence endpoint over the curated procurement corpus.
#[async_trait]
pub trait IntelProvider: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn fetch(
        &self,
        query: &str,
        study_type: Option<StudyType>,
        answer_context: Option<&serde_json::Value>,
    ) -> SonarResult<IntelReply>;
}
