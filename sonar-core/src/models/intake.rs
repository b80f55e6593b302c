use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// How a clarifying question is answered in the UI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuestionInput {
    Select,
    Multiselect,
    CategoryPicker,
    FreeText,
}

/// One selectable option on a question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct QuestionOption {
    pub value: String,
    pub label: String,
}

impl QuestionOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// How confidently a slot was filled from context.
///
/// `High` means the query alone filled it; `Medium` means chat history did;
/// `Low` means it is unfilled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SlotConfidence {
    Low,
    Medium,
    High,
}

/// A clarifying question shown before a deep-research run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IntakeQuestion {
    /// Stable slot id. LLM refinement must not change this.
    pub id: String,
    pub prompt: String,
    pub input: QuestionInput,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    pub required: bool,
}

/// The intake payload returned to the caller before processing starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IntakePayload {
    pub questions: Vec<IntakeQuestion>,
    /// Prefilled slot id → answer value.
    pub prefilled: std::collections::BTreeMap<String, String>,
    pub can_skip: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    /// True when the LLM refinement pass was applied but had to be repaired.
    #[serde(default)]
    pub soft_repaired: bool,
}
