use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::intent::IntentCategory;

/// A follow-up suggestion shown under a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Id of the rule that produced it (`default` for the fixed fallbacks).
    pub rule_id: String,
    pub text: String,
    /// The intent a click on this suggestion should route to, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_intent: Option<IntentCategory>,
}

impl Suggestion {
    pub fn new(rule_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            text: text.into(),
            target_intent: None,
        }
    }

    pub fn targeting(mut self, intent: IntentCategory) -> Self {
        self.target_intent = Some(intent);
        self
    }
}
