//! Optional LLM refinement of the deterministic question set.
//!
//! The model may reword prompts, improve help text, and reorder options.
//! Question ids are immutable: entries with unknown ids are ignored, and a
//! reply that drops a question leaves the original in place. Any failure
//! (timeout, provider error, unparseable output) surfaces as an error and
//! the caller keeps the deterministic payload.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::timeout;
use tracing::debug;

use sonar_core::constants::INTAKE_LLM_TIMEOUT_SECS;
use sonar_core::errors::{IntakeError, SonarError, SonarResult};
use sonar_core::models::intake::{IntakePayload, IntakeQuestion, QuestionOption};
use sonar_core::models::intent::Intent;
use sonar_core::traits::providers::FastProvider;
use sonar_providers::repair::parse_lenient;

const REFINE_TEMPLATE: &str = "You refine procurement intake questionnaires. Return a JSON \
     array of objects {\"id\", \"prompt\", \"help\", \"optionOrder\"}. Keep every id \
     unchanged. Do not invent new questions.";

/// One refined entry as the model returns it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefinedQuestion {
    id: String,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    help: Option<String>,
    /// Option values in the preferred display order.
    #[serde(default)]
    option_order: Vec<String>,
}

pub async fn refine_questions(
    provider: &dyn FastProvider,
    payload: &IntakePayload,
) -> SonarResult<IntakePayload> {
    let serialized = serde_json::to_string(&payload.questions)?;
    let message = format!("Refine these intake questions:\n{serialized}");

    let reply = timeout(
        Duration::from_secs(INTAKE_LLM_TIMEOUT_SECS),
        provider.generate(&message, &[], &Intent::general(), Some(REFINE_TEMPLATE)),
    )
    .await
    .map_err(|_| {
        SonarError::from(IntakeError::Refinement {
            reason: format!("timed out after {INTAKE_LLM_TIMEOUT_SECS}s"),
        })
    })??;

    let parsed = parse_lenient::<Vec<RefinedQuestion>>(&reply.content)?;
    let mut refined = payload.clone();
    refined.soft_repaired = parsed.repaired;
    for entry in parsed.value {
        let Some(question) = refined.questions.iter_mut().find(|q| q.id == entry.id) else {
            debug!(id = %entry.id, "refinement referenced an unknown question id");
            continue;
        };
        apply_entry(question, entry);
    }
    Ok(refined)
}

fn apply_entry(question: &mut IntakeQuestion, entry: RefinedQuestion) {
    if let Some(prompt) = entry.prompt {
        if !prompt.trim().is_empty() {
            question.prompt = prompt;
        }
    }
    if let Some(help) = entry.help {
        if !help.trim().is_empty() {
            question.help = Some(help);
        }
    }
    if !entry.option_order.is_empty() {
        reorder_options(&mut question.options, &entry.option_order);
    }
}

/// Reorder existing options by the given value order. Values the model did
/// not mention keep their relative order at the end; unknown values are
/// ignored, so the option set never changes.
fn reorder_options(options: &mut [QuestionOption], order: &[String]) {
    options.sort_by_key(|o| {
        order
            .iter()
            .position(|v| *v == o.value)
            .unwrap_or(usize::MAX)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sonar_core::models::intake::QuestionInput;
    use sonar_core::traits::providers::{ChatTurn, FastReply};

    struct CannedFast {
        content: String,
    }

    #[async_trait]
    impl FastProvider for CannedFast {
        fn is_configured(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            _message: &str,
            _history: &[ChatTurn],
            _intent: &Intent,
            _prompt_template: Option<&str>,
        ) -> SonarResult<FastReply> {
            Ok(FastReply {
                content: self.content.clone(),
                ..FastReply::default()
            })
        }
    }

    fn payload() -> IntakePayload {
        IntakePayload {
            questions: vec![IntakeQuestion {
                id: "region".to_string(),
                prompt: "Which regions are in scope?".to_string(),
                input: QuestionInput::Multiselect,
                options: vec![
                    QuestionOption::new("na", "North America"),
                    QuestionOption::new("eu", "Europe"),
                ],
                default: None,
                help: None,
                required: true,
            }],
            prefilled: Default::default(),
            can_skip: false,
            guidance: None,
            soft_repaired: false,
        }
    }

    #[tokio::test]
    async fn refinement_rewords_but_keeps_ids() {
        let provider = CannedFast {
            content: r#"[{"id": "region", "prompt": "Which markets matter most?", "optionOrder": ["eu", "na"]}]"#
                .to_string(),
        };
        let refined = refine_questions(&provider, &payload()).await.unwrap();
        let q = &refined.questions[0];
        assert_eq!(q.id, "region");
        assert_eq!(q.prompt, "Which markets matter most?");
        assert_eq!(q.options[0].value, "eu");
        assert!(!refined.soft_repaired);
    }

    #[tokio::test]
    async fn fenced_reply_sets_soft_repaired() {
        let provider = CannedFast {
            content: "```json\n[{\"id\": \"region\", \"help\": \"Pick all that apply\",}]\n```"
                .to_string(),
        };
        let refined = refine_questions(&provider, &payload()).await.unwrap();
        assert!(refined.soft_repaired);
        assert_eq!(
            refined.questions[0].help.as_deref(),
            Some("Pick all that apply")
        );
    }

    #[tokio::test]
    async fn unknown_ids_are_ignored() {
        let provider = CannedFast {
            content: r#"[{"id": "made-up", "prompt": "Injected"}]"#.to_string(),
        };
        let original = payload();
        let refined = refine_questions(&provider, &original).await.unwrap();
        assert_eq!(refined.questions, original.questions);
    }

    #[tokio::test]
    async fn garbage_reply_is_an_error() {
        let provider = CannedFast {
            content: "no json here at all".to_string(),
        };
        assert!(refine_questions(&provider, &payload()).await.is_err());
    }
}
