//! Research path: one web-research provider call.

use sonar_core::models::response::MilestoneEvent;
use sonar_core::traits::providers::{ChatTurn, WebProvider};
use sonar_core::SonarResult;
use sonar_respond::Draft;

use crate::milestones::MilestoneBuffer;

pub async fn run(
    web: &dyn WebProvider,
    message: &str,
    history: &[ChatTurn],
    buffer: &mut MilestoneBuffer<'_>,
) -> SonarResult<Draft> {
    let reply = web.research(message, history).await?;
    buffer.record(MilestoneEvent::DataRetrieved, "web-provider");
    if !reply.sources.is_empty() {
        buffer.record_with_value(
            MilestoneEvent::SourcesFound,
            "web-provider",
            Some(reply.sources.len().to_string()),
        );
    }
    let mut draft = Draft::text(reply.content);
    draft.sources = reply.sources;
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sonar_core::errors::{ProviderError, SonarError};
    use sonar_core::models::source::{Source, SourceType};
    use sonar_core::traits::providers::WebReply;

    struct FailingWeb;

    #[async_trait]
    impl WebProvider for FailingWeb {
        fn is_configured(&self) -> bool {
            true
        }

        async fn research(&self, _query: &str, _history: &[ChatTurn]) -> SonarResult<WebReply> {
            Err(SonarError::Provider(ProviderError::Http {
                provider: "research".to_string(),
                status: 503,
            }))
        }
    }

    struct CannedWeb;

    #[async_trait]
    impl WebProvider for CannedWeb {
        fn is_configured(&self) -> bool {
            true
        }

        async fn research(&self, _query: &str, _history: &[ChatTurn]) -> SonarResult<WebReply> {
            Ok(WebReply {
                content: "Web findings.".to_string(),
                sources: vec![Source::new("Trade journal", SourceType::Web)],
                ..WebReply::default()
            })
        }
    }

    #[tokio::test]
    async fn reply_maps_onto_the_draft() {
        let mut buffer = MilestoneBuffer::new(None);
        let draft = run(&CannedWeb, "lithium outlook", &[], &mut buffer)
            .await
            .unwrap();
        assert_eq!(draft.content, "Web findings.");
        assert_eq!(draft.sources.len(), 1);
    }

    #[tokio::test]
    async fn provider_errors_propagate_for_downgrade() {
        let mut buffer = MilestoneBuffer::new(None);
        assert!(run(&FailingWeb, "lithium outlook", &[], &mut buffer)
            .await
            .is_err());
    }
}
