//! Reasoning LLM provider client, used for synthesis. Chat-style messages,
//! 120 s per-call timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use sonar_core::constants::SYNTHESIS_TIMEOUT_SECS;
use sonar_core::errors::SonarResult;
use sonar_core::traits::{ChatTurn, ReasoningProvider, ReasoningReply};

use crate::client::ProviderClient;

const DEFAULT_ENDPOINT: &str = "https://api.sonar-reasoning.ai/v1/complete";

#[derive(Debug, Serialize)]
struct ReasoningRequest<'a> {
    messages: &'a [ChatTurn],
    stream: bool,
}

/// HTTP client for the reasoning provider.
#[derive(Debug, Clone)]
pub struct ReasoningClient {
    client: ProviderClient,
    endpoint: String,
}

impl ReasoningClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: ProviderClient::new(
                "reasoning",
                api_key,
                Duration::from_secs(SYNTHESIS_TIMEOUT_SECS),
            ),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl ReasoningProvider for ReasoningClient {
    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    async fn complete(&self, messages: &[ChatTurn]) -> SonarResult<ReasoningReply> {
        let request = ReasoningRequest {
            messages,
            stream: false,
        };
        self.client.post_json(&self.endpoint, &request).await
    }
}
