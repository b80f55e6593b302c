//! Fast LLM provider client: one structured chat call per turn.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sonar_core::errors::SonarResult;
use sonar_core::models::intent::Intent;
use sonar_core::traits::{ChatTurn, FastProvider, FastReply};
use tracing::debug;

use crate::client::ProviderClient;

const DEFAULT_ENDPOINT: &str = "https://api.sonar-fast.ai/v1/chat";
const TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct FastRequest<'a> {
    message: &'a str,
    history: &'a [ChatTurn],
    intent: &'a Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt_template: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct FastResponse {
    #[serde(flatten)]
    reply: FastReply,
}

/// HTTP client for the fast provider.
#[derive(Debug, Clone)]
pub struct FastClient {
    client: ProviderClient,
    endpoint: String,
}

impl FastClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: ProviderClient::new("fast", api_key, Duration::from_secs(TIMEOUT_SECS)),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl FastProvider for FastClient {
    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    async fn generate(
        &self,
        message: &str,
        history: &[ChatTurn],
        intent: &Intent,
        prompt_template: Option<&str>,
    ) -> SonarResult<FastReply> {
        let request = FastRequest {
            message,
            history,
            intent,
            prompt_template,
        };
        let response: FastResponse = self.client.post_json(&self.endpoint, &request).await?;
        debug!(sources = response.reply.sources.len(), "fast provider replied");
        Ok(response.reply)
    }
}
