//! Research LLM provider client with web search.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sonar_core::errors::SonarResult;
use sonar_core::models::source::{Source, SourceType};
use sonar_core::traits::{ChatTurn, WebProvider, WebReply};
use tracing::debug;

use crate::client::ProviderClient;

const DEFAULT_ENDPOINT: &str = "https://api.sonar-research.ai/v1/search";
const TIMEOUT_SECS: u64 = 45;

#[derive(Debug, Serialize)]
struct WebRequest<'a> {
    query: &'a str,
    history: &'a [ChatTurn],
}

#[derive(Debug, Deserialize)]
struct WireSource {
    name: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebResponse {
    content: String,
    #[serde(default)]
    sources: Vec<WireSource>,
    #[serde(default)]
    suggestions: Vec<String>,
    #[serde(default)]
    artifact: Option<sonar_core::models::response::Artifact>,
}

/// HTTP client for the research provider. Web results carry the `Web`
/// source type; the citation partition is derived from it downstream.
#[derive(Debug, Clone)]
pub struct WebClient {
    client: ProviderClient,
    endpoint: String,
}

impl WebClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: ProviderClient::new("research", api_key, Duration::from_secs(TIMEOUT_SECS)),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl WebProvider for WebClient {
    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    async fn research(&self, query: &str, history: &[ChatTurn]) -> SonarResult<WebReply> {
        let request = WebRequest { query, history };
        let response: WebResponse = self.client.post_json(&self.endpoint, &request).await?;
        let sources = response
            .sources
            .into_iter()
            .map(|s| Source {
                name: s.name,
                url: s.url,
                source_type: SourceType::Web,
                snippet: s.snippet,
                citation_id: None,
            })
            .collect::<Vec<_>>();
        debug!(sources = sources.len(), "research provider replied");
        Ok(WebReply {
            content: response.content,
            sources,
            suggestions: response.suggestions,
            artifact: response.artifact,
        })
    }
}
