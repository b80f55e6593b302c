//! Internal-intelligence endpoint client: curated procurement corpus
//! lookups for the hybrid and deep-research paths.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sonar_core::errors::SonarResult;
use sonar_core::models::research::StudyType;
use sonar_core::models::source::{Source, SourceType};
use sonar_core::traits::{IntelProvider, IntelReply};

use crate::client::ProviderClient;

const TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct IntelRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    study_type: Option<StudyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer_context: Option<&'a serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct WireSource {
    name: String,
    #[serde(rename = "type", default)]
    source_type: Option<SourceType>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IntelResponse {
    content: String,
    #[serde(default)]
    sources: Vec<WireSource>,
}

/// Client for the internal-intelligence endpoint. Configured via an
/// endpoint URL rather than an API key; requests authenticate with the
/// deployment's service token if one is present.
#[derive(Debug, Clone)]
pub struct IntelClient {
    client: ProviderClient,
    endpoint: Option<String>,
}

impl IntelClient {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            // The endpoint doubles as the configuration marker.
            client: ProviderClient::new(
                "intel",
                endpoint.clone(),
                Duration::from_secs(TIMEOUT_SECS),
            ),
            endpoint,
        }
    }
}

#[async_trait]
impl IntelProvider for IntelClient {
    fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn fetch(
        &self,
        query: &str,
        study_type: Option<StudyType>,
        answer_context: Option<&serde_json::Value>,
    ) -> SonarResult<IntelReply> {
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            sonar_core::errors::ProviderError::NotConfigured {
                provider: "intel".to_string(),
            }
        })?;
        let request = IntelRequest {
            query,
            study_type,
            answer_context,
        };
        let response: IntelResponse = self.client.post_json(endpoint, &request).await?;
        Ok(IntelReply {
            content: response.content,
            sources: response
                .sources
                .into_iter()
                .map(|s| Source {
                    name: s.name,
                    url: s.url,
                    source_type: s.source_type.unwrap_or(SourceType::InternalIntelligence),
                    snippet: s.snippet,
                    citation_id: None,
                })
                .collect(),
        })
    }
}
