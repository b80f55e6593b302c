//! Shared HTTP plumbing for the provider clients.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sonar_core::errors::{ProviderError, SonarResult};
use tracing::warn;

/// A thin wrapper over `reqwest::Client` with bearer auth and a fixed
/// per-call timeout. One instance per provider.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    name: &'static str,
    http: reqwest::Client,
    api_key: Option<String>,
    timeout: Duration,
}

impl ProviderClient {
    pub fn new(name: &'static str, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            name,
            http: reqwest::Client::new(),
            api_key,
            timeout,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// POST a JSON body and decode a JSON reply. Timeouts and transport
    /// failures map onto `ProviderError`; callers downgrade, never panic.
    pub async fn post_json<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: &str,
        body: &Req,
    ) -> SonarResult<Resp> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured {
                provider: self.name.to_string(),
            }
        })?;

        let response = self
            .http
            .post(url)
            .bearer_auth(key)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(provider = self.name, status = status.as_u16(), "provider returned non-2xx");
            return Err(ProviderError::Http {
                provider: self.name.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| {
                ProviderError::MalformedOutput {
                    reason: e.to_string(),
                }
                .into()
            })
    }

    fn classify_error(&self, e: reqwest::Error) -> sonar_core::errors::SonarError {
        if e.is_timeout() {
            ProviderError::Timeout {
                provider: self.name.to_string(),
                secs: self.timeout.as_secs(),
            }
            .into()
        } else {
            ProviderError::Network {
                provider: self.name.to_string(),
                reason: e.to_string(),
            }
            .into()
        }
    }
}
