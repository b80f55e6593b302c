//! Mock providers with canned replies, shared by integration tests across
//! the workspace. Every mock counts its calls so tests can assert that a
//! path did (or did not) reach a provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use sonar_core::errors::{ProviderError, SonarError};
use sonar_core::models::intent::Intent;
use sonar_core::models::research::StudyType;
use sonar_core::models::source::{Source, SourceType};
use sonar_core::traits::providers::{
    ChatTurn, FastProvider, FastReply, IntelProvider, IntelReply, ReasoningProvider,
    ReasoningReply, WebProvider, WebReply,
};
use sonar_core::SonarResult;

/// Long enough that any sane test timeout fires first.
const STALL: Duration = Duration::from_secs(3600);

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([BW]\d+)\]").unwrap());

fn unavailable(provider: &str) -> SonarError {
    SonarError::Provider(ProviderError::Http {
        provider: provider.to_string(),
        status: 503,
    })
}

/// `n` internal-tier sources with distinct URLs.
pub fn internal_sources(n: usize) -> Vec<Source> {
    (1..=n)
        .map(|i| {
            Source::new(format!("Intel brief {i}"), SourceType::InternalIntelligence)
                .with_url(format!("https://intel.internal/brief/{i}"))
                .with_snippet(format!("Internal finding {i} on the category under review."))
        })
        .collect()
}

/// `n` web-tier sources with distinct URLs.
pub fn web_sources(n: usize) -> Vec<Source> {
    (1..=n)
        .map(|i| {
            Source::new(format!("Trade article {i}"), SourceType::Web)
                .with_url(format!("https://example.com/article/{i}"))
                .with_snippet(format!("Reported market development number {i}."))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Reply,
    Fail,
    Stall,
}

// ---------------------------------------------------------------------------
// Fast provider

pub struct MockFast {
    reply: FastReply,
    behavior: Behavior,
    configured: bool,
    calls: AtomicUsize,
}

impl MockFast {
    pub fn replying(reply: FastReply) -> Self {
        Self {
            reply,
            behavior: Behavior::Reply,
            configured: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            behavior: Behavior::Fail,
            ..Self::replying(FastReply::default())
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::replying(FastReply::default())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FastProvider for MockFast {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(
        &self,
        _message: &str,
        _history: &[ChatTurn],
        _intent: &Intent,
        _prompt_template: Option<&str>,
    ) -> SonarResult<FastReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Reply => Ok(self.reply.clone()),
            Behavior::Fail => Err(unavailable("fast")),
            Behavior::Stall => {
                tokio::time::sleep(STALL).await;
                Ok(self.reply.clone())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Web provider

pub struct MockWeb {
    reply: WebReply,
    behavior: Behavior,
    configured: bool,
    calls: AtomicUsize,
}

impl MockWeb {
    pub fn replying(reply: WebReply) -> Self {
        Self {
            reply,
            behavior: Behavior::Reply,
            configured: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// A web provider returning `n` distinct sources and short findings.
    pub fn with_sources(n: usize) -> Self {
        Self::replying(WebReply {
            content: "External coverage points to tightening supply.".to_string(),
            sources: web_sources(n),
            ..WebReply::default()
        })
    }

    pub fn failing() -> Self {
        Self {
            behavior: Behavior::Fail,
            ..Self::replying(WebReply::default())
        }
    }

    /// Never completes; used to exercise timeout races.
    pub fn stalled() -> Self {
        Self {
            behavior: Behavior::Stall,
            ..Self::replying(WebReply::default())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebProvider for MockWeb {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn research(&self, _query: &str, _history: &[ChatTurn]) -> SonarResult<WebReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Reply => Ok(self.reply.clone()),
            Behavior::Fail => Err(unavailable("research")),
            Behavior::Stall => {
                tokio::time::sleep(STALL).await;
                Ok(self.reply.clone())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Reasoning provider

enum ReasoningMode {
    /// Echo a paragraph citing the ids found in the prompt's source legend.
    Citing,
    /// Always return the same text, markers or not.
    Canned(String),
    Fail,
    Stall,
}

pub struct MockReasoning {
    mode: ReasoningMode,
    configured: bool,
    calls: AtomicUsize,
}

impl MockReasoning {
    /// Cites up to four of the `[B#]`/`[W#]` ids present in the prompt, so
    /// synthesized sections always validate against the citation map.
    pub fn citing() -> Self {
        Self {
            mode: ReasoningMode::Citing,
            configured: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn canned(content: impl Into<String>) -> Self {
        Self {
            mode: ReasoningMode::Canned(content.into()),
            configured: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Substantial prose with no citation markers at all.
    pub fn uncited() -> Self {
        Self::canned(
            "The category outlook remains broadly stable across the reviewed horizon, \
             with supply and demand largely balanced and no structural break expected.",
        )
    }

    pub fn failing() -> Self {
        Self {
            mode: ReasoningMode::Fail,
            configured: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn stalled() -> Self {
        Self {
            mode: ReasoningMode::Stall,
            configured: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReasoningProvider for MockReasoning {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(&self, messages: &[ChatTurn]) -> SonarResult<ReasoningReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            ReasoningMode::Citing => {
                let prompt: String = messages
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                let mut ids: Vec<String> = Vec::new();
                for capture in MARKER_RE.captures_iter(&prompt) {
                    let id = capture[1].to_string();
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                let markers: String = ids
                    .iter()
                    .take(4)
                    .map(|id| format!(" [{id}]"))
                    .collect();
                let content = format!(
                    "The evidence shows sustained demand growth against a constrained \
                     supply base, keeping prices elevated through the period.{markers}"
                );
                Ok(ReasoningReply {
                    content,
                    ..ReasoningReply::default()
                })
            }
            ReasoningMode::Canned(content) => Ok(ReasoningReply {
                content: content.clone(),
                ..ReasoningReply::default()
            }),
            ReasoningMode::Fail => Err(unavailable("reasoning")),
            ReasoningMode::Stall => {
                tokio::time::sleep(STALL).await;
                Ok(ReasoningReply::default())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Internal-intelligence provider

pub struct MockIntel {
    reply: IntelReply,
    behavior: Behavior,
    configured: bool,
    calls: AtomicUsize,
}

impl MockIntel {
    pub fn replying(reply: IntelReply) -> Self {
        Self {
            reply,
            behavior: Behavior::Reply,
            configured: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// An intel endpoint returning `n` internal sources and short findings.
    pub fn with_sources(n: usize) -> Self {
        Self::replying(IntelReply {
            content: "Internal data shows concentrated exposure in this category.".to_string(),
            sources: internal_sources(n),
        })
    }

    pub fn failing() -> Self {
        Self {
            behavior: Behavior::Fail,
            ..Self::replying(IntelReply::default())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntelProvider for MockIntel {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn fetch(
        &self,
        _query: &str,
        _study_type: Option<StudyType>,
        _answer_context: Option<&serde_json::Value>,
    ) -> SonarResult<IntelReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Reply => Ok(self.reply.clone()),
            Behavior::Fail => Err(unavailable("intel")),
            Behavior::Stall => {
                tokio::time::sleep(STALL).await;
                Ok(self.reply.clone())
            }
        }
    }
}
