use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::constants::IDENTITY_SNIPPET_PREFIX_LEN;

/// Provenance tier of a piece of evidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    InternalIntelligence,
    FinancialPartner,
    SustainabilityPartner,
    SupplierData,
    Web,
    News,
}

/// Which citation-id partition a source belongs to: `B#` for internal-tier
/// sources, `W#` for the open web.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationTier {
    Internal,
    Web,
}

impl CitationTier {
    pub fn prefix(self) -> char {
        match self {
            CitationTier::Internal => 'B',
            CitationTier::Web => 'W',
        }
    }
}

impl SourceType {
    /// Internal-tier types cite as `B#`; web and news cite as `W#`.
    pub fn citation_tier(self) -> CitationTier {
        match self {
            SourceType::InternalIntelligence
            | SourceType::FinancialPartner
            | SourceType::SustainabilityPartner
            | SourceType::SupplierData => CitationTier::Internal,
            SourceType::Web | SourceType::News => CitationTier::Web,
        }
    }
}

/// A record attesting to a piece of evidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub name: String,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub snippet: Option<String>,
    /// Assigned during synthesis; `None` until then.
    pub citation_id: Option<String>,
}

impl Source {
    pub fn new(name: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            name: name.into(),
            url: None,
            source_type,
            snippet: None,
            citation_id: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Identity key for deduplication: the normalized URL when present,
    /// otherwise a blake3 hash of lowercased name + snippet prefix.
    ///
    /// Known false positive: two distinct no-URL sources that share a name
    /// and an opening sentence merge into one.
    pub fn identity_key(&self) -> String {
        if let Some(url) = &self.url {
            let normalized = normalize_url(url);
            if !normalized.is_empty() {
                return normalized;
            }
        }
        let name = self.name.trim().to_lowercase();
        let snippet_prefix: String = self
            .snippet
            .as_deref()
            .unwrap_or("")
            .chars()
            .take(IDENTITY_SNIPPET_PREFIX_LEN)
            .collect::<String>()
            .to_lowercase();
        let composite = format!("{name}\u{1f}{snippet_prefix}");
        blake3::hash(composite.as_bytes()).to_hex().to_string()
    }
}

/// Lowercase, strip scheme and trailing slash so `https://X/` == `http://x`.
fn normalize_url(url: &str) -> String {
    let mut u = url.trim().to_lowercase();
    for scheme in ["https://", "http://"] {
        if let Some(rest) = u.strip_prefix(scheme) {
            u = rest.to_string();
            break;
        }
    }
    u.trim_end_matches('/').to_string()
}

/// The per-job deduplicated source pool. Insertion order is preserved;
/// later duplicates are dropped, so adding A then B yields the same set as
/// B then A.
#[derive(Debug, Default, Clone)]
pub struct SourcePool {
    seen: HashSet<String>,
    sources: Vec<Source>,
}

impl SourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source unless its identity key is already present.
    /// Returns true if the source was new.
    pub fn add_if_unique(&mut self, source: Source) -> bool {
        if self.seen.insert(source.identity_key()) {
            self.sources.push(source);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn contains(&self, source: &Source) -> bool {
        self.seen.contains(&source.identity_key())
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn into_sources(self) -> Vec<Source> {
        self.sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_identity_ignores_scheme_and_trailing_slash() {
        let a = Source::new("A", SourceType::Web).with_url("https://example.com/report/");
        let b = Source::new("B", SourceType::Web).with_url("http://EXAMPLE.com/report");
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn composite_identity_uses_snippet_prefix() {
        let long = "x".repeat(200);
        let a = Source::new("Acme", SourceType::News).with_snippet(long.clone());
        let b = Source::new("acme", SourceType::News).with_snippet(long);
        assert_eq!(a.identity_key(), b.identity_key());

        let c = Source::new("Acme", SourceType::News).with_snippet("different opening");
        assert_ne!(a.identity_key(), c.identity_key());
    }

    #[test]
    fn pool_drops_duplicates_and_keeps_order() {
        let mut pool = SourcePool::new();
        let a = Source::new("A", SourceType::Web).with_url("https://a.com");
        let b = Source::new("B", SourceType::Web).with_url("https://b.com");
        assert!(pool.add_if_unique(a.clone()));
        assert!(pool.add_if_unique(b));
        assert!(!pool.add_if_unique(a));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.sources()[0].name, "A");
    }
}
