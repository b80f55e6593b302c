//! Hybrid path: parallel internal + web fetch, merged sources with dense
//! `B#`/`W#` citation ids, and cited synthesis over both findings.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use sonar_core::citations;
use sonar_core::models::intent::Intent;
use sonar_core::models::response::{Insight, MilestoneEvent, Sentiment};
use sonar_core::models::source::{CitationTier, Source, SourcePool, SourceType};
use sonar_core::traits::providers::{ChatTurn, IntelProvider, ReasoningProvider, WebProvider};
use sonar_core::SonarResult;
use sonar_research::synthesis::assign_citation_ids;
use sonar_respond::Draft;

use crate::milestones::MilestoneBuffer;

/// An absent web result must not fail the turn, so the web side runs under
/// its own short budget.
const WEB_TIMEOUT_SECS: u64 = 20;

pub async fn run(
    intel: &dyn IntelProvider,
    web: &dyn WebProvider,
    reasoning: Option<&dyn ReasoningProvider>,
    message: &str,
    history: &[ChatTurn],
    intent: &Intent,
    buffer: &mut MilestoneBuffer<'_>,
) -> SonarResult<Draft> {
    let (intel_result, web_result) = tokio::join!(
        intel.fetch(message, None, None),
        timeout(
            Duration::from_secs(WEB_TIMEOUT_SECS),
            web.research(message, history)
        ),
    );

    let intel_reply = intel_result?;
    let web_reply = match web_result {
        Ok(Ok(reply)) => Some(reply),
        Ok(Err(err)) => {
            warn!(%err, "web side of the hybrid fetch failed; continuing on internal data");
            None
        }
        Err(_) => {
            warn!(secs = WEB_TIMEOUT_SECS, "web side of the hybrid fetch timed out");
            None
        }
    };
    buffer.record(MilestoneEvent::DataRetrieved, "hybrid-providers");

    let mut pool = SourcePool::new();
    for source in intel_reply.sources.iter().cloned().map(tag_internal) {
        pool.add_if_unique(source);
    }
    if let Some(reply) = &web_reply {
        for source in reply.sources.iter().cloned() {
            pool.add_if_unique(source);
        }
    }
    if !pool.is_empty() {
        buffer.record_with_value(
            MilestoneEvent::SourcesFound,
            "hybrid-providers",
            Some(pool.len().to_string()),
        );
    }

    let (sources, citation_map) = assign_citation_ids(&pool);
    let web_findings = web_reply.as_ref().map(|r| r.content.as_str()).unwrap_or("");
    let content = match reasoning {
        Some(provider) if provider.is_configured() => {
            match synthesize(provider, message, &intel_reply.content, web_findings, &citation_map)
                .await
            {
                Ok(content) => content,
                Err(err) => {
                    warn!(%err, "hybrid synthesis failed; composing deterministically");
                    compose(&intel_reply.content, web_findings, &citation_map)
                }
            }
        }
        _ => compose(&intel_reply.content, web_findings, &citation_map),
    };

    // Markers the provider invented have no backing source and are dropped
    // before the claim counts are taken.
    let content = citations::strip_markers(&content, |id| citation_map.contains_key(id));
    let (internal_claims, web_claims) = claim_counts(&content);
    debug!(internal_claims, web_claims, sources = sources.len(), "hybrid synthesis done");

    let mut draft = Draft::text(content);
    draft.insight = Some(hybrid_insight(intent, internal_claims, web_claims));
    draft.sources = sources;
    draft.citations = citation_map;
    Ok(draft)
}

/// The internal endpoint occasionally labels its evidence as plain web
/// material; everything it returns belongs to the internal tier.
fn tag_internal(mut source: Source) -> Source {
    if source.source_type.citation_tier() == CitationTier::Web {
        source.source_type = SourceType::InternalIntelligence;
    }
    source
}

async fn synthesize(
    provider: &dyn ReasoningProvider,
    message: &str,
    internal_findings: &str,
    web_findings: &str,
    citation_map: &BTreeMap<String, Source>,
) -> SonarResult<String> {
    let legend: Vec<String> = citation_map
        .iter()
        .map(|(id, source)| format!("[{id}] {}", source.name))
        .collect();
    let system = format!(
        "You are a procurement analyst. Answer the question from the findings \
         below. Cite every claim with the bracketed ids from this legend, \
         exactly as written. Do not invent ids.\n\nSources:\n{}",
        legend.join("\n"),
    );
    let user = format!(
        "Question: {message}\n\nInternal findings:\n{internal_findings}\n\n\
         Web findings:\n{web_findings}",
    );
    let reply = provider
        .complete(&[ChatTurn::system(system), ChatTurn::user(user)])
        .await?;
    Ok(reply.content)
}

/// Deterministic composition used when no reasoning provider is available.
/// Every marker it writes comes from the citation map, so the result always
/// validates.
fn compose(
    internal_findings: &str,
    web_findings: &str,
    citation_map: &BTreeMap<String, Source>,
) -> String {
    let markers = |tier: char| -> String {
        citation_map
            .keys()
            .filter(|id| id.starts_with(tier))
            .take(3)
            .map(|id| format!("[{id}]"))
            .collect()
    };
    let mut parts = Vec::new();
    if !internal_findings.trim().is_empty() {
        parts.push(format!("{} {}", internal_findings.trim(), markers('B')));
    }
    if !web_findings.trim().is_empty() {
        parts.push(format!("{} {}", web_findings.trim(), markers('W')));
    }
    if parts.is_empty() {
        parts.push("Neither source returned findings for this question.".to_string());
    }
    parts.join("\n\n").trim_end().to_string()
}

fn claim_counts(content: &str) -> (usize, usize) {
    let ids = citations::extract_citation_ids(content);
    let internal = ids.iter().filter(|id| id.starts_with('B')).count();
    let web = ids.len() - internal;
    (internal, web)
}

fn hybrid_insight(intent: &Intent, internal_claims: usize, web_claims: usize) -> Insight {
    let confidence = if internal_claims >= 2 && web_claims >= 2 {
        "high"
    } else if internal_claims + web_claims >= 2 {
        "medium"
    } else {
        "low"
    };
    let subject = intent
        .entities
        .commodity
        .clone()
        .or_else(|| intent.entities.supplier.clone())
        .unwrap_or_else(|| "this question".to_string());
    Insight {
        headline: format!("Combined internal and web evidence on {subject}"),
        summary: Some(format!(
            "Confidence {confidence}: {internal_claims} internal and {web_claims} web citations."
        )),
        sentiment: Sentiment::Neutral,
        factors: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(ids: &[&str]) -> BTreeMap<String, Source> {
        ids.iter()
            .map(|id| {
                let ty = if id.starts_with('B') {
                    SourceType::InternalIntelligence
                } else {
                    SourceType::Web
                };
                ((*id).to_string(), Source::new(format!("src {id}"), ty))
            })
            .collect()
    }

    #[test]
    fn compose_only_uses_markers_from_the_map() {
        let map = map_of(&["B1", "B2", "W1"]);
        let content = compose("Internal view.", "Web view.", &map);
        let ids = citations::extract_citation_ids(&content);
        assert!(!ids.is_empty());
        assert!(ids.iter().all(|id| map.contains_key(id)));
    }

    #[test]
    fn compose_survives_an_absent_web_side() {
        let map = map_of(&["B1"]);
        let content = compose("Internal view.", "", &map);
        assert!(content.contains("[B1]"));
        assert!(!content.contains("[W"));
    }

    #[test]
    fn claim_counts_partition_by_prefix() {
        let (b, w) = claim_counts("x [B1] y [B2] z [W1]");
        assert_eq!((b, w), (2, 1));
    }

    #[test]
    fn internal_sources_are_retagged_to_the_internal_tier() {
        let s = tag_internal(Source::new("intel", SourceType::Web));
        assert_eq!(s.source_type, SourceType::InternalIntelligence);
        let s = tag_internal(Source::new("partner", SourceType::FinancialPartner));
        assert_eq!(s.source_type, SourceType::FinancialPartner);
    }

    #[test]
    fn confidence_scales_with_claims_on_both_sides() {
        let intent = Intent::general();
        let high = hybrid_insight(&intent, 2, 3);
        assert!(high.summary.as_deref().unwrap_or("").contains("high"));
        let low = hybrid_insight(&intent, 1, 0);
        assert!(low.summary.as_deref().unwrap_or("").contains("low"));
    }
}
