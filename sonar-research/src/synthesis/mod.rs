//! Synthesis stage: citation id assignment, template-driven section
//! writing with bounded concurrency and a heartbeat, the citation
//! validator with its shared regeneration budget, and the
//! executive-summary guard.

pub mod templates;

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::{debug, warn};

use sonar_core::citations::extract_citation_ids;
use sonar_core::constants::{MIN_SUMMARY_LEN, SUMMARY_FALLBACK_LEN};
use sonar_core::models::report::ReportSection;
use sonar_core::models::research::{StudyType, SynthesisProgress};
use sonar_core::models::source::{CitationTier, Source, SourcePool};
use sonar_core::traits::providers::{ChatTurn, ReasoningProvider};

use crate::progress::{JobState, ProgressBus};
use templates::{report_template, SectionTemplate, EXECUTIVE_SUMMARY_ID};

/// Everything the section writer needs besides the template.
pub struct SynthesisInput {
    pub query: String,
    pub study_type: StudyType,
    /// Sources with citation ids assigned, arrival order.
    pub sources: Vec<Source>,
    pub internal_findings: Option<String>,
    pub web_findings: String,
    pub intake_answers: BTreeMap<String, String>,
}

/// Assign stable citation ids over the dedup pool: internal-tier sources
/// get `B1, B2, …` and web-tier `W1, W2, …`, both in arrival order.
pub fn assign_citation_ids(pool: &SourcePool) -> (Vec<Source>, BTreeMap<String, Source>) {
    let mut internal_next = 0u32;
    let mut web_next = 0u32;
    let mut sources = Vec::with_capacity(pool.len());
    let mut map = BTreeMap::new();
    for source in pool.sources() {
        let mut source = source.clone();
        let id = match source.source_type.citation_tier() {
            CitationTier::Internal => {
                internal_next += 1;
                format!("B{internal_next}")
            }
            CitationTier::Web => {
                web_next += 1;
                format!("W{web_next}")
            }
        };
        source.citation_id = Some(id.clone());
        map.insert(id, source.clone());
        sources.push(source);
    }
    (sources, map)
}

/// Knobs the controller passes down from `ResearchConfig`.
pub struct SynthesisLimits {
    pub section_concurrency: usize,
    pub heartbeat_secs: u64,
    pub max_regen_calls: u32,
    pub call_timeout_secs: u64,
}

/// Run the synthesis stage phases against `state` (already at the
/// synthesis stage). Returns the finished sections in template order plus
/// the executive summary text.
pub async fn run_synthesis_stage(
    reasoning: Option<&dyn ReasoningProvider>,
    limits: &SynthesisLimits,
    input: &SynthesisInput,
    state: &Mutex<JobState>,
    bus: &ProgressBus,
) -> (Vec<ReportSection>, String) {
    let template = report_template(input.study_type);

    {
        let mut s = lock(state);
        s.phase_active("template");
        s.phase_complete("template");
        s.phase_active("writing");
        s.synthesis = Some(SynthesisProgress {
            current_section: None,
            sections_complete: 0,
            total_sections: template.sections.len() as u32,
        });
        bus.force(s.snapshot());
    }

    let mut sections = write_all_sections(reasoning, limits, input, &template.sections, state, bus).await;

    {
        let mut s = lock(state);
        s.phase_complete("writing");
        s.phase_active("quality");
        bus.force(s.snapshot());
    }

    validate_and_regenerate(reasoning, limits, input, &mut sections, state, bus).await;

    let summary = executive_summary(reasoning, limits, input, &mut sections).await;

    {
        let mut s = lock(state);
        s.phase_complete("quality");
        s.phase_active("visuals");
        s.phase_complete("visuals");
        bus.force(s.snapshot());
    }

    (sections, summary)
}

/// Write every section with bounded concurrency, a heartbeat keeping the
/// progress stream alive, and per-completion progress updates.
async fn write_all_sections(
    reasoning: Option<&dyn ReasoningProvider>,
    limits: &SynthesisLimits,
    input: &SynthesisInput,
    section_templates: &[SectionTemplate],
    state: &Mutex<JobState>,
    bus: &ProgressBus,
) -> Vec<ReportSection> {
    let write_all = async {
        let mut done: Vec<(usize, ReportSection)> = stream::iter(section_templates.iter().enumerate())
            .map(|(idx, tpl)| async move {
                {
                    // Announced by the heartbeat, so it names the section in
                    // flight, not the one that last finished.
                    let mut s = lock(state);
                    if let Some(progress) = &mut s.synthesis {
                        progress.current_section = Some(tpl.title.to_string());
                    }
                }
                let section = write_section(reasoning, limits, input, tpl, false).await;
                {
                    let mut s = lock(state);
                    if let Some(progress) = &mut s.synthesis {
                        progress.sections_complete += 1;
                    }
                    bus.emit(s.snapshot());
                }
                (idx, section)
            })
            .buffer_unordered(limits.section_concurrency.max(1))
            .collect()
            .await;
        done.sort_by_key(|(idx, _)| *idx);
        done.into_iter().map(|(_, s)| s).collect::<Vec<_>>()
    };
    tokio::pin!(write_all);

    let mut heartbeat = tokio::time::interval(Duration::from_secs(limits.heartbeat_secs.max(1)));
    heartbeat.tick().await; // the immediate first tick
    loop {
        tokio::select! {
            sections = &mut write_all => return sections,
            _ = heartbeat.tick() => {
                let mut s = lock(state);
                let current = s
                    .synthesis
                    .as_ref()
                    .and_then(|p| p.current_section.clone())
                    .unwrap_or_else(|| "report sections".to_string());
                s.push_insight(format!("Synthesizing {current}…"));
                bus.force(s.snapshot());
            }
        }
    }
}

/// Write one section. Provider failures and absent providers fall back to a
/// deterministic cited digest so the pipeline always terminates.
async fn write_section(
    reasoning: Option<&dyn ReasoningProvider>,
    limits: &SynthesisLimits,
    input: &SynthesisInput,
    tpl: &SectionTemplate,
    emphatic: bool,
) -> ReportSection {
    let content = match reasoning {
        Some(provider) if provider.is_configured() => {
            let messages = section_messages(input, tpl, emphatic);
            let call = provider.complete(&messages);
            match timeout(Duration::from_secs(limits.call_timeout_secs), call).await {
                Ok(Ok(reply)) if !reply.content.trim().is_empty() => reply.content,
                Ok(Ok(_)) => fallback_section_body(input, tpl),
                Ok(Err(err)) => {
                    warn!(section = tpl.id, %err, "section synthesis failed, using fallback");
                    fallback_section_body(input, tpl)
                }
                Err(_) => {
                    warn!(section = tpl.id, "section synthesis timed out, using fallback");
                    fallback_section_body(input, tpl)
                }
            }
        }
        _ => fallback_section_body(input, tpl),
    };

    let citation_ids = extract_citation_ids(&content);
    ReportSection {
        id: tpl.id.to_string(),
        title: tpl.title.to_string(),
        content,
        citation_ids,
        children: Vec::new(),
    }
}

fn section_messages(input: &SynthesisInput, tpl: &SectionTemplate, emphatic: bool) -> Vec<ChatTurn> {
    let mut sources_block = String::new();
    for source in &input.sources {
        if let Some(id) = &source.citation_id {
            sources_block.push_str(&format!(
                "[{id}] {}: {}\n",
                source.name,
                source.snippet.as_deref().unwrap_or("no snippet")
            ));
        }
    }
    let mut answers_block = String::new();
    for (slot, value) in &input.intake_answers {
        answers_block.push_str(&format!("- {slot}: {value}\n"));
    }

    let mut system = format!(
        "You write one section of a procurement {} report. Cite evidence with the exact \
         bracketed ids provided, e.g. [B1] or [W2]. Never invent citation ids.",
        input.study_type.as_str().replace('-', " ")
    );
    if emphatic {
        system.push_str(&format!(
            " This section MUST contain at least {} citations.",
            tpl.min_citations
        ));
    }

    let user = format!(
        "Study topic: {}\n\nSection: {} ({})\nGuidance: {}\n\nIntake answers:\n{}\n\
         Sources:\n{}\nInternal findings:\n{}\n\nWeb findings:\n{}",
        input.query,
        tpl.title,
        tpl.purpose,
        tpl.hints.join("; "),
        answers_block,
        sources_block,
        input.internal_findings.as_deref().unwrap_or("(none)"),
        input.web_findings,
    );
    vec![ChatTurn::system(system), ChatTurn::user(user)]
}

/// Deterministic cited digest of the available evidence.
fn fallback_section_body(input: &SynthesisInput, tpl: &SectionTemplate) -> String {
    let mut body = format!("{} for {}.\n\n", tpl.purpose, input.query);
    let take = (tpl.min_citations.max(2) as usize).min(input.sources.len());
    for source in input.sources.iter().take(take) {
        if let Some(id) = &source.citation_id {
            let line = source
                .snippet
                .as_deref()
                .unwrap_or("Evidence on file.")
                .trim();
            body.push_str(&format!("- {line} [{id}]\n"));
        }
    }
    if take == 0 {
        body.push_str("No sources were available for this section.\n");
    }
    body
}

/// Quality phase: flag sections below their citation floor and regenerate
/// within the shared budget, spent in section order.
async fn validate_and_regenerate(
    reasoning: Option<&dyn ReasoningProvider>,
    limits: &SynthesisLimits,
    input: &SynthesisInput,
    sections: &mut [ReportSection],
    state: &Mutex<JobState>,
    bus: &ProgressBus,
) {
    let template = report_template(input.study_type);
    let mut budget = limits.max_regen_calls;
    for (section, tpl) in sections.iter_mut().zip(template.sections) {
        if !needs_regeneration(section, tpl) {
            continue;
        }
        if budget == 0 {
            warn!(section = %section.id, "citation floor missed, regeneration budget exhausted");
            continue;
        }
        budget -= 1;
        debug!(section = %section.id, remaining = budget, "regenerating section");
        {
            let mut s = lock(state);
            s.push_insight(format!("Improving citations in {}…", section.title));
            bus.force(s.snapshot());
        }
        *section = write_section(reasoning, limits, input, tpl, true).await;
    }
}

fn needs_regeneration(section: &ReportSection, tpl: &SectionTemplate) -> bool {
    if tpl.id == EXECUTIVE_SUMMARY_ID {
        return section.citation_ids.is_empty();
    }
    let actual = section.citation_ids.len() as f64;
    tpl.min_citations > 0 && actual < f64::from(tpl.min_citations) * 0.5
}

/// The executive-summary guard: one regeneration for an unusable summary,
/// then the head of the first substantial section.
async fn executive_summary(
    reasoning: Option<&dyn ReasoningProvider>,
    limits: &SynthesisLimits,
    input: &SynthesisInput,
    sections: &mut Vec<ReportSection>,
) -> String {
    let template = report_template(input.study_type);
    let position = sections.iter().position(|s| s.id == EXECUTIVE_SUMMARY_ID);
    let Some(idx) = position else {
        return fallback_summary(sections);
    };

    if usable_summary(&sections[idx].content) {
        return sections[idx].content.clone();
    }

    if let Some(tpl) = template.sections.iter().find(|t| t.id == EXECUTIVE_SUMMARY_ID) {
        let regenerated = write_section(reasoning, limits, input, tpl, true).await;
        if usable_summary(&regenerated.content) {
            sections[idx] = regenerated;
            return sections[idx].content.clone();
        }
    }
    warn!("executive summary unusable after regeneration, using first section head");
    let summary = fallback_summary(sections);
    sections[idx].content = summary.clone();
    summary
}

fn usable_summary(content: &str) -> bool {
    content.trim().len() >= MIN_SUMMARY_LEN
}

fn fallback_summary(sections: &[ReportSection]) -> String {
    sections
        .iter()
        .find(|s| s.id != EXECUTIVE_SUMMARY_ID && s.content.trim().len() >= MIN_SUMMARY_LEN)
        .map(|s| s.content.chars().take(SUMMARY_FALLBACK_LEN).collect())
        .unwrap_or_else(|| "No summary could be produced from the available evidence.".to_string())
}

fn lock<'a, T>(mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonar_core::models::source::SourceType;

    fn pool_with(sources: &[(&str, SourceType)]) -> SourcePool {
        let mut pool = SourcePool::new();
        for (i, (name, ty)) in sources.iter().enumerate() {
            pool.add_if_unique(
                Source::new(*name, *ty).with_url(format!("https://example.com/{i}")),
            );
        }
        pool
    }

    #[test]
    fn citation_ids_are_dense_and_partitioned() {
        let pool = pool_with(&[
            ("Intel brief", SourceType::InternalIntelligence),
            ("Reuters", SourceType::Web),
            ("Supplier filing", SourceType::SupplierData),
            ("Bloomberg", SourceType::News),
        ]);
        let (sources, map) = assign_citation_ids(&pool);
        let ids: Vec<&str> = sources
            .iter()
            .map(|s| s.citation_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["B1", "W1", "B2", "W2"]);
        assert!(map.contains_key("B2"));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn regeneration_triggers_below_half_the_floor() {
        let tpl = SectionTemplate {
            id: "market-overview",
            title: "Market Overview",
            purpose: "",
            hints: &[],
            min_citations: 3,
        };
        let mut section = ReportSection {
            id: "market-overview".to_string(),
            title: "Market Overview".to_string(),
            content: "text [B1]".to_string(),
            citation_ids: vec!["B1".to_string()],
            children: Vec::new(),
        };
        assert!(needs_regeneration(&section, &tpl)); // 1 < 1.5
        section.citation_ids.push("W1".to_string());
        assert!(!needs_regeneration(&section, &tpl)); // 2 >= 1.5
    }

    #[test]
    fn fallback_section_cites_available_sources() {
        let pool = pool_with(&[("Intel", SourceType::InternalIntelligence)]);
        let (sources, _) = assign_citation_ids(&pool);
        let input = SynthesisInput {
            query: "lithium".to_string(),
            study_type: StudyType::MarketAnalysis,
            sources,
            internal_findings: None,
            web_findings: String::new(),
            intake_answers: BTreeMap::new(),
        };
        let tpl = &report_template(StudyType::MarketAnalysis).sections[1];
        let body = fallback_section_body(&input, tpl);
        assert!(body.contains("[B1]"));
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_announces_the_section_in_flight() {
        use sonar_core::traits::providers::ReasoningReply;
        use std::sync::Arc;

        struct Stalling;

        #[async_trait::async_trait]
        impl ReasoningProvider for Stalling {
            fn is_configured(&self) -> bool {
                true
            }

            async fn complete(
                &self,
                _messages: &[ChatTurn],
            ) -> sonar_core::SonarResult<ReasoningReply> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ReasoningReply::default())
            }
        }

        let limits = SynthesisLimits {
            section_concurrency: 1,
            heartbeat_secs: 1,
            max_regen_calls: 0,
            call_timeout_secs: 3,
        };
        let input = SynthesisInput {
            query: "lithium".to_string(),
            study_type: StudyType::MarketAnalysis,
            sources: Vec::new(),
            internal_findings: None,
            web_findings: String::new(),
            intake_answers: BTreeMap::new(),
        };
        let templates = [SectionTemplate {
            id: "market-overview",
            title: "Market Overview",
            purpose: "",
            hints: &[],
            min_citations: 0,
        }];
        let state = Mutex::new(JobState::new());
        {
            let mut s = lock(&state);
            s.synthesis = Some(SynthesisProgress {
                current_section: None,
                sections_complete: 0,
                total_sections: 1,
            });
        }
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let bus = ProgressBus::new(
            Some(Box::new(move |p| {
                sink_seen.lock().unwrap().push(p);
            })),
            0,
        );

        let provider: &dyn ReasoningProvider = &Stalling;
        let sections =
            write_all_sections(Some(provider), &limits, &input, &templates, &state, &bus).await;
        assert_eq!(sections.len(), 1);

        let seen = seen.lock().unwrap();
        let during = seen
            .iter()
            .find(|p| p.insight_stream.iter().any(|i| i.contains("Synthesizing")))
            .expect("heartbeat fired during the write");
        let progress = during.synthesis.as_ref().expect("synthesis progress set");
        assert_eq!(progress.sections_complete, 0);
        assert_eq!(progress.current_section.as_deref(), Some("Market Overview"));
        assert!(during
            .insight_stream
            .iter()
            .any(|i| i.contains("Market Overview")));
    }

    #[test]
    fn summary_fallback_takes_first_substantial_section_head(){
        let long = "x".repeat(2000);
        let sections = vec![
            ReportSection {
                id: EXECUTIVE_SUMMARY_ID.to_string(),
                title: "Executive Summary".to_string(),
                content: String::new(),
                citation_ids: Vec::new(),
                children: Vec::new(),
            },
            ReportSection {
                id: "market-overview".to_string(),
                title: "Market Overview".to_string(),
                content: long.clone(),
                citation_ids: Vec::new(),
                children: Vec::new(),
            },
        ];
        let summary = fallback_summary(&sections);
        assert_eq!(summary.len(), SUMMARY_FALLBACK_LEN);
        assert!(long.starts_with(&summary));
    }
}
