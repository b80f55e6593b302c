//! Research stage: internal-intelligence fetch in parallel with the agent
//! fan-out pool (bounded concurrency), feeding the job-wide dedup pool.

use std::sync::Mutex;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use sonar_core::constants::SNIPPET_INSIGHT_MIN_LEN;
use sonar_core::models::research::{AgentStatus, ResearchAgent, StudyType};
use sonar_core::models::source::{Source, SourcePool, SourceType};
use sonar_core::traits::providers::{IntelProvider, WebProvider};

use crate::progress::{JobState, ProgressBus};

/// Outcome of the research stage.
pub struct ResearchOutcome {
    pub pool: SourcePool,
    /// Findings text from the internal-intelligence fetch, if any.
    pub internal_findings: Option<String>,
    /// Concatenated per-agent findings from the web side.
    pub web_findings: String,
}

/// Run the research stage phases. `state` must already be at the research
/// stage; agents must be loaded into it.
pub async fn run_research_stage(
    web: Option<&dyn WebProvider>,
    intel: Option<&dyn IntelProvider>,
    query: &str,
    study_type: StudyType,
    agent_concurrency: usize,
    state: &Mutex<JobState>,
    bus: &ProgressBus,
) -> ResearchOutcome {
    let pool = Mutex::new(SourcePool::new());

    {
        let mut s = lock(state);
        s.phase_active("internal");
        s.phase_active("web");
        bus.force(s.snapshot());
    }

    let internal = fetch_internal(intel, query, study_type, &pool, state, bus);
    let fanout = run_agents(web, agent_concurrency, &pool, state, bus);
    let (internal_findings, web_findings) = tokio::join!(internal, fanout);

    {
        let mut s = lock(state);
        s.phase_complete("internal");
        s.phase_complete("web");
        s.phase_active("consolidation");
        let p = lock(&pool);
        s.total_sources = p.len() as u32;
        drop(p);
        s.phase_complete("consolidation");
        bus.force(s.snapshot());
    }

    ResearchOutcome {
        pool: pool.into_inner().unwrap_or_else(|e| e.into_inner()),
        internal_findings,
        web_findings,
    }
}

async fn fetch_internal(
    intel: Option<&dyn IntelProvider>,
    query: &str,
    study_type: StudyType,
    pool: &Mutex<SourcePool>,
    state: &Mutex<JobState>,
    bus: &ProgressBus,
) -> Option<String> {
    let provider = match intel {
        Some(p) if p.is_configured() => p,
        _ => return None,
    };
    match provider.fetch(query, Some(study_type), None).await {
        Ok(reply) => {
            let mut p = lock(pool);
            let mut s = lock(state);
            for source in reply.sources {
                s.total_sources_raw += 1;
                p.add_if_unique(tag_internal(source));
            }
            s.total_sources = p.len() as u32;
            drop(p);
            bus.emit(s.snapshot());
            Some(reply.content)
        }
        Err(err) => {
            warn!(%err, "internal-intelligence fetch failed");
            None
        }
    }
}

/// Bounded fan-out over the queued agents. Every agent state change is
/// force-emitted.
async fn run_agents(
    web: Option<&dyn WebProvider>,
    concurrency: usize,
    pool: &Mutex<SourcePool>,
    state: &Mutex<JobState>,
    bus: &ProgressBus,
) -> String {
    let agents: Vec<ResearchAgent> = lock(state).agents.clone();

    let results: Vec<Option<String>> = stream::iter(agents)
        .map(|agent| async move {
            run_one_agent(web, agent, pool, state, bus).await
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    results.into_iter().flatten().collect::<Vec<_>>().join("\n\n")
}

async fn run_one_agent(
    web: Option<&dyn WebProvider>,
    agent: ResearchAgent,
    pool: &Mutex<SourcePool>,
    state: &Mutex<JobState>,
    bus: &ProgressBus,
) -> Option<String> {
    {
        let mut s = lock(state);
        if let Some(a) = s.agent_mut(&agent.id) {
            a.status = AgentStatus::Researching;
            a.started_at = Some(Utc::now());
        }
        bus.force(s.snapshot());
    }

    let provider = match web {
        Some(p) if p.is_configured() => p,
        _ => {
            finish_agent(state, bus, &agent.id, Err("web provider not configured".to_string()));
            return None;
        }
    };

    match provider.research(&agent.query, &[]).await {
        Ok(reply) => {
            let mut unique = 0u32;
            let raw = reply.sources.len() as u32;
            let mut insights: Vec<String> = Vec::new();
            let mut kept_sources: Vec<Source> = Vec::new();
            {
                let mut p = lock(pool);
                for source in reply.sources {
                    if let Some(snippet) = &source.snippet {
                        if snippet.len() > SNIPPET_INSIGHT_MIN_LEN {
                            insights.push(snippet.clone());
                        }
                    }
                    if p.add_if_unique(source.clone()) {
                        unique += 1;
                    }
                    kept_sources.push(source);
                }
            }
            {
                let mut s = lock(state);
                s.total_sources_raw += raw;
                s.total_sources = lock(pool).len() as u32;
                for insight in &insights {
                    s.push_insight(insight.clone());
                }
                if let Some(a) = s.agent_mut(&agent.id) {
                    a.sources_found = raw;
                    a.unique_sources_found = unique;
                    a.sources = kept_sources;
                    a.insights = insights;
                    a.findings = Some(reply.content.clone());
                    a.status = AgentStatus::Complete;
                    a.finished_at = Some(Utc::now());
                }
                bus.force(s.snapshot());
            }
            debug!(agent = %agent.name, raw, unique, "agent complete");
            Some(format!("## {}\n{}", agent.name, reply.content))
        }
        Err(err) => {
            finish_agent(state, bus, &agent.id, Err(err.to_string()));
            None
        }
    }
}

fn finish_agent(
    state: &Mutex<JobState>,
    bus: &ProgressBus,
    agent_id: &str,
    result: Result<(), String>,
) {
    let mut s = lock(state);
    if let Some(a) = s.agent_mut(agent_id) {
        if let Err(message) = result {
            a.status = AgentStatus::Error;
            a.error = Some(message);
        } else {
            a.status = AgentStatus::Complete;
        }
        a.finished_at = Some(Utc::now());
    }
    bus.force(s.snapshot());
}

/// Internal fetch results are internal-tier regardless of what the endpoint
/// claims for untyped records.
fn tag_internal(mut source: Source) -> Source {
    if matches!(source.source_type, SourceType::Web) {
        source.source_type = SourceType::InternalIntelligence;
    }
    source
}

fn lock<'a, T>(mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
