//! The deep-research controller: credit gating, intake preparation, and the
//! staged execution pipeline raced against the global wall-clock budget.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

use sonar_catalog::Catalog;
use sonar_core::config::ResearchConfig;
use sonar_core::models::research::{
    DeepResearchError, DeepResearchResponse, JobPhase, Stage, StudyType,
};
use sonar_core::traits::providers::{
    ChatTurn, FastProvider, IntelProvider, ReasoningProvider, WebProvider,
};
use sonar_core::SonarResult;

use crate::assemble::assemble_report;
use crate::decompose::plan_agents;
use crate::progress::{JobState, ProgressBus, ProgressSink};
use crate::resolve::resolve_query;
use crate::scheduler::run_research_stage;
use crate::synthesis::templates::report_template;
use crate::synthesis::{assign_citation_ids, run_synthesis_stage, SynthesisInput, SynthesisLimits};

pub const ERR_INSUFFICIENT_CREDITS: &str = "INSUFFICIENT_CREDITS";
pub const ERR_TIMEOUT: &str = "RESEARCH_TIMEOUT";
pub const ERR_INTERNAL: &str = "INTERNAL_ERROR";

/// One deep-research request.
#[derive(Debug, Clone)]
pub struct DeepResearchRequest {
    pub query: String,
    pub study_type: StudyType,
    pub credits_available: u32,
    pub history: Vec<ChatTurn>,
    /// Confirmed intake answers, slot id → value.
    pub intake_answers: BTreeMap<String, String>,
}

/// Provider handles the pipeline may use. Any of them can be absent; the
/// pipeline degrades to deterministic fallbacks instead of failing.
#[derive(Clone, Copy)]
pub struct ResearchProviders<'a> {
    pub fast: Option<&'a dyn FastProvider>,
    pub web: Option<&'a dyn WebProvider>,
    pub reasoning: Option<&'a dyn ReasoningProvider>,
    pub intel: Option<&'a dyn IntelProvider>,
}

/// Credit-gate then produce the intake payload. No provider call is made
/// when the gate fails.
pub async fn prepare_job(
    catalog: &Catalog,
    providers: ResearchProviders<'_>,
    request: &DeepResearchRequest,
) -> DeepResearchResponse {
    let required = request.study_type.credit_cost();
    let resolved = resolve_query(&request.query, &request.history);
    let mut response = base_response(&resolved, request, JobPhase::Intake);

    if request.credits_available < required {
        return insufficient_credits(response, required, request.credits_available);
    }

    let intake = sonar_intake::generate_intake(
        catalog,
        request.study_type,
        &resolved,
        &request.history,
        providers.fast,
    )
    .await;
    response.intake = Some(intake);
    response
}

/// Run the full pipeline after intake confirmation. Races the global
/// wall-clock budget; the loser's results are discarded.
pub async fn execute_job(
    config: &ResearchConfig,
    providers: ResearchProviders<'_>,
    request: &DeepResearchRequest,
    sink: Option<ProgressSink>,
) -> DeepResearchResponse {
    let required = request.study_type.credit_cost();
    let resolved = resolve_query(&request.query, &request.history);

    if request.credits_available < required {
        let response = base_response(&resolved, request, JobPhase::Error);
        return insufficient_credits(response, required, request.credits_available);
    }

    let state = Mutex::new(JobState::new());
    let bus = ProgressBus::new(sink, config.progress_throttle_ms);
    info!(study = request.study_type.as_str(), query = %resolved, "deep research started");

    tokio::select! {
        result = run_pipeline(config, providers, &resolved, request, &state, &bus) => {
            match result {
                Ok(response) => response,
                Err(err) => {
                    warn!(%err, "deep research failed");
                    bus.flush();
                    let mut response = base_response(&resolved, request, JobPhase::Error);
                    response.progress = Some(lock(&state).snapshot());
                    response.error = Some(DeepResearchError {
                        code: ERR_INTERNAL.to_string(),
                        message: err.to_string(),
                        can_retry: true,
                    });
                    response
                }
            }
        }
        _ = sleep(Duration::from_secs(config.global_timeout_secs)) => {
            warn!(secs = config.global_timeout_secs, "deep research hit the global budget");
            bus.flush();
            let mut response = base_response(&resolved, request, JobPhase::Error);
            response.progress = Some(lock(&state).snapshot());
            response.error = Some(DeepResearchError {
                code: ERR_TIMEOUT.to_string(),
                message: format!(
                    "research did not finish within {}s",
                    config.global_timeout_secs
                ),
                can_retry: true,
            });
            response
        }
    }
}

async fn run_pipeline(
    config: &ResearchConfig,
    providers: ResearchProviders<'_>,
    resolved: &str,
    request: &DeepResearchRequest,
    state: &Mutex<JobState>,
    bus: &ProgressBus,
) -> SonarResult<DeepResearchResponse> {
    // Plan.
    {
        let mut s = lock(state);
        s.phase_active("decomposition");
        bus.force(s.snapshot());
    }
    let agents = plan_agents(providers.intel, resolved, request.study_type).await;
    {
        let mut s = lock(state);
        s.phase_complete("decomposition");
        s.phase_active("deduplication");
        s.phase_complete("deduplication");
        s.phase_active("assignment");
        s.agents = agents;
        s.tags = vec![request.study_type.as_str().to_string()];
        s.phase_complete("assignment");
        bus.force(s.snapshot());
        s.advance_to(Stage::Research);
        bus.force(s.snapshot());
    }

    // Research.
    let outcome = run_research_stage(
        providers.web,
        providers.intel,
        resolved,
        request.study_type,
        config.agent_concurrency,
        state,
        bus,
    )
    .await;

    {
        let mut s = lock(state);
        s.advance_to(Stage::Synthesis);
        bus.force(s.snapshot());
    }

    // Synthesis.
    let (sources, citation_map) = assign_citation_ids(&outcome.pool);
    let input = SynthesisInput {
        query: resolved.to_string(),
        study_type: request.study_type,
        sources,
        internal_findings: outcome.internal_findings,
        web_findings: outcome.web_findings,
        intake_answers: request.intake_answers.clone(),
    };
    let limits = SynthesisLimits {
        section_concurrency: config.section_concurrency,
        heartbeat_secs: config.heartbeat_secs,
        max_regen_calls: config.max_regen_calls,
        call_timeout_secs: config.synthesis_timeout_secs,
    };
    let (sections, summary) =
        run_synthesis_stage(providers.reasoning, &limits, &input, state, bus).await;

    // Delivery.
    {
        let mut s = lock(state);
        s.advance_to(Stage::Delivery);
        s.phase_active("assembly");
        bus.force(s.snapshot());
    }
    let total_sources = outcome.pool.len() as u32;
    let report = assemble_report(
        request.study_type,
        resolved,
        report_template(request.study_type).title_prefix,
        summary,
        sections,
        &citation_map,
        total_sources,
    );
    {
        let mut s = lock(state);
        s.phase_complete("assembly");
        s.phase_active("presentation");
        s.phase_complete("presentation");
        s.phase_active("export");
        s.phase_complete("export");
        bus.force(s.snapshot());
        s.advance_to(Stage::Complete);
        bus.force(s.snapshot());
    }
    bus.flush();
    info!(
        sections = report.sections.len(),
        references = report.references.len(),
        completeness = report.quality_metrics.completeness_score,
        "deep research complete"
    );

    let mut response = base_response(resolved, request, JobPhase::Complete);
    response.progress = Some(lock(state).snapshot());
    response.report = Some(report);
    Ok(response)
}

fn base_response(
    resolved: &str,
    request: &DeepResearchRequest,
    phase: JobPhase,
) -> DeepResearchResponse {
    DeepResearchResponse {
        job_id: Uuid::new_v4().to_string(),
        query: resolved.to_string(),
        study_type: request.study_type,
        phase,
        credits_required: request.study_type.credit_cost(),
        credits_available: request.credits_available,
        intake: None,
        progress: None,
        report: None,
        error: None,
    }
}

fn insufficient_credits(
    mut response: DeepResearchResponse,
    required: u32,
    available: u32,
) -> DeepResearchResponse {
    response.phase = JobPhase::Error;
    response.error = Some(DeepResearchError {
        code: ERR_INSUFFICIENT_CREDITS.to_string(),
        message: format!("this study needs {required} credits; {available} available"),
        can_retry: false,
    });
    response
}

fn lock<'a, T>(mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
