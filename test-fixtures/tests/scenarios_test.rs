//! End-to-end chat-turn and deep-research scenarios over mock providers.

use std::collections::BTreeMap;
use std::sync::Arc;

use sonar_catalog::Catalog;
use sonar_core::citations::extract_citation_ids;
use sonar_core::config::{ResearchConfig, SonarConfig};
use sonar_core::models::research::{JobPhase, Stage, StudyType};
use sonar_core::models::response::MilestoneEvent;
use sonar_core::models::source::CitationTier;
use sonar_orchestrator::{ChatRequest, DeepResearchCommand, Orchestrator};
use sonar_research::{ERR_INSUFFICIENT_CREDITS, ERR_TIMEOUT};
use test_fixtures::{MockFast, MockIntel, MockReasoning, MockWeb};

fn bare_orchestrator() -> Orchestrator {
    Orchestrator::new(Catalog::builtin(), SonarConfig::default())
}

fn research_command(confirmed: bool) -> DeepResearchCommand {
    DeepResearchCommand {
        study_type: StudyType::MarketAnalysis,
        confirmed,
        intake_answers: BTreeMap::new(),
    }
}

#[tokio::test]
async fn fast_portfolio_overview_without_providers() {
    let orchestrator = bare_orchestrator();
    let response = orchestrator
        .handle(ChatRequest::new("show my risk overview"))
        .await;

    let events: Vec<MilestoneEvent> = response.milestones.iter().map(|m| m.event).collect();
    assert!(events.contains(&MilestoneEvent::IntentClassified));
    assert!(events.contains(&MilestoneEvent::ProviderSelected));
    assert!(events.contains(&MilestoneEvent::ResponseReady));

    let classified = response
        .milestones
        .iter()
        .find(|m| m.event == MilestoneEvent::IntentClassified)
        .unwrap();
    assert_eq!(classified.label, "portfolio_overview");
    let selected = response
        .milestones
        .iter()
        .find(|m| m.event == MilestoneEvent::ProviderSelected)
        .unwrap();
    assert_eq!(selected.label, "local");

    assert_eq!(
        response.widget.as_ref().map(|w| w.kind()),
        Some("risk_distribution")
    );
    assert!(response.escalation.expand_to_artifact);
    assert_eq!(response.suggestions.len(), 3);
}

#[tokio::test]
async fn hybrid_market_query_partitions_and_resolves_citations() {
    let intel = Arc::new(MockIntel::with_sources(2));
    let web = Arc::new(MockWeb::with_sources(2));
    let orchestrator = bare_orchestrator()
        .with_intel(intel.clone())
        .with_web(web.clone())
        .with_reasoning(Arc::new(MockReasoning::citing()));

    let mut request = ChatRequest::new("how does lithium price impact battery suppliers");
    request.web_search = true;
    let response = orchestrator.handle(request).await;

    let selected = response
        .milestones
        .iter()
        .find(|m| m.event == MilestoneEvent::ProviderSelected)
        .unwrap();
    assert_eq!(selected.label, "hybrid");
    assert_eq!(intel.calls(), 1);
    assert_eq!(web.calls(), 1);

    assert!(!response.sources.internal.is_empty());
    assert!(!response.sources.web.is_empty());
    for (id, source) in &response.citations {
        let tier = source.source_type.citation_tier();
        match tier {
            CitationTier::Internal => assert!(id.starts_with('B'), "{id}"),
            CitationTier::Web => assert!(id.starts_with('W'), "{id}"),
        }
    }

    let markers = extract_citation_ids(&response.content);
    assert!(!markers.is_empty(), "hybrid content should carry citations");
    for id in markers {
        assert!(response.citations.contains_key(&id), "unresolved marker {id}");
    }
}

#[tokio::test]
async fn deep_research_intake_skips_when_query_is_complete() {
    let web = Arc::new(MockWeb::with_sources(3));
    let orchestrator = bare_orchestrator()
        .with_web(web.clone())
        .with_intel(Arc::new(MockIntel::with_sources(2)))
        .with_reasoning(Arc::new(MockReasoning::citing()));

    let mut request = ChatRequest::new("research lithium market in Europe last 12 months");
    request.credits_available = 500;
    request.deep_research = Some(research_command(false));
    let response = orchestrator.handle(request.clone()).await;
    let payload = response.deep_research.expect("intake payload");
    assert_eq!(payload.phase, JobPhase::Intake);
    let intake = payload.intake.expect("intake questions");
    assert!(intake.can_skip, "a fully specified query can skip intake");

    request.deep_research = Some(research_command(true));
    let response = orchestrator.handle(request).await;
    let payload = response.deep_research.expect("research payload");
    assert_eq!(payload.phase, JobPhase::Complete);
    let report = payload.report.expect("terminal report");
    assert!(report.quality_metrics.completeness_score >= 70);

    // Citation ids are dense per tier: the cited B and W numbers each count
    // up from 1 with no gaps.
    for prefix in ['B', 'W'] {
        let mut numbers: Vec<u32> = report
            .references
            .iter()
            .filter(|id| id.starts_with(prefix))
            .filter_map(|id| id[1..].parse().ok())
            .collect();
        numbers.sort_unstable();
        let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
        assert_eq!(numbers, expected, "{prefix} ids not dense");
    }
}

#[tokio::test]
async fn insufficient_credits_fail_before_any_provider_call() {
    let fast = Arc::new(MockFast::replying(Default::default()));
    let web = Arc::new(MockWeb::with_sources(1));
    let reasoning = Arc::new(MockReasoning::citing());
    let intel = Arc::new(MockIntel::with_sources(1));
    let orchestrator = bare_orchestrator()
        .with_fast(fast.clone())
        .with_web(web.clone())
        .with_reasoning(reasoning.clone())
        .with_intel(intel.clone());

    let mut request = ChatRequest::new("research the cobalt market");
    request.credits_available = 0;
    request.deep_research = Some(research_command(true));
    let response = orchestrator.handle(request.clone()).await;
    let payload = response.deep_research.expect("error payload");
    assert_eq!(payload.phase, JobPhase::Error);
    let error = payload.error.expect("credit error");
    assert_eq!(error.code, ERR_INSUFFICIENT_CREDITS);
    assert!(!error.can_retry);

    request.deep_research = Some(research_command(false));
    let response = orchestrator.handle(request).await;
    let payload = response.deep_research.expect("error payload");
    assert_eq!(
        payload.error.map(|e| e.code).as_deref(),
        Some(ERR_INSUFFICIENT_CREDITS)
    );

    assert_eq!(fast.calls(), 0);
    assert_eq!(web.calls(), 0);
    assert_eq!(reasoning.calls(), 0);
    assert_eq!(intel.calls(), 0);
}

#[tokio::test]
async fn stalled_research_hits_the_global_budget() {
    let config = SonarConfig {
        research: ResearchConfig {
            global_timeout_secs: 1,
            ..ResearchConfig::default()
        },
        ..SonarConfig::default()
    };
    let orchestrator = Orchestrator::new(Catalog::builtin(), config)
        .with_web(Arc::new(MockWeb::stalled()))
        .with_reasoning(Arc::new(MockReasoning::citing()));

    let mut request = ChatRequest::new("research nickel supply risk");
    request.credits_available = 1000;
    request.deep_research = Some(research_command(true));
    let response = orchestrator.handle(request).await;

    let payload = response.deep_research.expect("timeout payload");
    assert_eq!(payload.phase, JobPhase::Error);
    let error = payload.error.expect("timeout error");
    assert_eq!(error.code, ERR_TIMEOUT);
    assert!(error.can_retry);
    let progress = payload.progress.expect("partial progress");
    assert_eq!(progress.stage, Stage::Research, "stage at the moment of the cut");
}

#[tokio::test]
async fn regeneration_budget_caps_uncited_sections() {
    let reasoning = Arc::new(MockReasoning::uncited());
    let orchestrator = bare_orchestrator()
        .with_web(Arc::new(MockWeb::with_sources(2)))
        .with_reasoning(reasoning.clone());

    let mut request = ChatRequest::new("research graphite anode supply");
    request.credits_available = 500;
    request.deep_research = Some(research_command(true));
    let response = orchestrator.handle(request).await;

    let payload = response.deep_research.expect("research payload");
    assert_eq!(payload.phase, JobPhase::Complete);
    let report = payload.report.expect("report despite uncited sections");
    assert_eq!(report.sections.len(), 5);

    // 5 section writes plus exactly 2 regenerations; the summary needs no
    // extra call because the uncited prose is still long enough to stand.
    assert_eq!(reasoning.calls(), 7);
}
