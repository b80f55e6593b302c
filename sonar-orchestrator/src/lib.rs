//! # sonar-orchestrator
//!
//! The single public entry point for a chat turn. Classifies the message,
//! picks a route (hybrid, research, fast, or the always-available local
//! fallback), executes it, and funnels the result through the canonical
//! response builder. Provider failures downgrade the route; they never
//! surface to the caller. Deep-research turns delegate to `sonar-research`
//! and return a stub response carrying the job payload.

mod fast_path;
mod hybrid;
mod local;
mod milestones;
mod research_path;
mod route;

pub use milestones::{MilestoneBuffer, MilestoneCallback};
pub use route::{Available, Mode, Route};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use sonar_catalog::Catalog;
use sonar_classify::{is_price_data_query, Classifier};
use sonar_core::config::SonarConfig;
use sonar_core::models::intent::{Intent, IntentCategory};
use sonar_core::models::research::{DeepResearchResponse, JobPhase, StudyType};
use sonar_core::models::response::{ChatResponse, MilestoneEvent};
use sonar_core::traits::providers::{
    ChatTurn, FastProvider, IntelProvider, ReasoningProvider, WebProvider,
};
use sonar_providers::{FastClient, IntelClient, ReasoningClient, WebClient};
use sonar_research::{DeepResearchRequest, ProgressSink, ResearchProviders};
use sonar_respond::{build_response, validate_and_repair, Draft, SuggestionContext, SuggestionEngine};

/// Caller-supplied deterministic route ("builder meta"). Fixes the category
/// and sub-intent; entity extraction still runs on the message.
#[derive(Debug, Clone, Default)]
pub struct RouteOverride {
    pub category: Option<IntentCategory>,
    pub sub_intent: Option<String>,
    /// Widget kinds the caller's flow expects; advisory only.
    pub widgets: Vec<String>,
    pub requires_research: Option<bool>,
    pub prompt_template: Option<String>,
}

/// Deep-research instruction attached to a turn. `confirmed` is false while
/// intake questions are still open.
#[derive(Debug, Clone)]
pub struct DeepResearchCommand {
    pub study_type: StudyType,
    pub confirmed: bool,
    /// Confirmed intake answers, slot id to value.
    pub intake_answers: BTreeMap<String, String>,
}

/// One chat turn's input.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub mode: Mode,
    pub web_search: bool,
    pub hybrid: bool,
    pub history: Vec<ChatTurn>,
    pub route: Option<RouteOverride>,
    pub session_id: String,
    pub credits_available: u32,
    pub deep_research: Option<DeepResearchCommand>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            mode: Mode::Fast,
            web_search: false,
            hybrid: false,
            history: Vec::new(),
            route: None,
            session_id: Uuid::new_v4().to_string(),
            credits_available: 0,
            deep_research: None,
        }
    }
}

/// The orchestrator. Owns the catalog, configuration, the per-session
/// suggestion engine, and whichever provider handles are installed.
pub struct Orchestrator {
    catalog: Catalog,
    config: SonarConfig,
    suggestions: SuggestionEngine,
    fast: Option<Arc<dyn FastProvider>>,
    web: Option<Arc<dyn WebProvider>>,
    reasoning: Option<Arc<dyn ReasoningProvider>>,
    intel: Option<Arc<dyn IntelProvider>>,
}

impl Orchestrator {
    /// An orchestrator with no providers installed; every turn takes the
    /// local fallback until providers are added.
    pub fn new(catalog: Catalog, config: SonarConfig) -> Self {
        Self {
            catalog,
            config,
            suggestions: SuggestionEngine::new(),
            fast: None,
            web: None,
            reasoning: None,
            intel: None,
        }
    }

    /// Wire up the HTTP provider clients from the config's credentials.
    pub fn from_config(catalog: Catalog, config: SonarConfig) -> Self {
        let providers = config.providers.clone();
        Self::new(catalog, config)
            .with_fast(Arc::new(FastClient::new(providers.fast_api_key)))
            .with_web(Arc::new(WebClient::new(providers.research_api_key)))
            .with_reasoning(Arc::new(ReasoningClient::new(providers.reasoning_api_key)))
            .with_intel(Arc::new(IntelClient::new(providers.intel_endpoint)))
    }

    pub fn with_fast(mut self, provider: Arc<dyn FastProvider>) -> Self {
        self.fast = Some(provider);
        self
    }

    pub fn with_web(mut self, provider: Arc<dyn WebProvider>) -> Self {
        self.web = Some(provider);
        self
    }

    pub fn with_reasoning(mut self, provider: Arc<dyn ReasoningProvider>) -> Self {
        self.reasoning = Some(provider);
        self
    }

    pub fn with_intel(mut self, provider: Arc<dyn IntelProvider>) -> Self {
        self.intel = Some(provider);
        self
    }

    /// Drop a session's suggestion state.
    pub fn reset_session(&self, session_id: &str) {
        self.suggestions.forget_session(session_id);
    }

    /// Handle one chat turn without callbacks.
    pub async fn handle(&self, request: ChatRequest) -> ChatResponse {
        self.handle_with(request, None, None).await
    }

    /// Handle one chat turn. `on_milestone` sees every milestone as it is
    /// recorded; `on_progress` receives deep-research progress snapshots.
    /// This never returns an error: every failure downgrades to the local
    /// fallback or, for deep research, to an error payload.
    pub async fn handle_with(
        &self,
        request: ChatRequest,
        on_milestone: Option<MilestoneCallback<'_>>,
        on_progress: Option<ProgressSink>,
    ) -> ChatResponse {
        if let Some(command) = request.deep_research.clone() {
            return self.deep_research(&request, &command, on_progress).await;
        }

        let mut buffer = MilestoneBuffer::new(on_milestone);
        let classifier = Classifier::new(&self.catalog);
        let mut intent = match &request.route {
            Some(route) => overridden_intent(&classifier, &request.message, route),
            None => classifier.classify(&request.message),
        };
        buffer.record_with_value(
            MilestoneEvent::IntentClassified,
            category_label(intent.category),
            intent.sub_intent.clone(),
        );

        // Internal data is authoritative for commodity prices.
        if intent.requires_research && is_price_data_query(&request.message) {
            debug!("price-data pattern matched; keeping the query on internal data");
            intent.requires_research = false;
        }

        let available = Available {
            fast: configured(&self.fast, |p| p.is_configured()),
            web: configured(&self.web, |p| p.is_configured()),
            intel: configured(&self.intel, |p| p.is_configured()),
        };
        let route = route::choose_route(
            request.mode,
            request.web_search,
            request.hybrid,
            &intent,
            available,
        );
        buffer.record(MilestoneEvent::ProviderSelected, route.label());
        info!(route = route.label(), category = category_label(intent.category), "turn routed");

        let prompt_template = request
            .route
            .as_ref()
            .and_then(|r| r.prompt_template.as_deref());
        let outcome: sonar_core::SonarResult<Draft> = match route {
            Route::Hybrid => match (self.intel.as_deref(), self.web.as_deref()) {
                (Some(intel), Some(web)) => {
                    hybrid::run(
                        intel,
                        web,
                        self.reasoning.as_deref(),
                        &request.message,
                        &request.history,
                        &intent,
                        &mut buffer,
                    )
                    .await
                }
                _ => Ok(local::run(&self.catalog, &intent, &mut buffer)),
            },
            Route::Research => match self.web.as_deref() {
                Some(web) => {
                    research_path::run(web, &request.message, &request.history, &mut buffer).await
                }
                None => Ok(local::run(&self.catalog, &intent, &mut buffer)),
            },
            Route::Fast => match self.fast.as_deref() {
                Some(fast) => {
                    fast_path::run(
                        &self.catalog,
                        fast,
                        &request.message,
                        &request.history,
                        &intent,
                        prompt_template,
                        &mut buffer,
                    )
                    .await
                }
                None => Ok(local::run(&self.catalog, &intent, &mut buffer)),
            },
            Route::Local => Ok(local::run(&self.catalog, &intent, &mut buffer)),
        };

        let draft = match outcome {
            Ok(draft) => draft,
            Err(err) => {
                warn!(%err, route = route.label(), "route failed; downgrading to local fallback");
                buffer.record_with_value(
                    MilestoneEvent::ProviderSelected,
                    Route::Local.label(),
                    Some("downgraded".to_string()),
                );
                local::run(&self.catalog, &intent, &mut buffer)
            }
        };

        let (result_count, has_widget) = widget_shape(&self.catalog, &intent, &draft);
        let suggestions = self.suggestions.suggest(&SuggestionContext {
            session_id: request.session_id.clone(),
            intent: intent.clone(),
            result_count,
            has_widget,
            deep_research_ran: false,
        });

        let mut response = build_response(&self.catalog, &intent, draft, suggestions);
        if let Some(widget) = &response.widget {
            buffer.record(MilestoneEvent::WidgetSelected, widget.kind());
        }
        buffer.record(MilestoneEvent::ResponseReady, route.label());
        response.duration_ms = buffer.elapsed_ms();
        response.milestones = buffer.into_milestones();
        response
    }

    async fn deep_research(
        &self,
        request: &ChatRequest,
        command: &DeepResearchCommand,
        on_progress: Option<ProgressSink>,
    ) -> ChatResponse {
        let started = Instant::now();
        let dr_request = DeepResearchRequest {
            query: request.message.clone(),
            study_type: command.study_type,
            credits_available: request.credits_available,
            history: request.history.clone(),
            intake_answers: command.intake_answers.clone(),
        };
        let providers = ResearchProviders {
            fast: self.fast.as_deref(),
            web: self.web.as_deref(),
            reasoning: self.reasoning.as_deref(),
            intel: self.intel.as_deref(),
        };
        let payload = if command.confirmed {
            sonar_research::execute_job(&self.config.research, providers, &dr_request, on_progress)
                .await
        } else {
            sonar_research::prepare_job(&self.catalog, providers, &dr_request).await
        };

        let mut response = ChatResponse::minimal(stub_content(&payload));
        response.deep_research = Some(payload);
        let mut response = validate_and_repair(response);
        response.duration_ms = started.elapsed().as_millis() as u64;
        response
    }
}

fn configured<T: ?Sized>(provider: &Option<Arc<T>>, check: impl Fn(&T) -> bool) -> bool {
    provider.as_deref().map(check).unwrap_or(false)
}

fn overridden_intent(classifier: &Classifier<'_>, message: &str, route: &RouteOverride) -> Intent {
    let Some(category) = route.category else {
        return classifier.classify(message);
    };
    Intent {
        category,
        sub_intent: route.sub_intent.clone(),
        confidence: 1.0,
        entities: classifier.extract(message),
        requires_research: route.requires_research.unwrap_or(false),
        requires_discovery: category == IntentCategory::FilteredDiscovery,
        requires_handoff: category == IntentCategory::Restricted,
    }
}

/// What the response builder will end up rendering, computed ahead of time
/// for the suggestion context.
fn widget_shape(catalog: &Catalog, intent: &Intent, draft: &Draft) -> (u32, bool) {
    if draft.widget.is_some() {
        return (draft.result_count.unwrap_or(1), true);
    }
    let (widget, count) = sonar_respond::build_widget_for_intent(catalog, intent);
    (draft.result_count.unwrap_or(count), widget.is_some())
}

fn stub_content(payload: &DeepResearchResponse) -> String {
    match payload.phase {
        JobPhase::Intake => {
            "Before I start this study, have a look at the intake questions below. \
             You can answer them or skip straight to the research."
                .to_string()
        }
        JobPhase::Processing => "Deep research is underway.".to_string(),
        JobPhase::Complete => match &payload.report {
            Some(report) => format!(
                "**{}** is ready: {} sections, {} references.",
                report.title,
                report.sections.len(),
                report.references.len()
            ),
            None => "Deep research finished.".to_string(),
        },
        JobPhase::Error => match &payload.error {
            Some(error) => format!("The study could not run: {}.", error.message),
            None => "The study could not run.".to_string(),
        },
    }
}

fn category_label(category: IntentCategory) -> &'static str {
    match category {
        IntentCategory::PortfolioOverview => "portfolio_overview",
        IntentCategory::FilteredDiscovery => "filtered_discovery",
        IntentCategory::SupplierDeepDive => "supplier_deep_dive",
        IntentCategory::TrendDetection => "trend_detection",
        IntentCategory::Comparison => "comparison",
        IntentCategory::MarketContext => "market_context",
        IntentCategory::InflationSummary => "inflation_summary",
        IntentCategory::InflationDrivers => "inflation_drivers",
        IntentCategory::InflationImpact => "inflation_impact",
        IntentCategory::InflationJustification => "inflation_justification",
        IntentCategory::InflationScenarios => "inflation_scenarios",
        IntentCategory::Explanation => "explanation",
        IntentCategory::Action => "action",
        IntentCategory::Restricted => "restricted",
        IntentCategory::General => "general",
    }
}
