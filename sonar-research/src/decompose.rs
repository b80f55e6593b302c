//! Plan stage: LLM query decomposition and Jaccard deduplication.

use serde::Deserialize;
use uuid::Uuid;

use sonar_core::constants::JACCARD_DEDUP_THRESHOLD;
use sonar_core::models::research::{ResearchAgent, StudyType};
use sonar_core::traits::providers::IntelProvider;
use sonar_providers::repair::parse_lenient;
use tracing::{debug, warn};

/// One planned agent as the decomposition LLM returns it.
#[derive(Debug, Deserialize)]
struct PlannedAgent {
    name: String,
    query: String,
    #[serde(default)]
    category: Option<String>,
}

/// Decompose the resolved query into research agents. Falls back to a
/// deterministic plan when the provider is absent or returns garbage.
pub async fn plan_agents(
    intel: Option<&dyn IntelProvider>,
    query: &str,
    study_type: StudyType,
) -> Vec<ResearchAgent> {
    let planned = match intel {
        Some(provider) if provider.is_configured() => {
            match decompose_via_llm(provider, query, study_type).await {
                Ok(planned) if !planned.is_empty() => planned,
                Ok(_) => {
                    warn!("decomposition returned no agents, using default plan");
                    default_plan(query, study_type)
                }
                Err(err) => {
                    warn!(%err, "decomposition failed, using default plan");
                    default_plan(query, study_type)
                }
            }
        }
        _ => default_plan(query, study_type),
    };

    let deduped = dedup_by_similarity(planned);
    debug!(agents = deduped.len(), "plan ready");
    deduped
        .into_iter()
        .map(|p| {
            ResearchAgent::queued(
                Uuid::new_v4().to_string(),
                p.name,
                p.query,
                p.category.unwrap_or_else(|| "general".to_string()),
            )
        })
        .collect()
}

async fn decompose_via_llm(
    provider: &dyn IntelProvider,
    query: &str,
    study_type: StudyType,
) -> sonar_core::SonarResult<Vec<PlannedAgent>> {
    let prompt = format!(
        "Decompose this {} research request into 3-5 focused research agents. \
         Return a JSON array of {{\"name\", \"query\", \"category\"}}.\n\nRequest: {query}",
        study_type.as_str().replace('-', " ")
    );
    let reply = provider.fetch(&prompt, Some(study_type), None).await?;
    Ok(parse_lenient::<Vec<PlannedAgent>>(&reply.content)?.value)
}

/// Study-shaped default plan used when no LLM is available.
fn default_plan(query: &str, study_type: StudyType) -> Vec<PlannedAgent> {
    let mut planned = vec![
        PlannedAgent {
            name: "Market overview".to_string(),
            query: format!("{query} market overview and demand outlook"),
            category: Some("market".to_string()),
        },
        PlannedAgent {
            name: "Supply landscape".to_string(),
            query: format!("{query} key suppliers and capacity"),
            category: Some("supply".to_string()),
        },
        PlannedAgent {
            name: "Pricing and cost".to_string(),
            query: format!("{query} pricing trends and cost drivers"),
            category: Some("pricing".to_string()),
        },
    ];
    planned.push(match study_type {
        StudyType::RiskAssessment | StudyType::SupplierAssessment => PlannedAgent {
            name: "Risk factors".to_string(),
            query: format!("{query} risks, disruptions and mitigation"),
            category: Some("risk".to_string()),
        },
        _ => PlannedAgent {
            name: "Regulation and trade".to_string(),
            query: format!("{query} regulation, tariffs and trade flows"),
            category: Some("regulation".to_string()),
        },
    });
    planned
}

/// Drop agents whose query is near-identical to an already-kept one.
fn dedup_by_similarity(planned: Vec<PlannedAgent>) -> Vec<PlannedAgent> {
    let mut kept: Vec<PlannedAgent> = Vec::new();
    for candidate in planned {
        let duplicate = kept
            .iter()
            .any(|k| jaccard(&k.query, &candidate.query) > JACCARD_DEDUP_THRESHOLD);
        if duplicate {
            debug!(query = %candidate.query, "dropping near-duplicate agent");
        } else {
            kept.push(candidate);
        }
    }
    kept
}

/// Token-set Jaccard similarity over lowercased alphanumeric words.
fn jaccard(a: &str, b: &str) -> f64 {
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() && tb.is_empty() {
        return 1.0;
    }
    let intersection = ta.intersection(&tb).count() as f64;
    let union = ta.union(&tb).count() as f64;
    intersection / union
}

fn tokens(text: &str) -> std::collections::HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}
