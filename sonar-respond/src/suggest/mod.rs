//! Follow-up suggestion engine.
//!
//! A registry of predicate rules is evaluated against the turn context;
//! each session tracks which rules fired recently so suggestions rotate
//! instead of repeating. At most three distinct suggestions are returned,
//! padded from the fixed defaults when the rules yield fewer.

mod rules;

use dashmap::DashMap;
use std::collections::HashMap;

use sonar_core::models::intent::Intent;
use sonar_core::models::suggestion::Suggestion;

pub use rules::default_suggestions;

/// Everything a rule predicate can look at for one turn.
#[derive(Debug, Clone)]
pub struct SuggestionContext {
    pub session_id: String,
    pub intent: Intent,
    /// Result count behind the response (rows, matches, alerts).
    pub result_count: u32,
    pub has_widget: bool,
    pub deep_research_ran: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    turn: u32,
    /// rule id -> turn it last fired on.
    last_fired: HashMap<&'static str, u32>,
}

/// Process-wide engine; one state record per session id.
#[derive(Debug, Default)]
pub struct SuggestionEngine {
    sessions: DashMap<String, SessionState>,
}

impl SuggestionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the rule registry for this turn. Advances the session's turn
    /// counter and records cooldowns for the rules that fire.
    pub fn suggest(&self, ctx: &SuggestionContext) -> Vec<Suggestion> {
        let mut state = self.sessions.entry(ctx.session_id.clone()).or_default();
        state.turn += 1;
        let turn = state.turn;

        let mut out: Vec<Suggestion> = Vec::new();
        for rule in rules::REGISTRY {
            if out.len() == 3 {
                break;
            }
            if !(rule.applies)(ctx) {
                continue;
            }
            if let Some(&fired) = state.last_fired.get(rule.id) {
                if turn - fired <= rule.cooldown {
                    continue;
                }
            }
            let suggestion = (rule.build)(ctx);
            // Distinct texts only, even if two rules render the same line.
            if out.iter().any(|s| s.text == suggestion.text) {
                continue;
            }
            state.last_fired.insert(rule.id, turn);
            out.push(suggestion);
        }

        for fallback in default_suggestions() {
            if out.len() == 3 {
                break;
            }
            if !out.iter().any(|s| s.text == fallback.text) {
                out.push(fallback);
            }
        }
        out
    }

    /// Drop a session's cooldown state.
    pub fn forget_session(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonar_core::models::intent::{ExtractedEntities, IntentCategory};

    fn ctx(session: &str, category: IntentCategory) -> SuggestionContext {
        SuggestionContext {
            session_id: session.to_string(),
            intent: Intent {
                category,
                sub_intent: None,
                confidence: 0.9,
                entities: ExtractedEntities::default(),
                requires_research: false,
                requires_discovery: false,
                requires_handoff: false,
            },
            result_count: 4,
            has_widget: true,
            deep_research_ran: false,
        }
    }

    #[test]
    fn always_returns_exactly_three_distinct() {
        let engine = SuggestionEngine::new();
        let got = engine.suggest(&ctx("s1", IntentCategory::PortfolioOverview));
        assert_eq!(got.len(), 3);
        for i in 0..got.len() {
            for j in (i + 1)..got.len() {
                assert_ne!(got[i].text, got[j].text);
            }
        }
    }

    #[test]
    fn cooldown_rotates_suggestions_within_a_session() {
        let engine = SuggestionEngine::new();
        let first = engine.suggest(&ctx("s2", IntentCategory::SupplierDeepDive));
        let second = engine.suggest(&ctx("s2", IntentCategory::SupplierDeepDive));
        let first_rules: Vec<&str> = first
            .iter()
            .filter(|s| s.rule_id != "default")
            .map(|s| s.rule_id.as_str())
            .collect();
        for s in &second {
            if s.rule_id != "default" {
                assert!(
                    !first_rules.contains(&s.rule_id.as_str()),
                    "rule {} repeated inside its cooldown window",
                    s.rule_id
                );
            }
        }
    }

    #[test]
    fn sessions_are_isolated() {
        let engine = SuggestionEngine::new();
        let a1 = engine.suggest(&ctx("a", IntentCategory::InflationSummary));
        let b1 = engine.suggest(&ctx("b", IntentCategory::InflationSummary));
        assert_eq!(a1, b1);
    }

    #[test]
    fn fallbacks_pad_when_no_rule_matches() {
        let engine = SuggestionEngine::new();
        let mut c = ctx("s3", IntentCategory::Restricted);
        c.result_count = 0;
        c.has_widget = false;
        let got = engine.suggest(&c);
        assert_eq!(got.len(), 3);
        assert!(got.iter().any(|s| s.rule_id == "default"));
    }
}
