//! Intake context: what the slot predicates get to look at.

use sonar_catalog::Catalog;
use sonar_classify::extract_entities;
use sonar_core::models::intent::ExtractedEntities;
use sonar_core::traits::providers::{ChatRole, ChatTurn};

/// How many trailing user turns feed the context.
const HISTORY_WINDOW: usize = 5;

/// The combined evidence available to slot predicates: entities extracted
/// from the query alone and from the query plus recent history. The split
/// drives confidence: a query-only hit is `high`, a history-only hit is
/// `medium`.
#[derive(Debug, Clone)]
pub struct IntakeContext {
    pub query: String,
    /// Last user turns, oldest first.
    pub recent_user_turns: Vec<String>,
    pub from_query: ExtractedEntities,
    pub from_conversation: ExtractedEntities,
}

impl IntakeContext {
    pub fn build(catalog: &Catalog, query: &str, history: &[ChatTurn]) -> Self {
        let mut recent_user_turns: Vec<String> = history
            .iter()
            .rev()
            .filter(|t| t.role == ChatRole::User)
            .map(|t| t.content.clone())
            .take(HISTORY_WINDOW)
            .collect();
        recent_user_turns.reverse();

        let mut from_query = extract_entities(catalog, query);
        let mut combined = query.to_string();
        for turn in &recent_user_turns {
            combined.push('\n');
            combined.push_str(turn);
        }
        let mut from_conversation = extract_entities(catalog, &combined);
        resolve_category(catalog, &mut from_query);
        resolve_category(catalog, &mut from_conversation);

        Self {
            query: query.to_string(),
            recent_user_turns,
            from_query,
            from_conversation,
        }
    }

    /// Query plus recent turns, used for keyword scoring.
    pub fn summary_text(&self) -> String {
        let mut out = self.query.to_lowercase();
        for turn in &self.recent_user_turns {
            out.push('\n');
            out.push_str(&turn.to_lowercase());
        }
        out
    }
}

/// A bare commodity pins down its managed category, so the category slot
/// can prefill the canonical id.
fn resolve_category(catalog: &Catalog, entities: &mut ExtractedEntities) {
    if entities.category_id.is_some() {
        return;
    }
    if let Some(commodity) = &entities.commodity {
        if let Some(cat) = catalog
            .categories()
            .iter()
            .find(|cat| cat.commodities.iter().any(|x| x == commodity))
        {
            entities.category_id = Some(cat.id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_window_keeps_last_five_user_turns() {
        let catalog = Catalog::builtin();
        let history: Vec<ChatTurn> = (0..8)
            .map(|i| ChatTurn::user(format!("user message number {i}")))
            .chain(std::iter::once(ChatTurn::assistant("ignored")))
            .collect();
        let ctx = IntakeContext::build(&catalog, "analyze lithium", &history);
        assert_eq!(ctx.recent_user_turns.len(), 5);
        assert_eq!(ctx.recent_user_turns[0], "user message number 3");
        assert_eq!(ctx.recent_user_turns[4], "user message number 7");
    }

    #[test]
    fn query_and_conversation_extractions_differ() {
        let catalog = Catalog::builtin();
        let history = vec![ChatTurn::user("we talked about lithium suppliers in apac")];
        let ctx = IntakeContext::build(&catalog, "run the study for europe", &history);
        assert!(ctx.from_query.commodity.is_none());
        assert_eq!(ctx.from_conversation.commodity.as_deref(), Some("lithium"));
    }
}
