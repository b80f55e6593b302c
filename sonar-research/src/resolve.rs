//! Meta-query resolution: turning "research this" into the actual topic.

use std::sync::LazyLock;

use regex::Regex;
use sonar_core::constants::MIN_SUBSTANTIVE_QUERY_LEN;
use sonar_core::traits::providers::{ChatRole, ChatTurn};
use tracing::debug;

static META_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^\s*(do\s+|run\s+|start\s+)?(a\s+)?deep\s+research(\s+(on|about|into))?\s*(this|that|it)?\s*(topic)?\s*[.!?]?\s*$",
        r"(?i)^\s*research\s+(this|that|it)(\s+topic)?\s*[.!?]?\s*$",
        r"(?i)^\s*(analyze|investigate|explore)\s+(this|that|it)(\s+topic)?\s*[.!?]?\s*$",
        r"(?i)^\s*(go\s+)?deeper(\s+on\s+(this|that|it))?\s*[.!?]?\s*$",
        r"(?i)^\s*look\s+into\s+(this|that|it)\s*[.!?]?\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

/// Action-verb prefix whose tail is the topic ("research lithium supply").
static VERB_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:research|analyze|investigate|explore|study)\s+(.{3,})$")
        .expect("static pattern")
});

fn is_meta(query: &str) -> bool {
    META_PATTERNS.iter().any(|p| p.is_match(query))
}

/// Resolve the topic a deep-research job should run on.
///
/// A meta-query ("deep research on this") adopts the most recent substantive
/// user turn: walking history backwards, skipping meta-matches and messages
/// shorter than the substantive minimum. A non-meta query with an action
/// verb prefix uses the verb's tail. Everything else passes through.
pub fn resolve_query(raw: &str, history: &[ChatTurn]) -> String {
    if is_meta(raw) {
        for turn in history.iter().rev() {
            if turn.role != ChatRole::User {
                continue;
            }
            let text = turn.content.trim();
            if text.len() < MIN_SUBSTANTIVE_QUERY_LEN || is_meta(text) {
                continue;
            }
            debug!(topic = %text, "meta-query resolved from history");
            return text.to_string();
        }
    } else if let Some(cap) = VERB_TAIL.captures(raw) {
        let tail = cap[1].trim().trim_end_matches(['.', '!', '?']).trim();
        if tail.len() >= 3 && !is_meta(tail) {
            return tail.to_string();
        }
    }
    raw.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_query_adopts_last_substantive_turn() {
        let history = vec![
            ChatTurn::user("how is the lithium market developing in europe"),
            ChatTurn::assistant("…"),
            ChatTurn::user("ok"),
            ChatTurn::user("deep research on this"),
        ];
        assert_eq!(
            resolve_query("analyze this topic", &history),
            "how is the lithium market developing in europe"
        );
    }

    #[test]
    fn meta_query_with_empty_history_falls_back_to_raw() {
        assert_eq!(resolve_query("research this", &[]), "research this");
    }

    #[test]
    fn verb_tail_becomes_the_topic() {
        assert_eq!(
            resolve_query("research lithium market in Europe last 12 months", &[]),
            "lithium market in Europe last 12 months"
        );
    }

    #[test]
    fn plain_queries_pass_through() {
        assert_eq!(
            resolve_query("cobalt supply risk outlook", &[]),
            "cobalt supply risk outlook"
        );
    }
}
