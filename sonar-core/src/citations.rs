//! Citation id grammar and extraction.
//!
//! A citation marker is `[` (`B` | `W`)? digits `]`. Ids without a prefix
//! are legacy and resolve by 1-based position in the source list.

use regex::Regex;
use std::sync::LazyLock;

/// Matches every citation marker in a block of markdown.
static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([BW]?)(\d+)\]").expect("static pattern"));

/// Extract the citation ids used in `content`, in first-use order, without
/// duplicates.
pub fn extract_citation_ids(content: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for cap in CITATION_RE.captures_iter(content) {
        let id = format!("{}{}", &cap[1], &cap[2]);
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Remove every citation marker whose id fails `keep`. Markers that pass
/// are left byte-for-byte intact, so a second pass is a no-op. Runs to a
/// fixpoint: a removal that uncovers a nested marker gets reprocessed.
pub fn strip_markers<F: Fn(&str) -> bool>(content: &str, keep: F) -> String {
    let mut current = content.to_string();
    loop {
        let next = CITATION_RE
            .replace_all(&current, |cap: &regex::Captures| {
                let id = format!("{}{}", &cap[1], &cap[2]);
                if keep(&id) {
                    cap[0].to_string()
                } else {
                    String::new()
                }
            })
            .into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Split an id into its prefix (`B`, `W`, or empty for legacy) and number.
pub fn parse_citation_id(id: &str) -> Option<(char, u32)> {
    let (prefix, digits) = match id.chars().next() {
        Some(c @ ('B' | 'W')) => (c, &id[1..]),
        Some(c) if c.is_ascii_digit() => ('\0', id),
        _ => return None,
    };
    digits.parse::<u32>().ok().map(|n| (prefix, n))
}

/// Reference ordering: all `B#` before all `W#`, ascending numerically
/// within each partition. Legacy unprefixed ids sort last.
pub fn sort_references(ids: &mut [String]) {
    ids.sort_by_key(|id| match parse_citation_id(id) {
        Some(('B', n)) => (0u8, n),
        Some(('W', n)) => (1u8, n),
        Some((_, n)) => (2u8, n),
        None => (3u8, u32::MAX),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_is_ordered_and_deduplicated() {
        let content = "Demand grew 12% [B1], driven by EV adoption [W2][B1] and \
                       subsidies [W1].";
        assert_eq!(extract_citation_ids(content), vec!["B1", "W2", "W1"]);
    }

    #[test]
    fn legacy_unprefixed_ids_are_recognized() {
        assert_eq!(extract_citation_ids("fact [3]"), vec!["3"]);
        assert_eq!(parse_citation_id("3"), Some(('\0', 3)));
    }

    #[test]
    fn strip_markers_drops_only_rejected_ids() {
        let content = "grew [B1] fast [W9].";
        let out = strip_markers(content, |id| id == "B1");
        assert_eq!(out, "grew [B1] fast .");
        // Idempotent.
        assert_eq!(strip_markers(&out, |id| id == "B1"), out);
    }

    #[test]
    fn strip_reprocesses_uncovered_nested_markers() {
        assert_eq!(strip_markers("[W[W7]7]", |_| false), "");
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn every_extracted_id_parses(content in ".{0,200}") {
            for id in extract_citation_ids(&content) {
                prop_assert!(parse_citation_id(&id).is_some(), "unparseable id {id}");
            }
        }

        #[test]
        fn stripping_everything_leaves_no_markers(content in ".{0,200}") {
            let stripped = strip_markers(&content, |_| false);
            prop_assert!(extract_citation_ids(&stripped).is_empty());
        }
    }

    #[test]
    fn references_sort_b_before_w() {
        let mut ids = vec![
            "W2".to_string(),
            "B10".to_string(),
            "W1".to_string(),
            "B2".to_string(),
        ];
        sort_references(&mut ids);
        assert_eq!(ids, vec!["B2", "B10", "W1", "W2"]);
    }
}
