//! Lenient parsing for near-JSON LLM output.
//!
//! LLMs frequently wrap JSON in code fences, leave trailing commas, or use
//! single quotes. The repair pipeline is: strip fences → locate the first
//! balanced JSON value → fix trailing commas and single-quoted strings →
//! parse. Any repair counts as a soft failure and is surfaced on the result
//! so callers can log it.

use serde::de::DeserializeOwned;
use sonar_core::errors::{ProviderError, SonarResult};

/// A parsed value plus whether any repair step had to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired<T> {
    pub value: T,
    pub repaired: bool,
}

/// Parse `raw` into `T`, repairing if necessary.
pub fn parse_lenient<T: DeserializeOwned>(raw: &str) -> SonarResult<Repaired<T>> {
    // Fast path: it is already valid JSON.
    if let Ok(value) = serde_json::from_str::<T>(raw) {
        return Ok(Repaired {
            value,
            repaired: false,
        });
    }

    let stripped = strip_code_fences(raw);
    let candidate = first_balanced_json(stripped).unwrap_or(stripped);
    let fixed = repair_quotes_and_commas(candidate);

    serde_json::from_str::<T>(&fixed)
        .map(|value| Repaired {
            value,
            repaired: true,
        })
        .map_err(|e| {
            ProviderError::MalformedOutput {
                reason: format!("unrepairable JSON: {e}"),
            }
            .into()
        })
}

/// Drop Markdown code fences, keeping their interior.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string ("json", "javascript", ...).
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    body.rsplit_once("```").map(|(b, _)| b.trim()).unwrap_or(body.trim())
}

/// Find the first balanced `{...}` or `[...]` span, respecting strings.
fn first_balanced_json(text: &str) -> Option<&str> {
    let start = text.find(|c| c == '{' || c == '[')?;
    let bytes = text.as_bytes();
    let open = bytes[start] as char;
    let close = if open == '{' { '}' } else { ']' };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Replace single-quoted strings with double-quoted ones and drop trailing
/// commas before a closing bracket. Operates outside double-quoted strings
/// only.
fn repair_quotes_and_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_double = false;
    let mut in_single = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_double {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_double = false;
            }
            continue;
        }
        if in_single {
            if escaped {
                out.push(c);
                escaped = false;
            } else if c == '\\' {
                out.push(c);
                escaped = true;
            } else if c == '\'' {
                out.push('"');
                in_single = false;
            } else if c == '"' {
                out.push('\\');
                out.push('"');
            } else {
                out.push(c);
            }
            continue;
        }
        match c {
            '"' => {
                in_double = true;
                out.push(c);
            }
            '\'' => {
                in_single = true;
                out.push('"');
            }
            ',' => {
                // Trailing comma: next non-whitespace is a closer.
                let mut lookahead = chars.clone();
                let mut next_meaningful = None;
                for la in lookahead.by_ref() {
                    if !la.is_whitespace() {
                        next_meaningful = Some(la);
                        break;
                    }
                }
                if matches!(next_meaningful, Some('}') | Some(']')) {
                    // Drop the comma.
                } else {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Demo {
        name: String,
        count: u32,
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn well_formed_json_never_flags_repair(values in proptest::collection::vec("[a-z ]{0,12}", 0..6)) {
            let raw = serde_json::to_string(&values).unwrap();
            let r: Repaired<Vec<String>> = parse_lenient(&raw).unwrap();
            prop_assert!(!r.repaired);
            prop_assert_eq!(r.value, values);
        }
    }

    #[test]
    fn valid_json_is_untouched() {
        let r: Repaired<Demo> = parse_lenient(r#"{"name":"a","count":1}"#).unwrap();
        assert!(!r.repaired);
        assert_eq!(r.value.count, 1);
    }

    #[test]
    fn code_fences_are_stripped() {
        let raw = "```json\n{\"name\": \"a\", \"count\": 2}\n```";
        let r: Repaired<Demo> = parse_lenient(raw).unwrap();
        assert!(r.repaired);
        assert_eq!(r.value.count, 2);
    }

    #[test]
    fn prose_around_json_is_ignored() {
        let raw = "Here is the result you asked for:\n{\"name\": \"a\", \"count\": 3}\nHope that helps!";
        let r: Repaired<Demo> = parse_lenient(raw).unwrap();
        assert_eq!(r.value.count, 3);
    }

    #[test]
    fn trailing_commas_and_single_quotes_are_repaired() {
        let raw = "{'name': 'a', 'count': 4,}";
        let r: Repaired<Demo> = parse_lenient(raw).unwrap();
        assert!(r.repaired);
        assert_eq!(r.value, Demo { name: "a".to_string(), count: 4 });
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_the_scanner() {
        let raw = "noise {\"name\": \"with } brace\", \"count\": 5} tail";
        let r: Repaired<Demo> = parse_lenient(raw).unwrap();
        assert_eq!(r.value.name, "with } brace");
    }

    #[test]
    fn hopeless_input_is_an_error() {
        let err = parse_lenient::<Demo>("no json here at all");
        assert!(err.is_err());
    }
}
