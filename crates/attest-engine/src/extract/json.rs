//! JSON claim format.

use serde_json::Value;

use super::{Fragment, ParsedFragments};

const TEXT_KEYS: &[&str] = &["text", "claim", "assertion", "statement", "description"];

/// Parse a JSON claim list. Returns `None` when `raw` is not JSON, so the
/// caller can fall back to the line format.
pub fn parse(raw: &str) -> Option<ParsedFragments> {
    let body = strip_code_fence(raw.trim());
    if !(body.starts_with('[') || body.starts_with('{')) {
        return None;
    }
    let value: Value = serde_json::from_str(body).ok()?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("claims") {
            Some(Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };

    let mut parsed = ParsedFragments::default();
    for item in items {
        match item {
            Value::String(text) => parsed.fragments.push(Fragment::new("", text)),
            Value::Object(map) => {
                let text = TEXT_KEYS
                    .iter()
                    .find_map(|k| map.get(*k).and_then(Value::as_str));
                let Some(text) = text else {
                    parsed.dropped += 1;
                    continue;
                };
                let mut fragment = Fragment::new(
                    map.get("section").and_then(Value::as_str).unwrap_or_default(),
                    text,
                );
                if let Some(raw) = map.get("category").and_then(Value::as_str) {
                    match raw.parse() {
                        Ok(category) => fragment.category = category,
                        Err(_) => parsed.unknown_tags += 1,
                    }
                }
                if let Some(raw) = map.get("severity").and_then(Value::as_str) {
                    match raw.parse() {
                        Ok(severity) => fragment.severity = severity,
                        Err(_) => parsed.unknown_tags += 1,
                    }
                }
                if let Some(testable) = map.get("testable").and_then(Value::as_bool) {
                    fragment.testable = testable;
                }
                parsed.fragments.push(fragment);
            }
            _ => parsed.dropped += 1,
        }
    }
    Some(parsed)
}

/// Unwrap a ```json fenced block if the whole body is one.
fn strip_code_fence(body: &str) -> &str {
    let Some(rest) = body.strip_prefix("```") else {
        return body;
    };
    let rest = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => return body,
    };
    rest.trim_end()
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(body)
}
