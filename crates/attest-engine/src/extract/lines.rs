//! Line-oriented claim format.
//!
//! ```text
//! ## Authentication
//! - [critical] [security] Passwords are hashed with bcrypt
//! 2. [untestable] The login page is pleasant to use
//! ```
//!
//! When a response contains at least one bullet or numbered line, only those
//! lines are claims and surrounding prose is ignored. Otherwise every
//! non-heading line is a candidate.

use std::sync::LazyLock;

use regex::Regex;

use attest_core::models::{ClaimCategory, Severity};

use super::{Fragment, ParsedFragments};

static TAG_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[([A-Za-z][A-Za-z _\-]*)\]").ok());

enum Tag {
    Severity(Severity),
    Category(ClaimCategory),
    Untestable,
    Testable,
    Unknown,
}

fn classify_tag(raw: &str) -> Tag {
    let key = raw.trim().to_ascii_lowercase();
    match key.as_str() {
        "untestable" | "non-testable" | "not testable" | "not-testable" => return Tag::Untestable,
        "testable" => return Tag::Testable,
        _ => {}
    }
    if let Ok(severity) = key.parse::<Severity>() {
        return Tag::Severity(severity);
    }
    if let Ok(category) = key.parse::<ClaimCategory>() {
        return Tag::Category(category);
    }
    Tag::Unknown
}

/// Parse the line format. Never fails; unusable lines surface later as
/// dropped fragments.
pub fn parse(raw: &str) -> ParsedFragments {
    let mut parsed = ParsedFragments::default();
    let mut section = String::new();
    let mut bullets: Vec<(String, String)> = Vec::new();
    let mut prose: Vec<(String, String)> = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("```") {
            continue;
        }
        if let Some(heading) = trimmed.strip_prefix('#') {
            section = heading.trim_start_matches('#').trim().to_string();
            continue;
        }
        match strip_bullet(trimmed) {
            Some(body) => bullets.push((section.clone(), body.to_string())),
            None => prose.push((section.clone(), trimmed.to_string())),
        }
    }

    let candidates = if bullets.is_empty() { prose } else { bullets };
    for (section, body) in candidates {
        let fragment = apply_tags(Fragment::new(section, body), &mut parsed.unknown_tags);
        parsed.fragments.push(fragment);
    }
    parsed
}

/// Return the body of a bullet or numbered line.
fn strip_bullet(line: &str) -> Option<&str> {
    let body = if let Some(rest) = ["- ", "* ", "+ ", "• "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
    {
        rest
    } else {
        let digits = line.chars().take_while(char::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let rest = &line[digits..];
        let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
        if !rest.starts_with(' ') {
            return None;
        }
        rest
    };
    let body = body.trim_start();
    // task-list checkboxes
    let body = ["[ ] ", "[x] ", "[X] "]
        .iter()
        .find_map(|box_| body.strip_prefix(box_))
        .unwrap_or(body);
    Some(body.trim())
}

/// Lift recognized `[tag]`s into the fragment and strip them from the text.
fn apply_tags(mut fragment: Fragment, unknown: &mut usize) -> Fragment {
    let Some(re) = TAG_RE.as_ref() else {
        return fragment;
    };
    let mut text = String::with_capacity(fragment.text.len());
    let mut last = 0;
    for caps in re.captures_iter(&fragment.text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let recognized = match classify_tag(inner.as_str()) {
            Tag::Severity(s) => {
                fragment.severity = s;
                true
            }
            Tag::Category(c) => {
                fragment.category = c;
                true
            }
            Tag::Untestable => {
                fragment.testable = false;
                true
            }
            Tag::Testable => true,
            Tag::Unknown => {
                *unknown += 1;
                false
            }
        };
        if recognized {
            text.push_str(&fragment.text[last..whole.start()]);
            last = whole.end();
        }
    }
    text.push_str(&fragment.text[last..]);
    fragment.text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_and_tags() {
        let raw = "Here is what I found:\n\
                   ## Authentication\n\
                   - [critical] [security] Passwords are hashed with bcrypt\n\
                   2) [untestable] The login page is pleasant to use\n\
                   ### Storage\n\
                   * Backups run nightly [operational]\n";
        let parsed = parse(raw);
        assert_eq!(parsed.fragments.len(), 3);

        let first = &parsed.fragments[0];
        assert_eq!(first.section, "Authentication");
        assert_eq!(first.severity, Severity::Critical);
        assert_eq!(first.category, ClaimCategory::Security);
        assert_eq!(first.text, "Passwords are hashed with bcrypt");

        assert!(!parsed.fragments[1].testable);
        assert_eq!(parsed.fragments[2].section, "Storage");
        assert_eq!(parsed.fragments[2].category, ClaimCategory::Operational);
        assert_eq!(parsed.fragments[2].text, "Backups run nightly");
    }

    #[test]
    fn unknown_tags_stay_in_text() {
        let parsed = parse("- [wip] Cache entries expire after ten minutes");
        assert_eq!(parsed.unknown_tags, 1);
        assert!(parsed.fragments[0].text.starts_with("[wip]"));
    }

    #[test]
    fn prose_only_when_no_bullets() {
        let parsed = parse("The API validates every payload\nErrors carry request ids\n");
        assert_eq!(parsed.fragments.len(), 2);
        assert_eq!(parsed.fragments[1].text, "Errors carry request ids");
    }

    #[test]
    fn numbered_requires_separator() {
        assert_eq!(strip_bullet("12. Twelve things"), Some("Twelve things"));
        assert_eq!(strip_bullet("2024 was a year"), None);
        assert_eq!(strip_bullet("- [ ] Pending item"), Some("Pending item"));
    }
}
