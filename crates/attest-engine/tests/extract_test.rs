use attest_core::models::{ClaimCategory, Severity};
use attest_engine::{ClaimRegistry, Extractor};

#[test]
fn json_object_format_with_metadata() {
    let raw = r#"```json
{"claims": [
  {"text": "Refresh tokens are rotated on every use", "severity": "critical", "category": "security", "section": "Auth"},
  {"claim": "The admin dashboard feels responsive", "testable": false},
  {"statement": "Uploads larger than ten megabytes are rejected", "severity": "apocalyptic"},
  {"id": 7},
  42
]}
```"#;
    let extraction = Extractor::default().extract(raw, &ClaimRegistry::new()).unwrap();
    assert_eq!(extraction.claims.len(), 3);
    assert_eq!(extraction.dropped, 2);
    assert_eq!(extraction.unknown_tags, 1);

    let first = &extraction.claims[0];
    assert_eq!(first.severity, Severity::Critical);
    assert_eq!(first.category, ClaimCategory::Security);
    assert_eq!(first.section, "Auth");
    assert!(!extraction.claims[1].testable);
}

#[test]
fn line_format_ignores_prose_around_bullets() {
    let raw = "\
Here are the claims I found:

## Storage
1. [high] [data-privacy] Personal fields are encrypted at rest
2) [ ] Backups run nightly at midnight UTC
- [untestable] [legal] The license permits commercial use
- [wibble] Cache entries expire after five minutes

Let me know if you need more.
";
    let extraction = Extractor::default().extract(raw, &ClaimRegistry::new()).unwrap();
    let texts: Vec<&str> = extraction.claims.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Personal fields are encrypted at rest",
            "Backups run nightly at midnight UTC",
            "The license permits commercial use",
            "[wibble] Cache entries expire after five minutes",
        ]
    );
    assert_eq!(extraction.claims[0].category, ClaimCategory::DataPrivacy);
    assert_eq!(extraction.claims[0].section, "Storage");
    assert!(!extraction.claims[2].testable);
    assert_eq!(extraction.unknown_tags, 1);
}

#[test]
fn registry_dedup_spans_all_previous_iterations() {
    let extractor = Extractor::default();
    let mut registry = ClaimRegistry::new();

    let first = extractor
        .extract("- Passwords are hashed with bcrypt before storage\n", &registry)
        .unwrap();
    registry.merge(first.claims);
    let second = extractor
        .extract("- Audit log records every admin action\n", &registry)
        .unwrap();
    registry.merge(second.claims);
    assert_eq!(registry.len(), 2);

    // Paraphrase of the iteration-1 claim, two iterations later.
    let third = extractor
        .extract(
            "- All passwords are hashed with bcrypt before storage.\n- Audit log records every admin action\n",
            &registry,
        )
        .unwrap();
    assert_eq!(third.new_claims, 0);
    assert_eq!(third.carried_forward, 2);
    assert_eq!(registry.merge(third.claims), 0);
}

#[test]
fn negated_claim_is_a_new_claim() {
    let extractor = Extractor::default();
    let mut registry = ClaimRegistry::new();
    let first = extractor.extract("- User input is validated on submit\n", &registry).unwrap();
    registry.merge(first.claims);

    let negated = extractor
        .extract("- User input is not validated on submit\n", &registry)
        .unwrap();
    assert_eq!(negated.new_claims, 1);
    assert_eq!(registry.merge(negated.claims), 1);
}
