use proptest::prelude::*;

use attest_core::models::{Claim, ClaimCategory, ClaimVerification, Evidence, Severity, Verdict};
use attest_engine::remediation::RemediationPlanner;
use attest_engine::Scorer;

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Low),
        Just(Severity::Medium),
        Just(Severity::High),
        Just(Severity::Critical),
    ]
}

fn arb_verdict() -> impl Strategy<Value = Verdict> {
    prop_oneof![
        Just(Verdict::Pass),
        Just(Verdict::Partial),
        Just(Verdict::Fail),
        Just(Verdict::NotApplicable),
    ]
}

fn build(rows: &[(Severity, Verdict)]) -> (Vec<Claim>, Vec<ClaimVerification>) {
    let claims: Vec<Claim> = rows
        .iter()
        .enumerate()
        .map(|(i, (severity, _))| {
            Claim::new("p", ClaimCategory::Correctness, *severity, format!("property claim {i} holds"))
        })
        .collect();
    let verifications = claims
        .iter()
        .zip(rows)
        .map(|(c, (_, verdict))| {
            let evidence = if *verdict == Verdict::Pass {
                vec![Evidence::new("a.rs", Some(1), "x", 1.0)]
            } else {
                Vec::new()
            };
            ClaimVerification::new(&c.id, *verdict, evidence, "r")
        })
        .collect();
    (claims, verifications)
}

proptest! {
    #[test]
    fn score_and_gap_stay_in_range(rows in prop::collection::vec((arb_severity(), arb_verdict()), 0..40)) {
        let (claims, verifications) = build(&rows);
        let summary = Scorer::default().score(&claims, verifications).unwrap();
        prop_assert!((0.0..=100.0).contains(&summary.compliance_score));
        prop_assert!((0.0..=1.0).contains(&summary.specification_gap));
    }

    #[test]
    fn full_score_iff_nothing_unmet(rows in prop::collection::vec((arb_severity(), arb_verdict()), 0..40)) {
        let (claims, verifications) = build(&rows);
        let summary = Scorer::default().score(&claims, verifications).unwrap();
        let unmet = rows.iter().any(|(_, v)| v.is_unmet());
        prop_assert_eq!(summary.compliance_score == 100.0, !unmet);
        prop_assert_eq!(summary.specification_gap == 0.0, !unmet);
    }

    #[test]
    fn counts_always_add_up(rows in prop::collection::vec((arb_severity(), arb_verdict()), 0..40)) {
        let (claims, verifications) = build(&rows);
        let summary = Scorer::default().score(&claims, verifications).unwrap();
        prop_assert!(summary.counts_consistent());
        prop_assert_eq!(summary.total_claims, rows.len());
    }

    #[test]
    fn remediation_covers_exactly_the_unmet_claims(rows in prop::collection::vec((arb_severity(), arb_verdict()), 0..40)) {
        let (claims, verifications) = build(&rows);
        let summary = Scorer::default().score(&claims, verifications).unwrap();
        let plan = RemediationPlanner::new().plan(&summary);
        prop_assert_eq!(plan.len(), summary.unmet_count());
        for pair in plan.windows(2) {
            prop_assert!(pair[0].severity >= pair[1].severity);
        }
    }
}
