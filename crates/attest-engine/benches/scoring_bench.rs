//! Criterion benchmarks for the score and extract phases.
//!
//! - score 100 / 1000 verifications
//! - extract 200 bullet lines against an empty and a populated registry

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use attest_core::models::{Claim, ClaimCategory, ClaimVerification, Evidence, Severity, Verdict};
use attest_engine::{ClaimRegistry, Extractor, Scorer};

const SEVERITIES: [Severity; 4] = [Severity::Critical, Severity::High, Severity::Medium, Severity::Low];
const VERDICTS: [Verdict; 4] = [Verdict::Pass, Verdict::Partial, Verdict::Fail, Verdict::NotApplicable];

fn fixture(n: usize) -> (Vec<Claim>, Vec<ClaimVerification>) {
    let claims: Vec<Claim> = (0..n)
        .map(|i| {
            Claim::new(
                "bench",
                ClaimCategory::Functionality,
                SEVERITIES[i % 4],
                format!("handler {i} validates request payload field_{i}"),
            )
        })
        .collect();
    let verifications = claims
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let verdict = VERDICTS[i % 4];
            let evidence = if verdict == Verdict::Pass {
                vec![Evidence::new("src/lib.rs", Some(i as u32), "fn handler()", 0.9)]
            } else {
                Vec::new()
            };
            ClaimVerification::new(&c.id, verdict, evidence, "bench")
        })
        .collect();
    (claims, verifications)
}

fn bench_score(c: &mut Criterion) {
    let scorer = Scorer::default();
    for n in [100usize, 1000] {
        let (claims, verifications) = fixture(n);
        c.bench_function(&format!("score_{n}"), |b| {
            b.iter(|| {
                let summary = scorer
                    .score(black_box(&claims), black_box(verifications.clone()))
                    .unwrap();
                black_box(summary.specification_gap)
            })
        });
    }
}

fn bench_extract(c: &mut Criterion) {
    let extractor = Extractor::default();
    let raw: String = (0..200)
        .map(|i| format!("- [medium] [correctness] parser {i} rejects malformed header field_{i}\n"))
        .collect();

    let empty = ClaimRegistry::new();
    c.bench_function("extract_200_fresh", |b| {
        b.iter(|| black_box(extractor.extract(black_box(&raw), &empty).unwrap().claims.len()))
    });

    let mut populated = ClaimRegistry::new();
    populated.merge(extractor.extract(&raw, &empty).unwrap().claims);
    c.bench_function("extract_200_carried_forward", |b| {
        b.iter(|| black_box(extractor.extract(black_box(&raw), &populated).unwrap().claims.len()))
    });
}

criterion_group!(benches, bench_score, bench_extract);
criterion_main!(benches);
