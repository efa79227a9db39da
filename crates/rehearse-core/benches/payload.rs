use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rehearse_core::gateway::{parse_evaluation_payload, parse_summary_payload};

const CLEAN: &str = r#"{
  "scores": {"clarity": 8, "technical_or_role_fit": 7, "structure_STAR": 6, "confidence": 9, "brevity": 5},
  "weak_spots": ["STAR_method", "metrics"],
  "strengths": ["ownership"],
  "comments": "Solid example. Quantify the result next time."
}"#;

const FENCED_AND_SLOPPY: &str = "```json\n{\"scores\": {\"clarity\": \"8\", \"confidence\": 7.6, \"brevity\": 14}, \"weak_spots\": \"STAR_method\", \"comments\": 3}\n```";

const SUMMARY: &str = r#"{"summary_text": "Good session.", "weak_spot_topics": ["system_design"], "strength_topics": ["testing"]}"#;

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_evaluation_payload");

    group.bench_function("clean", |b| {
        b.iter(|| parse_evaluation_payload(black_box(CLEAN)))
    });

    group.bench_function("fenced_and_repaired", |b| {
        b.iter(|| parse_evaluation_payload(black_box(FENCED_AND_SLOPPY)))
    });

    group.bench_function("garbage", |b| {
        b.iter(|| parse_evaluation_payload(black_box("I'd rate this answer a 7.")))
    });

    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    c.bench_function("parse_summary_payload", |b| {
        b.iter(|| parse_summary_payload(black_box(SUMMARY)))
    });
}

criterion_group!(benches, bench_evaluation, bench_summary);
criterion_main!(benches);
