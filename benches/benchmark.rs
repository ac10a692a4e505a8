// Performance benchmarks for the reclink pipeline stages
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reclink_core::{BlockingRule, Record, RecordId, RecordSet};
use reclink_model::{ComparisonLevel, ComparisonSpec, LevelTest, LinkageSettings, Linker};
use serde_json::json;

const FIRST_NAMES: &[&str] = &[
    "Jon", "John", "Mary", "Maria", "Pete", "Peter", "Anna", "Anne", "Carl", "Karl",
];
const SURNAMES: &[&str] = &[
    "Smith", "Smyth", "Jones", "Jonas", "Brown", "Browne", "Taylor", "Tailor",
];

fn settings() -> LinkageSettings {
    LinkageSettings::new(
        0.001,
        vec![BlockingRule::on_field("dob")],
        vec![
            ComparisonSpec::new(
                "name",
                vec![
                    ComparisonLevel::new("exact", LevelTest::Exact, 0.7, 0.001),
                    ComparisonLevel::new(
                        "close",
                        LevelTest::JaroWinkler { at_least: 0.9 },
                        0.2,
                        0.01,
                    ),
                    ComparisonLevel::new("other", LevelTest::Else, 0.1, 0.989),
                ],
            ),
            ComparisonSpec::new(
                "dob",
                vec![
                    ComparisonLevel::new("exact", LevelTest::Exact, 0.95, 0.01),
                    ComparisonLevel::new("other", LevelTest::Else, 0.05, 0.99),
                ],
            ),
        ],
    )
}

fn generate_records(count: usize) -> RecordSet {
    let mut rng = StdRng::seed_from_u64(42);
    let rows = (0..count)
        .map(|i| {
            let name = format!(
                "{} {}",
                FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())],
                SURNAMES[rng.random_range(0..SURNAMES.len())]
            );
            // ~25 records per dob block
            let dob = format!("19{:02}-01-01", rng.random_range(0..count.max(1) / 25 + 1));
            Record::new(RecordId::Integer(i as u64), json!({"name": name, "dob": dob}))
        })
        .collect();
    RecordSet::from_records(rows).unwrap()
}

fn benchmark_score_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_pairs");
    let linker = Linker::new(settings()).unwrap();

    for size in [100, 1000, 5000].iter() {
        let records = generate_records(*size);
        group.bench_with_input(BenchmarkId::new("reclink", size), size, |b, _| {
            b.iter(|| {
                let edges = linker.score_pairs(black_box(&records)).unwrap();
                black_box(edges)
            });
        });
    }

    group.finish();
}

fn benchmark_deduplicate(c: &mut Criterion) {
    let mut group = c.benchmark_group("deduplicate");
    let linker = Linker::new(settings()).unwrap();

    for size in [100, 1000, 5000].iter() {
        let records = generate_records(*size);
        group.bench_with_input(BenchmarkId::new("reclink", size), size, |b, _| {
            b.iter(|| {
                let output = linker.deduplicate(black_box(&records)).unwrap();
                black_box(output)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_score_pairs, benchmark_deduplicate);
criterion_main!(benches);
