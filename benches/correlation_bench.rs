//! Benchmarks for correlation statistics and context scoring
//!
//! Run with: cargo bench

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use synergy_engine::context::score_opportunity;
use synergy_engine::patterns::stats;
use synergy_engine::{ContextSnapshot, EntityInfo, SynergyGenerator, SynergyOpportunity};

/// Two entities changing every `step` minutes over 90 days, the second
/// lagging by a minute
fn create_timestamps(step_minutes: i64) -> (Vec<DateTime<Utc>>, Vec<DateTime<Utc>>) {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let count = 90 * 24 * 60 / step_minutes;

    let first: Vec<_> = (0..count)
        .map(|i| start + Duration::minutes(i * step_minutes))
        .collect();
    let second = first.iter().map(|t| *t + Duration::minutes(1)).collect();
    (first, second)
}

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_stats");

    for step in [60, 15, 5] {
        let (ts1, ts2) = create_timestamps(step);
        let start = ts1[0];
        let end = start + Duration::days(90);

        group.throughput(Throughput::Elements((ts1.len() + ts2.len()) as u64));

        group.bench_function(format!("co_occurrence_every_{}m", step), |b| {
            b.iter(|| stats::co_occurrence_correlation(black_box(&ts1), black_box(&ts2)))
        });

        group.bench_function(format!("seasonal_every_{}m", step), |b| {
            b.iter(|| stats::seasonal_pattern(black_box(&ts1), black_box(&ts2)))
        });

        group.bench_function(format!("weekly_every_{}m", step), |b| {
            b.iter(|| stats::weekly_pattern(black_box(&ts1), black_box(&ts2)))
        });

        group.bench_function(format!("trend_every_{}m", step), |b| {
            b.iter(|| stats::trend(black_box(&ts1), black_box(&ts2), start, end))
        });
    }

    group.finish();
}

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("context_scoring");

    let snapshot = ContextSnapshot::temporal(&Utc.with_ymd_and_hms(2024, 7, 15, 19, 0, 0).unwrap())
        .weather("sunny", Some(31.0))
        .energy(Some(0.22), true)
        .carbon(450.0);
    let opportunity = SynergyOpportunity::new(
        "temp_to_climate:sensor.outdoor+climate.living_room",
        "temp_to_climate",
        vec!["sensor.outdoor".to_string(), "climate.living_room".to_string()],
        0.8,
    );

    group.bench_function("score_opportunity", |b| {
        b.iter(|| score_opportunity(black_box(&opportunity), black_box(&snapshot)))
    });

    let entities: Vec<EntityInfo> = ["weather.home", "sensor.nordpool_kwh", "sensor.grid_carbon_intensity"]
        .into_iter()
        .map(EntityInfo::new)
        .chain((0..50).map(|i| EntityInfo::new(format!("light.room_{}", i))))
        .chain((0..10).map(|i| EntityInfo::new(format!("switch.ev_charger_{}", i))))
        .collect();
    let generator = SynergyGenerator::default();

    group.bench_function("generate_synergies", |b| {
        b.iter(|| generator.generate_context_aware_synergies(black_box(&entities)))
    });

    group.finish();
}

criterion_group!(benches, bench_statistics, bench_scoring);
criterion_main!(benches);
