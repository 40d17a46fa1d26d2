//! Benchmarks for race normalization and backtest scoring

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use form_backtest::analysis::{normalize_race, Backtester};
use form_backtest::config::AnalysisConfig;
use form_backtest::race::{AttributeTag, HorseRecord, RaceRecord, TableRow};
use uuid::Uuid;

fn sample_race(race_id: usize, runners: usize) -> RaceRecord {
    let horses = (1..=runners)
        .map(|card| {
            let mut row = TableRow::new();
            row.insert("TAB".to_string(), card.to_string());
            for (i, tag) in AttributeTag::PREDICTORS.iter().enumerate() {
                let value = (card * 7 + i * 13) % 97 + 1;
                row.insert(tag.key().to_string(), value.to_string());
            }
            let mut horse = HorseRecord::from_row(row, "TAB");
            horse.finishing_position = card as u32;
            horse
        })
        .collect();

    let mut race = RaceRecord::new(race_id.to_string(), None, Uuid::nil());
    race.set_field(horses);
    race
}

fn benchmark_normalize_race(c: &mut Criterion) {
    let race = sample_race(1, 12);

    c.bench_function("normalize_race_12_runners", |b| {
        b.iter(|| normalize_race(black_box(&race), &AttributeTag::PREDICTORS))
    });
}

fn benchmark_backtest(c: &mut Criterion) {
    let backtester = Backtester::new(AnalysisConfig::default());
    let races: Vec<RaceRecord> = (0..500).map(|id| sample_race(id, 9 + id % 6)).collect();

    c.bench_function("backtest_500_races", |b| {
        b.iter(|| backtester.run(black_box(&races)))
    });
}

criterion_group!(benches, benchmark_normalize_race, benchmark_backtest);
criterion_main!(benches);
