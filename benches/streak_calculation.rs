//! Streak and series benchmarks.
//!
//! Covers the pure streak functions over histories of increasing size and a
//! summary read through the SQLite ledger.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dotoday::adapters::sqlite::{create_migrated_test_pool, SqliteCompletionLedger, SqliteGoalRepository};
use dotoday::domain::models::{DailySeries, Goal};
use dotoday::domain::ports::{CompletionLedger, FixedClock, GoalRepository};
use dotoday::services::streak_calculator::{current_streak_as_of, longest_streak_of, streak_runs};
use dotoday::services::StreakCalculator;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

/// Newest-first history of `days` days with every seventh day skipped.
fn history(days: u64) -> Vec<NaiveDate> {
    (0..days)
        .filter(|n| n % 7 != 3)
        .map(|n| today().checked_sub_days(Days::new(n)).unwrap())
        .collect()
}

fn bench_streak_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("streak/pure");

    for days in [30u64, 365, 3650] {
        let dates = history(days);

        group.bench_with_input(BenchmarkId::new("runs", days), &dates, |b, dates| {
            b.iter(|| streak_runs(black_box(dates)));
        });
        group.bench_with_input(BenchmarkId::new("current", days), &dates, |b, dates| {
            b.iter(|| current_streak_as_of(black_box(dates), today()));
        });
        group.bench_with_input(BenchmarkId::new("longest", days), &dates, |b, dates| {
            b.iter(|| longest_streak_of(black_box(dates)));
        });
    }

    group.finish();
}

fn bench_daily_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("streak/series");

    for window in [7u32, 365, 3660] {
        let counts: BTreeMap<NaiveDate, u32> = history(u64::from(window) + 1)
            .into_iter()
            .map(|d| (d, 1))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(window), &counts, |b, counts| {
            b.iter(|| {
                let series = DailySeries::new(today(), window, black_box(counts.clone())).unwrap();
                series.iter().filter(|day| day.present).count()
            });
        });
    }

    group.finish();
}

fn bench_summary_from_ledger(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let goal = Goal::new("bench", "bench");
    let goal_id = goal.id;

    let calculator = rt.block_on(async {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteGoalRepository::new(pool.clone()).create(&goal).await.unwrap();
        let ledger = Arc::new(SqliteCompletionLedger::new(pool));
        for date in history(365) {
            ledger.record_completion(goal_id, date, 1).await.unwrap();
        }
        StreakCalculator::new(ledger, Arc::new(FixedClock::new(today())))
    });

    c.bench_function("streak/summary_365", |b| {
        b.to_async(&rt)
            .iter(|| async { calculator.summary(goal_id, 365).await.unwrap() });
    });
}

criterion_group!(
    benches,
    bench_streak_functions,
    bench_daily_series,
    bench_summary_from_ledger
);
criterion_main!(benches);
