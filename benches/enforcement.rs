//! Benchmarks for the enforcement hot path: spend recording, policy evaluation
//! and tick sweeps over fleets of varying size.

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use spendguard::campaign::{Budgets, InitialState};
use spendguard::clock::ManualClock;
use spendguard::engine::{BudgetEngine, NewBrand, NewCampaign, NewSchedule};
use spendguard::events::EventLog;
use spendguard::ledger::SpendSnapshot;
use spendguard::policy;
use spendguard::store::InMemoryStore;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// An engine with `count` Active campaigns; every other one has a weekday window.
fn create_engine(rt: &Runtime, count: u64) -> BudgetEngine {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 9, 12, 0, 0).unwrap(),
    ));
    let engine = BudgetEngine::new(
        Arc::new(InMemoryStore::new()),
        clock,
        Arc::new(EventLog::new(64)),
    );

    rt.block_on(async {
        engine
            .create_brand(NewBrand {
                id: 1,
                name: "bench".to_string(),
                daily_budget: Decimal::from(1_000_000),
                monthly_budget: Decimal::from(10_000_000),
            })
            .await
            .unwrap();
        for id in 0..count {
            engine
                .create_campaign(NewCampaign {
                    id,
                    brand_id: 1,
                    name: format!("campaign-{}", id),
                    daily_budget: None,
                    monthly_budget: None,
                    initial_state: InitialState::Active,
                })
                .await
                .unwrap();
            if id % 2 == 0 {
                engine
                    .add_schedule(
                        id,
                        NewSchedule {
                            day_of_week: 0,
                            start: "08:00".to_string(),
                            end: "18:00".to_string(),
                            is_active: true,
                        },
                    )
                    .await
                    .unwrap();
            }
        }
    });
    engine
}

fn bench_policy_evaluate(c: &mut Criterion) {
    let budgets = Budgets::new(Decimal::from(100), Decimal::from(3000)).unwrap();
    let snapshot = SpendSnapshot {
        daily_spend: Decimal::new(9999, 2),
        monthly_spend: Decimal::from(1200),
    };

    c.bench_function("policy_evaluate", |b| {
        b.iter(|| black_box(policy::evaluate(black_box(&budgets), black_box(&snapshot))));
    });
}

fn bench_record_spend(c: &mut Criterion) {
    let rt = runtime();
    let engine = create_engine(&rt, 100);
    let amount = Decimal::new(1, 2);

    c.bench_function("record_spend", |b| {
        let mut id = 0;
        b.iter(|| {
            id = (id + 1) % 100;
            rt.block_on(async { black_box(engine.record_spend(id, amount).await.unwrap()) })
        });
    });
}

fn bench_tick_by_fleet_size(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("tick");

    for count in [10, 100, 1000] {
        let engine = create_engine(&rt, count);
        group.bench_with_input(BenchmarkId::new("campaigns", count), &count, |b, _| {
            b.iter(|| rt.block_on(async { black_box(engine.run_tick().await.unwrap()) }));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_policy_evaluate,
    bench_record_spend,
    bench_tick_by_fleet_size
);
criterion_main!(benches);
