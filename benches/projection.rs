use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use flowplan_core::{project_plan, Timeline};
use flowplan_domain::{Cadence, Category, Item, Plan, Recurrence};

fn sample_plan(items: usize) -> Plan {
    let recurrences = [
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Every2Weeks,
        Recurrence::Monthly,
        Recurrence::Quarterly,
    ];
    let mut plan = Plan::new("Bench");
    for index in 0..items {
        let category = Category::ALL[index % Category::ALL.len()];
        let start = NaiveDate::from_ymd_opt(2024, 1 + (index % 12) as u32, 1 + (index % 28) as u32)
            .expect("day 28 or earlier is always valid");
        plan.add_item(
            Item::new(category, format!("item {index}"))
                .with_amount(10.0 + index as f64)
                .with_start_date(start)
                .with_recurrence(recurrences[index % recurrences.len()]),
        );
    }
    plan
}

fn bench_project_plan(c: &mut Criterion) {
    let plan = sample_plan(200);
    let mut group = c.benchmark_group("project_plan");
    for cadence in Cadence::ALL {
        let timeline = Timeline::new(cadence, 2025);
        group.bench_with_input(
            BenchmarkId::from_parameter(cadence.key()),
            &timeline,
            |b, timeline| b.iter(|| project_plan(black_box(&plan), black_box(timeline))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_project_plan);
criterion_main!(benches);
