use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion};
use isbn_scheduler::{IsbnScheduler, ScheduleRequest, SchedulerConfig};
use std::hint::black_box;

fn scheduler_with_capacity(capacity: u64) -> IsbnScheduler {
    // in-memory and without per-call saves, so the numbers reflect
    // allocation cost only
    let mut scheduler = IsbnScheduler::new(SchedulerConfig::new().with_persist_on_mutation(false));
    scheduler
        .add_block("978", 0, capacity - 1, "1234", None)
        .expect("bench block must be valid");
    scheduler
}

/// Register scheduling throughput benchmarks.
pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scheduler - Throughput");
    let date = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid bench date");

    for &count in &[100u64, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("schedule", count), &count, |b, &count| {
            b.iter_with_setup(
                || scheduler_with_capacity(count),
                |mut scheduler| {
                    for i in 0..count {
                        let request = ScheduleRequest::new("Bench", format!("book-{i}"), date);
                        black_box(scheduler.schedule(request));
                    }
                    scheduler
                },
            );
        });
    }

    group.bench_function("get_or_assign_existing", |b| {
        let mut scheduler = scheduler_with_capacity(1_000);
        for i in 0..1_000 {
            scheduler.schedule(ScheduleRequest::new("Bench", format!("book-{i}"), date));
        }
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % 1_000;
            let request = ScheduleRequest::new("Rebuilt", format!("book-{i}"), date);
            black_box(scheduler.get_or_assign(request))
        })
    });

    group.bench_function("search_1000", |b| {
        let mut scheduler = scheduler_with_capacity(1_000);
        for i in 0..1_000 {
            scheduler.schedule(ScheduleRequest::new(
                format!("Title number {i}"),
                format!("book-{i}"),
                date,
            ));
        }
        b.iter(|| black_box(scheduler.search(black_box("number 99"))).len())
    });

    group.finish();
}
