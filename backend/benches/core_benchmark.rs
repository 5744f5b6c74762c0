use chrono::{Days, NaiveDate};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rapport::models::{InteractionEvent, RecurrenceRule};
use rapport::services::recurrence::expand;
use rapport::services::scoring::score;
use std::hint::black_box;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

fn bench_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("recurrence_expand");

    let rules = [
        ("weekly", RecurrenceRule::weekly(5)),
        ("monthly_day_31", RecurrenceRule::monthly_on_day(31)),
        ("last_friday", RecurrenceRule::monthly_nth_weekday(5, 5)),
    ];

    for (name, rule) in &rules {
        for months in [3u32, 24] {
            group.bench_with_input(BenchmarkId::new(*name, months), &months, |b, &months| {
                b.iter(|| expand(black_box(rule), black_box(today()), months));
            });
        }
    }

    group.finish();
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("relationship_score");
    let kinds = ["call", "visit", "message", "dinner"];

    for count in [10usize, 1_000] {
        let events: Vec<InteractionEvent> = (0..count)
            .map(|i| {
                let date = today()
                    .checked_sub_days(Days::new((i % 120) as u64))
                    .unwrap();
                InteractionEvent::new(date, kinds[i % kinds.len()])
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("events", count), &events, |b, events| {
            b.iter(|| score(black_box(events), black_box(today())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_expand, bench_score);
criterion_main!(benches);
