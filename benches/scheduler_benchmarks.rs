use std::collections::BTreeMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use repaso::deck::ingest::parse_questions;
use repaso::engine::mastery::{MasteryEntry, MasteryTracker};
use repaso::engine::scheduler::{QueueScheduler, build_queue};

fn make_tracker(questions: usize) -> MasteryTracker {
    let entries: BTreeMap<usize, MasteryEntry> = (0..questions)
        .map(|i| (i, MasteryEntry::new(1 + (i % 5) as u32)))
        .collect();
    MasteryTracker::from_entries(entries)
}

fn make_csv(rows: usize) -> String {
    let mut csv = String::from(
        "Pregunta,Opción Correcta,Opción Incorrecta 1,Opción Incorrecta 2,Opción Incorrecta 3,Contexto\n",
    );
    for i in 0..rows {
        csv.push_str(&format!(
            "\"Question {i}?\" , \"Answer {i}\",wrong a,wrong b,\"wrong, c\",context {i}\n"
        ));
    }
    csv
}

fn bench_build_queue(c: &mut Criterion) {
    let tracker = make_tracker(1000);
    let mut rng = SmallRng::seed_from_u64(7);

    c.bench_function("build_queue (1000 questions, ~3000 slots)", |b| {
        b.iter(|| build_queue(black_box(&tracker), &mut rng))
    });
}

fn bench_drain(c: &mut Criterion) {
    let tracker = make_tracker(200);

    c.bench_function("scheduler drain (200 questions)", |b| {
        b.iter(|| {
            let mut rng = SmallRng::seed_from_u64(11);
            let mut scheduler = QueueScheduler::default();
            let mut served = 0usize;
            scheduler.build_queue(&tracker, &mut rng);
            while !scheduler.is_empty() {
                scheduler.next(&tracker, &mut rng);
                served += 1;
            }
            served
        })
    });
}

fn bench_parse(c: &mut Criterion) {
    let csv = make_csv(500);

    c.bench_function("parse_questions (500 rows)", |b| {
        b.iter(|| parse_questions(black_box(&csv)))
    });
}

criterion_group!(benches, bench_build_queue, bench_drain, bench_parse);
criterion_main!(benches);
