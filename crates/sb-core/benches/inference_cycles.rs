//! Training-loop throughput on synthetic partially labeled tables.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sb_core::config::Priors;
use sb_core::data::{Dataset, Instance, Label};
use sb_core::inference::{train, TrainOptions};

/// Deterministic synthetic table: a quarter labeled per class, half unlabeled.
fn synthetic(instances: usize, features: usize) -> Dataset {
    let rows = (0..instances)
        .map(|i| {
            let features = (0..features)
                .map(|f| (i * 31 + f * 17) % 7 < 3)
                .collect();
            let label = match i % 4 {
                0 => Label::Known(0),
                1 => Label::Known(1),
                _ => Label::Unknown,
            };
            Instance { features, label }
        })
        .collect();
    Dataset::new(rows).unwrap()
}

fn bench_training(c: &mut Criterion) {
    let priors = Priors::default();
    let options = TrainOptions::default();

    let small = synthetic(64, 8);
    c.bench_function("train_64x8", |b| {
        b.iter(|| train(black_box(&small), &priors, &options).unwrap())
    });

    let medium = synthetic(512, 32);
    c.bench_function("train_512x32", |b| {
        b.iter(|| train(black_box(&medium), &priors, &options).unwrap())
    });
}

criterion_group!(benches, bench_training);
criterion_main!(benches);
