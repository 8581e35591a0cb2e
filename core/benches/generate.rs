use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use mathtiles_core::*;

fn generate_problems(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for (name, operators) in [("add_sub", Operators::ADD_SUB), ("mul_div", Operators::MUL_DIV)] {
        group.bench_function(name, |b| {
            let mut generator = RandomProblemGenerator::new(0xdec0de);
            b.iter(|| generator.generate(black_box(operators), black_box(7)))
        });
    }
    group.finish();
}

fn configure_grid(c: &mut Criterion) {
    let config = GameConfig::new(12, 4, Operators::MUL_DIV).unwrap();
    let mut session = GameSession::with_clock(config.clone(), ManualClock::new(), 1).unwrap();
    c.bench_function("configure_4x4", |b| {
        b.iter(|| session.configure(black_box(config.clone())).unwrap())
    });
}

criterion_group!(benches, generate_problems, configure_grid);
criterion_main!(benches);
