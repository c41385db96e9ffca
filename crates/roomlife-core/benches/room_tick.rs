use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use roomlife_core::config::SceneSpec;
use roomlife_core::prelude::*;

fn household() -> SimulationEngine {
    let mut engine = SimulationEngine::new();
    if let Err(e) = engine.build_scene(&SceneSpec::household()) {
        panic!("household scene failed to build: {}", e);
    }
    engine
}

/// Household with extra pets to stress the furniture queries
fn crowded(pets: usize) -> SimulationEngine {
    let mut engine = household();
    for i in 0..pets {
        let angle = i as f32 * std::f32::consts::TAU / pets as f32;
        engine.spawn_pet(Vec3::ground(2.0 * angle.cos(), 2.0 * angle.sin()));
    }
    engine
}

fn bench_room_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("room_tick");

    group.bench_function("household_one_second", |b| {
        b.iter_batched(
            household,
            |mut engine| {
                for _ in 0..20 {
                    engine.update(black_box(0.05));
                }
                engine
            },
            BatchSize::SmallInput,
        )
    });

    for pets in [8, 32] {
        group.bench_function(format!("crowded_{}_pets_one_second", pets), |b| {
            b.iter_batched(
                || crowded(pets),
                |mut engine| {
                    for _ in 0..20 {
                        engine.update(black_box(0.05));
                    }
                    engine
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.bench_function("background_catch_up_hour", |b| {
        b.iter_batched(
            household,
            |mut engine| {
                engine.advance(black_box(3600.0), TickRegime::Background);
                engine
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_room_tick);
criterion_main!(benches);
