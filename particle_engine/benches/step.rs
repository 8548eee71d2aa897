//! Frame-step throughput.
//!
//! Run with: `cargo bench -p particle_engine`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use particle_engine::{GestureSignal, ParticleEngine, Shape, SimulationConfig};

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for shape in Shape::ALL {
        for (label, pinch) in [("closed", 0.0f32), ("open", 1.0)] {
            let config = SimulationConfig::default().with_shape(shape);
            let Ok(mut engine) = ParticleEngine::seeded(config.clone(), 1) else {
                continue;
            };
            let signal = GestureSignal::held(pinch, Vec2::new(0.2, -0.1), 0.5);
            group.bench_with_input(
                BenchmarkId::new(shape.name(), label),
                &signal,
                |b, signal| b.iter(|| black_box(engine.step(1.0 / 60.0, signal, &config))),
            );
        }
    }

    group.finish();
}

fn bench_shape_change(c: &mut Criterion) {
    let base = SimulationConfig::default();
    let Ok(mut engine) = ParticleEngine::seeded(base.clone(), 2) else {
        return;
    };
    let configs = [base.clone().with_shape(Shape::Heart), base];
    let mut i = 0;
    c.bench_function("shape_change_24k", |b| {
        b.iter(|| {
            i = (i + 1) % configs.len();
            black_box(engine.apply_changes(&configs[i]))
        })
    });
}

criterion_group!(benches, bench_step, bench_shape_change);
criterion_main!(benches);
