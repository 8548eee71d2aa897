// Not every test file will use every function.
#![allow(dead_code)]

use glam::{Vec2, Vec3};
use particle_engine::{GestureSignal, ParticleEngine, Rgb, Shape, SimulationConfig};

pub const FRAME: f32 = 1.0 / 60.0;

pub fn closed_fist() -> GestureSignal {
    GestureSignal::held(0.0, Vec2::ZERO, 0.5)
}

pub fn open_hand() -> GestureSignal {
    GestureSignal::held(1.0, Vec2::ZERO, 0.5)
}

pub fn engine(shape: Shape, color: u32, count: usize, seed: u64) -> (ParticleEngine, SimulationConfig) {
    let config = SimulationConfig::default()
        .with_shape(shape)
        .with_color(Rgb::from_u32(color))
        .with_particle_count(count);
    let engine = ParticleEngine::seeded(config.clone(), seed).unwrap();
    (engine, config)
}

pub fn run(engine: &mut ParticleEngine, config: &SimulationConfig, signal: &GestureSignal, frames: usize) {
    for _ in 0..frames {
        engine.step(FRAME, signal, config);
    }
}

pub fn mean_distance_to_targets(engine: &ParticleEngine) -> f32 {
    let total: f32 = engine
        .positions()
        .iter()
        .zip(engine.targets())
        .map(|(p, t)| p.distance(*t))
        .sum();
    total / engine.particle_count() as f32
}

pub fn within_box(p: Vec3, center: Vec3, half: f32) -> bool {
    (p - center).abs().max_element() <= half
}
