mod common;

use common::*;
use glam::Vec3;
use particle_engine::{GestureSignal, Shape};

#[test]
fn heart_closes_onto_its_targets() {
    // SETUP
    let (mut engine, config) = engine(Shape::Heart, 0xFF0000, 100, 17);
    assert!(mean_distance_to_targets(&engine) > 5.0, "starts scattered");

    // RUN
    run(&mut engine, &config, &closed_fist(), 60);

    // CHECK
    let mean = mean_distance_to_targets(&engine);
    assert!(mean < 0.5, "mean distance to target {}", mean);
    assert!(engine.colors().iter().all(|c| c.r > 0.5 && c.b < 0.4));
}

#[test]
fn shape_change_keeps_buffers_and_damps_velocity() {
    let (mut engine, config) = engine(Shape::Starfield, 0xFFFACD, 400, 23);
    run(&mut engine, &config, &open_hand(), 30);

    let before: Vec<Vec3> = engine.velocities().to_vec();
    assert!(before.iter().any(|v| v.length() > 0.1), "open hand sets particles moving");

    let fireworks = config.clone().with_shape(Shape::Fireworks);
    let outcome = engine.apply_changes(&fireworks);
    assert!(outcome.shape_changed);
    assert!(!outcome.reset_completed);

    assert_eq!(engine.targets().len(), 400);
    assert!(engine.targets().iter().all(|t| t.length() <= 3.0 + 1e-4));
    for (after, before) in engine.velocities().iter().zip(&before) {
        assert!(after.length() <= before.length() * 0.1 + 1e-6);
        if before.length() > 0.0 {
            assert!(after.length() > 0.0, "damped, not zeroed");
        }
    }
}

#[test]
fn shape_change_with_reset_zeroes_velocity() {
    let (mut engine, config) = engine(Shape::Starfield, 0xFFFACD, 400, 29);
    run(&mut engine, &config, &open_hand(), 30);

    engine.request_reset();
    let fireworks = config.clone().with_shape(Shape::Fireworks);
    let outcome = engine.apply_changes(&fireworks);
    assert!(outcome.shape_changed && outcome.reset_completed);

    assert_eq!(engine.targets().len(), 400);
    assert!(engine.velocities().iter().all(|&v| v == Vec3::ZERO));
    for (p, t) in engine.positions().iter().zip(engine.targets()) {
        assert!(within_box(*p, *t, 1.0), "{:?} too far from {:?}", p, t);
    }
}

#[test]
fn shape_change_through_step_reports_it_once() {
    let (mut engine, config) = engine(Shape::Starfield, 0xFFFACD, 50, 31);
    let flower = config.clone().with_shape(Shape::Flower);
    let first = engine.step(FRAME, &GestureSignal::NOT_DETECTED, &flower);
    let second = engine.step(FRAME, &GestureSignal::NOT_DETECTED, &flower);
    assert!(first.shape_changed);
    assert!(!second.shape_changed);
    assert_eq!(engine.config().base_color.to_hex(), "#FF1493");
}

#[test]
fn lost_hand_never_reads_closed() {
    let (mut engine, config) = engine(Shape::Fireworks, 0xFF4500, 200, 37);
    for _ in 0..120 {
        let stats = engine.step(FRAME, &GestureSignal::NOT_DETECTED, &config);
        assert!(!stats.closed);
    }
    assert!(engine.positions().iter().all(|p| p.is_finite()));
}

#[test]
fn open_starfield_stays_contained() {
    let (mut engine, config) = engine(Shape::Starfield, 0xFFFACD, 500, 41);
    run(&mut engine, &config, &open_hand(), 600);
    let max = engine.positions().iter().map(|p| p.length()).fold(0.0f32, f32::max);
    // Push and pull balance near radius 20.
    assert!(max < 22.0, "cloud escaped to radius {}", max);
}

#[test]
fn seeded_runs_are_reproducible() {
    let (mut a, config) = engine(Shape::Flower, 0xFF1493, 64, 99);
    let (mut b, _) = engine(Shape::Flower, 0xFF1493, 64, 99);
    run(&mut a, &config, &open_hand(), 20);
    run(&mut b, &config, &open_hand(), 20);
    assert_eq!(a.position_buffer(), b.position_buffer());
    assert_eq!(a.color_buffer(), b.color_buffer());
}
