//! The particle simulation engine.
//!
//! [`ParticleEngine`] owns every per-particle buffer.  The caller drives it
//! explicitly, once per rendered frame:
//!
//! ```text
//!  step(dt, signal, config)
//!    1. apply_changes     shape → new targets + colors, damp velocities
//!                         color → recolor only
//!                         pending reset → targets + jitter, zero velocity
//!    2. smooth signal     position / pinch / size
//!    3. object transform  rotation follows the hand, scale follows size
//!    4. per particle      leash reset, or force → v += f·dt, v *= friction,
//!                         p += v·dt
//! ```
//!
//! Randomness comes from the injected `R: Rng`; a seeded [`StdRng`] makes
//! whole runs reproducible.

use glam::{Mat3, Vec2, Vec3};
use hand_signal::{GestureSignal, SignalSmoother, SmoothedSignal};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shape_field::{colorize, generate, Rgb};

use crate::config::{ConfigError, EngineTuning, SimulationConfig};
use crate::forces::{force_rule, jitter, ForceContext};

// ════════════════════════════════════════════════════════════════════════════
// Render-facing types
// ════════════════════════════════════════════════════════════════════════════

/// Whole-cloud rotation and uniform scale, applied by the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectTransform {
    /// Euler angles about x then y, radians.
    pub rotation: Vec2,
    pub scale:    f32,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        ObjectTransform { rotation: Vec2::ZERO, scale: 1.0 }
    }
}

impl ObjectTransform {
    pub fn matrix(&self) -> Mat3 {
        Mat3::from_rotation_x(self.rotation.x)
            * Mat3::from_rotation_y(self.rotation.y)
            * Mat3::from_diagonal(Vec3::splat(self.scale))
    }

    /// Object space → world space.
    pub fn apply(&self, p: Vec3) -> Vec3 {
        self.matrix() * p
    }
}

/// Fixed per-particle point size and opacity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointStyle {
    pub size:    f32,
    pub opacity: f32,
}

impl PointStyle {
    pub const DEFAULT: PointStyle = PointStyle { size: 0.025, opacity: 0.8 };
}

impl Default for PointStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What happened during [`ParticleEngine::apply_changes`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub shape_changed:   bool,
    pub recolored:       bool,
    /// True on exactly the frame a requested reset was carried out.
    pub reset_completed: bool,
    /// True the first time a particular different particle count is seen.
    pub count_ignored:   bool,
}

/// Summary of one [`ParticleEngine::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub closed:          bool,
    pub leash_resets:    usize,
    pub shape_changed:   bool,
    pub reset_completed: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleEngine
// ════════════════════════════════════════════════════════════════════════════

pub struct ParticleEngine<R = StdRng> {
    config:          SimulationConfig,
    tuning:          EngineTuning,
    rng:             R,

    positions:       Vec<Vec3>,
    velocities:      Vec<Vec3>,
    targets:         Vec<Vec3>,
    colors:          Vec<Rgb>,

    smoother:        SignalSmoother,
    transform:       ObjectTransform,
    elapsed:         f32,
    reset_pending:   bool,
    /// Last particle count refused by `apply_changes`, so it is logged once.
    rejected_count:  Option<usize>,
    positions_dirty: bool,
    colors_dirty:    bool,
}

impl ParticleEngine<StdRng> {
    /// Reproducible engine.
    pub fn seeded(config: SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    /// Engine seeded from the operating system.
    pub fn from_entropy(config: SimulationConfig) -> Result<Self, ConfigError> {
        Self::new(config, StdRng::from_os_rng())
    }
}

impl<R: Rng> ParticleEngine<R> {
    pub fn new(config: SimulationConfig, rng: R) -> Result<Self, ConfigError> {
        Self::with_tuning(config, EngineTuning::default(), rng)
    }

    /// Validate `config`, then generate targets, colors and the initial
    /// scatter.  Buffer lengths never change after this.
    pub fn with_tuning(
        config:  SimulationConfig,
        tuning:  EngineTuning,
        mut rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let n = config.particle_count;

        let targets   = generate(config.shape, n, &mut rng);
        let colors    = colorize(&targets, config.shape, config.base_color, &mut rng);
        let positions = (0..n).map(|_| jitter(&mut rng, tuning.initial_scatter)).collect();

        info!(
            "particle engine: {} particles, shape {}, color {}",
            n, config.shape, config.base_color
        );

        Ok(ParticleEngine {
            config,
            tuning,
            rng,
            positions,
            velocities:      vec![Vec3::ZERO; n],
            targets,
            colors,
            smoother:        SignalSmoother::default(),
            transform:       ObjectTransform::default(),
            elapsed:         0.0,
            reset_pending:   false,
            rejected_count:  None,
            positions_dirty: true,
            colors_dirty:    true,
        })
    }

    // ── commands ──────────────────────────────────────────────────────────

    /// Snap every particle to its target on the next frame.  One-shot.
    pub fn request_reset(&mut self) {
        self.reset_pending = true;
    }

    pub fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Bring shape and color in line with `config`, then carry out a pending
    /// reset.  Called at the start of every [`step`](Self::step); callable on
    /// its own to apply UI changes between frames.
    pub fn apply_changes(&mut self, config: &SimulationConfig) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        if config.particle_count == self.config.particle_count {
            self.rejected_count = None;
        } else if self.rejected_count != Some(config.particle_count) {
            warn!(
                "particle count is fixed at {}; ignoring request for {}",
                self.config.particle_count, config.particle_count
            );
            self.rejected_count   = Some(config.particle_count);
            outcome.count_ignored = true;
        }

        if config.shape != self.config.shape {
            info!("shape {} → {}", self.config.shape, config.shape);
            self.config.shape      = config.shape;
            self.config.base_color = config.base_color;
            self.targets = generate(config.shape, self.targets.len(), &mut self.rng);
            self.recolor();
            if !self.reset_pending {
                debug!("damping velocities ×{}", self.tuning.shape_change_damping);
                let k = self.tuning.shape_change_damping;
                self.velocities.iter_mut().for_each(|v| *v *= k);
            }
            outcome.shape_changed = true;
            outcome.recolored     = true;
        } else if config.base_color != self.config.base_color {
            debug!("recolor {} → {}", self.config.base_color, config.base_color);
            self.config.base_color = config.base_color;
            self.recolor();
            outcome.recolored = true;
        }

        if self.reset_pending {
            self.reset_to_targets();
            self.reset_pending      = false;
            outcome.reset_completed = true;
        }

        outcome
    }

    fn recolor(&mut self) {
        self.colors = colorize(
            &self.targets,
            self.config.shape,
            self.config.base_color,
            &mut self.rng,
        );
        self.colors_dirty = true;
    }

    fn reset_to_targets(&mut self) {
        let span = self.tuning.reset_jitter;
        for ((p, v), &t) in self
            .positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .zip(self.targets.iter())
        {
            *p = t + jitter(&mut self.rng, span);
            *v = Vec3::ZERO;
        }
        self.positions_dirty = true;
        info!("reset {} particles to their targets", self.positions.len());
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Advance one frame of `dt` seconds.  Negative or non-finite `dt`
    /// counts as zero.
    pub fn step(&mut self, dt: f32, signal: &GestureSignal, config: &SimulationConfig) -> FrameStats {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let sync = self.apply_changes(config);

        let smooth = self.smoother.update(signal, dt);
        self.update_transform(&smooth, dt);

        let closed = smooth.pinch < self.tuning.closed_below;
        self.elapsed += dt;

        let rule     = force_rule(self.config.shape);
        let ctx      = ForceContext { pinch: smooth.pinch, time: self.elapsed };
        let friction = if closed { self.tuning.closed_friction } else { self.tuning.open_friction };
        let leash_sq = self.tuning.leash_distance_sq;
        let leash_jitter = self.tuning.leash_jitter;

        let mut leash_resets = 0;
        for i in 0..self.positions.len() {
            let p = self.positions[i];
            let target = self.targets[i];

            if p.length_squared() > leash_sq {
                self.positions[i]  = target + jitter(&mut self.rng, leash_jitter);
                self.velocities[i] = Vec3::ZERO;
                leash_resets += 1;
                continue;
            }

            let f = rule.force(p, target, closed, &ctx, &mut self.rng);
            let v = (self.velocities[i] + f * dt) * friction;
            self.velocities[i] = v;
            self.positions[i]  = p + v * dt;
        }
        self.positions_dirty = true;

        if leash_resets > 0 {
            debug!("leash reset {} particles", leash_resets);
        }

        FrameStats {
            closed,
            leash_resets,
            shape_changed:   sync.shape_changed,
            reset_completed: sync.reset_completed,
        }
    }

    fn update_transform(&mut self, smooth: &SmoothedSignal, dt: f32) {
        let t    = (dt * self.tuning.rotation_rate).min(1.0);
        let gain = self.tuning.rotation_gain;
        let goal = Vec2::new(-smooth.position.y * gain, smooth.position.x * gain);
        self.transform.rotation = self.transform.rotation.lerp(goal, t);
        self.transform.scale    = 1.0 + smooth.size * self.tuning.scale_gain;
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn positions(&self)  -> &[Vec3] { &self.positions }
    pub fn velocities(&self) -> &[Vec3] { &self.velocities }
    pub fn targets(&self)    -> &[Vec3] { &self.targets }
    pub fn colors(&self)     -> &[Rgb]  { &self.colors }

    /// Positions as `[x0, y0, z0, x1, …]`.
    pub fn position_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Colors as `[r0, g0, b0, r1, …]`.
    pub fn color_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn transform(&self)     -> ObjectTransform   { self.transform }
    pub fn smoothed(&self)      -> SmoothedSignal    { self.smoother.state() }
    pub fn config(&self)        -> &SimulationConfig { &self.config }
    pub fn tuning(&self)        -> &EngineTuning     { &self.tuning }
    pub fn point_style(&self)   -> PointStyle        { PointStyle::DEFAULT }
    pub fn particle_count(&self) -> usize            { self.positions.len() }
    pub fn elapsed(&self)       -> f32               { self.elapsed }

    /// True once after any frame that moved particles.
    pub fn take_positions_dirty(&mut self) -> bool {
        std::mem::take(&mut self.positions_dirty)
    }

    /// True once after a recolor.
    pub fn take_colors_dirty(&mut self) -> bool {
        std::mem::take(&mut self.colors_dirty)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use shape_field::Shape;

    fn closed_hand() -> GestureSignal {
        GestureSignal::held(0.0, Vec2::ZERO, 0.5)
    }

    /// One-particle engine whose smoother already reads a closed hand.
    fn single(shape: Shape) -> (ParticleEngine, SimulationConfig) {
        let cfg = SimulationConfig::default().with_shape(shape).with_particle_count(1);
        let mut engine = ParticleEngine::seeded(cfg.clone(), 5).unwrap();
        for _ in 0..60 {
            engine.step(1.0 / 120.0, &closed_hand(), &cfg);
        }
        assert!(engine.smoothed().pinch < 0.35);
        (engine, cfg)
    }

    #[test]
    fn construction_fills_every_buffer() {
        let cfg = SimulationConfig::default().with_particle_count(321);
        let mut engine = ParticleEngine::seeded(cfg, 1).unwrap();
        assert_eq!(engine.particle_count(), 321);
        assert_eq!(engine.targets().len(), 321);
        assert_eq!(engine.velocities().len(), 321);
        assert_eq!(engine.colors().len(), 321);
        assert_eq!(engine.position_buffer().len(), 963);
        assert_eq!(engine.color_buffer().len(), 963);
        assert!(engine.positions().iter().all(|p| p.abs().max_element() <= 20.0));
        assert!(engine.take_positions_dirty());
        assert!(engine.take_colors_dirty());
        assert!(!engine.take_colors_dirty());
    }

    #[test]
    fn construction_rejects_bad_count() {
        let cfg = SimulationConfig::default().with_particle_count(0);
        assert!(matches!(ParticleEngine::seeded(cfg, 1), Err(ConfigError::NoParticles)));
    }

    #[test]
    fn flat_buffer_layout() {
        let cfg = SimulationConfig::default().with_particle_count(10);
        let engine = ParticleEngine::seeded(cfg, 2).unwrap();
        let flat = engine.position_buffer();
        for (i, p) in engine.positions().iter().enumerate() {
            assert_eq!(&flat[3 * i..3 * i + 3], &[p.x, p.y, p.z]);
        }
        let c = engine.color_buffer();
        assert_eq!(&c[0..3], &[engine.colors()[0].r, engine.colors()[0].g, engine.colors()[0].b]);
    }

    #[test]
    fn leash_resets_runaway_particle() {
        let (mut engine, cfg) = single(Shape::Starfield);
        engine.positions[0]  = Vec3::new(40.0, 20.0, 1.0); // |p|² = 2001
        engine.velocities[0] = Vec3::new(3.0, -2.0, 1.0);
        let stats = engine.step(1.0 / 60.0, &closed_hand(), &cfg);
        assert_eq!(stats.leash_resets, 1);
        assert_eq!(engine.velocities()[0], Vec3::ZERO);
        let offset = engine.positions()[0] - engine.targets()[0];
        assert!(offset.abs().max_element() <= 1.0, "offset {:?}", offset);
    }

    #[test]
    fn particle_at_leash_bound_is_integrated() {
        let (mut engine, cfg) = single(Shape::Starfield);
        engine.positions[0] = Vec3::new(40.0, 20.0, 0.0); // |p|² = 2000
        let stats = engine.step(1.0 / 60.0, &closed_hand(), &cfg);
        assert_eq!(stats.leash_resets, 0);
        assert_ne!(engine.velocities()[0], Vec3::ZERO);
    }

    #[test]
    fn closed_hand_converges_for_every_shape() {
        for shape in Shape::ALL {
            let (mut engine, cfg) = single(shape);
            let target = Vec3::new(0.0, 2.0, 0.0);
            engine.targets[0]    = target;
            engine.positions[0]  = Vec3::new(0.0, 5.0, 0.0);
            engine.velocities[0] = Vec3::ZERO;

            let mut dist = engine.positions()[0].distance(target);
            let mut frames = 0;
            while dist > 0.2 {
                let stats = engine.step(1.0 / 120.0, &closed_hand(), &cfg);
                assert!(stats.closed);
                let next = engine.positions()[0].distance(target);
                assert!(next < dist, "{}: {} → {} at frame {}", shape, dist, next, frames);
                dist = next;
                frames += 1;
                assert!(frames < 2_000, "{} never converged", shape);
            }
        }
    }

    #[test]
    fn closed_starfield_settles_beside_an_off_axis_target() {
        // Swirl (−3z, 0, 3x) against spring 30·(t − p): the particle rests
        // where they balance, 3·|t_xz|/√909 away from the target.
        let (mut engine, cfg) = single(Shape::Starfield);
        let target = Vec3::new(2.0, 0.5, -1.8);
        engine.targets[0]    = target;
        engine.positions[0]  = Vec3::new(-1.0, 3.0, 2.0);
        engine.velocities[0] = Vec3::ZERO;

        for _ in 0..600 {
            engine.step(1.0 / 60.0, &closed_hand(), &cfg);
        }
        let dist = engine.positions()[0].distance(target);
        let expected = 3.0 * Vec2::new(target.x, target.z).length() / 909f32.sqrt();
        assert!((dist - expected).abs() < 0.01, "rest offset {} (expected {})", dist, expected);
        assert!(dist < 0.1 * target.length());
        assert!(engine.velocities()[0].length() < 1e-3);
    }

    #[test]
    fn shape_change_damps_velocity() {
        let cfg = SimulationConfig::default().with_particle_count(50);
        let mut engine = ParticleEngine::seeded(cfg.clone(), 3).unwrap();
        for _ in 0..10 {
            engine.step(1.0 / 60.0, &GestureSignal::NOT_DETECTED, &cfg);
        }
        let before = engine.velocities().to_vec();
        let heart = cfg.clone().with_shape(Shape::Heart);
        let out = engine.apply_changes(&heart);
        assert!(out.shape_changed && out.recolored && !out.reset_completed);
        for (a, b) in engine.velocities().iter().zip(&before) {
            assert!((*a - *b * 0.1).length() < 1e-6);
        }
        assert_eq!(engine.config().shape, Shape::Heart);
    }

    #[test]
    fn color_change_recolors_only() {
        let cfg = SimulationConfig::default().with_particle_count(20);
        let mut engine = ParticleEngine::seeded(cfg.clone(), 4).unwrap();
        engine.step(1.0 / 60.0, &GestureSignal::NOT_DETECTED, &cfg);
        engine.take_colors_dirty();
        let targets = engine.targets().to_vec();
        let velocities = engine.velocities().to_vec();

        let blue = Rgb::from_u32(0x0000FF);
        let out = engine.apply_changes(&cfg.clone().with_color(blue));
        assert_eq!(out, SyncOutcome { recolored: true, ..SyncOutcome::default() });
        assert_eq!(engine.targets(), &targets[..]);
        assert_eq!(engine.velocities(), &velocities[..]);
        assert!(engine.colors().iter().all(|&c| c == blue));
        assert!(engine.take_colors_dirty());
    }

    #[test]
    fn reset_is_one_shot() {
        let cfg = SimulationConfig::default().with_particle_count(30);
        let mut engine = ParticleEngine::seeded(cfg.clone(), 6).unwrap();
        engine.request_reset();
        assert!(engine.reset_pending());
        let first = engine.apply_changes(&cfg);
        assert!(first.reset_completed);
        assert!(engine.velocities().iter().all(|&v| v == Vec3::ZERO));
        for (p, t) in engine.positions().iter().zip(engine.targets()) {
            assert!((*p - *t).abs().max_element() <= 1.0);
        }
        let second = engine.apply_changes(&cfg);
        assert!(!second.reset_completed);
    }

    #[test]
    fn particle_count_is_fixed() {
        let cfg = SimulationConfig::default().with_particle_count(10);
        let mut engine = ParticleEngine::seeded(cfg.clone(), 7).unwrap();
        engine.step(1.0 / 60.0, &GestureSignal::NOT_DETECTED, &cfg.clone().with_particle_count(99));
        assert_eq!(engine.particle_count(), 10);
        assert_eq!(engine.config().particle_count, 10);
    }

    #[test]
    fn refused_count_is_reported_once() {
        let cfg = SimulationConfig::default().with_particle_count(10);
        let mut engine = ParticleEngine::seeded(cfg.clone(), 7).unwrap();
        let eleven = cfg.clone().with_particle_count(11);

        assert!(engine.apply_changes(&eleven).count_ignored);
        for _ in 0..3 {
            engine.step(1.0 / 60.0, &GestureSignal::NOT_DETECTED, &eleven);
            assert!(!engine.apply_changes(&eleven).count_ignored);
        }
        assert_eq!(engine.particle_count(), 10);

        // A new count is reported again; going back to the real one re-arms.
        assert!(engine.apply_changes(&cfg.clone().with_particle_count(12)).count_ignored);
        assert!(!engine.apply_changes(&cfg).count_ignored);
        assert!(engine.apply_changes(&eleven).count_ignored);
    }

    #[test]
    fn transform_follows_hand() {
        let cfg = SimulationConfig::default().with_particle_count(1);
        let mut engine = ParticleEngine::seeded(cfg.clone(), 8).unwrap();
        let hand = GestureSignal::held(1.0, Vec2::new(0.5, -0.25), 1.0);
        for _ in 0..600 {
            engine.step(1.0 / 60.0, &hand, &cfg);
        }
        let t = engine.transform();
        assert!((t.rotation.x - 0.2).abs() < 1e-3, "{:?}", t);
        assert!((t.rotation.y - 0.4).abs() < 1e-3, "{:?}", t);
        assert!((t.scale - 1.8).abs() < 1e-3);
    }

    #[test]
    fn transform_applies_scale_then_rotation() {
        let t = ObjectTransform { rotation: Vec2::new(0.0, std::f32::consts::FRAC_PI_2), scale: 2.0 };
        let p = t.apply(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5, "{:?}", p);
    }

    #[test]
    fn elapsed_and_dt_guard() {
        let cfg = SimulationConfig::default().with_particle_count(1);
        let mut engine = ParticleEngine::seeded(cfg.clone(), 9).unwrap();
        engine.step(0.5, &GestureSignal::NOT_DETECTED, &cfg);
        engine.step(-1.0, &GestureSignal::NOT_DETECTED, &cfg);
        engine.step(f32::NAN, &GestureSignal::NOT_DETECTED, &cfg);
        assert_eq!(engine.elapsed(), 0.5);
        assert!(engine.positions()[0].is_finite());
    }
}
