//! # particle_engine
//!
//! A fixed-size cloud of particles that is pulled onto one of four shapes
//! when the hand closes and set loose by shape-specific force fields when it
//! opens.
//!
//! ```rust
//! use particle_engine::{GestureSignal, ParticleEngine, Shape, SimulationConfig};
//! use glam::Vec2;
//!
//! let config = SimulationConfig::default()
//!     .with_shape(Shape::Heart)
//!     .with_particle_count(500);
//! let mut engine = ParticleEngine::seeded(config.clone(), 42)?;
//!
//! let fist = GestureSignal::held(0.0, Vec2::ZERO, 0.5);
//! for _ in 0..60 {
//!     engine.step(1.0 / 60.0, &fist, &config);
//! }
//! assert_eq!(engine.position_buffer().len(), 3 * 500);
//! # Ok::<(), particle_engine::ConfigError>(())
//! ```
//!
//! ## Modules
//!
//! * [`config`]: [`SimulationConfig`], [`EngineTuning`], [`ConfigError`].
//! * [`forces`]: the per-shape closed/open force table.
//! * [`engine`]: [`ParticleEngine`] and the render-facing types.

pub mod config;
pub mod engine;
pub mod forces;

pub use config::{
    ConfigError, EngineTuning, SimulationConfig, DEFAULT_PARTICLE_COUNT, MAX_PARTICLE_COUNT,
};
pub use engine::{FrameStats, ObjectTransform, ParticleEngine, PointStyle, SyncOutcome};
pub use forces::{force_rule, ClosedRule, Flourish, ForceContext, ForceRule, OpenRule};

pub use hand_signal::{GestureSignal, SmoothedSignal};
pub use shape_field::{Rgb, Shape};
