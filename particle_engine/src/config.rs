//! Simulation configuration and engine tuning constants.

use std::fmt;

use shape_field::{ColorError, ParseShapeError, Rgb, Shape};

pub const DEFAULT_PARTICLE_COUNT: usize = 24_000;

/// Upper bound on `particle_count`; buffers are allocated up front.
pub const MAX_PARTICLE_COUNT: usize = 2_000_000;

// ════════════════════════════════════════════════════════════════════════════
// SimulationConfig
// ════════════════════════════════════════════════════════════════════════════

/// What the UI controls.  `particle_count` is fixed once an engine is built.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub shape:          Shape,
    pub base_color:     Rgb,
    pub particle_count: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            shape:          Shape::Starfield,
            base_color:     Shape::Starfield.default_color(),
            particle_count: DEFAULT_PARTICLE_COUNT,
        }
    }
}

impl SimulationConfig {
    /// Switch shape and adopt that shape's default color.
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self.base_color = shape.default_color();
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.base_color = color;
        self
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Build from user-facing strings, e.g. `("heart", "#FF0000", 5000)`.
    pub fn parse(shape: &str, color: &str, count: usize) -> Result<Self, ConfigError> {
        let shape: Shape = shape.parse()?;
        let color = Rgb::from_hex(color)?;
        let cfg = SimulationConfig::default()
            .with_shape(shape)
            .with_color(color)
            .with_particle_count(count);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if self.particle_count > MAX_PARTICLE_COUNT {
            return Err(ConfigError::TooManyParticles(self.particle_count));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ConfigError
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NoParticles,
    TooManyParticles(usize),
    Shape(ParseShapeError),
    Color(ColorError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoParticles => write!(f, "particle count must be at least 1"),
            ConfigError::TooManyParticles(n) => {
                write!(f, "particle count {} exceeds the maximum of {}", n, MAX_PARTICLE_COUNT)
            }
            ConfigError::Shape(e) => write!(f, "{}", e),
            ConfigError::Color(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Shape(e) => Some(e),
            ConfigError::Color(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseShapeError> for ConfigError {
    fn from(e: ParseShapeError) -> Self {
        ConfigError::Shape(e)
    }
}

impl From<ColorError> for ConfigError {
    fn from(e: ColorError) -> Self {
        ConfigError::Color(e)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EngineTuning
// ════════════════════════════════════════════════════════════════════════════

/// Every numeric constant of the frame step that is not shape-specific.
/// Shape-specific constants live in [`crate::forces`].
#[derive(Clone, Debug, PartialEq)]
pub struct EngineTuning {
    /// Squared distance from the origin that triggers a leash reset.
    pub leash_distance_sq:    f32,
    /// Per-axis jitter span around the target after a leash reset.
    pub leash_jitter:         f32,
    /// Smoothed pinch below this counts as a closed hand.
    pub closed_below:         f32,
    pub closed_friction:      f32,
    pub open_friction:        f32,
    /// Velocity multiplier applied when the shape changes.
    pub shape_change_damping: f32,
    /// Per-axis jitter span around the target on manual reset.
    pub reset_jitter:         f32,
    /// Edge of the initial scatter cube.
    pub initial_scatter:      f32,
    pub rotation_rate:        f32,
    pub rotation_gain:        f32,
    pub scale_gain:           f32,
}

impl Default for EngineTuning {
    fn default() -> Self {
        EngineTuning {
            leash_distance_sq:    2000.0,
            leash_jitter:         1.0,
            closed_below:         0.35,
            closed_friction:      0.80,
            open_friction:        0.90,
            shape_change_damping: 0.1,
            reset_jitter:         2.0,
            initial_scatter:      40.0,
            rotation_rate:        5.0,
            rotation_gain:        0.8,
            scale_gain:           0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_starfield_with_its_color() {
        let cfg = SimulationConfig::default();
        assert_eq!(cfg.shape, Shape::Starfield);
        assert_eq!(cfg.base_color.to_hex(), "#FFFACD");
        assert_eq!(cfg.particle_count, 24_000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn with_shape_adopts_default_color() {
        let cfg = SimulationConfig::default()
            .with_color(Rgb::WHITE)
            .with_shape(Shape::Flower);
        assert_eq!(cfg.base_color.to_hex(), "#FF1493");
    }

    #[test]
    fn parse_wraps_component_errors() {
        let cfg = SimulationConfig::parse("heart", "#FF0000", 100).unwrap();
        assert_eq!(cfg.shape, Shape::Heart);
        assert!(matches!(SimulationConfig::parse("cube", "#FF0000", 1), Err(ConfigError::Shape(_))));
        assert!(matches!(SimulationConfig::parse("heart", "red", 1), Err(ConfigError::Color(_))));
        assert_eq!(SimulationConfig::parse("heart", "#FF0000", 0), Err(ConfigError::NoParticles));
        assert_eq!(
            SimulationConfig::parse("heart", "#FF0000", MAX_PARTICLE_COUNT + 1),
            Err(ConfigError::TooManyParticles(MAX_PARTICLE_COUNT + 1))
        );
    }
}
