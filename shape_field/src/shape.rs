//! Shape identifiers and their target-point distributions.
//!
//! Every shape is described by one [`ShapeProfile`] row in a static table:
//! how to sample a target point, how to color it, and which base color the
//! UI selects when the shape is picked.  Adding a shape means adding a row.

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use rand::Rng;

use crate::color::{Gradient, Rgb};

// ════════════════════════════════════════════════════════════════════════════
// Shape
// ════════════════════════════════════════════════════════════════════════════

/// The four target geometries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    #[default]
    Starfield,
    Flower,
    Fireworks,
    Heart,
}

impl Shape {
    /// All shapes in UI order.
    pub const ALL: [Shape; 4] = [Shape::Starfield, Shape::Flower, Shape::Fireworks, Shape::Heart];

    pub fn profile(self) -> &'static ShapeProfile {
        &PROFILES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }

    /// Base color the UI switches to when this shape is selected.
    pub fn default_color(self) -> Rgb {
        Rgb::from_u32(self.profile().default_color)
    }

    /// Next shape in UI order, wrapping.
    pub fn next(self) -> Shape {
        Shape::ALL[(self as usize + 1) % Shape::ALL.len()]
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shape {
    type Err = ParseShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starfield" | "stars" | "star" => Ok(Shape::Starfield),
            "flower"                       => Ok(Shape::Flower),
            "fireworks" | "burst"          => Ok(Shape::Fireworks),
            "heart"                        => Ok(Shape::Heart),
            _ => Err(ParseShapeError(s.to_string())),
        }
    }
}

/// Unknown shape name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseShapeError(pub String);

impl fmt::Display for ParseShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown shape {:?} (expected starfield, flower, fireworks or heart)",
            self.0
        )
    }
}

impl std::error::Error for ParseShapeError {}

// ════════════════════════════════════════════════════════════════════════════
// Profile table
// ════════════════════════════════════════════════════════════════════════════

/// Everything shape-specific that is not a force rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeProfile {
    pub name:          &'static str,
    /// Packed `0xRRGGBB`.
    pub default_color: u32,
    pub sampler:       Sampler,
    pub gradient:      Gradient,
}

/// Target-point distribution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sampler {
    /// Uniform density inside a ball.
    Sphere { radius: f32 },
    /// Flat heart curve, filled with mass biased toward the outline.
    Heart { depth: f32, fill_exponent: f32, scale: f32 },
    /// Stacked layers of petals.
    Flower { layers: u32, petals: u32 },
}

// Indexed by `Shape as usize`.
static PROFILES: [ShapeProfile; 4] = [
    ShapeProfile {
        name:          "starfield",
        default_color: 0xFFFACD,
        sampler:       Sampler::Sphere { radius: 5.0 },
        gradient:      Gradient::Uniform,
    },
    ShapeProfile {
        name:          "flower",
        default_color: 0xFF1493,
        sampler:       Sampler::Flower { layers: 6, petals: 8 },
        gradient:      Gradient::Radial {
            inner: 0xFFD700, mid: 0xFF1493, outer: 0x9400D3,
            pivot: 1.0, outer_span: 2.5,
        },
    },
    ShapeProfile {
        name:          "fireworks",
        default_color: 0xFF4500,
        sampler:       Sampler::Sphere { radius: 3.0 },
        gradient:      Gradient::Sparks {
            hot: 0xFFFFFF, warm: 0xFFFF00, cool: 0xFF4500,
            hot_above: 0.8, warm_above: 0.4,
        },
    },
    ShapeProfile {
        name:          "heart",
        default_color: 0xFF0000,
        sampler:       Sampler::Heart { depth: 1.5, fill_exponent: 0.4, scale: 0.2 },
        gradient:      Gradient::Core { core: 0x8B0000, rim: 0xFF6347, radius: 2.0, bias: 0.2 },
    },
];

// ════════════════════════════════════════════════════════════════════════════
// Sampling
// ════════════════════════════════════════════════════════════════════════════

impl Sampler {
    /// Draw one target point.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match *self {
            Sampler::Sphere { radius } => {
                // Inverse-CDF: cbrt keeps density uniform in volume.
                let r     = radius * rng.random::<f32>().cbrt();
                let theta = rng.random::<f32>() * TAU;
                let phi   = (2.0 * rng.random::<f32>() - 1.0).acos();
                Vec3::new(
                    r * phi.sin() * theta.cos(),
                    r * phi.sin() * theta.sin(),
                    r * phi.cos(),
                )
            }

            Sampler::Heart { depth, fill_exponent, scale } => {
                let t = rng.random::<f32>() * TAU;
                let x = 16.0 * t.sin().powi(3);
                let y = 13.0 * t.cos()
                    - 5.0 * (2.0 * t).cos()
                    - 2.0 * (3.0 * t).cos()
                    - (4.0 * t).cos();
                let z = (rng.random::<f32>() - 0.5) * depth;
                let fill = rng.random::<f32>().powf(fill_exponent);
                Vec3::new(x, y, z) * fill * scale
            }

            Sampler::Flower { layers, petals } => {
                let layer = (rng.random::<f32>().powf(0.3) * layers as f32).floor();
                let t = rng.random::<f32>() * TAU;

                let petal_angle = (t * petals as f32) % TAU;
                let petal = (petal_angle / 2.0).cos().abs().powf(0.2);

                let erosion = rng.random::<f32>() * 0.08;
                let r = 0.2 + layer * 0.25 + petal * 0.5 - erosion;

                let z = (petal_angle / 2.0).sin() * 0.03
                    + layer * 0.05
                    + (rng.random::<f32>() - 0.5) * 0.02;

                Vec3::new(r * t.cos(), r * t.sin(), z)
            }
        }
    }
}

/// `count` independent target points for `shape`.
pub fn generate<R: Rng + ?Sized>(shape: Shape, count: usize, rng: &mut R) -> Vec<Vec3> {
    let sampler = shape.profile().sampler;
    (0..count).map(|_| sampler.sample(rng)).collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
