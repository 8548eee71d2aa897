//! Per-particle color assignment.
//!
//! Colors are a function of the particle's *target* position and the active
//! shape's [`Gradient`].  They are computed once per shape or base-color
//! change, never per frame.

use std::fmt;

use glam::Vec3;
use rand::Rng;

use crate::shape::Shape;

// ════════════════════════════════════════════════════════════════════════════
// Rgb
// ════════════════════════════════════════════════════════════════════════════

/// Linear RGB triple, each channel nominally 0.0–1.0.
///
/// `#[repr(C)]` + `Pod` so a `&[Rgb]` can be handed to a renderer as a flat
/// `&[f32]` with three floats per particle.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Rgb { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_u32(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
        Rgb { r: channel(16), g: channel(8), b: channel(0) }
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(s: &str) -> Result<Self, ColorError> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::Malformed(s.to_string()));
        }
        let packed = u32::from_str_radix(digits, 16)
            .map_err(|_| ColorError::Malformed(s.to_string()))?;
        Ok(Rgb::from_u32(packed))
    }

    /// Linear interpolation; `t` is not clamped.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// Packed `0xFFRRGGBB`, the pixel format `minifb` expects.
    pub fn to_argb(self) -> u32 {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        0xFF00_0000 | (q(self.r) << 16) | (q(self.g) << 8) | q(self.b)
    }

    /// `#RRGGBB`
    pub fn to_hex(self) -> String {
        format!("#{:06X}", self.to_argb() & 0x00FF_FFFF)
    }
}

impl From<Rgb> for Vec3 {
    fn from(c: Rgb) -> Vec3 {
        Vec3::new(c.r, c.g, c.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Error returned by [`Rgb::from_hex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    Malformed(String),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::Malformed(s) => {
                write!(f, "invalid color {:?}: expected #RRGGBB", s)
            }
        }
    }
}

impl std::error::Error for ColorError {}

// ════════════════════════════════════════════════════════════════════════════
// Gradient: the per-shape color rule
// ════════════════════════════════════════════════════════════════════════════

/// How a shape colors its particles.  Stops are packed `0xRRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gradient {
    /// Every particle gets the configured base color.
    Uniform,
    /// Three stops keyed by target distance: `inner → mid` over
    /// `[0, pivot)`, then `mid → outer` over `(d − pivot) / outer_span`.
    Radial { inner: u32, mid: u32, outer: u32, pivot: f32, outer_span: f32 },
    /// Random pick per particle: `hot` when `u > hot_above`, `warm` when
    /// `u > warm_above`, `cool` otherwise.
    Sparks { hot: u32, warm: u32, cool: u32, hot_above: f32, warm_above: f32 },
    /// Two stops at `min(1, d / radius + bias)`.
    Core { core: u32, rim: u32, radius: f32, bias: f32 },
}

impl Gradient {
    /// Color for one particle whose target is `target`.
    pub fn color_at<R: Rng + ?Sized>(&self, target: Vec3, base: Rgb, rng: &mut R) -> Rgb {
        match *self {
            Gradient::Uniform => base,
            Gradient::Radial { inner, mid, outer, pivot, outer_span } => {
                let d = target.length();
                if d < pivot {
                    Rgb::from_u32(inner).lerp(Rgb::from_u32(mid), d / pivot)
                } else {
                    let t = ((d - pivot) / outer_span).clamp(0.0, 1.0);
                    Rgb::from_u32(mid).lerp(Rgb::from_u32(outer), t)
                }
            }
            Gradient::Sparks { hot, warm, cool, hot_above, warm_above } => {
                let u: f32 = rng.random();
                if u > hot_above {
                    Rgb::from_u32(hot)
                } else if u > warm_above {
                    Rgb::from_u32(warm)
                } else {
                    Rgb::from_u32(cool)
                }
            }
            Gradient::Core { core, rim, radius, bias } => {
                let t = (target.length() / radius + bias).clamp(0.0, 1.0);
                Rgb::from_u32(core).lerp(Rgb::from_u32(rim), t)
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// colorize
// ════════════════════════════════════════════════════════════════════════════

/// One color per target, index-aligned with `targets`.
pub fn colorize<R: Rng + ?Sized>(
    targets: &[Vec3],
    shape:   Shape,
    base:    Rgb,
    rng:     &mut R,
) -> Vec<Rgb> {
    let gradient = shape.profile().gradient;
    targets.iter().map(|&t| gradient.color_at(t, base, rng)).collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::generate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn close(a: Rgb, b: Rgb) -> bool {
        (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
    }

    #[test]
    fn hex_parse_with_and_without_hash() {
        let a = Rgb::from_hex("#FF8000").unwrap();
        let b = Rgb::from_hex("ff8000").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.r, 1.0);
        assert_eq!(a.g, 128.0 / 255.0);
        assert_eq!(a.b, 0.0);
    }

    #[test]
    fn hex_parse_rejects_garbage() {
        assert!(Rgb::from_hex("#FFF").is_err());
        assert!(Rgb::from_hex("#GG0000").is_err());
        assert!(Rgb::from_hex("").is_err());
        assert!(Rgb::from_hex("#+FFFFF").is_err());
    }

    #[test]
    fn argb_round_trips_through_hex() {
        let c = Rgb::from_hex("#FFFACD").unwrap();
        assert_eq!(c.to_argb(), 0xFFFF_FACD);
        assert_eq!(c.to_hex(), "#FFFACD");
    }

    #[test]
    fn starfield_uses_base_color_exactly() {
        let mut rng = StdRng::seed_from_u64(3);
        let base = Rgb::from_hex("#12AB9F").unwrap();
        for shape in Shape::ALL {
            // Any target distribution must give the same uniform result.
            let targets = generate(shape, 500, &mut rng);
            let colors = colorize(&targets, Shape::Starfield, base, &mut rng);
            assert_eq!(colors.len(), 500);
            assert!(colors.iter().all(|&c| c == base));
        }
    }

    #[test]
    fn flower_center_is_gold_and_pivot_is_pink() {
        let mut rng = StdRng::seed_from_u64(0);
        let colors = colorize(
            &[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.5, 0.0, 0.0)],
            Shape::Flower,
            Rgb::WHITE,
            &mut rng,
        );
        assert!(close(colors[0], Rgb::from_u32(0xFFD700)));
        assert!(close(colors[1], Rgb::from_u32(0xFF1493)));
        assert!(close(colors[2], Rgb::from_u32(0x9400D3)));
    }

    #[test]
    fn fireworks_palette_weights() {
        let mut rng = StdRng::seed_from_u64(11);
        let targets = vec![Vec3::ZERO; 20_000];
        let colors = colorize(&targets, Shape::Fireworks, Rgb::WHITE, &mut rng);
        let count = |hex: u32| colors.iter().filter(|&&c| c == Rgb::from_u32(hex)).count();
        let white  = count(0xFFFFFF) as f32 / 20_000.0;
        let yellow = count(0xFFFF00) as f32 / 20_000.0;
        let orange = count(0xFF4500) as f32 / 20_000.0;
        assert!((white + yellow + orange - 1.0).abs() < 1e-6);
        assert!((white - 0.2).abs() < 0.02, "white share {}", white);
        assert!((yellow - 0.4).abs() < 0.02, "yellow share {}", yellow);
        assert!((orange - 0.4).abs() < 0.02, "orange share {}", orange);
    }

    #[test]
    fn heart_core_is_biased_toward_rim() {
        let mut rng = StdRng::seed_from_u64(0);
        let colors = colorize(
            &[Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0)],
            Shape::Heart,
            Rgb::WHITE,
            &mut rng,
        );
        let core = Rgb::from_u32(0x8B0000);
        let rim  = Rgb::from_u32(0xFF6347);
        assert!(close(colors[0], core.lerp(rim, 0.2)));
        assert!(close(colors[1], rim));
    }
}
