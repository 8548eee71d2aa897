//! Per-shape force rules.
//!
//! One [`ForceRule`] row per shape: a spring rule used while the hand is
//! closed and a free-motion rule used while it is open.  The engine looks the
//! row up once per frame and calls [`ForceRule::force`] per particle.

use glam::Vec3;
use rand::Rng;
use shape_field::Shape;

/// Frame-wide inputs shared by every particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceContext {
    /// Smoothed pinch openness.
    pub pinch: f32,
    /// Seconds since the engine was built.
    pub time:  f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceRule {
    pub closed: ClosedRule,
    pub open:   OpenRule,
}

/// Spring toward the target plus a per-shape flourish.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClosedRule {
    pub stiffness: f32,
    pub flourish:  Flourish,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Flourish {
    /// Rotation about the y axis: `(−z, 0, x) · strength`.
    Swirl { strength: f32 },
    /// Uniform per-axis noise in `[−span/2, span/2)`.
    Jitter { span: f32 },
}

/// Open-hand behaviour.  Every variant pulls back inward beyond `containment`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OpenRule {
    /// Radial push scaled by pinch plus a travelling sine ripple on x.
    Breathe {
        repulsion:   f32,
        ripple:      f32,
        ripple_freq: f32,
        ripple_rate: f32,
        containment: f32,
        pull:        f32,
    },
    /// Sinusoidal flow field plus a gentle push that fades with distance.
    Drift {
        amplitude:   f32,
        frequency:   f32,
        time_scale:  f32,
        push:        f32,
        containment: f32,
        pull:        f32,
    },
    /// Strong radial push with heavy per-particle noise.
    Burst {
        repulsion:   f32,
        jitter:      f32,
        containment: f32,
        pull:        f32,
    },
}

// Indexed by `Shape as usize`, same order as `Shape::ALL`.
static RULES: [ForceRule; 4] = [
    // Starfield
    ForceRule {
        closed: ClosedRule { stiffness: 30.0, flourish: Flourish::Swirl { strength: 3.0 } },
        open: OpenRule::Breathe {
            repulsion:   80.0,
            ripple:      5.0,
            ripple_freq: 0.5,
            ripple_rate: 5.0,
            containment: 10.0,
            pull:        8.0,
        },
    },
    // Flower
    ForceRule {
        closed: ClosedRule { stiffness: 120.0, flourish: Flourish::Jitter { span: 2.0 } },
        open: DRIFT,
    },
    // Fireworks
    ForceRule {
        closed: ClosedRule { stiffness: 40.0, flourish: Flourish::Jitter { span: 10.0 } },
        open: OpenRule::Burst {
            repulsion:   50.0,
            jitter:      50.0,
            containment: 9.0,
            pull:        5.0,
        },
    },
    // Heart
    ForceRule {
        closed: ClosedRule { stiffness: 120.0, flourish: Flourish::Jitter { span: 2.0 } },
        open: DRIFT,
    },
];

const DRIFT: OpenRule = OpenRule::Drift {
    amplitude:   6.0,
    frequency:   0.3,
    time_scale:  0.8,
    push:        50.0,
    containment: 5.0,
    pull:        10.0,
};

pub fn force_rule(shape: Shape) -> &'static ForceRule {
    &RULES[shape as usize]
}

/// Uniform per-axis noise in `[−span/2, span/2)`.
pub(crate) fn jitter<R: Rng + ?Sized>(rng: &mut R, span: f32) -> Vec3 {
    Vec3::new(
        (rng.random::<f32>() - 0.5) * span,
        (rng.random::<f32>() - 0.5) * span,
        (rng.random::<f32>() - 0.5) * span,
    )
}

impl ForceRule {
    pub fn force<R: Rng + ?Sized>(
        &self,
        p:      Vec3,
        target: Vec3,
        closed: bool,
        ctx:    &ForceContext,
        rng:    &mut R,
    ) -> Vec3 {
        if closed {
            self.closed.force(p, target, rng)
        } else {
            self.open.force(p, ctx, rng)
        }
    }
}

impl ClosedRule {
    pub fn force<R: Rng + ?Sized>(&self, p: Vec3, target: Vec3, rng: &mut R) -> Vec3 {
        let spring = (target - p) * self.stiffness;
        match self.flourish {
            Flourish::Swirl { strength } => spring + Vec3::new(-p.z, 0.0, p.x) * strength,
            Flourish::Jitter { span }    => spring + jitter(rng, span),
        }
    }
}

impl OpenRule {
    pub fn force<R: Rng + ?Sized>(&self, p: Vec3, ctx: &ForceContext, rng: &mut R) -> Vec3 {
        match *self {
            OpenRule::Breathe { repulsion, ripple, ripple_freq, ripple_rate, containment, pull } => {
                let dist = p.length() + 0.1;
                let dir = p / dist;
                let mut f = dir * repulsion * ctx.pinch;
                f.x += (p.y * ripple_freq + ctx.time * ripple_rate).sin() * ripple;
                if dist > containment {
                    f -= dir * (dist - containment) * pull;
                }
                f
            }

            OpenRule::Drift { amplitude, frequency, time_scale, push, containment, pull } => {
                let t = ctx.time * time_scale;
                let flow = Vec3::new(
                    (p.y * frequency + t).sin() + (p.z * frequency * 1.3 + t).sin(),
                    (p.z * frequency + t).cos() + (p.x * frequency * 1.7 + t).cos(),
                    (p.x * frequency + t).sin() + (p.y * frequency * 0.7 + t).sin(),
                );
                let d = p.length() + 0.01;
                let dir = p / d;
                let mut f = flow * amplitude + dir * (push / (d + 1.0));
                if d > containment {
                    f -= dir * (d - containment) * pull;
                }
                f
            }

            OpenRule::Burst { repulsion, jitter: span, containment, pull } => {
                let dist = p.length() + 0.01;
                let dir = p / dist;
                let mut f = dir * repulsion + jitter(rng, span);
                if dist > containment {
                    f -= dir * (dist - containment) * pull;
                }
                f
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const CTX: ForceContext = ForceContext { pinch: 1.0, time: 0.0 };

    #[test]
    fn spring_constants_per_shape() {
        assert_eq!(force_rule(Shape::Starfield).closed.stiffness, 30.0);
        assert_eq!(force_rule(Shape::Flower).closed.stiffness, 120.0);
        assert_eq!(force_rule(Shape::Fireworks).closed.stiffness, 40.0);
        assert_eq!(force_rule(Shape::Heart).closed.stiffness, 120.0);
    }

    #[test]
    fn starfield_swirl_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(0);
        let f = force_rule(Shape::Starfield).force(
            Vec3::new(1.0, 0.0, 2.0),
            Vec3::new(1.0, 0.0, 2.0),
            true,
            &CTX,
            &mut rng,
        );
        assert_eq!(f, Vec3::new(-6.0, 0.0, 3.0));
    }

    #[test]
    fn closed_jitter_stays_within_span() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1_000 {
            let f = force_rule(Shape::Fireworks).force(Vec3::ZERO, Vec3::ZERO, true, &CTX, &mut rng);
            assert!(f.abs().max_element() <= 5.0);
        }
    }

    #[test]
    fn open_rules_pull_back_beyond_containment() {
        let mut rng = StdRng::seed_from_u64(2);
        let far = Vec3::new(0.0, 0.0, 30.0);
        for shape in Shape::ALL {
            let f = force_rule(shape).force(far, Vec3::ZERO, false, &CTX, &mut rng);
            assert!(f.z < 0.0, "{} pushes outward at z=30: {:?}", shape, f);
        }
    }

    #[test]
    fn open_starfield_pushes_out_inside_containment() {
        let mut rng = StdRng::seed_from_u64(3);
        // y = 0 and t = 0: the ripple term vanishes.
        let p = Vec3::new(0.0, 0.0, 4.0);
        let rule = force_rule(Shape::Starfield);
        let f = rule.force(p, Vec3::ZERO, false, &CTX, &mut rng);
        assert!((f.z - 80.0 * 4.0 / 4.1).abs() < 1e-3, "{:?}", f);
        assert!(f.x.abs() < 1e-6);
        let weak = ForceContext { pinch: 0.5, time: 0.0 };
        let g = rule.force(p, Vec3::ZERO, false, &weak, &mut rng);
        assert!((g.z - f.z * 0.5).abs() < 1e-3);
    }
}
