//! Frame-rate-independent exponential smoothing of the gesture signal.
//!
//! While a hand is tracked each field follows the raw value with factor
//! `min(dt · follow_rate, 1)`.  When the hand is lost the fields drift back
//! to neutral with the slower, uncapped factor `dt · decay_rate`, so a lost
//! hand settles instead of snapping.

use glam::Vec2;

use crate::signal::GestureSignal;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothedSignal {
    pub position: Vec2,
    pub pinch:    f32,
    pub size:     f32,
}

impl SmoothedSignal {
    pub const NEUTRAL: SmoothedSignal = SmoothedSignal {
        position: Vec2::ZERO,
        pinch:    0.5,
        size:     0.5,
    };
}

impl Default for SmoothedSignal {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SmootherTuning {
    pub follow_rate: f32,
    pub decay_rate:  f32,
    /// Where the fields drift while no hand is seen.
    pub neutral:     SmoothedSignal,
}

impl Default for SmootherTuning {
    fn default() -> Self {
        SmootherTuning {
            follow_rate: 20.0,
            decay_rate:  1.0,
            neutral:     SmoothedSignal::NEUTRAL,
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// One smoothing step with explicit tuning.
pub fn smooth_with(
    previous: SmoothedSignal,
    current:  &GestureSignal,
    dt:       f32,
    tuning:   &SmootherTuning,
) -> SmoothedSignal {
    let (goal, t) = if current.detected {
        let goal = SmoothedSignal {
            position: current.position,
            pinch:    current.pinch_openness,
            size:     current.hand_size,
        };
        (goal, (dt * tuning.follow_rate).min(1.0))
    } else {
        (tuning.neutral, dt * tuning.decay_rate)
    };

    SmoothedSignal {
        position: previous.position.lerp(goal.position, t),
        pinch:    lerp(previous.pinch, goal.pinch, t),
        size:     lerp(previous.size, goal.size, t),
    }
}

/// One smoothing step with the default rates.
pub fn smooth(previous: SmoothedSignal, current: &GestureSignal, dt: f32) -> SmoothedSignal {
    smooth_with(previous, current, dt, &SmootherTuning::default())
}

/// Holds the smoothed state between frames.  Never hard-reset.
#[derive(Clone, Debug, Default)]
pub struct SignalSmoother {
    state:  SmoothedSignal,
    tuning: SmootherTuning,
}

impl SignalSmoother {
    pub fn new(tuning: SmootherTuning) -> Self {
        SignalSmoother { state: tuning.neutral, tuning }
    }

    pub fn update(&mut self, signal: &GestureSignal, dt: f32) -> SmoothedSignal {
        self.state = smooth_with(self.state, signal, dt, &self.tuning);
        self.state
    }

    pub fn state(&self) -> SmoothedSignal {
        self.state
    }
}
