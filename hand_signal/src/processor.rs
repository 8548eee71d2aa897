//! Raw landmarks → [`GestureSignal`].
//!
//! # Algorithm
//!
//! * **Reference size**: wrist to middle-finger base, in 3D.  Its length
//!   depends on distance from the camera but barely on pose, so it doubles
//!   as a depth proxy (`hand_size`) and as the scale for the pinch ratio.
//! * **Pinch**: thumb-tip/index-tip distance divided by the reference size,
//!   mapped linearly from `[closed_ratio, open_ratio]` onto `[0, 1]`.
//! * **Position**: middle-finger base, mirrored in x and remapped onto
//!   `[-1, 1]` with +y up.
//! * **Velocity**: finite difference against the last *detected* frame,
//!   suppressed across gaps of `max_velocity_gap` or more.

use std::time::{Duration, Instant};

use glam::Vec2;
use log::trace;

use crate::landmark::HandLandmarks;
use crate::signal::GestureSignal;

// ════════════════════════════════════════════════════════════════════════════
// Tuning
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessorTuning {
    /// Reference size that reads as `hand_size = 0`.
    pub size_near_zero:   f32,
    /// Reference size that reads as `hand_size = 1`.
    pub size_near_one:    f32,
    /// Pinch ratio at or below which the hand reads fully closed.
    pub closed_ratio:     f32,
    /// Pinch ratio at or above which the hand reads fully open.
    pub open_ratio:       f32,
    /// Velocity is zeroed when frames are this far apart (or more).
    pub max_velocity_gap: Duration,
    /// Reference sizes below this are treated as no hand.
    pub min_reference:    f32,
}

impl Default for ProcessorTuning {
    fn default() -> Self {
        ProcessorTuning {
            size_near_zero:   0.05,
            size_near_one:    0.25,
            closed_ratio:     0.2,
            open_ratio:       0.5,
            max_velocity_gap: Duration::from_millis(200),
            min_reference:    1e-6,
        }
    }
}

// ── pure mappings ─────────────────────────────────────────────────────────────

/// Wrist/middle-base distance → `[0, 1]` closeness.
pub fn hand_size_from_reference(reference: f32, tuning: &ProcessorTuning) -> f32 {
    ((reference - tuning.size_near_zero) / (tuning.size_near_one - tuning.size_near_zero))
        .clamp(0.0, 1.0)
}

/// Scale-free thumb/index ratio → `[0, 1]` openness.
pub fn pinch_openness_from_ratio(ratio: f32, tuning: &ProcessorTuning) -> f32 {
    ((ratio - tuning.closed_ratio) / (tuning.open_ratio - tuning.closed_ratio)).clamp(0.0, 1.0)
}

/// Image coordinates (`[0, 1]`, y down) → mirrored screen frame (`[-1, 1]`, y up).
pub fn mirror_to_screen(x: f32, y: f32) -> Vec2 {
    Vec2::new((1.0 - x) * 2.0 - 1.0, -(y * 2.0 - 1.0))
}

// ════════════════════════════════════════════════════════════════════════════
// GestureProcessor
// ════════════════════════════════════════════════════════════════════════════

/// Stateful only for velocity: remembers the last detected position and time.
#[derive(Debug, Default)]
pub struct GestureProcessor {
    tuning: ProcessorTuning,
    last:   Option<(Vec2, Instant)>,
}

impl GestureProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tuning(tuning: ProcessorTuning) -> Self {
        GestureProcessor { tuning, last: None }
    }

    pub fn tuning(&self) -> &ProcessorTuning {
        &self.tuning
    }

    /// Process one detector frame captured at `now`.
    ///
    /// Degenerate geometry (zero reference size, non-finite results) reads as
    /// no hand and leaves the velocity history untouched.
    pub fn process(&mut self, hand: Option<&HandLandmarks>, now: Instant) -> GestureSignal {
        let Some(hand) = hand else {
            return GestureSignal::NOT_DETECTED;
        };

        let reference = hand.wrist().distance(hand.middle_mcp());
        if !reference.is_finite() || reference < self.tuning.min_reference {
            trace!("degenerate hand reference size {}", reference);
            return GestureSignal::NOT_DETECTED;
        }

        let ratio     = hand.thumb_tip().distance(hand.index_tip()) / reference;
        let openness  = pinch_openness_from_ratio(ratio, &self.tuning);
        let hand_size = hand_size_from_reference(reference, &self.tuning);
        let mcp       = hand.middle_mcp();
        let position  = mirror_to_screen(mcp.x, mcp.y);

        if !(openness.is_finite() && hand_size.is_finite() && position.is_finite()) {
            trace!("non-finite gesture values, treating as no hand");
            return GestureSignal::NOT_DETECTED;
        }

        let velocity = match self.last {
            Some((last_pos, last_time)) => match now.checked_duration_since(last_time) {
                Some(gap) if !gap.is_zero() && gap < self.tuning.max_velocity_gap => {
                    (position - last_pos) / gap.as_secs_f32()
                }
                _ => Vec2::ZERO,
            },
            None => Vec2::ZERO,
        };
        self.last = Some((position, now));

        trace!(
            "hand size={:.2} open={:.2} pos=({:.2},{:.2})",
            hand_size, openness, position.x, position.y
        );

        GestureSignal {
            detected: true,
            pinch_openness: openness,
            position,
            velocity,
            hand_size,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
