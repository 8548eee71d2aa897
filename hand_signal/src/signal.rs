//! The per-frame gesture snapshot.

use glam::Vec2;

/// What the processor reports for one detector frame.
///
/// Copied whole from the detector thread to the frame loop; never mutated
/// in place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSignal {
    pub detected:       bool,
    /// 0 = thumb and index touching, 1 = fully spread.
    pub pinch_openness: f32,
    /// Mirrored screen frame, each axis in `[-1, 1]`.
    pub position:       Vec2,
    /// Screen units per second.
    pub velocity:       Vec2,
    /// 0 = far from the camera, 1 = close.
    pub hand_size:      f32,
}

impl GestureSignal {
    /// Emitted whenever no usable hand is present.  Openness reads as fully
    /// open so a lost hand never looks like a closed fist.
    pub const NOT_DETECTED: GestureSignal = GestureSignal {
        detected:       false,
        pinch_openness: 1.0,
        position:       Vec2::ZERO,
        velocity:       Vec2::ZERO,
        hand_size:      0.5,
    };

    pub fn not_detected() -> Self {
        Self::NOT_DETECTED
    }

    /// A detected hand at rest; handy for driving the engine directly.
    pub fn held(pinch_openness: f32, position: Vec2, hand_size: f32) -> Self {
        GestureSignal {
            detected: true,
            pinch_openness,
            position,
            velocity: Vec2::ZERO,
            hand_size,
        }
    }
}

impl Default for GestureSignal {
    fn default() -> Self {
        Self::NOT_DETECTED
    }
}
