//! # hand_signal
//!
//! Turns raw 21-point hand landmarks into the per-frame control signal the
//! particle engine consumes.
//!
//! ```text
//!  HandLandmarks ──► GestureProcessor::process ──► GestureSignal
//!                                                      │
//!                    SignalSmoother::update(dt) ◄──────┘
//!                            │
//!                            ▼
//!                      SmoothedSignal
//! ```
//!
//! * [`landmark`] : the 21-point skeleton and the indices this crate reads.
//! * [`signal`]   : the [`GestureSignal`] snapshot (a plain `Copy` value).
//! * [`processor`]: size, pinch, mirrored position and velocity.
//! * [`smoother`] : frame-rate-independent exponential smoothing.

pub mod landmark;
pub mod processor;
pub mod signal;
pub mod smoother;

pub use landmark::{HandLandmarks, LandmarkError, LANDMARK_COUNT};
pub use processor::{GestureProcessor, ProcessorTuning};
pub use signal::GestureSignal;
pub use smoother::{smooth, SignalSmoother, SmoothedSignal, SmootherTuning};
