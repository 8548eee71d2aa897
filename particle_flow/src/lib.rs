//! # particle_flow
//!
//! Interactive front end for the gesture-driven particle field: a hand
//! source thread feeds [`GestureSignal`](hand_signal::GestureSignal)s to the
//! render loop, which steps the [`ParticleEngine`](particle_engine::ParticleEngine)
//! and draws the points in a `minifb` window.
//!
//! ## Gestures
//!
//! | Gesture | Effect |
//! |---|---|
//! | Close the hand (pinch) | particles spring onto the shape |
//! | Open the hand | the shape breathes, drifts or bursts outward |
//! | Move the hand | tilts the object |
//! | Hand closer to the camera | scales the object up |
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**. The mouse drives a synthetic hand.
//! * `leap`: **Hardware mode**. Polls a LeapMotion controller via LeapC.
//!
//! ### Keys
//!
//! | Key | Action |
//! |---|---|
//! | `1`–`4` | Starfield / Flower / Fireworks / Heart |
//! | `Tab` | Next shape |
//! | `C` | Next color preset |
//! | `R` | Reset particles onto the shape |
//! | `F` | Toggle the HUD |
//! | `H` | Show / hide the simulated hand |
//! | Left button | Pinch (simulated hand) |
//! | Wheel | Hand distance (simulated hand) |
//! | `Q` / `Escape` | Quit |

pub mod gesture;
pub mod visualizer;
pub mod app;
