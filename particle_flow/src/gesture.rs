//! Hand tracking, from LeapMotion hardware or from the mouse.
//!
//! Every source runs on its own thread, turns whatever it observes into
//! 21-point [`HandLandmarks`], runs them through a [`GestureProcessor`] and
//! sends whole [`GestureSignal`] snapshots down an `mpsc` channel.  The frame
//! loop reads that channel through a [`SignalSlot`], which only ever keeps
//! the newest value.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use glam::{Vec2, Vec3};
use hand_signal::landmark::{INDEX_TIP, LANDMARK_COUNT, THUMB_TIP, WRIST};
use hand_signal::{GestureProcessor, GestureSignal, HandLandmarks};
use log::{debug, info, warn};

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait: unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`GestureSignal`]s over a channel.
pub trait HandSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<GestureSignal>);
}

/// Spawn a hand source on its own thread and return the receiving end.
pub fn spawn_hand_source<H: HandSource>(source: H) -> Receiver<GestureSignal> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SignalSlot: latest-value reader for the frame loop
// ════════════════════════════════════════════════════════════════════════════

/// Non-blocking "latest gesture" slot.
///
/// Each [`latest`](Self::latest) drains everything queued and keeps only the
/// newest signal.  A disconnected source reads as no hand.  With
/// `stale_after` set, a detected signal older than that also reads as no
/// hand; without it the last signal is held indefinitely.
pub struct SignalSlot {
    rx:          Receiver<GestureSignal>,
    latest:      GestureSignal,
    received_at: Option<Instant>,
    stale_after: Option<Duration>,
    connected:   bool,
}

impl SignalSlot {
    pub fn new(rx: Receiver<GestureSignal>, stale_after: Option<Duration>) -> Self {
        SignalSlot {
            rx,
            latest:      GestureSignal::NOT_DETECTED,
            received_at: None,
            stale_after,
            connected:   true,
        }
    }

    pub fn latest(&mut self, now: Instant) -> GestureSignal {
        loop {
            match self.rx.try_recv() {
                Ok(signal) => {
                    self.latest      = signal;
                    self.received_at = Some(now);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        warn!("hand source disconnected; continuing without a hand");
                        self.connected = false;
                    }
                    self.latest = GestureSignal::NOT_DETECTED;
                    break;
                }
            }
        }

        if let (Some(limit), Some(at)) = (self.stale_after, self.received_at) {
            if self.latest.detected && now.saturating_duration_since(at) > limit {
                debug!("gesture signal stale after {:?}", limit);
                return GestureSignal::NOT_DETECTED;
            }
        }
        self.latest
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Visible image width in mm per mm of hand height above the device.
const LEAP_VIEW_SCALE: f32 = 2.0;

/// Project a LeapMotion point (mm, device frame, +y up, +z toward the user)
/// into the normalized image space a downward-looking camera would report.
///
/// Perspective divides by height, so the hand grows as it approaches the
/// device, which is what the processor's depth proxy expects.
#[cfg_attr(not(feature = "leap"), allow(dead_code))]
pub fn project_leap_mm(p: Vec3) -> Vec3 {
    let h = p.y.max(60.0) * LEAP_VIEW_SCALE;
    Vec3::new(0.5 - p.x / h, 0.5 + p.z / h, (p.y - 250.0) / 500.0)
}

/// Hand source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// # Joint mapping
///
/// LeapC reports four bones per digit.  The 21-point skeleton takes the wrist
/// from the middle metacarpal's base and, for each digit, the far joint of
/// metacarpal, proximal, intermediate and distal bones.
#[cfg(feature = "leap")]
pub struct LeapHandSource {
    processor: GestureProcessor,
}

#[cfg(feature = "leap")]
impl LeapHandSource {
    pub fn new() -> Self {
        LeapHandSource { processor: GestureProcessor::new() }
    }
}

#[cfg(feature = "leap")]
impl HandSource for LeapHandSource {
    fn run(mut self: Box<Self>, tx: Sender<GestureSignal>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                warn!("LeapC connection unavailable: {:?}", e);
                let _ = tx.send(GestureSignal::NOT_DETECTED);
                return;
            }
        };
        if let Err(e) = connection.open() {
            warn!("failed to open LeapMotion device: {:?}", e);
            let _ = tx.send(GestureSignal::NOT_DETECTED);
            return;
        }
        info!("LeapMotion hand source started");

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hand = frame.hands().into_iter().next().map(|h| {
                    macro_rules! joint {
                        ($j:expr) => {{
                            let j = $j;
                            project_leap_mm(Vec3::new(j.x, j.y, j.z))
                        }};
                    }
                    let mut pts = [Vec3::ZERO; LANDMARK_COUNT];
                    for (d, digit) in h.digits().into_iter().take(5).enumerate() {
                        if d == 2 {
                            pts[WRIST] = joint!(digit.metacarpal().prev_joint());
                        }
                        pts[1 + 4 * d] = joint!(digit.metacarpal().next_joint());
                        pts[2 + 4 * d] = joint!(digit.proximal().next_joint());
                        pts[3 + 4 * d] = joint!(digit.intermediate().next_joint());
                        pts[4 + 4 * d] = joint!(digit.distal().next_joint());
                    }
                    HandLandmarks(pts)
                });

                let signal = self.processor.process(hand.as_ref(), Instant::now());
                if tx.send(signal).is_err() {
                    info!("LeapMotion hand source stopped");
                    return;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource: mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Pointer in window coordinates scaled to `[0, 1]`, y down.
    /// `pinched` is the left mouse button.
    Pointer { x: f32, y: f32, pinched: bool },
    /// Scroll wheel notches; positive brings the hand closer.
    Wheel(f32),
    /// Show or hide the simulated hand.
    ToggleHand,
}

/// Simulated hand state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimHand {
    pub pointer: Vec2,
    pub pinched: bool,
    /// 0 = far, 1 = close.
    pub size:    f32,
    pub visible: bool,
}

impl Default for SimHand {
    fn default() -> Self {
        SimHand { pointer: Vec2::splat(0.5), pinched: false, size: 0.5, visible: true }
    }
}

const WHEEL_STEP:       f32 = 0.05;
const SIM_CLOSED_RATIO: f32 = 0.1;
const SIM_OPEN_RATIO:   f32 = 0.6;

impl SimHand {
    pub fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::Pointer { x, y, pinched } => {
                self.pointer = Vec2::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
                self.pinched = pinched;
            }
            SimInput::Wheel(notches) => {
                self.size = (self.size + notches * WHEEL_STEP).clamp(0.0, 1.0);
            }
            SimInput::ToggleHand => {
                self.visible = !self.visible;
                info!("simulated hand {}", if self.visible { "shown" } else { "hidden" });
            }
        }
    }

    /// The camera sees the user mirrored, so image x runs opposite to the
    /// pointer; after the processor mirrors it back the hand follows the
    /// pointer on screen.
    pub fn landmarks(&self) -> Option<HandLandmarks> {
        if !self.visible {
            return None;
        }
        let ratio = if self.pinched { SIM_CLOSED_RATIO } else { SIM_OPEN_RATIO };
        Some(synth_landmarks(
            Vec2::new(1.0 - self.pointer.x, self.pointer.y),
            self.size,
            ratio,
        ))
    }
}

/// Upright 21-point hand whose middle-finger base sits at `mcp` (image
/// space), whose wrist/middle-base length reads as `size`, and whose
/// thumb/index tips are `pinch_ratio` reference lengths apart.
pub fn synth_landmarks(mcp: Vec2, size: f32, pinch_ratio: f32) -> HandLandmarks {
    let r = 0.05 + size.clamp(0.0, 1.0) * 0.2;
    let base = mcp.extend(0.0);

    let mut pts = [base; LANDMARK_COUNT];
    pts[WRIST] = base + Vec3::new(0.0, r, 0.0);
    for finger in 0..5 {
        let spread = (finger as f32 - 2.0) * 0.25 * r;
        for joint in 0..4 {
            let reach = joint as f32 * 0.3 * r;
            pts[1 + 4 * finger + joint] = base + Vec3::new(spread * (1.0 + joint as f32 * 0.2), -reach, 0.0);
        }
    }
    pts[THUMB_TIP] = base + Vec3::new(-0.35 * r, -0.6 * r, 0.0);
    pts[INDEX_TIP] = pts[THUMB_TIP] + Vec3::new(pinch_ratio * r, 0.0, 0.0);
    HandLandmarks(pts)
}

/// Hand source driven by [`SimInput`] events from the visualizer window.
pub struct SimHandSource {
    rx:        Receiver<SimInput>,
    hand:      SimHand,
    processor: GestureProcessor,
}

impl SimHandSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimHandSource { rx, hand: SimHand::default(), processor: GestureProcessor::new() }
    }
}

impl HandSource for SimHandSource {
    fn run(mut self: Box<Self>, tx: Sender<GestureSignal>) {
        info!("simulated hand source started");
        while let Ok(input) = self.rx.recv() {
            self.hand.apply(input);
            let hand = self.hand.landmarks();
            let signal = self.processor.process(hand.as_ref(), Instant::now());
            if tx.send(signal).is_err() {
                break;
            }
        }
        info!("simulated hand source stopped");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
