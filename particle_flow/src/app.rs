//! Top-level application state machine.
//!
//! `AppState` owns the [`ParticleEngine`] and the configuration the UI is
//! asking for.  It applies [`UiCommand`]s as they arrive and steps the engine
//! once per frame with whatever gesture signal is current.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use log::info;
use particle_engine::{
    ConfigError, FrameStats, GestureSignal, ParticleEngine, Rgb, Shape, SimulationConfig,
};

use crate::gesture::{spawn_hand_source, SignalSlot, SimInput};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub simulation:  SimulationConfig,
    /// Fixed RNG seed; `None` seeds from the operating system.
    pub seed:        Option<u64>,
    /// Treat a detected hand as gone when no update arrived for this long.
    pub stale_after: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            simulation:  SimulationConfig::default(),
            seed:        None,
            stale_after: None,
        }
    }
}

impl AppConfig {
    /// Parse `--shape NAME --color HEX --count N --seed N --stale-ms N`.
    /// `--quick` is accepted and changes nothing.
    pub fn from_args<I, S>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cfg   = AppConfig::default();
        let mut color = None;
        let mut args  = args.into_iter();

        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            if arg == "--quick" {
                continue;
            }
            let value = args
                .next()
                .with_context(|| format!("missing value for {}", arg))?;
            let value = value.as_ref();
            match arg {
                "--shape" => {
                    let shape = value.parse::<Shape>().map_err(ConfigError::from)?;
                    cfg.simulation = cfg.simulation.with_shape(shape);
                }
                "--color" => color = Some(Rgb::from_hex(value).map_err(ConfigError::from)?),
                "--count" => {
                    let n: usize = value
                        .parse()
                        .with_context(|| format!("invalid particle count {:?}", value))?;
                    cfg.simulation = cfg.simulation.with_particle_count(n);
                }
                "--seed" => {
                    cfg.seed = Some(
                        value.parse().with_context(|| format!("invalid seed {:?}", value))?,
                    );
                }
                "--stale-ms" => {
                    let ms: u64 = value
                        .parse()
                        .with_context(|| format!("invalid staleness timeout {:?}", value))?;
                    cfg.stale_after = Some(Duration::from_millis(ms));
                }
                other => bail!("unknown argument {:?}", other),
            }
        }

        // An explicit color wins over the shape default regardless of order.
        if let Some(c) = color {
            cfg.simulation = cfg.simulation.with_color(c);
        }
        cfg.simulation.validate()?;
        Ok(cfg)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UI commands
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiCommand {
    SetShape(Shape),
    CycleShape,
    /// Step through [`COLOR_PRESETS`].
    CycleColor,
    Reset,
    /// Presentation only: hides or shows the HUD.
    ToggleFullscreen,
    Quit,
}

/// Base colors offered by `C`, in order.
pub const COLOR_PRESETS: [u32; 8] = [
    0xFFFACD, 0xFF1493, 0xFF4500, 0xFF0000,
    0x00BFFF, 0x7CFC00, 0x9400D3, 0xFFFFFF,
];

/// Longest frame step handed to the engine.
pub const MAX_FRAME_DT: f32 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    engine:       ParticleEngine,
    /// What the UI wants; the engine catches up on its next step.
    desired:      SimulationConfig,
    preset:       usize,
    show_hud:     bool,
    quit:         bool,
    signal:       GestureSignal,
    last_stats:   FrameStats,
    pub status:   String,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Result<Self, ConfigError> {
        let engine = match cfg.seed {
            Some(seed) => ParticleEngine::seeded(cfg.simulation.clone(), seed)?,
            None       => ParticleEngine::from_entropy(cfg.simulation.clone())?,
        };
        Ok(AppState {
            engine,
            desired:    cfg.simulation.clone(),
            preset:     0,
            show_hud:   true,
            quit:       false,
            signal:     GestureSignal::NOT_DETECTED,
            last_stats: FrameStats::default(),
            status:     format!("Ready: {} {}", cfg.simulation.shape, cfg.simulation.base_color),
        })
    }

    // ── process one UiCommand ─────────────────────────────────────────────

    pub fn handle_command(&mut self, cmd: UiCommand) {
        match cmd {
            UiCommand::SetShape(shape) => {
                if shape != self.desired.shape {
                    self.desired = self.desired.clone().with_shape(shape);
                    self.status  = format!("Shape: {}", shape);
                }
            }
            UiCommand::CycleShape => {
                self.handle_command(UiCommand::SetShape(self.desired.shape.next()));
            }
            UiCommand::CycleColor => {
                self.preset = (self.preset + 1) % COLOR_PRESETS.len();
                let color   = Rgb::from_u32(COLOR_PRESETS[self.preset]);
                self.desired = self.desired.clone().with_color(color);
                self.status  = format!("Color: {}", color);
            }
            UiCommand::Reset => {
                self.engine.request_reset();
                self.status = "Reset".to_string();
            }
            UiCommand::ToggleFullscreen => {
                self.show_hud = !self.show_hud;
            }
            UiCommand::Quit => {
                self.quit = true;
            }
        }
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, dt: f32, signal: GestureSignal) -> FrameStats {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.signal     = signal;
        self.last_stats = self.engine.step(dt, &signal, &self.desired);
        if self.last_stats.reset_completed {
            self.status = "Reset complete".to_string();
        }
        self.last_stats
    }

    // ── Read-outs ─────────────────────────────────────────────────────────

    /// `"73% OPEN"` while a hand is seen, `"IDLE"` otherwise.
    pub fn gesture_readout(&self) -> String {
        if self.signal.detected {
            format!("{}% OPEN", (self.signal.pinch_openness * 100.0).round() as u32)
        } else {
            "IDLE".to_string()
        }
    }

    /// Fill level of the HUD openness bar; half full when idle.
    pub fn openness_bar(&self) -> f32 {
        if self.signal.detected { self.signal.pinch_openness } else { 0.5 }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn engine(&self)      -> &ParticleEngine    { &self.engine }
    pub fn engine_mut(&mut self) -> &mut ParticleEngine { &mut self.engine }
    pub fn desired(&self)     -> &SimulationConfig  { &self.desired }
    pub fn signal(&self)      -> GestureSignal      { self.signal }
    pub fn last_stats(&self)  -> FrameStats         { self.last_stats }
    pub fn show_hud(&self)    -> bool               { self.show_hud }
    pub fn should_quit(&self) -> bool               { self.quit }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It creates the visualizer,
/// the hand source (mouse simulation by default, hardware with
/// `--features leap`), and drives the input/step/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    // ── Hand source ───────────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    #[cfg(feature = "leap")]
    let hand_rx = {
        drop(sim_rx);
        spawn_hand_source(crate::gesture::LeapHandSource::new())
    };
    #[cfg(not(feature = "leap"))]
    let hand_rx = spawn_hand_source(crate::gesture::SimHandSource::new(sim_rx));

    let mut slot = SignalSlot::new(hand_rx, cfg.stale_after);

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(sim_tx).context("failed to open the visualizer window")?;

    // ── App state ─────────────────────────────────────────────────────────
    let mut app = AppState::new(&cfg)?;

    // ── Main loop ─────────────────────────────────────────────────────────
    let mut last = Instant::now();
    while vis.is_open() && !app.should_quit() {
        // 1. Window input → UI commands (pointer goes to the sim source)
        for cmd in vis.poll_input() {
            app.handle_command(cmd);
        }

        // 2. Latest gesture, frame step
        let now = Instant::now();
        let dt  = now.duration_since(last).as_secs_f32();
        last    = now;
        app.tick(dt, slot.latest(now));

        // 3. Render
        vis.render(&mut app, dt);
    }

    info!("window closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
