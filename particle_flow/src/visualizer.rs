//! Software-rendered point visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ ┌──────────────────┐                                                 │
//! │ │ PARTICLE FLOW    │                                                 │
//! │ │ SHAPE  COLOR     │            · ·  ·.·:·.· ·  ·                    │
//! │ │ STATUS [■■■■  ]  │          ·  ·:·:·:·:·:·:·:·  ·                  │
//! │ │ HAND DETECTED    │            ·  ·:·:·:·:·:·  ·                    │
//! │ └──────────────────┘                ·  ·:·  ·                        │
//! │                                                                      │
//! │               SHOW HAND - OPEN/CLOSE TO BREATHE                      │
//! │ key legend                                                           │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Points are projected through a perspective camera that slowly orbits the
//! origin and are added onto the framebuffer (additive blending), so dense
//! regions glow.

use std::f32::consts::TAU;
use std::sync::mpsc::Sender;

use glam::Vec3;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use particle_engine::Shape;

use crate::app::{AppState, UiCommand};
use crate::gesture::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:      usize = 1024;
pub const WIN_H:      usize = 640;
const PANEL_X:        usize = 16;
const PANEL_Y:        usize = 16;
const PANEL_W:        usize = 260;
const PANEL_H:        usize = 150;
const BAR_W:          usize = PANEL_W - 24;
const BG_COLOR:       u32   = 0xFF050505;
const PANEL_BG:       u32   = 0xFF000000;
const BAR_BG:         u32   = 0xFF2A2A2A;
const BAR_FG:         u32   = 0xFF3B82F6;
const TEXT_COLOR:     u32   = 0xFFEEEEEE;
const DIM_TEXT:       u32   = 0xFF888888;
const DETECTED_COLOR: u32   = 0xFF4ADE80;
const MISSING_COLOR:  u32   = 0xFFF87171;

const LEGEND: &str =
    "1-4 SHAPE  TAB NEXT  C COLOR  R RESET  F HUD  H HAND  CLICK PINCH  WHEEL DEPTH  Q QUIT";
const HINT: &str = "SHOW HAND - OPEN/CLOSE TO BREATHE";

// ════════════════════════════════════════════════════════════════════════════
// Camera
// ════════════════════════════════════════════════════════════════════════════

/// Perspective camera on a circle around the y axis, looking at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub azimuth:  f32,
    pub distance: f32,
    /// Vertical field of view, radians.
    pub fov_y:    f32,
    pub width:    f32,
    pub height:   f32,
}

/// Orbit speed: 0.5 means one revolution every two minutes.
const AUTO_ROTATE_SPEED: f32 = 0.5;
const NEAR_PLANE:        f32 = 0.1;

impl Camera {
    pub fn new(width: usize, height: usize) -> Self {
        Camera {
            azimuth:  0.0,
            distance: 15.0,
            fov_y:    45f32.to_radians(),
            width:    width as f32,
            height:   height as f32,
        }
    }

    pub fn orbit(&mut self, dt: f32) {
        self.azimuth = (self.azimuth + AUTO_ROTATE_SPEED * TAU / 60.0 * dt) % TAU;
    }

    /// Pixels per world unit at depth 1.
    pub fn focal(&self) -> f32 {
        self.height * 0.5 / (self.fov_y * 0.5).tan()
    }

    /// World point → `(screen x, screen y, depth)`, or `None` behind the
    /// near plane.
    pub fn project(&self, world: Vec3) -> Option<(f32, f32, f32)> {
        let (s, c) = self.azimuth.sin_cos();
        let vx = c * world.x - s * world.z;
        let vz = s * world.x + c * world.z;
        let depth = self.distance - vz;
        if depth <= NEAR_PLANE {
            return None;
        }
        let f = self.focal() / depth;
        Some((
            self.width * 0.5 + vx * f,
            self.height * 0.5 - world.y * f,
            depth,
        ))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    sim_tx: Sender<SimInput>,
    camera: Camera,
    /// Particle colors pre-scaled by opacity, refreshed when the engine
    /// reports a recolor.
    tints:  Vec<[f32; 3]>,
    fps:    f32,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "Particle Flow",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps
        log::info!("visualizer window opened ({}×{})", WIN_W, WIN_H);

        Ok(Visualizer {
            window,
            buf:    vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            camera: Camera::new(WIN_W, WIN_H),
            tints:  Vec::new(),
            fps:    60.0,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse.  Keys become [`UiCommand`]s; the pointer,
    /// wheel and `H` go to the simulated hand.
    pub fn poll_input(&mut self) -> Vec<UiCommand> {
        let mut cmds = Vec::new();
        if !self.window.is_open() {
            cmds.push(UiCommand::Quit);
            return cmds;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        let shape_keys = [
            (Key::Key1, Shape::Starfield),
            (Key::Key2, Shape::Flower),
            (Key::Key3, Shape::Fireworks),
            (Key::Key4, Shape::Heart),
        ];
        for (key, shape) in shape_keys {
            if one_shot(key) { cmds.push(UiCommand::SetShape(shape)); }
        }
        if one_shot(Key::Tab) { cmds.push(UiCommand::CycleShape); }
        if one_shot(Key::C)   { cmds.push(UiCommand::CycleColor); }
        if one_shot(Key::R)   { cmds.push(UiCommand::Reset); }
        if one_shot(Key::F)   { cmds.push(UiCommand::ToggleFullscreen); }
        if one_shot(Key::Q) || one_shot(Key::Escape) {
            cmds.push(UiCommand::Quit);
        }
        let toggle_hand = one_shot(Key::H);

        // ── simulated hand ────────────────────────────────────────────────
        if toggle_hand {
            let _ = self.sim_tx.send(SimInput::ToggleHand);
        }
        if let Some((_, dy)) = self.window.get_scroll_wheel() {
            if dy != 0.0 {
                let _ = self.sim_tx.send(SimInput::Wheel(dy.signum()));
            }
        }
        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let _ = self.sim_tx.send(SimInput::Pointer {
                x:       mx / WIN_W as f32,
                y:       my / WIN_H as f32,
                pinched: self.window.get_mouse_down(MouseButton::Left),
            });
        }

        cmds
    }

    /// Render one frame.
    pub fn render(&mut self, app: &mut AppState, dt: f32) {
        if dt > 0.0 {
            self.fps += (1.0 / dt - self.fps) * 0.05;
        }
        self.camera.orbit(dt);

        // Clear
        self.buf.fill(BG_COLOR);

        // Particles
        let engine = app.engine_mut();
        if engine.take_colors_dirty() || self.tints.len() != engine.particle_count() {
            let opacity = engine.point_style().opacity;
            self.tints = engine
                .colors()
                .iter()
                .map(|c| [c.r * opacity, c.g * opacity, c.b * opacity])
                .collect();
        }
        engine.take_positions_dirty();
        self.draw_points(app);

        // HUD
        if app.show_hud() {
            self.draw_hud(app);
        }

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Points ────────────────────────────────────────────────────────────

    fn draw_points(&mut self, app: &AppState) {
        let engine = app.engine();
        let matrix = engine.transform().matrix();
        let style  = engine.point_style();
        // Matches a GPU point sprite sized against half the viewport height.
        let size_scale = style.size * self.camera.height * 0.5;
        let camera = self.camera;
        let buf    = &mut self.buf;

        for (p, tint) in engine.positions().iter().zip(&self.tints) {
            let Some((sx, sy, depth)) = camera.project(matrix * *p) else {
                continue;
            };
            if sx < 0.0 || sy < 0.0 { continue; }
            let (x, y) = (sx as usize, sy as usize);

            let side = if size_scale / depth >= 1.5 { 2 } else { 1 };
            for py in y..(y + side).min(WIN_H) {
                for px in x..(x + side).min(WIN_W) {
                    let i = py * WIN_W + px;
                    buf[i] = add_blend(buf[i], *tint);
                }
            }
        }
    }

    // ── HUD ───────────────────────────────────────────────────────────────

    fn draw_hud(&mut self, app: &AppState) {
        let engine = app.engine();
        let signal = app.signal();

        self.shade_rect(PANEL_X, PANEL_Y, PANEL_W, PANEL_H, PANEL_BG, 0.6);

        let x = PANEL_X + 12;
        self.draw_text("PARTICLE FLOW", x, PANEL_Y + 12, 2, TEXT_COLOR);

        let shape = format!("SHAPE  {}", engine.config().shape);
        self.draw_text(&shape, x, PANEL_Y + 36, 2, TEXT_COLOR);
        let color = engine.config().base_color;
        let swatch_x = x + 150;
        self.fill_rect(swatch_x, PANEL_Y + 35, 12, 12, color.to_argb());
        self.draw_text(&color.to_hex(), swatch_x + 18, PANEL_Y + 36, 2, DIM_TEXT);

        // ── openness bar ──────────────────────────────────────────────────
        self.draw_text("STATUS", x, PANEL_Y + 62, 2, DIM_TEXT);
        let readout = app.gesture_readout();
        let rx = PANEL_X + PANEL_W - 12 - text_width(&readout, 2);
        self.draw_text(&readout, rx, PANEL_Y + 62, 2, TEXT_COLOR);
        self.fill_rect(x, PANEL_Y + 80, BAR_W, 4, BAR_BG);
        let filled = (BAR_W as f32 * app.openness_bar().clamp(0.0, 1.0)) as usize;
        self.fill_rect(x, PANEL_Y + 80, filled, 4, BAR_FG);

        // ── detection + counters ──────────────────────────────────────────
        let (label, tone) = if signal.detected {
            ("HAND DETECTED", DETECTED_COLOR)
        } else {
            ("NO HAND DETECTED", MISSING_COLOR)
        };
        self.draw_text(label, x, PANEL_Y + 96, 2, tone);

        let stats = app.last_stats();
        let counters = format!(
            "{} PTS  {:.0} FPS  {}",
            engine.particle_count(),
            self.fps,
            if stats.closed { "CLOSED" } else { "OPEN" },
        );
        self.draw_text(&counters, x, PANEL_Y + 120, 1, DIM_TEXT);
        self.draw_text(&app.status, x, PANEL_Y + 132, 1, DIM_TEXT);

        // ── bottom ────────────────────────────────────────────────────────
        let hx = (WIN_W - text_width(HINT, 2)) / 2;
        self.draw_text(HINT, hx, WIN_H - 48, 2, DIM_TEXT);
        self.draw_text(LEGEND, 10, WIN_H - 16, 1, DIM_TEXT);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    /// Blend `color` over the existing pixels with weight `t`.
    fn shade_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32, t: f32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                let i = row * WIN_W + col;
                self.buf[i] = blend(self.buf[i], color, t);
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// 3×5 bitmap font, each glyph pixel drawn as a `scale`×`scale` block.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for sy in 0..scale {
                            for sx in 0..scale {
                                self.set_pixel(cx + col * scale + sx, y + row * scale + sy, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }
}

fn text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * 4 * scale
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

/// Additive blend of a linear `[r, g, b]` tint onto an ARGB pixel,
/// saturating each channel.
fn add_blend(dst: u32, tint: [f32; 3]) -> u32 {
    let add = |shift: u32, c: f32| {
        let base = (dst >> shift) & 0xFF;
        (base + (c.clamp(0.0, 1.0) * 255.0) as u32).min(0xFF) << shift
    };
    0xFF000000 | add(16, tint[0]) | add(8, tint[1]) | add(0, tint[2])
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
