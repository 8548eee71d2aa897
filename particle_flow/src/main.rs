//! particle_flow: interactive entry point.

use std::io::{self, Write};
use std::time::Duration;

use log::warn;
use particle_engine::{SimulationConfig, DEFAULT_PARTICLE_COUNT};
use particle_flow::app::{run, AppConfig};
use shape_field::{Rgb, Shape};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Particle Flow: Gesture-Driven Particle Field          ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Mouse simulation  (use --features leap for hardware)");
    println!();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cfg = if args.is_empty() {
        configure_interactively()
    } else {
        if args.iter().any(|a| a == "--quick") {
            println!("  Quick-start: starfield, #FFFACD, {} particles\n", DEFAULT_PARTICLE_COUNT);
        }
        AppConfig::from_args(&args)?
    };

    println!();
    println!("  Opening visualizer window…");
    println!();

    run(cfg)
}

fn configure_interactively() -> AppConfig {
    let shape = pick_shape();
    let mut simulation = SimulationConfig::default().with_shape(shape);

    let default_hex = shape.default_color().to_hex();
    let input = read_line(&format!("  Base color hex (default {}): ", default_hex));
    if !input.trim().is_empty() {
        match Rgb::from_hex(input.trim()) {
            Ok(color) => simulation = simulation.with_color(color),
            Err(e)    => warn!("{}; keeping {}", e, default_hex),
        }
    }

    let count = read_line(&format!("  Particle count (default {}): ", DEFAULT_PARTICLE_COUNT))
        .trim()
        .parse::<usize>()
        .unwrap_or(DEFAULT_PARTICLE_COUNT);
    simulation = simulation.with_particle_count(count);
    if let Err(e) = simulation.validate() {
        warn!("{}; using {}", e, DEFAULT_PARTICLE_COUNT);
        simulation = simulation.with_particle_count(DEFAULT_PARTICLE_COUNT);
    }

    let seed = read_line("  RNG seed (blank = random): ").trim().parse::<u64>().ok();
    let stale_after = read_line("  Drop hand after N ms without data (blank = never): ")
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_millis);

    AppConfig { simulation, seed, stale_after }
}

fn pick_shape() -> Shape {
    println!("  Shape:");
    println!("    1.Starfield  2.Flower  3.Fireworks  4.Heart");
    match read_line("    Choice (1–4, default 1): ").trim() {
        "2" => Shape::Flower,
        "3" => Shape::Fireworks,
        "4" => Shape::Heart,
        _   => Shape::Starfield,
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
