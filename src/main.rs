//! OrbitView - satellite tracking from two-line element sets
//!
//! Decodes a NORAD TLE, reports the decoded elements and derived orbital
//! figures, and propagates the satellite to a requested UTC instant with
//! SGP4.

mod propagation;
mod tle;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;

use propagation::{generate_orbit_ring, OrbitTracker};
use tle::{decode_lines, decode_named, DecodeResult};

#[derive(Parser, Debug)]
#[command(
    name = "orbitview",
    about = "Satellite tracking from NORAD two-line element sets"
)]
struct Cli {
    /// Path to a file holding one TLE (two or three lines)
    tle_file: PathBuf,

    /// UTC query time (RFC 3339); defaults to now
    #[arg(long)]
    time: Option<DateTime<Utc>>,

    /// Display scale factor applied after Earth-radius normalization
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Also print an orbit ring with this many points (km)
    #[arg(long)]
    ring: Option<u32>,

    /// Emit the decoded element set as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.tle_file)
        .with_context(|| format!("Failed to read TLE file: {:?}", cli.tle_file))?;
    let decoded = decode_text(&text)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&decoded.elements)?);
    }

    let el = &decoded.elements;
    println!("{}", el.display_name());
    println!("  NORAD id:        {}", el.norad_id);
    println!("  Designator:      {}", el.intl_designator);
    println!("  Epoch:           {}", el.epoch.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Inclination:     {:.4} deg", el.inclination_deg);
    println!("  Eccentricity:    {:.7}", el.eccentricity);
    println!("  Mean motion:     {:.8} rev/day", el.mean_motion);
    println!("  Period:          {:.2} min", el.period_min);
    println!("  Semi-major axis: {:.1} km", el.semi_major_axis_km);
    println!("  Altitude:        {:.1} km", el.altitude_km);

    if let Some(n) = cli.ring {
        let ring = generate_orbit_ring(
            el.semi_major_axis_km,
            el.eccentricity,
            el.inclination_deg,
            n,
        );
        println!("Orbit ring ({} points):", ring.len());
        for p in &ring {
            println!("  {:8.4} {:8.4} {:8.4}", p.x, p.y, p.z);
        }
    }

    let mut tracker = OrbitTracker::new();
    tracker.initialize(decoded.elements);

    let time = cli.time.unwrap_or_else(Utc::now);
    let (position, velocity) = tracker.position_velocity_at(time);
    let display = OrbitTracker::to_display_coordinates(&position, cli.scale);

    println!("State at {}:", time.format("%Y-%m-%d %H:%M:%S UTC"));
    println!(
        "  ECI position:   [{:9.1}, {:9.1}, {:9.1}] km",
        position.x, position.y, position.z
    );
    println!(
        "  ECI velocity:   [{:8.3}, {:8.3}, {:8.3}] km/s",
        velocity.x, velocity.y, velocity.z
    );
    println!(
        "  Display coords: [{:8.4}, {:8.4}, {:8.4}] (scale {})",
        display.x, display.y, display.z, cli.scale
    );
    println!("  Circular speed: {:.2} km/s", tracker.orbital_speed_km_s());

    for event in tracker.take_events() {
        log::warn!("{}", event);
    }

    Ok(())
}

/// Split a file's text into one two- or three-line element set
fn decode_text(text: &str) -> Result<DecodeResult> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    match lines.as_slice() {
        [line1, line2] => Ok(decode_lines(line1, line2)),
        [line0, line1, line2] => Ok(decode_named(line0, line1, line2)),
        _ => anyhow::bail!("expected 2 or 3 TLE lines, found {}", lines.len()),
    }
}
