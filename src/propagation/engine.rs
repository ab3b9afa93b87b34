//! External propagation engine interface
//!
//! SGP4 itself lives in satkit; this module wraps it behind a small
//! capability trait so the tracker can swap in another compliant engine
//! (or a test stub) without touching the façade contract.

use chrono::{DateTime, Datelike, Timelike, Utc};
use nalgebra::Vector3;
use satkit::sgp4::sgp4;
use std::fmt;

/// Engine-side failure
#[derive(Debug, Clone)]
pub enum EngineError {
    /// Raw element lines were rejected at construction
    BadElements(String),
    /// Query timestamp could not be represented in engine time
    Time(String),
    /// The propagation model rejected the query (decayed or degenerate orbit)
    Model(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadElements(msg) => write!(f, "engine rejected element lines: {}", msg),
            Self::Time(msg) => write!(f, "query time not representable: {}", msg),
            Self::Model(msg) => write!(f, "propagation model error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

/// Capability interface over an orbital mechanics engine
///
/// Queries take an explicit UTC instant and answer in ECI kilometers.
/// Implementations must never be handed local time.
pub trait PropagationEngine: Send {
    /// ECI position (km) at the given UTC instant
    fn position_at(&mut self, time: DateTime<Utc>) -> Result<Vector3<f64>, EngineError>;

    /// ECI position (km) and velocity (km/s) from one analytic evaluation
    fn position_velocity_at(
        &mut self,
        time: DateTime<Utc>,
    ) -> Result<(Vector3<f64>, Vector3<f64>), EngineError>;

    /// Engine name for diagnostics
    fn name(&self) -> &'static str;
}

/// SGP4 engine backed by satkit
pub struct Sgp4Engine {
    tle: satkit::TLE,
}

impl Sgp4Engine {
    /// Build from the raw TLE data lines; satkit re-validates the text
    pub fn from_lines(line1: &str, line2: &str) -> Result<Self, EngineError> {
        let tle = satkit::TLE::load_2line(line1, line2)
            .map_err(|e| EngineError::BadElements(e.to_string()))?;
        Ok(Self { tle })
    }

    fn propagate(
        &mut self,
        time: DateTime<Utc>,
    ) -> Result<(Vector3<f64>, Vector3<f64>), EngineError> {
        let instant = engine_instant(&time)?;

        // satkit answers in TEME meters and m/s, returning position and
        // velocity matrices alongside a per-instant error vector.
        let (positions, velocities, errs) = sgp4(&mut self.tle, &[instant]);
        if let Some(err) = errs
            .iter()
            .find(|e| **e != satkit::sgp4::SGP4Error::SGP4Success)
        {
            return Err(EngineError::Model(format!("{:?}", err)));
        }
        let pos = positions.column(0);
        let vel = velocities.column(0);
        Ok((
            Vector3::new(pos[0], pos[1], pos[2]) / 1000.0,
            Vector3::new(vel[0], vel[1], vel[2]) / 1000.0,
        ))
    }
}

impl PropagationEngine for Sgp4Engine {
    fn position_at(&mut self, time: DateTime<Utc>) -> Result<Vector3<f64>, EngineError> {
        self.propagate(time).map(|(pos, _)| pos)
    }

    fn position_velocity_at(
        &mut self,
        time: DateTime<Utc>,
    ) -> Result<(Vector3<f64>, Vector3<f64>), EngineError> {
        self.propagate(time)
    }

    fn name(&self) -> &'static str {
        "sgp4 (satkit)"
    }
}

/// Convert a UTC timestamp to the engine's calendar representation
///
/// satkit wants the explicit year/month/day/hour/minute/second split;
/// the fractional second carries the sub-second precision.
fn engine_instant(time: &DateTime<Utc>) -> Result<satkit::Instant, EngineError> {
    let second = time.second() as f64 + f64::from(time.nanosecond()) * 1e-9;
    Ok(satkit::Instant::from_datetime(
        time.year(),
        time.month() as i32,
        time.day() as i32,
        time.hour() as i32,
        time.minute() as i32,
        second,
    ))
}
