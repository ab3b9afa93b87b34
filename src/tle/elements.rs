//! Decoded orbital element records

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::f64::consts::PI;

/// Earth's gravitational parameter (km³/s²)
pub const MU_EARTH_KM3_S2: f64 = 398600.4418;

/// Earth's mean radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Minutes in a day
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// A decoded NORAD two-line element set
///
/// The raw lines are kept verbatim alongside the decoded values: the SGP4
/// engine consumes the original text, not the extracted numbers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ElementSet {
    /// Satellite name from line 0 (empty for the two-line form)
    pub name: String,
    /// NORAD catalog number
    pub norad_id: u32,
    /// International designator (launch year/number/piece)
    pub intl_designator: String,

    /// Raw line 1 as received
    pub line1: String,
    /// Raw line 2 as received
    pub line2: String,

    /// Element epoch as an absolute UTC instant
    pub epoch: DateTime<Utc>,
    /// Two-digit epoch year as printed
    pub epoch_year: u32,
    /// Fractional day-of-year as printed
    pub epoch_day: f64,

    /// Inclination (degrees, 0-180)
    pub inclination_deg: f64,
    /// Right ascension of the ascending node (degrees)
    pub raan_deg: f64,
    /// Eccentricity (unitless, below 1)
    pub eccentricity: f64,
    /// Argument of perigee (degrees)
    pub arg_of_perigee_deg: f64,
    /// Mean anomaly at epoch (degrees)
    pub mean_anomaly_deg: f64,
    /// Mean motion (revolutions/day)
    pub mean_motion: f64,

    /// B* drag term
    pub bstar: f64,
    /// First time-derivative of mean motion
    pub mean_motion_dot: f64,
    /// Second time-derivative of mean motion
    pub mean_motion_ddot: f64,

    /// Element set number
    pub element_set_number: u32,
    /// Revolution number at epoch
    pub revolution_number: u32,

    /// Orbital period (minutes); derived, see [`recompute_derived`](Self::recompute_derived)
    pub period_min: f64,
    /// Semi-major axis (km); derived
    pub semi_major_axis_km: f64,
    /// Mean altitude above Earth's surface (km); derived
    pub altitude_km: f64,
}

impl ElementSet {
    /// Recompute period, semi-major axis and altitude from mean motion
    ///
    /// The three derived fields only change together; anything that edits
    /// mean motion must call this again before they are read. Period is
    /// 1440 / n, the semi-major axis comes from Kepler's third law
    /// a³ = μT²/(4π²), and altitude subtracts the mean Earth radius.
    /// A non-positive or non-finite mean motion zeroes all three rather
    /// than letting NaN reach display math.
    pub fn recompute_derived(&mut self) {
        if !self.mean_motion.is_finite() || self.mean_motion <= 0.0 {
            self.period_min = 0.0;
            self.semi_major_axis_km = 0.0;
            self.altitude_km = 0.0;
            return;
        }

        self.period_min = MINUTES_PER_DAY / self.mean_motion;

        let period_s = self.period_min * 60.0;
        let a_cubed = MU_EARTH_KM3_S2 * period_s * period_s / (4.0 * PI * PI);
        self.semi_major_axis_km = a_cubed.cbrt();

        self.altitude_km = self.semi_major_axis_km - EARTH_RADIUS_KM;
    }

    /// Display name, falling back to the NORAD id
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("NORAD {}", self.norad_id)
        } else {
            self.name.clone()
        }
    }

    /// Whether the verbatim source lines survived into this record
    ///
    /// The propagation engine is built from the raw text, so a record
    /// without it cannot initialize a tracker.
    pub fn has_raw_lines(&self) -> bool {
        !self.line1.trim().is_empty() && !self.line2.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_parameters_iss() {
        let mut el = ElementSet {
            mean_motion: 15.49747070,
            ..Default::default()
        };
        el.recompute_derived();

        // 1440 / 15.49747070 rev/day
        assert!((el.period_min - 92.9184).abs() < 1e-3);
        // Kepler III for a 92.92-minute period
        assert!((el.semi_major_axis_km - 6795.6).abs() < 1.0);
        assert!((el.altitude_km - 424.6).abs() < 1.0);
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let mut el = ElementSet {
            mean_motion: 14.2,
            ..Default::default()
        };
        el.recompute_derived();
        let first = (el.period_min, el.semi_major_axis_km, el.altitude_km);
        el.recompute_derived();
        assert_eq!(first, (el.period_min, el.semi_major_axis_km, el.altitude_km));
    }

    #[test]
    fn test_degenerate_mean_motion_zeroes_derived() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut el = ElementSet {
                mean_motion: bad,
                ..Default::default()
            };
            el.recompute_derived();
            assert_eq!(el.period_min, 0.0);
            assert_eq!(el.semi_major_axis_km, 0.0);
            assert_eq!(el.altitude_km, 0.0);
        }
    }

    #[test]
    fn test_display_name_fallback() {
        let mut el = ElementSet {
            norad_id: 25544,
            ..Default::default()
        };
        assert_eq!(el.display_name(), "NORAD 25544");
        el.name = "ISS (ZARYA)".to_string();
        assert_eq!(el.display_name(), "ISS (ZARYA)");
    }
}
