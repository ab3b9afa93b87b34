//! Orbit tracking façade
//!
//! Owns one decoded element set and answers timestamped position queries,
//! delegating to the SGP4 engine when one is available and degrading to a
//! plain ellipse model when it is not. Engine failures never cross the
//! query boundary: they land on the event queue and the query answers
//! with a zero vector.
//!
//! The handle has no internal locking; initialization and queries on the
//! same handle must be serialized by the caller.

use chrono::{DateTime, TimeDelta, Utc};
use glam::Vec3;
use nalgebra::Vector3;
use std::f64::consts::PI;
use std::fmt;

use super::engine::{PropagationEngine, Sgp4Engine};
use super::orbit_ring::ring_point;
use crate::tle::{ElementSet, EARTH_RADIUS_KM, MU_EARTH_KM3_S2};

/// Radius of the rendered Earth sphere in scene units
pub const RENDER_EARTH_RADIUS: f64 = 3.0;

/// Observable tracker failure, drained via [`OrbitTracker::take_events`]
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// `initialize` failed; the handle is not ready
    InitFailed { reason: String },
    /// A per-call engine failure; the query answered with a zero vector
    PropagationFailed { reason: String },
}

impl fmt::Display for TrackerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitFailed { reason } => write!(f, "initialization failed: {}", reason),
            Self::PropagationFailed { reason } => write!(f, "propagation failed: {}", reason),
        }
    }
}

/// Stateful wrapper around one element set and one propagation engine
///
/// Created empty, ready only after a successful [`initialize`](Self::initialize);
/// a later initialization that fails drops the handle back to not-ready.
/// There is no partially-ready state.
pub struct OrbitTracker {
    elements: Option<ElementSet>,
    engine: Option<Box<dyn PropagationEngine>>,
    initialized: bool,
    events: Vec<TrackerEvent>,
}

impl Default for OrbitTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitTracker {
    pub fn new() -> Self {
        Self {
            elements: None,
            engine: None,
            initialized: false,
            events: Vec::new(),
        }
    }

    /// Adopt an element set and construct the engine from its raw lines
    ///
    /// The engine consumes the original TLE text, so a record that lost
    /// its raw lines cannot initialize. On any failure the handle is left
    /// not-ready (regardless of an earlier success), the element set is
    /// still retained for the fallback path, and an
    /// [`TrackerEvent::InitFailed`] is queued.
    pub fn initialize(&mut self, elements: ElementSet) -> bool {
        self.initialized = false;
        self.engine = None;

        let outcome = if !elements.has_raw_lines() {
            Err("raw TLE lines missing".to_string())
        } else {
            Sgp4Engine::from_lines(&elements.line1, &elements.line2)
                .map(|engine| Box::new(engine) as Box<dyn PropagationEngine>)
                .map_err(|e| e.to_string())
        };

        match outcome {
            Ok(engine) => {
                log::info!(
                    "tracking {} via {}: altitude {:.0} km, period {:.2} min",
                    elements.display_name(),
                    engine.name(),
                    elements.altitude_km,
                    elements.period_min
                );
                self.engine = Some(engine);
                self.elements = Some(elements);
                self.initialized = true;
                true
            }
            Err(reason) => {
                log::warn!("tracker initialization failed: {}", reason);
                self.events.push(TrackerEvent::InitFailed { reason });
                self.elements = Some(elements);
                false
            }
        }
    }

    /// Adopt an element set with a caller-supplied engine
    ///
    /// Lets an alternative SGP4 implementation stand behind the same
    /// façade contract.
    pub fn initialize_with_engine(
        &mut self,
        elements: ElementSet,
        engine: Box<dyn PropagationEngine>,
    ) {
        self.engine = Some(engine);
        self.elements = Some(elements);
        self.initialized = true;
    }

    pub fn is_ready(&self) -> bool {
        self.initialized
    }

    /// Satellite name from the element set, if any
    pub fn name(&self) -> &str {
        self.elements.as_ref().map(|e| e.name.as_str()).unwrap_or("")
    }

    pub fn elements(&self) -> Option<&ElementSet> {
        self.elements.as_ref()
    }

    /// Drain pending failure events
    pub fn take_events(&mut self) -> Vec<TrackerEvent> {
        std::mem::take(&mut self.events)
    }

    /// ECI position (km) at the given UTC instant
    ///
    /// Ready: one SGP4 evaluation at the engine's calendar representation
    /// of the instant. A per-call engine failure queues an event and
    /// answers with the zero vector; the handle stays ready. Not ready:
    /// the lower-fidelity ellipse fallback, or zero when no element set
    /// is held. Never NaN, never a panic.
    pub fn position_at(&mut self, time: DateTime<Utc>) -> Vector3<f64> {
        if self.initialized {
            if let Some(engine) = self.engine.as_mut() {
                return match engine.position_at(time) {
                    Ok(pos) => pos,
                    Err(e) => {
                        let reason = e.to_string();
                        log::warn!("propagation failed: {}", reason);
                        self.events.push(TrackerEvent::PropagationFailed { reason });
                        Vector3::zeros()
                    }
                };
            }
        }
        self.fallback_position(time)
    }

    /// ECI position (km) and velocity (km/s) at the given UTC instant
    ///
    /// With an engine both come from one analytic evaluation. The
    /// degraded path estimates velocity from positions one second apart,
    /// an approximation that drifts with orbital curvature.
    pub fn position_velocity_at(&mut self, time: DateTime<Utc>) -> (Vector3<f64>, Vector3<f64>) {
        if self.initialized {
            if let Some(engine) = self.engine.as_mut() {
                match engine.position_velocity_at(time) {
                    Ok(pair) => return pair,
                    Err(e) => {
                        let reason = e.to_string();
                        log::warn!("propagation failed: {}", reason);
                        self.events.push(TrackerEvent::PropagationFailed { reason });
                        return (Vector3::zeros(), Vector3::zeros());
                    }
                }
            }
        }

        let p0 = self.fallback_position(time);
        let p1 = self.fallback_position(time + TimeDelta::seconds(1));
        (p0, p1 - p0)
    }

    /// ECI position (km) at an offset from the element-set epoch
    pub fn position_at_offset(&mut self, seconds_since_epoch: f64) -> Vector3<f64> {
        let Some(epoch) = self.elements.as_ref().map(|e| e.epoch) else {
            return Vector3::zeros();
        };
        let offset = TimeDelta::microseconds((seconds_since_epoch * 1e6) as i64);
        self.position_at(epoch + offset)
    }

    /// Minutes between the element-set epoch and the given instant
    pub fn minutes_since_epoch(&self, time: DateTime<Utc>) -> f64 {
        self.elements
            .as_ref()
            .map(|e| (time - e.epoch).num_milliseconds() as f64 / 60_000.0)
            .unwrap_or(0.0)
    }

    /// Precomputed mean altitude (km); 0 when the handle is not ready
    pub fn altitude_km(&self) -> f64 {
        if !self.initialized {
            return 0.0;
        }
        self.elements.as_ref().map(|e| e.altitude_km).unwrap_or(0.0)
    }

    /// Ideal circular speed sqrt(μ / a) (km/s); 0 when not ready
    ///
    /// A theoretical figure for the record's semi-major axis, not the
    /// instantaneous speed a position/velocity query reports.
    pub fn orbital_speed_km_s(&self) -> f64 {
        if !self.initialized {
            return 0.0;
        }
        match self.elements.as_ref() {
            Some(e) if e.semi_major_axis_km > 0.0 => {
                (MU_EARTH_KM3_S2 / e.semi_major_axis_km).sqrt()
            }
            _ => 0.0,
        }
    }

    /// Map an ECI position (km) into scene units
    ///
    /// The scene draws Earth as a sphere of [`RENDER_EARTH_RADIUS`]
    /// units, so one scene unit is `EARTH_RADIUS_KM / RENDER_EARTH_RADIUS`
    /// kilometers. Pure unit conversion, no axis changes.
    pub fn to_display_coordinates(eci_km: &Vector3<f64>, scale: f64) -> Vec3 {
        let km_per_unit = EARTH_RADIUS_KM / RENDER_EARTH_RADIUS;
        Vec3::new(
            (eci_km.x / km_per_unit * scale) as f32,
            (eci_km.y / km_per_unit * scale) as f32,
            (eci_km.z / km_per_unit * scale) as f32,
        )
    }

    /// Plain-ellipse estimate used when no engine is available
    ///
    /// Advances the angle from the decoded mean anomaly at the record's
    /// mean motion. Far below SGP4 fidelity, but keeps a marker moving
    /// on screen.
    fn fallback_position(&self, time: DateTime<Utc>) -> Vector3<f64> {
        let Some(el) = self.elements.as_ref() else {
            return Vector3::zeros();
        };
        if el.semi_major_axis_km <= 0.0 {
            return Vector3::zeros();
        }

        let elapsed_days = (time - el.epoch).num_milliseconds() as f64 / 86_400_000.0;
        let angle = el.mean_anomaly_deg.to_radians() + 2.0 * PI * el.mean_motion * elapsed_days;
        ring_point(
            el.semi_major_axis_km,
            el.eccentricity,
            el.inclination_deg,
            angle,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::engine::EngineError;
    use crate::tle::decode_lines;
    use chrono::TimeZone;

    const ISS_LINE1: &str =
        "1 25544U 98067A   25308.55131963  .00010237  00000+0  18874-3 0  9994";
    const ISS_LINE2: &str =
        "2 25544  51.6336 331.5320 0005028  16.6774 343.4380 15.49747070536934";

    fn iss_elements() -> ElementSet {
        decode_lines(ISS_LINE1, ISS_LINE2).elements
    }

    struct FailingEngine;

    impl PropagationEngine for FailingEngine {
        fn position_at(&mut self, _time: DateTime<Utc>) -> Result<Vector3<f64>, EngineError> {
            Err(EngineError::Model("orbit decayed".to_string()))
        }

        fn position_velocity_at(
            &mut self,
            _time: DateTime<Utc>,
        ) -> Result<(Vector3<f64>, Vector3<f64>), EngineError> {
            Err(EngineError::Model("orbit decayed".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing stub"
        }
    }

    #[test]
    fn test_empty_handle_answers_zero() {
        let mut tracker = OrbitTracker::new();
        assert!(!tracker.is_ready());
        assert_eq!(tracker.name(), "");

        let now = Utc.with_ymd_and_hms(2025, 11, 4, 14, 0, 0).unwrap();
        let pos = tracker.position_at(now);
        assert_eq!(pos, Vector3::zeros());
        assert_eq!(tracker.altitude_km(), 0.0);
        assert_eq!(tracker.orbital_speed_km_s(), 0.0);
        // Querying a never-initialized handle is not an error
        assert!(tracker.take_events().is_empty());
    }

    #[test]
    fn test_missing_raw_lines_is_a_hard_init_failure() {
        let mut el = iss_elements();
        el.line1.clear();
        el.line2.clear();

        let mut tracker = OrbitTracker::new();
        assert!(!tracker.initialize(el));
        assert!(!tracker.is_ready());
        assert!(matches!(
            tracker.take_events().as_slice(),
            [TrackerEvent::InitFailed { .. }]
        ));
    }

    #[test]
    fn test_fallback_stays_on_the_ellipse() {
        let mut el = iss_elements();
        el.line1.clear();
        el.line2.clear();

        let mut tracker = OrbitTracker::new();
        tracker.initialize(el);

        let a = tracker.elements().unwrap().semi_major_axis_km;
        let e = tracker.elements().unwrap().eccentricity;
        let t = Utc.with_ymd_and_hms(2025, 11, 4, 20, 0, 0).unwrap();
        let pos = tracker.position_at(t);

        let radius = pos.norm();
        assert!(radius.is_finite());
        assert!(radius >= a * (1.0 - e) - 1.0);
        assert!(radius <= a * (1.0 + e) + 1.0);
    }

    #[test]
    fn test_fallback_finite_difference_speed() {
        let mut el = iss_elements();
        el.line1.clear();
        el.line2.clear();

        let mut tracker = OrbitTracker::new();
        tracker.initialize(el);
        let a = tracker.elements().unwrap().semi_major_axis_km;

        let t = Utc.with_ymd_and_hms(2025, 11, 5, 0, 0, 0).unwrap();
        let (_, vel) = tracker.position_velocity_at(t);

        // Near-circular orbit: the finite difference should land within
        // a percent of the ideal circular speed
        let ideal = (MU_EARTH_KM3_S2 / a).sqrt();
        let rel_err = (vel.norm() - ideal).abs() / ideal;
        assert!(rel_err < 0.01, "relative error {}", rel_err);
    }

    #[test]
    fn test_engine_path_reports_leo_state() {
        let mut tracker = OrbitTracker::new();
        assert!(tracker.initialize(iss_elements()));
        assert!(tracker.is_ready());

        assert!((tracker.altitude_km() - 424.6).abs() < 1.0);
        assert!((tracker.orbital_speed_km_s() - 7.66).abs() < 0.05);

        let epoch = tracker.elements().unwrap().epoch;
        let (pos, vel) = tracker.position_velocity_at(epoch);
        assert!((6650.0..6950.0).contains(&pos.norm()));
        assert!((7.0..8.5).contains(&vel.norm()));
        assert!(tracker.take_events().is_empty());
    }

    #[test]
    fn test_engine_failure_is_recoverable_per_call() {
        let mut tracker = OrbitTracker::new();
        tracker.initialize_with_engine(iss_elements(), Box::new(FailingEngine));
        assert!(tracker.is_ready());

        let t = Utc.with_ymd_and_hms(2025, 11, 4, 14, 0, 0).unwrap();
        let pos = tracker.position_at(t);
        assert_eq!(pos, Vector3::zeros());

        let events = tracker.take_events();
        assert!(matches!(
            events.as_slice(),
            [TrackerEvent::PropagationFailed { .. }]
        ));
        // The failure did not knock the handle out of ready
        assert!(tracker.is_ready());
    }

    #[test]
    fn test_reinitialization_failure_invalidates_handle() {
        let mut tracker = OrbitTracker::new();
        assert!(tracker.initialize(iss_elements()));
        assert!(tracker.is_ready());

        let mut bad = iss_elements();
        bad.line1.clear();
        bad.line2.clear();
        assert!(!tracker.initialize(bad));
        assert!(!tracker.is_ready());
    }

    #[test]
    fn test_position_at_offset_tracks_epoch() {
        let mut tracker = OrbitTracker::new();
        tracker.initialize(iss_elements());

        let epoch = tracker.elements().unwrap().epoch;
        let direct = tracker.position_at(epoch + TimeDelta::seconds(600));
        let offset = tracker.position_at_offset(600.0);
        assert!((direct - offset).norm() < 1e-6);

        assert!((tracker.minutes_since_epoch(epoch + TimeDelta::seconds(600)) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_transform_is_pure_scaling() {
        let eci = Vector3::new(EARTH_RADIUS_KM, 0.0, -2.0 * EARTH_RADIUS_KM);
        let display = OrbitTracker::to_display_coordinates(&eci, 1.0);
        assert!((display.x - RENDER_EARTH_RADIUS as f32).abs() < 1e-5);
        assert_eq!(display.y, 0.0);
        assert!((display.z + 2.0 * RENDER_EARTH_RADIUS as f32).abs() < 1e-5);

        let doubled = OrbitTracker::to_display_coordinates(&eci, 2.0);
        assert!((doubled.x - 2.0 * display.x).abs() < 1e-5);
    }
}
