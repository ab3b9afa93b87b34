//! Cosmetic orbit ring generation
//!
//! A static ellipse ring for drawing an orbit path. Purely geometric,
//! with no epoch and no time dependence. The same point model doubles as
//! the tracker's degraded fallback when no SGP4 engine is available.

use glam::Vec3;
use nalgebra::Vector3;
use std::f64::consts::PI;

/// Eccentricity ceiling; keeps the polar-ellipse radius finite
const MAX_ECCENTRICITY: f64 = 0.99;

/// Point on the inclined ellipse at the given angle (radians)
///
/// Polar ellipse r = a(1 - e²) / (1 + e cos θ) in the orbital plane,
/// tilted about the X axis by the inclination.
pub fn ring_point(
    semi_major_axis_km: f64,
    eccentricity: f64,
    inclination_deg: f64,
    angle: f64,
) -> Vector3<f64> {
    let e = eccentricity.clamp(0.0, MAX_ECCENTRICITY);
    let radius = semi_major_axis_km * (1.0 - e * e) / (1.0 + e * angle.cos());

    let x_orb = radius * angle.cos();
    let y_orb = radius * angle.sin();

    let (sin_inc, cos_inc) = inclination_deg.to_radians().sin_cos();
    Vector3::new(x_orb, y_orb * cos_inc, y_orb * sin_inc)
}

/// Closed ring of `n + 1` points over one full revolution
///
/// The first and last points both sit at θ = 0 ≡ 2π, so the polyline
/// closes by construction.
pub fn generate_orbit_ring(
    semi_major_axis_km: f64,
    eccentricity: f64,
    inclination_deg: f64,
    n: u32,
) -> Vec<Vec3> {
    let n = n.max(3);
    let mut points = Vec::with_capacity(n as usize + 1);

    for i in 0..=n {
        let angle = 2.0 * PI * f64::from(i) / f64::from(n);
        let p = ring_point(semi_major_axis_km, eccentricity, inclination_deg, angle);
        points.push(Vec3::new(p.x as f32, p.y as f32, p.z as f32));
    }

    points
}
