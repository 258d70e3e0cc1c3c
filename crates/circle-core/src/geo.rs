use std::f64::consts::PI;

use crate::types::LatLng;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Analysis window sent to the backend, in minutes.
pub const TIME_THRESHOLD_MIN: u32 = 15;

/// Isochrone bands the backend draws.
pub const ISOCHRONE_MINUTES: [u32; 3] = [5, 10, 15];

fn deg2rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

fn rad2deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Great-circle distance in meters (haversine).
pub fn distance_m(a: LatLng, b: LatLng) -> f64 {
    let dlat = deg2rad(b.lat - a.lat);
    let dlng = deg2rad(b.lng - a.lng);
    let h = (dlat / 2.0).sin().powi(2)
        + deg2rad(a.lat).cos() * deg2rad(b.lat).cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Walking pace in meters per minute.
pub fn meters_per_minute(speed_kmh: f64) -> f64 {
    speed_kmh * 1000.0 / 60.0
}

/// Distance covered in `minutes` at `speed_kmh`, unrounded.
pub fn walk_distance_m(speed_kmh: f64, minutes: u32) -> f64 {
    meters_per_minute(speed_kmh) * minutes as f64
}

/// The 15-minute walk distance shown next to the speed slider.
pub fn walk_distance_display(speed_kmh: f64) -> i64 {
    walk_distance_m(speed_kmh, TIME_THRESHOLD_MIN).round() as i64
}

/// Minutes needed to walk `distance_m`.
pub fn walk_minutes(distance_m: f64, speed_kmh: f64) -> f64 {
    distance_m / meters_per_minute(speed_kmh)
}

/// Point reached by travelling `distance_m` from `origin` on `bearing_deg`.
pub fn destination(origin: LatLng, bearing_deg: f64, distance_m: f64) -> LatLng {
    let delta = distance_m / EARTH_RADIUS_M;
    let theta = deg2rad(bearing_deg);
    let phi1 = deg2rad(origin.lat);
    let lambda1 = deg2rad(origin.lng);

    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

    LatLng::new(rad2deg(phi2), rad2deg(lambda2))
}

/// Closed GeoJSON ring approximating a circle of `radius_m` around `center`.
pub fn circle_ring(center: LatLng, radius_m: f64, segments: usize) -> Vec<[f64; 2]> {
    let segments = segments.max(3);
    let mut ring: Vec<[f64; 2]> = (0..segments)
        .map(|i| {
            let bearing = 360.0 * i as f64 / segments as f64;
            destination(center, bearing, radius_m).to_position()
        })
        .collect();
    ring.push(ring[0]);
    ring
}
