//! Spherical geometry primitives for the Stoop map surface.
//!
//! Everything here works on WGS84 points (longitude/latitude degrees,
//! the standard for GPS). The functions are pure and deterministic:
//! great-circle distance in statute miles, destination-point projection,
//! and ring generation for rendering a claim radius as an approximate
//! disk. The `wkt` module handles the `SRID=4326;POINT(lng lat)` literals
//! the API exchanges with clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod wkt;

/// Earth radius used for distance calculations, statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Earth radius used for destination-point projection, kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Statute miles to kilometers.
pub const MILES_TO_KM: f64 = 1.60934;

/// Default segment count for [`circle_polygon`] rings.
pub const DEFAULT_CIRCLE_STEPS: usize = 64;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("invalid longitude {0}: must be a finite value between -180 and 180")]
    InvalidLongitude(f64),

    #[error("invalid latitude {0}: must be a finite value between -90 and 90")]
    InvalidLatitude(f64),
}

/// A WGS84 point. Construct through [`Point::new`] so non-finite and
/// out-of-range coordinates never enter the system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lng: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lng: f64, lat: f64) -> Result<Self, GeoError> {
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::InvalidLongitude(lng));
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidLatitude(lat));
        }

        Ok(Self { lng, lat })
    }
}

/// Haversine great-circle distance between two points in statute miles.
///
/// Symmetric within floating-point tolerance and zero iff `a == b`.
pub fn distance_miles(a: Point, b: Point) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// Spherical destination point: start at `origin`, travel `angular_distance`
/// radians along the given bearing (radians, clockwise from north).
pub fn destination(origin: Point, bearing: f64, angular_distance: f64) -> Point {
    let lat = origin.lat.to_radians();
    let lng = origin.lng.to_radians();

    let lat2 = (lat.sin() * angular_distance.cos()
        + lat.cos() * angular_distance.sin() * bearing.cos())
    .asin();
    let lng2 = lng
        + (bearing.sin() * angular_distance.sin() * lat.cos())
            .atan2(angular_distance.cos() - lat.sin() * lat2.sin());

    // Projected points near the antimeridian can step just past ±180°;
    // they stay valid render coordinates, so bypass the range check.
    Point {
        lng: lng2.to_degrees(),
        lat: lat2.to_degrees(),
    }
}

/// Closed ring of `steps + 1` points approximating a disk of
/// `radius_miles` around `center` (first point == last point).
///
/// Bearings advance by `2π / steps`, so the generated point set does not
/// depend on where the ring starts.
pub fn circle_polygon(center: Point, radius_miles: f64, steps: usize) -> Vec<Point> {
    let radius_km = radius_miles * MILES_TO_KM;
    let angular_distance = radius_km / EARTH_RADIUS_KM;

    let mut ring = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let bearing = 2.0 * std::f64::consts::PI * i as f64 / steps as f64;
        ring.push(destination(center, bearing, angular_distance));
    }

    ring
}
