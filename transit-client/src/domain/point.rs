//! Geographic coordinate type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres, for distance estimates.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 coordinate stored in micro-degrees.
///
/// Backends exchange coordinates either as float degrees or as integer
/// micro-degrees (degrees × 1e6). Storing micro-degrees keeps `Point`
/// `Copy + Eq + Hash`, which the rest of the model relies on.
///
/// # Examples
///
/// ```
/// use transit_client::domain::Point;
///
/// let p = Point::from_degrees(52.5200, 13.4050);
/// assert_eq!(p.lat_e6(), 52_520_000);
/// assert!((p.lat_degrees() - 52.52).abs() < 1e-6);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    lat_e6: i32,
    lon_e6: i32,
}

impl Point {
    /// Creates a point from integer micro-degrees.
    pub fn from_e6(lat_e6: i32, lon_e6: i32) -> Self {
        Self { lat_e6, lon_e6 }
    }

    /// Creates a point from float degrees, rounding to micro-degree precision.
    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Self {
            lat_e6: (lat * 1e6).round() as i32,
            lon_e6: (lon * 1e6).round() as i32,
        }
    }

    /// Latitude in micro-degrees.
    pub fn lat_e6(&self) -> i32 {
        self.lat_e6
    }

    /// Longitude in micro-degrees.
    pub fn lon_e6(&self) -> i32 {
        self.lon_e6
    }

    /// Latitude in degrees.
    pub fn lat_degrees(&self) -> f64 {
        f64::from(self.lat_e6) / 1e6
    }

    /// Longitude in degrees.
    pub fn lon_degrees(&self) -> f64 {
        f64::from(self.lon_e6) / 1e6
    }

    /// Great-circle distance to another point, in metres (haversine).
    ///
    /// Used for the "same real-world place" proximity check between
    /// adjacent trip legs; accuracy well below a metre at that scale.
    pub fn distance_m(&self, other: &Point) -> f64 {
        let lat1 = self.lat_degrees().to_radians();
        let lat2 = other.lat_degrees().to_radians();
        let dlat = (other.lat_degrees() - self.lat_degrees()).to_radians();
        let dlon = (other.lon_degrees() - self.lon_degrees()).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.lat_degrees(), self.lon_degrees())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat_degrees(), self.lon_degrees())
    }
}
