//! Spherical geometry helpers used by the nearby search and trip cost estimates
use serde::{Deserialize, Serialize};

/// Mean radius of the earth in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Approximate length of one degree of latitude in kilometers
pub const KM_PER_DEGREE: f64 = 111.0;

// below this the longitude span of a box is effectively unbounded
const MIN_COS_LATITUDE: f64 = 1e-9;

/// A point on the surface of the earth, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometers
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self, other)
    }
}

/// Calculates the great-circle distance between two points with the haversine formula
pub fn haversine_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // rounding can push `a` a hair above 1.0 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Round `value` to the given number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// An inclusive latitude/longitude rectangle.
///
/// When the rectangle crosses the antimeridian, `min_longitude` is greater than
/// `max_longitude` and a longitude matches if it lies on either side of the
/// ±180° line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Computes a box that contains every point within `radius_km` of `center`.
    ///
    /// Deltas start from the flat approximation of 111 km per degree. Away from
    /// the equator the circle bulges east and west of the center's parallel,
    /// so the longitude delta is widened to the spherical bound
    /// `asin(sin(r / R) / cos(lat))` where that is larger.
    pub fn around(center: &Coordinate, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE;
        let min_latitude = (center.latitude - lat_delta).max(-90.0);
        let max_latitude = (center.latitude + lat_delta).min(90.0);

        let cos_lat = center.latitude.to_radians().cos().abs();
        let reaches_pole =
            center.latitude + lat_delta >= 90.0 || center.latitude - lat_delta <= -90.0;
        let angular_radius = radius_km / EARTH_RADIUS_KM;
        let lon_delta = if cos_lat < MIN_COS_LATITUDE
            || angular_radius >= std::f64::consts::FRAC_PI_2
            || angular_radius.sin() >= cos_lat
        {
            f64::INFINITY
        } else {
            let flat = (radius_km / (KM_PER_DEGREE * cos_lat)).abs();
            let spherical = (angular_radius.sin() / cos_lat).asin().to_degrees();
            flat.max(spherical)
        };

        if reaches_pole || lon_delta >= 180.0 {
            return Self {
                min_latitude,
                max_latitude,
                min_longitude: -180.0,
                max_longitude: 180.0,
            };
        }

        let mut min_longitude = center.longitude - lon_delta;
        let mut max_longitude = center.longitude + lon_delta;
        if min_longitude < -180.0 {
            min_longitude += 360.0;
        }
        if max_longitude > 180.0 {
            max_longitude -= 360.0;
        }
        Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.min_longitude > self.max_longitude
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        if point.latitude < self.min_latitude || point.latitude > self.max_latitude {
            return false;
        }
        if self.crosses_antimeridian() {
            point.longitude >= self.min_longitude || point.longitude <= self.max_longitude
        } else {
            point.longitude >= self.min_longitude && point.longitude <= self.max_longitude
        }
    }
}
