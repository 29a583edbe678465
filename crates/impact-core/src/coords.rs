/// Geographic point and bounding-box types.
/// All coordinate math uses f64 for precision.
use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

use crate::error::{ImpactError, Result};

/// Wrap a longitude into [-180, 180).
///
/// The result is congruent to `lon` modulo 360. Every layer query goes through
/// this first: the datasets are stored in [-180, 180] and an unwrapped
/// longitude would silently miss (or hit the wrong) polygons.
pub fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// A validated point in geographic coordinates (EPSG:4326).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, -90 to +90.
    lat: f64,
    /// Longitude in degrees, -180 (inclusive) to +180 (exclusive).
    lon: f64,
}

impl GeoPoint {
    /// Validate `lat` and wrap `lon`.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ImpactError::invalid(format!("latitude {lat} outside [-90, 90]")));
        }
        if !lon.is_finite() {
            return Err(ImpactError::invalid(format!("longitude {lon} is not finite")));
        }
        Ok(Self { lat, lon: normalize_lon(lon) })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Degenerate bounding box covering just this point.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.lon, self.lat, self.lon, self.lat)
    }

    /// `geo` point in (x = lon, y = lat) order.
    pub fn to_geo(self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

/// Axis-aligned box in degrees. `min_*` may equal `max_*` (a point).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self { min_lon, min_lat, max_lon, max_lat }
    }

    pub fn from_rect(rect: Rect<f64>) -> Self {
        let (min, max) = (rect.min(), rect.max());
        Self::new(min.x, min.y, max.x, max.y)
    }

    pub fn to_rect(self) -> Rect<f64> {
        Rect::new(
            Coord { x: self.min_lon, y: self.min_lat },
            Coord { x: self.max_lon, y: self.max_lat },
        )
    }

    /// Closed-interval overlap test; touching boxes intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lon <= other.max_lon
            && self.max_lon >= other.min_lon
            && self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_range_and_congruence() {
        let mut rng_state: u64 = 42;
        for _ in 0..1000 {
            // LCG for deterministic pseudo-random
            rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let lon = (rng_state as f64 / u64::MAX as f64) * 4000.0 - 2000.0;

            let n = normalize_lon(lon);
            assert!((-180.0..180.0).contains(&n), "{lon} -> {n}");
            let turns = (lon - n) / 360.0;
            assert!((turns - turns.round()).abs() < 1e-9, "{lon} -> {n} not congruent");
        }
    }

    #[test]
    fn normalize_edges() {
        assert_eq!(normalize_lon(180.0), -180.0);
        assert_eq!(normalize_lon(-180.0), -180.0);
        assert_eq!(normalize_lon(190.0), -170.0);
        assert_eq!(normalize_lon(540.0), -180.0);
        assert_eq!(normalize_lon(0.0), 0.0);
        assert!(normalize_lon(-1e-20) < 180.0);
    }

    #[test]
    fn new_wraps_longitude() {
        let p = GeoPoint::new(10.0, 190.0).unwrap();
        assert_eq!(p.lon(), -170.0);
        assert_eq!(p, GeoPoint::new(10.0, -170.0).unwrap());
    }

    #[test]
    fn new_rejects_bad_latitude() {
        assert!(matches!(GeoPoint::new(91.0, 0.0), Err(ImpactError::InvalidInput(_))));
        assert!(matches!(GeoPoint::new(f64::NAN, 0.0), Err(ImpactError::InvalidInput(_))));
        assert!(matches!(GeoPoint::new(0.0, f64::INFINITY), Err(ImpactError::InvalidInput(_))));
        assert!(GeoPoint::new(-90.0, 0.0).is_ok());
    }

    #[test]
    fn bbox_intersection_includes_touching() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(1.0, 1.0, 2.0, 2.0);
        let c = BoundingBox::new(1.5, 1.5, 2.0, 2.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        let p = GeoPoint::new(0.5, 0.5).unwrap().bbox();
        assert!(a.intersects(&p));
    }
}
