//! Buffer construction and bounding boxes for `geo` geometries.

use geo::{BoundingRect, Coord, Geometry, LineString, Polygon};

use crate::coords::{BoundingBox, GeoPoint};
use crate::projection::{from_mercator, to_mercator};

/// Segments per quarter circle; 64 vertices per full ring.
pub const QUADRANT_SEGMENTS: usize = 16;

/// Planar circle of `radius` around (cx, cy), `4 * QUADRANT_SEGMENTS` vertices,
/// ring closed. A zero radius yields a degenerate ring at the centre.
pub fn circle(cx: f64, cy: f64, radius: f64) -> Polygon<f64> {
    let n = 4 * QUADRANT_SEGMENTS;
    let mut ring: Vec<Coord<f64>> = (0..n)
        .map(|i| {
            let theta = std::f64::consts::TAU * i as f64 / n as f64;
            Coord { x: cx + radius * theta.cos(), y: cy + radius * theta.sin() }
        })
        .collect();
    ring.push(ring[0]);
    Polygon::new(LineString::from(ring), vec![])
}

/// Buffer in degree space: the radius is an angle, not a distance.
///
/// Used for the coarse coastline-proximity test where km are converted at
/// 111 km per degree. Shape is distorted away from the equator and is not
/// wrapped at the antimeridian.
pub fn degree_buffer(center: GeoPoint, radius_deg: f64) -> Polygon<f64> {
    circle(center.lon(), center.lat(), radius_deg)
}

/// Circular buffer of `radius_m` built in Web Mercator metres, with every
/// vertex reprojected back to geographic degrees.
pub fn metric_buffer(center: GeoPoint, radius_m: f64) -> Polygon<f64> {
    let (cx, cy) = to_mercator(center.lon(), center.lat());
    let projected = circle(cx, cy, radius_m);
    let ring: Vec<Coord<f64>> = projected
        .exterior()
        .coords()
        .map(|c| {
            let (lon, lat) = from_mercator(c.x, c.y);
            Coord { x: lon, y: lat }
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

/// Bounding box of any geometry; `None` for empty geometries.
pub fn geometry_bbox(geometry: &Geometry<f64>) -> Option<BoundingBox> {
    geometry.bounding_rect().map(BoundingBox::from_rect)
}

pub fn polygon_bbox(polygon: &Polygon<f64>) -> Option<BoundingBox> {
    polygon.bounding_rect().map(BoundingBox::from_rect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo::{Contains, Point};

    #[test]
    fn circle_has_closed_ring_of_expected_size() {
        let c = circle(0.0, 0.0, 1.0);
        let coords: Vec<_> = c.exterior().coords().collect();
        assert_eq!(coords.len(), 4 * QUADRANT_SEGMENTS + 1);
        assert_eq!(coords.first(), coords.last());
        for p in coords {
            assert_abs_diff_eq!((p.x * p.x + p.y * p.y).sqrt(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn degree_buffer_bbox_matches_radius() {
        let center = GeoPoint::new(10.0, 20.0).unwrap();
        let bbox = polygon_bbox(&degree_buffer(center, 0.9)).unwrap();
        assert_abs_diff_eq!(bbox.min_lon, 19.1, epsilon = 1e-9);
        assert_abs_diff_eq!(bbox.max_lon, 20.9, epsilon = 1e-9);
        assert_abs_diff_eq!(bbox.min_lat, 9.1, epsilon = 1e-9);
        assert_abs_diff_eq!(bbox.max_lat, 10.9, epsilon = 1e-9);
    }

    #[test]
    fn metric_buffer_at_equator_spans_radius() {
        let center = GeoPoint::new(0.0, 0.0).unwrap();
        let buffer = metric_buffer(center, 111_319.49);
        let bbox = polygon_bbox(&buffer).unwrap();
        // 1° of longitude on the Web Mercator sphere is ~111.32 km.
        assert_abs_diff_eq!(bbox.max_lon, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(bbox.min_lon, -1.0, epsilon = 1e-4);
        assert!(buffer.contains(&Point::new(0.5, 0.5)));
        assert!(!buffer.contains(&Point::new(0.9, 0.9)));
    }

    #[test]
    fn metric_buffer_keeps_longitude_span_across_latitudes() {
        // Same projected radius: identical longitude span, narrower latitude span further north.
        let equator = polygon_bbox(&metric_buffer(GeoPoint::new(0.0, 0.0).unwrap(), 50_000.0)).unwrap();
        let north = polygon_bbox(&metric_buffer(GeoPoint::new(60.0, 0.0).unwrap(), 50_000.0)).unwrap();
        assert_abs_diff_eq!(
            equator.max_lon - equator.min_lon,
            north.max_lon - north.min_lon,
            epsilon = 1e-9
        );
        assert!(north.max_lat - north.min_lat < equator.max_lat - equator.min_lat);
    }
}
