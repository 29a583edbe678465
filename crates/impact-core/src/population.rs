//! Population within a radius of an impact point.

use std::time::Instant;

use tracing::debug;

use crate::coords::GeoPoint;
use crate::error::{ImpactError, Result};
use crate::geometry::{metric_buffer, polygon_bbox};
use crate::raster::{GeoTiffSource, PopulationSource};

/// Sums gridded population inside a circular buffer.
#[derive(Debug, Clone)]
pub struct PopulationAggregator<S = GeoTiffSource> {
    source: S,
}

impl<S: PopulationSource> PopulationAggregator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// People living within `radius_km` of `point`.
    ///
    /// The circle is built in Web Mercator metres (EPSG:3857) and reprojected
    /// to degrees; cells whose centres fall inside it are summed, together
    /// with the cell under the point itself. Nodata, NaN and non-positive
    /// cells are skipped. The f64 total is truncated, not rounded.
    ///
    /// A radius of zero returns the cell covering the point. Errors with
    /// `DataUnavailable` if the raster cannot be read; a buffer outside the
    /// raster extent yields 0.
    pub fn population_in_radius(&self, point: GeoPoint, radius_km: f64) -> Result<u64> {
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(ImpactError::invalid(format!(
                "radius {radius_km} km must be finite and non-negative"
            )));
        }
        let start = Instant::now();

        let buffer = metric_buffer(point, radius_km * 1000.0);
        let Some(mut bbox) = polygon_bbox(&buffer) else {
            return Ok(0);
        };
        // Keep the anchor cell in the window even for a degenerate buffer.
        bbox.min_lon = bbox.min_lon.min(point.lon());
        bbox.max_lon = bbox.max_lon.max(point.lon());
        bbox.min_lat = bbox.min_lat.min(point.lat());
        bbox.max_lat = bbox.max_lat.max(point.lat());

        let Some(grid) = self.source.read_window(&bbox)? else {
            return Ok(0);
        };
        let total = grid.sum_within(&buffer, point);

        debug!(
            lat = point.lat(),
            lon = point.lon(),
            radius_km,
            cells = grid.width * grid.height,
            total,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "population in radius"
        );
        Ok(total.max(0.0) as u64)
    }

    /// Validate raw input, then aggregate.
    pub fn population_at(&self, lat: f64, lon: f64, radius_km: f64) -> Result<u64> {
        let point = GeoPoint::new(lat, lon)?;
        self.population_in_radius(point, radius_km)
    }
}
