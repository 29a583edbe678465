//! Impact-site classification against the vector layer store.
//!
//! Ordered cascade, first match wins: Lake, River, then Land. Land points are
//! split into Coastal/Inland by a coastline-proximity test; everything else is
//! Ocean.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DEFAULT_COASTAL_DISTANCE_KM;
use crate::coords::GeoPoint;
use crate::error::{ImpactError, Result};
use crate::geometry::degree_buffer;
use crate::layers::VectorLayerStore;

/// Linear km-per-degree used for the coastal buffer (1° latitude ≈ 111 km).
pub const KM_PER_DEGREE: f64 = 111.0;

/// Terrain category at an impact point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Open water: direct tsunami source.
    Ocean,
    /// Land within the coastal distance of a coastline: receives tsunami.
    Coastal,
    /// Land far from any coastline.
    Inland,
    /// Lake surface: local flooding.
    Lake,
    /// River centreline: downstream flooding.
    River,
}

impl Classification {
    pub const ALL: [Classification; 5] = [
        Classification::Ocean,
        Classification::Coastal,
        Classification::Inland,
        Classification::Lake,
        Classification::River,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Ocean => "Ocean",
            Classification::Coastal => "Coastal",
            Classification::Inland => "Inland",
            Classification::Lake => "Lake",
            Classification::River => "River",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ocean and Coastal impacts carry tsunami risk; nothing else does.
pub fn tsunami_risk(classification: Classification) -> bool {
    matches!(classification, Classification::Ocean | Classification::Coastal)
}

/// Classifier over a borrowed, immutable layer store.
#[derive(Debug, Clone, Copy)]
pub struct ImpactClassifier<'a> {
    store: &'a VectorLayerStore,
}

impl<'a> ImpactClassifier<'a> {
    pub fn new(store: &'a VectorLayerStore) -> Self {
        Self { store }
    }

    /// Classify with the default 100 km coastal distance.
    pub fn classify_default(&self, point: GeoPoint) -> Classification {
        self.classify(point, DEFAULT_COASTAL_DISTANCE_KM)
    }

    /// Run the cascade. `GeoPoint` construction has already wrapped the
    /// longitude, so every layer sees [-180, 180).
    ///
    /// The coastal buffer is `coastal_distance_km / 111` degrees in both axes.
    /// It is not corrected for latitude or wrapped at the antimeridian.
    pub fn classify(&self, point: GeoPoint, coastal_distance_km: f64) -> Classification {
        if self.store.lakes().intersects_point(point) {
            debug!(lat = point.lat(), lon = point.lon(), "lake hit");
            return Classification::Lake;
        }
        if self.store.rivers().intersects_point(point) {
            debug!(lat = point.lat(), lon = point.lon(), "river hit");
            return Classification::River;
        }
        if !self.store.land().intersects_point(point) {
            if !self.store.ocean().intersects_point(point) {
                // Gap in the land/ocean coverage; Ocean is the policy answer.
                debug!(lat = point.lat(), lon = point.lon(), "no land or ocean polygon, defaulting to ocean");
            }
            return Classification::Ocean;
        }

        let buffer = degree_buffer(point, coastal_distance_km / KM_PER_DEGREE);
        if self.store.coastline().intersects_polygon(&buffer) {
            Classification::Coastal
        } else {
            Classification::Inland
        }
    }

    /// Validate raw coordinates, then classify.
    pub fn classify_lat_lon(&self, lat: f64, lon: f64, coastal_distance_km: f64) -> Result<Classification> {
        if !coastal_distance_km.is_finite() || coastal_distance_km < 0.0 {
            return Err(ImpactError::invalid(format!(
                "coastal distance {coastal_distance_km} km must be finite and non-negative"
            )));
        }
        let point = GeoPoint::new(lat, lon)?;
        Ok(self.classify(point, coastal_distance_km))
    }

    /// 1 for tsunami risk, 0 otherwise.
    pub fn tsunami_risk_flag(&self, point: GeoPoint, coastal_distance_km: f64) -> u8 {
        u8::from(tsunami_risk(self.classify(point, coastal_distance_km)))
    }

    /// Land membership from the land layer alone (interior only).
    pub fn is_land(&self, point: GeoPoint) -> bool {
        self.store.land().contains_point(point)
    }
}
