//! Vector layer store: land, ocean, lakes, rivers and coastline features with
//! one spatial index per layer.
//!
//! Layers are read from Natural Earth shapefiles once at startup and never
//! mutated afterwards, so a loaded [`VectorLayerStore`] can be shared across
//! threads by reference.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use geo::{Contains, Coord, Geometry, Intersects, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};
use shapefile::{PolygonRing, Shape};
use tracing::{debug, info, warn};

use crate::config::DataPaths;
use crate::coords::{BoundingBox, GeoPoint};
use crate::error::{ImpactError, Result};
use crate::geometry::{geometry_bbox, polygon_bbox};
use crate::spatial_index::{RTreeIndex, SpatialIndex};

/// The five geographic datasets the classifier consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Land,
    Ocean,
    Lakes,
    Rivers,
    Coastline,
}

impl LayerKind {
    pub const ALL: [LayerKind; 5] =
        [LayerKind::Land, LayerKind::Ocean, LayerKind::Lakes, LayerKind::Rivers, LayerKind::Coastline];

    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Land => "land",
            LayerKind::Ocean => "ocean",
            LayerKind::Lakes => "lakes",
            LayerKind::Rivers => "rivers",
            LayerKind::Coastline => "coastline",
        }
    }

    fn slot(self) -> usize {
        match self {
            LayerKind::Land => 0,
            LayerKind::Ocean => 1,
            LayerKind::Lakes => 2,
            LayerKind::Rivers => 3,
            LayerKind::Coastline => 4,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One geometry plus its precomputed bounding box.
#[derive(Debug, Clone)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub bbox: BoundingBox,
}

/// An ordered feature collection with a bounding-box index.
pub struct VectorLayer {
    kind: LayerKind,
    features: Vec<Feature>,
    index: Box<dyn SpatialIndex>,
}

impl VectorLayer {
    /// Build a layer and bulk-load an R-tree over it. Empty geometries are dropped.
    pub fn from_geometries(kind: LayerKind, geometries: impl IntoIterator<Item = Geometry<f64>>) -> Self {
        let features = to_features(geometries);
        let index = RTreeIndex::bulk_load(features.iter().enumerate().map(|(id, f)| (id, f.bbox)));
        Self { kind, features, index: Box::new(index) }
    }

    /// Build a layer on a caller-supplied index, inserting features one by one.
    pub fn with_index(
        kind: LayerKind,
        geometries: impl IntoIterator<Item = Geometry<f64>>,
        mut index: Box<dyn SpatialIndex>,
    ) -> Self {
        let features = to_features(geometries);
        for (id, f) in features.iter().enumerate() {
            index.insert(id, f.bbox);
        }
        Self { kind, features, index }
    }

    /// Read every shape of an ESRI shapefile into a layer.
    pub fn load_shapefile(kind: LayerKind, path: &Path) -> Result<Self> {
        let what = format!("{kind} layer");
        if !path.exists() {
            return Err(ImpactError::unavailable(what, path, "file not found"));
        }
        let start = Instant::now();
        let shapes = shapefile::read_shapes(path).map_err(|e| ImpactError::unavailable(&what, path, e))?;

        let total = shapes.len();
        let geometries: Vec<Geometry<f64>> = shapes.into_iter().filter_map(shape_to_geometry).collect();
        if geometries.len() < total {
            debug!(layer = %kind, skipped = total - geometries.len(), "skipped shapes without usable geometry");
        }

        let layer = Self::from_geometries(kind, geometries);
        info!(
            layer = %kind,
            features = layer.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            path = %path.display(),
            "loaded vector layer"
        );
        Ok(layer)
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Candidate feature ids whose bounding box touches `bbox`.
    pub fn candidates(&self, bbox: &BoundingBox) -> Vec<usize> {
        self.index.query(bbox)
    }

    pub fn feature(&self, id: usize) -> Option<&Geometry<f64>> {
        self.features.get(id).map(|f| &f.geometry)
    }

    /// True if any feature intersects the point (boundary included).
    pub fn intersects_point(&self, point: GeoPoint) -> bool {
        let p = point.to_geo();
        self.candidates(&point.bbox())
            .into_iter()
            .any(|id| self.features[id].geometry.intersects(&p))
    }

    /// True if any feature intersects `polygon`.
    pub fn intersects_polygon(&self, polygon: &Polygon<f64>) -> bool {
        let Some(bbox) = polygon_bbox(polygon) else {
            return false;
        };
        self.candidates(&bbox)
            .into_iter()
            .any(|id| self.features[id].geometry.intersects(polygon))
    }

    /// True if the point lies in the interior of any feature (boundary excluded).
    pub fn contains_point(&self, point: GeoPoint) -> bool {
        let p = point.to_geo();
        self.candidates(&point.bbox())
            .into_iter()
            .any(|id| geometry_contains(&self.features[id].geometry, &p))
    }
}

impl fmt::Debug for VectorLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorLayer")
            .field("kind", &self.kind)
            .field("features", &self.features.len())
            .finish()
    }
}

fn to_features(geometries: impl IntoIterator<Item = Geometry<f64>>) -> Vec<Feature> {
    geometries
        .into_iter()
        .filter_map(|geometry| geometry_bbox(&geometry).map(|bbox| Feature { geometry, bbox }))
        .collect()
}

fn geometry_contains(geometry: &Geometry<f64>, p: &Point<f64>) -> bool {
    match geometry {
        Geometry::Polygon(g) => g.contains(p),
        Geometry::MultiPolygon(g) => g.contains(p),
        Geometry::LineString(g) => g.contains(p),
        Geometry::MultiLineString(g) => g.contains(p),
        Geometry::Point(g) => g.contains(p),
        Geometry::MultiPoint(g) => g.contains(p),
        Geometry::Rect(g) => g.contains(p),
        Geometry::Triangle(g) => g.contains(p),
        Geometry::Line(g) => g.contains(p),
        Geometry::GeometryCollection(gc) => gc.iter().any(|g| geometry_contains(g, p)),
    }
}

// ── Shapefile conversion ──────────────────────────────────────────────────────

fn ring_coords(points: &[shapefile::Point]) -> LineString<f64> {
    points.iter().map(|p| Coord { x: p.x, y: p.y }).collect::<Vec<_>>().into()
}

/// Outer rings open a new polygon; inner rings become holes of the most recent
/// outer ring (shapefile ring order).
fn polygon_from_rings(rings: &[PolygonRing<shapefile::Point>]) -> Option<MultiPolygon<f64>> {
    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();
    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => polygons.push((ring_coords(points), Vec::new())),
            PolygonRing::Inner(points) => match polygons.last_mut() {
                Some((_, holes)) => holes.push(ring_coords(points)),
                None => warn!("inner ring without preceding outer ring, dropped"),
            },
        }
    }
    if polygons.is_empty() {
        return None;
    }
    Some(MultiPolygon::new(
        polygons.into_iter().map(|(exterior, holes)| Polygon::new(exterior, holes)).collect(),
    ))
}

/// Convert one shapefile record to a `geo` geometry. Null and
/// measured/3D shapes yield `None`.
pub(crate) fn shape_to_geometry(shape: Shape) -> Option<Geometry<f64>> {
    match shape {
        Shape::Polygon(polygon) => {
            let mp = polygon_from_rings(polygon.rings())?;
            if mp.0.len() == 1 {
                mp.0.into_iter().next().map(Geometry::Polygon)
            } else {
                Some(Geometry::MultiPolygon(mp))
            }
        }
        Shape::Polyline(line) => {
            let parts: Vec<LineString<f64>> = line.parts().iter().map(|p| ring_coords(p)).collect();
            if parts.len() == 1 {
                parts.into_iter().next().map(Geometry::LineString)
            } else {
                Some(Geometry::MultiLineString(MultiLineString::new(parts)))
            }
        }
        Shape::Point(p) => Some(Geometry::Point(Point::new(p.x, p.y))),
        Shape::Multipoint(mp) => Some(Geometry::MultiPoint(MultiPoint::new(
            mp.points().iter().map(|p| Point::new(p.x, p.y)).collect(),
        ))),
        Shape::NullShape => None,
        other => {
            warn!(shape_type = ?other.shapetype(), "unsupported shape type, skipped");
            None
        }
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// The five layers, loaded once and read-only afterwards.
#[derive(Debug)]
pub struct VectorLayerStore {
    /// Indexed by `LayerKind::slot`.
    layers: Vec<VectorLayer>,
}

impl VectorLayerStore {
    /// Load all five layers. Any missing or unparsable dataset is fatal:
    /// the classifier cannot serve requests without a complete store.
    pub fn load(paths: &DataPaths) -> Result<Self> {
        let start = Instant::now();

        #[cfg(feature = "threading")]
        let loaded: Result<Vec<VectorLayer>> = {
            use rayon::prelude::*;
            LayerKind::ALL
                .par_iter()
                .map(|&kind| VectorLayer::load_shapefile(kind, paths.layer(kind)))
                .collect()
        };
        #[cfg(not(feature = "threading"))]
        let loaded: Result<Vec<VectorLayer>> = LayerKind::ALL
            .iter()
            .map(|&kind| VectorLayer::load_shapefile(kind, paths.layer(kind)))
            .collect();

        let store = Self { layers: loaded? };
        info!(elapsed_ms = start.elapsed().as_millis() as u64, "vector layer store ready");
        Ok(store)
    }

    /// Assemble a store from prebuilt layers (synthetic layers in tests).
    pub fn from_layers(
        land: VectorLayer,
        ocean: VectorLayer,
        lakes: VectorLayer,
        rivers: VectorLayer,
        coastline: VectorLayer,
    ) -> Result<Self> {
        let layers = vec![land, ocean, lakes, rivers, coastline];
        for (layer, kind) in layers.iter().zip(LayerKind::ALL) {
            if layer.kind() != kind {
                return Err(ImpactError::invalid(format!(
                    "expected {kind} layer in slot {}, got {}",
                    kind.slot(),
                    layer.kind()
                )));
            }
        }
        Ok(Self { layers })
    }

    pub fn layer(&self, kind: LayerKind) -> &VectorLayer {
        &self.layers[kind.slot()]
    }

    pub fn land(&self) -> &VectorLayer {
        self.layer(LayerKind::Land)
    }

    pub fn ocean(&self) -> &VectorLayer {
        self.layer(LayerKind::Ocean)
    }

    pub fn lakes(&self) -> &VectorLayer {
        self.layer(LayerKind::Lakes)
    }

    pub fn rivers(&self) -> &VectorLayer {
        self.layer(LayerKind::Rivers)
    }

    pub fn coastline(&self) -> &VectorLayer {
        self.layer(LayerKind::Coastline)
    }

    /// Strict land/ocean coverage: which of the two layers holds the point.
    /// `NoMatch` when neither does (a gap in the datasets).
    pub fn coverage(&self, point: GeoPoint) -> Result<LayerKind> {
        if self.land().intersects_point(point) {
            Ok(LayerKind::Land)
        } else if self.ocean().intersects_point(point) {
            Ok(LayerKind::Ocean)
        } else {
            Err(ImpactError::NoMatch { lat: point.lat(), lon: point.lon() })
        }
    }
}
