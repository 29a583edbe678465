//! Result assembly: validates a request, runs the classifier (and optionally
//! the population aggregator) and builds the record handed back to callers.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{tsunami_risk, Classification, ImpactClassifier};
use crate::config::{AsteroidDefaults, ImpactConfig};
use crate::coords::GeoPoint;
use crate::error::{ImpactError, Result};
use crate::layers::VectorLayerStore;
use crate::population::PopulationAggregator;
use crate::raster::{GeoTiffSource, PopulationSource};

// ── Request ──────────────────────────────────────────────────────────────────

/// Caller-supplied asteroid description; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidInput {
    pub angle_deg: Option<f64>,
    /// Type name such as "C-type"; only the first letter is kept.
    pub asteroid_type: Option<String>,
    pub density_kg_m3: Option<f64>,
    pub material_strength_pa: Option<f64>,
    pub radius_m: Option<f64>,
    pub velocity_km_s: Option<f64>,
}

/// Raw request as it arrives from the outer layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactRequest {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
    pub asteroid: Option<AsteroidInput>,
}

impl ImpactRequest {
    pub fn at(lat: f64, lon: f64) -> Self {
        Self { lat: Some(lat), lon: Some(lon), ..Self::default() }
    }

    pub fn with_radius(mut self, radius_km: f64) -> Self {
        self.radius_km = Some(radius_km);
        self
    }

    /// Parse JSON; wrong types surface as `InvalidInput`.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ImpactError::invalid(format!("malformed request: {e}")))
    }

    /// Validated impact point.
    pub fn point(&self) -> Result<GeoPoint> {
        let lat = self.lat.ok_or_else(|| ImpactError::invalid("missing lat"))?;
        let lon = self.lon.ok_or_else(|| ImpactError::invalid("missing lon"))?;
        GeoPoint::new(lat, lon)
    }
}

/// Asteroid parameters after defaults have been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidParams {
    pub angle_deg: f64,
    pub asteroid_type: String,
    pub density_kg_m3: f64,
    pub material_strength_pa: f64,
    pub radius_m: f64,
    pub velocity_km_s: f64,
}

impl AsteroidParams {
    /// Fill gaps from `defaults`. Radius and velocity are rounded to 2 decimals.
    pub fn resolve(input: Option<&AsteroidInput>, defaults: &AsteroidDefaults) -> Self {
        let empty = AsteroidInput::default();
        let input = input.unwrap_or(&empty);
        let asteroid_type = input
            .asteroid_type
            .as_deref()
            .and_then(|name| name.trim().chars().next())
            .map(|c| c.to_ascii_uppercase().to_string())
            .unwrap_or_else(|| defaults.asteroid_type.clone());
        Self {
            angle_deg: input.angle_deg.unwrap_or(defaults.angle_deg),
            asteroid_type,
            density_kg_m3: input.density_kg_m3.unwrap_or(defaults.density_kg_m3),
            material_strength_pa: input.material_strength_pa.unwrap_or(defaults.material_strength_pa),
            radius_m: round2(input.radius_m.unwrap_or(defaults.radius_m)),
            velocity_km_s: round2(input.velocity_km_s.unwrap_or(defaults.velocity_km_s)),
        }
    }
}

#[inline]
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ── Results ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactTarget {
    Land,
    Water,
}

/// Per-request outcome for in-process callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactResult {
    pub point: GeoPoint,
    pub is_land: bool,
    pub is_tsunami_risk: bool,
    pub classification: Classification,
}

/// The record returned across the service boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
    /// Latitude as sent.
    pub lat: f64,
    /// Longitude as sent (not wrapped).
    pub lon: f64,
    pub asteroid: AsteroidParams,
    pub impact_target: ImpactTarget,
    pub is_land: u8,
    pub is_tsunami: u8,
    pub classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub population: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationReport {
    pub population: u64,
}

// ── Assessor ─────────────────────────────────────────────────────────────────

/// Combines classifier and aggregator output into response records.
pub struct Assessor<'a, S = GeoTiffSource> {
    classifier: ImpactClassifier<'a>,
    population: Option<PopulationAggregator<S>>,
    coastal_distance_km: f64,
    defaults: AsteroidDefaults,
}

impl<'a> Assessor<'a> {
    /// Classification only; attach a raster with [`Assessor::with_population`].
    pub fn new(store: &'a VectorLayerStore, config: &ImpactConfig) -> Self {
        Self {
            classifier: ImpactClassifier::new(store),
            population: None,
            coastal_distance_km: config.classifier.coastal_distance_km,
            defaults: config.defaults.clone(),
        }
    }
}

impl<'a, S: PopulationSource> Assessor<'a, S> {
    pub fn with_population<T: PopulationSource>(self, aggregator: PopulationAggregator<T>) -> Assessor<'a, T> {
        Assessor {
            classifier: self.classifier,
            population: Some(aggregator),
            coastal_distance_km: self.coastal_distance_km,
            defaults: self.defaults,
        }
    }

    pub fn impact(&self, point: GeoPoint) -> ImpactResult {
        let classification = self.classifier.classify(point, self.coastal_distance_km);
        ImpactResult {
            point,
            is_land: self.classifier.is_land(point),
            is_tsunami_risk: tsunami_risk(classification),
            classification,
        }
    }

    /// Full record. Population is filled only when the request carries a
    /// radius and a raster is attached.
    pub fn assess(&self, request: &ImpactRequest) -> Result<ImpactReport> {
        let point = request.point()?;
        let result = self.impact(point);

        let population = match (request.radius_km, &self.population) {
            (Some(radius_km), Some(aggregator)) => Some(aggregator.population_in_radius(point, radius_km)?),
            (Some(_), None) => {
                debug!("radius given but no population raster attached");
                None
            }
            _ => None,
        };

        Ok(ImpactReport {
            lat: request.lat.unwrap_or(point.lat()),
            lon: request.lon.unwrap_or(point.lon()),
            asteroid: AsteroidParams::resolve(request.asteroid.as_ref(), &self.defaults),
            impact_target: if result.is_land { ImpactTarget::Land } else { ImpactTarget::Water },
            is_land: u8::from(result.is_land),
            is_tsunami: u8::from(result.is_tsunami_risk),
            classification: result.classification,
            population,
        })
    }

    /// Population-only contract: `{lat, lon, radius_km}` → `{population}`.
    pub fn population(&self, request: &ImpactRequest) -> Result<PopulationReport> {
        let point = request.point()?;
        let radius_km = request.radius_km.ok_or_else(|| ImpactError::invalid("missing radius_km"))?;
        let aggregator = self
            .population
            .as_ref()
            .ok_or_else(|| ImpactError::Config("no population raster attached".to_string()))?;
        Ok(PopulationReport { population: aggregator.population_in_radius(point, radius_km)? })
    }
}

/// Compact human-readable count: 1.23B, 4.56M, 7.8K, or the plain number.
pub fn format_large_number(n: u64) -> String {
    let v = n as f64;
    if n >= 1_000_000_000 {
        format!("{:.2}B", v / 1e9)
    } else if n >= 1_000_000 {
        format!("{:.2}M", v / 1e6)
    } else if n >= 1_000 {
        format!("{:.1}K", v / 1e3)
    } else {
        n.to_string()
    }
}
