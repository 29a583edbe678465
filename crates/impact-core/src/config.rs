//! Configuration loaded from TOML.
//!
//! Every field carries a serde default, so an empty file (or no file at all)
//! yields the stock layout: Natural Earth 10m shapefiles and the WorldPop 1 km
//! raster under `data/`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ImpactError, Result};
use crate::layers::LayerKind;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const LAND_FILE: &str = "ne_10m_land.shp";
pub const OCEAN_FILE: &str = "ne_10m_ocean.shp";
pub const LAKES_FILE: &str = "ne_10m_lakes.shp";
pub const RIVERS_FILE: &str = "ne_10m_rivers_lake_centerlines.shp";
pub const COASTLINE_FILE: &str = "ne_10m_coastline.shp";
pub const POPULATION_FILE: &str = "ppp_2020_1km_Aggregated.tif";

/// Default coastline proximity for the Coastal/Inland split, in km.
pub const DEFAULT_COASTAL_DISTANCE_KM: f64 = 100.0;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    pub data: DataPaths,
    pub classifier: ClassifierSettings,
    pub defaults: AsteroidDefaults,
}

impl ImpactConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ImpactError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ImpactError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml(&text)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

/// Locations of the five vector datasets and the population raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub land: PathBuf,
    pub ocean: PathBuf,
    pub lakes: PathBuf,
    pub rivers: PathBuf,
    pub coastline: PathBuf,
    pub population: PathBuf,
}

impl DataPaths {
    /// Stock file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            land: dir.join(LAND_FILE),
            ocean: dir.join(OCEAN_FILE),
            lakes: dir.join(LAKES_FILE),
            rivers: dir.join(RIVERS_FILE),
            coastline: dir.join(COASTLINE_FILE),
            population: dir.join(POPULATION_FILE),
        }
    }

    pub fn layer(&self, kind: LayerKind) -> &Path {
        match kind {
            LayerKind::Land => &self.land,
            LayerKind::Ocean => &self.ocean,
            LayerKind::Lakes => &self.lakes,
            LayerKind::Rivers => &self.rivers,
            LayerKind::Coastline => &self.coastline,
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::in_dir(Path::new(DEFAULT_DATA_DIR))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Land points within this many km of a coastline are `Coastal`.
    pub coastal_distance_km: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self { coastal_distance_km: DEFAULT_COASTAL_DISTANCE_KM }
    }
}

/// Fallbacks for asteroid fields a request leaves out.
/// Applied only when assembling a result, never inside the classifier or aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidDefaults {
    /// Entry angle from horizontal, degrees.
    pub angle_deg: f64,
    /// Spectral type letter (C, S, M, ...).
    pub asteroid_type: String,
    /// Bulk density, kg/m³.
    pub density_kg_m3: f64,
    /// Material strength, Pa.
    pub material_strength_pa: f64,
    /// Mean radius, m.
    pub radius_m: f64,
    /// Velocity relative to Earth, km/s.
    pub velocity_km_s: f64,
}

impl Default for AsteroidDefaults {
    fn default() -> Self {
        Self {
            angle_deg: 90.0,
            asteroid_type: "C".to_string(),
            density_kg_m3: 1500.0,
            material_strength_pa: 1_000_000.0,
            radius_m: 50.0,
            velocity_km_s: 10.0,
        }
    }
}
