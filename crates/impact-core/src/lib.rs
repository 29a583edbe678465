//! Impact-site assessment: terrain classification of an asteroid impact point
//! against Natural Earth vector layers, and gridded population within a radius.
//!
//! ```no_run
//! use std::path::Path;
//! use impact_core::{Assessor, DataPaths, ImpactConfig, ImpactRequest, VectorLayerStore};
//! use impact_core::{GeoTiffSource, PopulationAggregator};
//!
//! let config = ImpactConfig::default();
//! let store = VectorLayerStore::load(&DataPaths::in_dir(Path::new("data")))?;
//! let assessor = Assessor::new(&store, &config)
//!     .with_population(PopulationAggregator::new(GeoTiffSource::new(&config.data.population)));
//! let report = assessor.assess(&ImpactRequest::at(39.9, 116.4).with_radius(50.0))?;
//! println!("{}", serde_json::to_string(&report).unwrap());
//! # Ok::<(), impact_core::ImpactError>(())
//! ```

pub mod assess;
pub mod classifier;
pub mod config;
pub mod coords;
pub mod error;
pub mod geometry;
pub mod layers;
pub mod population;
pub mod projection;
pub mod raster;
pub mod spatial_index;

pub use assess::{
    format_large_number, AsteroidInput, AsteroidParams, Assessor, ImpactReport, ImpactRequest, ImpactResult,
    ImpactTarget, PopulationReport,
};
pub use classifier::{tsunami_risk, Classification, ImpactClassifier};
pub use config::{AsteroidDefaults, ClassifierSettings, DataPaths, ImpactConfig};
pub use coords::{normalize_lon, BoundingBox, GeoPoint};
pub use error::{ImpactError, Result};
pub use layers::{LayerKind, VectorLayer, VectorLayerStore};
pub use population::PopulationAggregator;
pub use raster::{GeoTiffSource, GeoTransform, PopulationGrid, PopulationSource};
pub use spatial_index::{RTreeIndex, SpatialIndex};
