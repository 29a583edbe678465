use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error taxonomy shared by the classifier, the population aggregator and the
/// result assembler.
#[derive(Debug, Error)]
pub enum ImpactError {
    /// Request rejected before any spatial work was done.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A vector layer or the population raster could not be opened or parsed.
    #[error("{what} unavailable at {location}: {reason}", location = path.display())]
    DataUnavailable {
        what: String,
        path: PathBuf,
        reason: String,
    },

    /// The point is covered by neither the land nor the ocean layer.
    #[error("no land or ocean polygon covers ({lat}, {lon})")]
    NoMatch { lat: f64, lon: f64 },

    #[error("configuration error: {0}")]
    Config(String),
}

impl ImpactError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn unavailable(what: impl Into<String>, path: &Path, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            what: what.into(),
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImpactError>;
