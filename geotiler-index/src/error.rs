//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Input text is not valid GeoJSON.
    #[error("failed to parse GeoJSON: {0}")]
    Parse(String),
    /// A feature geometry cannot be indexed.
    #[error("invalid geometry in feature {feature}: {reason}")]
    InvalidGeometry {
        /// Position of the feature in the collection.
        feature: usize,
        /// What is wrong with the geometry.
        reason: String,
    },
    /// Requested zoom level is deeper than the index supports.
    #[error("zoom level {z} is above the maximum zoom level {max_zoom}")]
    ZoomOutOfRange {
        /// Requested zoom level.
        z: u8,
        /// Maximum zoom level of the index.
        max_zoom: u8,
    },
}

impl From<geojson::Error> for IndexError {
    fn from(value: geojson::Error) -> Self {
        Self::Parse(value.to_string())
    }
}
