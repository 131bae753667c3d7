//! Spatial index over GeoJSON feature collections.
//!
//! The index keeps features projected into Web Mercator world units and cuts them into tiles on request. Each
//! returned [`TileFeature`] has integer coordinates in the tile-local space `0..extent`, possibly reaching into the
//! buffer around the tile. Geometries are clipped to the buffered tile and simplified for the requested zoom level.
//!
//! ```ignore
//! use geotiler_index::{parse_geojson, GeoJsonIndexBuilder, IndexBuilder};
//!
//! let collection = parse_geojson(&std::fs::read_to_string("roads.geojson")?)?;
//! let index = GeoJsonIndexBuilder::default().build(collection)?;
//! let features = index.get_tile(10, 550, 335)?;
//! ```

use geojson::{Feature, GeoJson};
use geotiler_types::TileFeature;
use serde::{Deserialize, Serialize};

mod clip;
mod convert;
pub mod error;
mod index;
mod tile;

pub use convert::property_from_json;
pub use error::IndexError;
pub use geojson::FeatureCollection;
pub use index::{GeoJsonIndex, GeoJsonIndexBuilder};

/// Index that can produce the simplified features of a single tile.
pub trait SpatialIndex: Send + Sync {
    /// Returns the features of the tile `(z, x, y)` in tile-local coordinates, in the order they were indexed.
    fn get_tile(&self, z: u8, x: u32, y: u32) -> Result<Vec<TileFeature>, IndexError>;

    /// Number of features stored in the index.
    fn feature_count(&self) -> usize;
}

impl std::fmt::Debug for dyn SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex").finish_non_exhaustive()
    }
}

/// Creates spatial indices from parsed feature collections.
pub trait IndexBuilder: Send + Sync {
    /// Builds an index over all features of the collection.
    fn build(&self, collection: FeatureCollection) -> Result<Box<dyn SpatialIndex>, IndexError>;
}

/// Parameters of tile generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    /// Size of the tile-local coordinate space.
    pub extent: u32,
    /// Margin around the tile in tile-local units that is kept when clipping.
    pub buffer: u32,
    /// Douglas-Peucker tolerance in tile-local units. `0` disables simplification.
    pub tolerance: f64,
    /// Deepest zoom level the index can be queried at.
    pub max_zoom: u8,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            extent: 4096,
            buffer: 64,
            tolerance: 3.0,
            max_zoom: 24,
        }
    }
}

/// Parses GeoJSON text into a feature collection.
///
/// A single feature or a bare geometry is wrapped into a collection with one feature.
pub fn parse_geojson(raw: &str) -> Result<FeatureCollection, IndexError> {
    let collection = match raw.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(feature) => single_feature(feature),
        GeoJson::Geometry(geometry) => single_feature(Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }),
    };

    Ok(collection)
}

fn single_feature(feature: Feature) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: vec![feature],
        foreign_members: None,
    }
}
