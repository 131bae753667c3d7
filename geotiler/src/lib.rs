//! Geotiler serves Mapbox Vector Tiles cut on demand from GeoJSON files.
//!
//! Data is loaded into a [`Tiler`] under a string key. Loading parses the file and builds a spatial index over it
//! (see [`geotiler_index`]). Every tile request asks the index for the clipped and simplified features of the tile and
//! writes them into a new tile with a single layer:
//!
//! ```ignore
//! use geotiler::Tiler;
//!
//! let tiler = Tiler::new();
//! tiler.load("roads", "data/roads.geojson")?;
//! let bytes = tiler.get_tile("roads", 12, 2200, 1343)?;
//! ```
//!
//! Only line strings and polygons are written to tiles, with property values that are booleans, unsigned integers,
//! doubles or strings. A tile that contains anything else is rejected as a whole with an error.
//!
//! The conversion steps are available separately for use with custom [`SpatialIndex`] implementations:
//! [`convert_feature`] writes a single feature into a [`LayerBuilder`](geotiler_mvt::LayerBuilder),
//! [`encode_property`] writes a single property value.

mod assembler;
mod cache;
mod convert;
pub mod error;
mod tiler;
mod value;

pub use assembler::TileAssembler;
pub use cache::IndexCache;
pub use convert::convert_feature;
pub use error::TilerError;
pub use geotiler_index::{IndexBuilder, IndexOptions, SpatialIndex};
pub use tiler::{Tiler, TilerOptions};
pub use value::{encode_properties, encode_property};

pub use {geotiler_index, geotiler_mvt, geotiler_types};
