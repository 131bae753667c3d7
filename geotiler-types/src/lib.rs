//! Tile-local geometry and property types.
//!
//! These types describe a feature after it has been clipped and simplified for one specific tile: coordinates are
//! integers in the tile coordinate space (usually `0..4096` plus a small buffer on each side) and properties are
//! dynamically typed values parsed from the source data.
//!
//! They are produced by a spatial index (see `geotiler-index`) and consumed by the tile conversion pipeline
//! (see `geotiler`).

mod feature;
mod geometry;
mod point;
mod value;

pub use feature::{Properties, TileFeature};
pub use geometry::{GeometryKind, TileGeometry};
pub use point::TilePoint;
pub use value::{PropertyValue, ValueKind};
