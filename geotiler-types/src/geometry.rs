use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::TilePoint;

/// Geometry of a feature in tile-local coordinates.
///
/// Polygons are stored as a list of rings, the first one being the outer boundary and the rest being holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TileGeometry {
    /// Single point.
    Point(TilePoint),
    /// Set of points.
    MultiPoint(Vec<TilePoint>),
    /// Open sequence of points.
    LineString(Vec<TilePoint>),
    /// Set of line strings.
    MultiLineString(Vec<Vec<TilePoint>>),
    /// Outer ring followed by holes.
    Polygon(Vec<Vec<TilePoint>>),
    /// Set of polygons.
    MultiPolygon(Vec<Vec<Vec<TilePoint>>>),
    /// Heterogeneous set of geometries.
    GeometryCollection(Vec<TileGeometry>),
}

impl TileGeometry {
    /// Kind tag of the geometry.
    pub fn kind(&self) -> GeometryKind {
        match self {
            TileGeometry::Point(_) => GeometryKind::Point,
            TileGeometry::MultiPoint(_) => GeometryKind::MultiPoint,
            TileGeometry::LineString(_) => GeometryKind::LineString,
            TileGeometry::MultiLineString(_) => GeometryKind::MultiLineString,
            TileGeometry::Polygon(_) => GeometryKind::Polygon,
            TileGeometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            TileGeometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }
}

/// Kind tag of a [`TileGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    /// [`TileGeometry::Point`].
    Point,
    /// [`TileGeometry::MultiPoint`].
    MultiPoint,
    /// [`TileGeometry::LineString`].
    LineString,
    /// [`TileGeometry::MultiLineString`].
    MultiLineString,
    /// [`TileGeometry::Polygon`].
    Polygon,
    /// [`TileGeometry::MultiPolygon`].
    MultiPolygon,
    /// [`TileGeometry::GeometryCollection`].
    GeometryCollection,
}

impl Display for GeometryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
        };
        write!(f, "{name}")
    }
}
