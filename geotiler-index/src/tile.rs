//! Conversion of clipped geometries into tile-local integer geometries.

use geo::{Coord, Geometry, LineString, Polygon, Rect, Simplify};
use geotiler_types::{TileGeometry, TilePoint};

use crate::clip::{clip_line, clip_polygon, contains};

/// Clips, simplifies and rounds a geometry that is already in tile-space `f64` coordinates.
///
/// Returns `None` if nothing of the geometry is left inside `bounds`.
pub(crate) fn to_tile_geometry(
    geometry: &Geometry<f64>,
    bounds: &Rect<f64>,
    tolerance: f64,
) -> Option<TileGeometry> {
    match geometry {
        Geometry::Point(point) => {
            contains(bounds, &point.0).then(|| TileGeometry::Point(round(point.0)))
        }
        Geometry::MultiPoint(points) => {
            let points: Vec<TilePoint> = points
                .iter()
                .filter(|p| contains(bounds, &p.0))
                .map(|p| round(p.0))
                .collect();
            match points.len() {
                0 => None,
                1 => Some(TileGeometry::Point(points[0])),
                _ => Some(TileGeometry::MultiPoint(points)),
            }
        }
        Geometry::Line(line) => to_tile_geometry(
            &Geometry::LineString(LineString::new(vec![line.start, line.end])),
            bounds,
            tolerance,
        ),
        Geometry::LineString(line) => lines(clip_line(line, bounds), tolerance),
        Geometry::MultiLineString(multi) => lines(
            multi
                .iter()
                .flat_map(|line| clip_line(line, bounds))
                .collect(),
            tolerance,
        ),
        Geometry::Polygon(polygon) => {
            polygon_rings(polygon, bounds, tolerance).map(TileGeometry::Polygon)
        }
        Geometry::Rect(rect) => polygon_rings(&rect.to_polygon(), bounds, tolerance)
            .map(TileGeometry::Polygon),
        Geometry::Triangle(triangle) => polygon_rings(&triangle.to_polygon(), bounds, tolerance)
            .map(TileGeometry::Polygon),
        Geometry::MultiPolygon(multi) => {
            let mut polygons: Vec<Vec<Vec<TilePoint>>> = multi
                .iter()
                .filter_map(|polygon| polygon_rings(polygon, bounds, tolerance))
                .collect();
            match polygons.len() {
                0 => None,
                1 => polygons.pop().map(TileGeometry::Polygon),
                _ => Some(TileGeometry::MultiPolygon(polygons)),
            }
        }
        Geometry::GeometryCollection(collection) => {
            let geometries: Vec<TileGeometry> = collection
                .iter()
                .filter_map(|geometry| to_tile_geometry(geometry, bounds, tolerance))
                .collect();
            (!geometries.is_empty()).then_some(TileGeometry::GeometryCollection(geometries))
        }
    }
}

fn lines(pieces: Vec<LineString<f64>>, tolerance: f64) -> Option<TileGeometry> {
    let mut lines: Vec<Vec<TilePoint>> = pieces
        .iter()
        .map(|piece| round_line(&simplify(piece, tolerance)))
        .collect();

    match lines.len() {
        0 => None,
        1 => lines.pop().map(TileGeometry::LineString),
        _ => Some(TileGeometry::MultiLineString(lines)),
    }
}

fn polygon_rings(
    polygon: &Polygon<f64>,
    bounds: &Rect<f64>,
    tolerance: f64,
) -> Option<Vec<Vec<TilePoint>>> {
    let clipped = clip_polygon(polygon, bounds)?;

    let exterior = round_line(&simplify(clipped.exterior(), tolerance));
    if exterior.len() < 4 {
        log::trace!("Polygon exterior ring collapsed after simplification");
        return None;
    }

    let mut rings = vec![exterior];
    rings.extend(
        clipped
            .interiors()
            .iter()
            .map(|ring| round_line(&simplify(ring, tolerance)))
            .filter(|ring| ring.len() >= 4),
    );

    Some(rings)
}

fn simplify(line: &LineString<f64>, tolerance: f64) -> LineString<f64> {
    if tolerance <= 0.0 || line.0.len() <= 2 {
        return line.clone();
    }

    line.simplify(&tolerance)
}

fn round_line(line: &LineString<f64>) -> Vec<TilePoint> {
    line.0.iter().copied().map(round).collect()
}

fn round(coord: Coord<f64>) -> TilePoint {
    TilePoint::new(coord.x.round() as i32, coord.y.round() as i32)
}
