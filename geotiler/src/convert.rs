//! Conversion of simplified tile features into vector tile features.

use geotiler_mvt::{LayerBuilder, Point};
use geotiler_types::{TileFeature, TileGeometry, TilePoint};

use crate::error::TilerError;
use crate::value::encode_properties;

/// Writes one simplified feature into the layer.
///
/// Only line strings and polygons can be written, any other geometry fails with
/// [`TilerError::UnsupportedGeometryKind`]. Line strings of zero length are skipped without an error. If a property
/// cannot be encoded, the feature is not added to the layer.
pub fn convert_feature(feature: &TileFeature, layer: &mut LayerBuilder) -> Result<(), TilerError> {
    match &feature.geometry {
        TileGeometry::LineString(points) => convert_line_string(points, feature, layer),
        TileGeometry::Polygon(rings) => convert_polygon(rings, feature, layer),
        other => Err(TilerError::UnsupportedGeometryKind(other.kind())),
    }
}

fn convert_line_string(
    points: &[TilePoint],
    feature: &TileFeature,
    layer: &mut LayerBuilder,
) -> Result<(), TilerError> {
    if line_length(points) == 0.0 {
        log::trace!("Skipping line string of zero length with {} points", points.len());
        return Ok(());
    }

    let mut builder = layer.linestring_feature();
    builder.add_linestring(points.len());
    for point in points {
        builder.set_point(*point);
    }

    encode_properties(&feature.properties, &mut builder)?;
    builder.commit();

    Ok(())
}

fn line_length(points: &[TilePoint]) -> f64 {
    points.windows(2).map(|pair| pair[0].distance(&pair[1])).sum()
}

fn convert_polygon(
    rings: &[Vec<TilePoint>],
    feature: &TileFeature,
    layer: &mut LayerBuilder,
) -> Result<(), TilerError> {
    let mut builder = layer.polygon_feature();

    // Never equal to the first point, so it is always written.
    let mut previous = rings
        .first()
        .and_then(|ring| ring.first())
        .map(|first| Point::new(first.x.wrapping_add(1), first.y.wrapping_add(2)));

    for ring in rings {
        builder.add_ring(ring.len());
        for &point in ring {
            if previous == Some(point) {
                log::trace!("Skipping repeated point {point} in polygon ring");
            } else {
                builder.set_point(point);
            }
            previous = Some(point);
        }
    }

    encode_properties(&feature.properties, &mut builder)?;
    builder.commit();

    Ok(())
}
