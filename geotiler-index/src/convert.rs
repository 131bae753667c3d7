//! Conversion of GeoJSON features into projected geometries.
//!
//! Positions are projected into Web Mercator world units: the whole world is the `[0, 1] x [0, 1]` square with `y`
//! growing to the south. A tile `(z, x, y)` covers `[x / 2^z, (x + 1) / 2^z]` horizontally.

use std::f64::consts::PI;

use geo::{
    BoundingRect, Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon, Rect,
};
use geojson::{FeatureCollection, PolygonType, Position, Value};
use geotiler_types::{Properties, PropertyValue};
use serde_json::Value as JsonValue;

use crate::error::IndexError;

/// Feature projected into world units.
#[derive(Debug, Clone)]
pub(crate) struct ProjectedFeature {
    pub(crate) geometry: Geometry<f64>,
    pub(crate) bbox: Rect<f64>,
    pub(crate) properties: Properties,
}

pub(crate) fn project_collection(
    collection: FeatureCollection,
) -> Result<Vec<ProjectedFeature>, IndexError> {
    let mut features = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            log::debug!("Skipping feature {index} without geometry");
            continue;
        };

        let geometry = project_value(&geometry.value).map_err(|reason| {
            IndexError::InvalidGeometry {
                feature: index,
                reason,
            }
        })?;

        let Some(bbox) = geometry.bounding_rect() else {
            log::debug!("Skipping feature {index} with empty geometry");
            continue;
        };

        let properties = feature
            .properties
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key, property_from_json(value)))
            .collect();

        features.push(ProjectedFeature {
            geometry,
            bbox,
            properties,
        });
    }

    Ok(features)
}

/// Converts a JSON value into a property value.
///
/// Non-negative integers become `Uint`, negative integers become `Int`, all other numbers become `Double`.
pub fn property_from_json(value: JsonValue) -> PropertyValue {
    match value {
        JsonValue::Null => PropertyValue::Null,
        JsonValue::Bool(v) => PropertyValue::Bool(v),
        JsonValue::Number(n) => {
            if let Some(v) = n.as_u64() {
                PropertyValue::Uint(v)
            } else if let Some(v) = n.as_i64() {
                PropertyValue::Int(v)
            } else {
                PropertyValue::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(v) => PropertyValue::String(v),
        JsonValue::Array(values) => {
            PropertyValue::Array(values.into_iter().map(property_from_json).collect())
        }
        JsonValue::Object(object) => PropertyValue::Object(
            object
                .into_iter()
                .map(|(key, value)| (key, property_from_json(value)))
                .collect(),
        ),
    }
}

fn project_value(value: &Value) -> Result<Geometry<f64>, String> {
    Ok(match value {
        Value::Point(p) => Geometry::Point(Point(project(p)?)),
        Value::MultiPoint(points) => Geometry::MultiPoint(MultiPoint::new(
            points
                .iter()
                .map(|p| project(p).map(Point))
                .collect::<Result<_, _>>()?,
        )),
        Value::LineString(line) => Geometry::LineString(project_line(line)?),
        Value::MultiLineString(lines) => Geometry::MultiLineString(MultiLineString::new(
            lines
                .iter()
                .map(|l| project_line(l))
                .collect::<Result<_, _>>()?,
        )),
        Value::Polygon(polygon) => Geometry::Polygon(project_polygon(polygon)?),
        Value::MultiPolygon(polygons) => Geometry::MultiPolygon(MultiPolygon::new(
            polygons
                .iter()
                .map(project_polygon)
                .collect::<Result<_, _>>()?,
        )),
        Value::GeometryCollection(geometries) => Geometry::GeometryCollection(GeometryCollection(
            geometries
                .iter()
                .map(|g| project_value(&g.value))
                .collect::<Result<_, _>>()?,
        )),
    })
}

fn project_line(line: &[Position]) -> Result<LineString<f64>, String> {
    if line.is_empty() {
        return Err("line string has no positions".into());
    }

    Ok(LineString::new(
        line.iter().map(|p| project(p)).collect::<Result<_, _>>()?,
    ))
}

fn project_polygon(polygon: &PolygonType) -> Result<Polygon<f64>, String> {
    let Some((exterior, interiors)) = polygon.split_first() else {
        return Err("polygon has no exterior ring".into());
    };

    if exterior.is_empty() {
        return Err("polygon exterior ring has no positions".into());
    }

    Ok(Polygon::new(
        project_line(exterior)?,
        interiors
            .iter()
            .filter(|ring| !ring.is_empty())
            .map(|ring| project_line(ring))
            .collect::<Result<_, _>>()?,
    ))
}

/// Projects a longitude/latitude position into Web Mercator world units.
fn project(position: &Position) -> Result<Coord<f64>, String> {
    if position.len() < 2 {
        return Err("position must contain at least 2 dimensions".into());
    }

    let (lon, lat) = (position[0], position[1]);
    if !lon.is_finite() || !lat.is_finite() {
        return Err(format!("position ({lon}, {lat}) is not finite"));
    }

    let sin = lat.to_radians().sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;

    Ok(Coord {
        x: lon / 360.0 + 0.5,
        y: y.clamp(0.0, 1.0),
    })
}
