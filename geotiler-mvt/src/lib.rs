use std::collections::HashMap;

use bytes::Buf;
use geotiler_types::TilePoint;
use geozero::mvt::tile::GeomType;
use geozero::mvt::{Message as GeozeroMessage, Tile};
use serde::{Deserialize, Serialize};

use crate::error::MvtError;

pub mod builder;
pub mod error;
mod geometry;

pub use builder::{
    LayerBuilder, LineStringFeatureBuilder, PolygonFeatureBuilder, PropertySink, TileBuilder,
    DEFAULT_EXTENT,
};
pub use geometry::{command_encode, zigzag_encode};
pub use geozero::mvt::TileValue;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MvtTile {
    pub layers: Vec<MvtLayer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MvtLayer {
    pub name: String,
    pub features: Vec<MvtFeature>,
    pub properties: Vec<String>,
    pub size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MvtFeature {
    pub id: Option<u64>,
    pub properties: HashMap<String, MvtValue>,
    pub geometry: MvtGeometry,
}

/// Decoded property value. `Unknown` replaces values that could not be decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MvtValue {
    String(String),
    Float(f32),
    Double(f64),
    Int64(i64),
    Uint64(u64),
    Bool(bool),
    Unknown,
}

pub type Point = TilePoint;

/// Decoded feature geometry in tile coordinates.
///
/// Every `MoveTo` command starts a new part. Polygon rings include the closing point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MvtGeometry {
    Point(Vec<Point>),
    LineString(Vec<Vec<Point>>),
    Polygon(Vec<Vec<Point>>),
}

impl MvtTile {
    /// Decodes a protobuf tile.
    ///
    /// With `skip_recoverable_errors` broken layers and features are left out and broken values are replaced with
    /// [`MvtValue::Unknown`]. Otherwise the first such problem fails decoding.
    pub fn decode<B>(buffer: B, skip_recoverable_errors: bool) -> Result<MvtTile, MvtError>
    where
        B: Buf,
    {
        let pb = Tile::decode(buffer)?;

        let mut layers = Vec::with_capacity(pb.layers.len());
        for layer in pb.layers {
            match MvtLayer::decode(layer, skip_recoverable_errors) {
                Ok(v) => layers.push(v),
                Err(e) if skip_recoverable_errors => log::warn!("Skipping layer: {e}"),
                Err(e) => return Err(e),
            }
        }

        if layers.is_empty() {
            return Err(MvtError::NoLayers);
        }

        Ok(MvtTile { layers })
    }

    pub fn layer(&self, name: &str) -> Option<&MvtLayer> {
        self.layers.iter().find(|l| l.name == name)
    }
}

impl MvtLayer {
    fn decode(
        pb_layer: geozero::mvt::tile::Layer,
        skip_recoverable_errors: bool,
    ) -> Result<Self, MvtError> {
        let geozero::mvt::tile::Layer {
            name,
            keys,
            values,
            features,
            version,
            extent,
        } = pb_layer;
        if version != 2 {
            return Err(MvtError::Version {
                layer: name,
                version,
            });
        }

        let mut mvt_values = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match MvtValue::decode(value) {
                Ok(v) => mvt_values.push(v),
                Err(reason) => {
                    let error = MvtError::Value {
                        layer: name.clone(),
                        index,
                        reason,
                    };
                    if !skip_recoverable_errors {
                        return Err(error);
                    }
                    log::warn!("{error}");
                    mvt_values.push(MvtValue::Unknown);
                }
            }
        }

        let mut mvt_features = Vec::with_capacity(features.len());
        for feature in features {
            match MvtFeature::decode(feature, &keys, &mvt_values) {
                Ok(v) => mvt_features.push(v),
                Err(e) if skip_recoverable_errors => {
                    log::warn!("Skipping feature of layer '{name}': {e}")
                }
                Err(e) => return Err(e),
            }
        }

        Ok(MvtLayer {
            name,
            properties: keys,
            features: mvt_features,
            size: extent.unwrap_or(DEFAULT_EXTENT),
        })
    }
}

impl MvtValue {
    /// Exactly one of the value fields must be set.
    fn decode(pb_value: geozero::mvt::tile::Value) -> Result<MvtValue, &'static str> {
        let geozero::mvt::tile::Value {
            string_value,
            float_value,
            double_value,
            int_value,
            uint_value,
            sint_value,
            bool_value,
        } = pb_value;

        let mut present = [
            string_value.map(MvtValue::String),
            float_value.map(MvtValue::Float),
            double_value.map(MvtValue::Double),
            int_value.map(MvtValue::Int64),
            uint_value.map(MvtValue::Uint64),
            sint_value.map(MvtValue::Int64),
            bool_value.map(MvtValue::Bool),
        ]
        .into_iter()
        .flatten();

        match (present.next(), present.next()) {
            (Some(value), None) => Ok(value),
            (None, _) => Err("no value is set"),
            (Some(_), Some(_)) => Err("more than one value is set"),
        }
    }
}

impl MvtFeature {
    fn decode(
        pb_feature: geozero::mvt::tile::Feature,
        keys: &[String],
        values: &[MvtValue],
    ) -> Result<MvtFeature, MvtError> {
        let geozero::mvt::tile::Feature {
            id,
            tags,
            r#type,
            geometry,
        } = pb_feature;

        let geom_type = match r#type {
            Some(1) => GeomType::Point,
            Some(2) => GeomType::Linestring,
            Some(3) => GeomType::Polygon,
            _ => GeomType::Unknown,
        };
        let properties = Self::decode_properties(&tags, keys, values)?;
        let geometry = Self::decode_geometry(geom_type, &geometry)?;

        Ok(MvtFeature {
            id,
            properties,
            geometry,
        })
    }

    fn decode_properties(
        tags: &[u32],
        keys: &[String],
        values: &[MvtValue],
    ) -> Result<HashMap<String, MvtValue>, MvtError> {
        if tags.len() % 2 != 0 {
            return Err(MvtError::Tags(format!(
                "odd number of tag indices ({})",
                tags.len()
            )));
        }

        let mut properties = HashMap::with_capacity(tags.len() / 2);
        for pair in tags.chunks_exact(2) {
            let (key_index, value_index) = (pair[0] as usize, pair[1] as usize);
            let key = keys
                .get(key_index)
                .ok_or_else(|| MvtError::Tags(format!("key index {key_index} is out of range")))?;
            let value = values.get(value_index).ok_or_else(|| {
                MvtError::Tags(format!("value index {value_index} is out of range"))
            })?;

            properties.insert(key.clone(), value.clone());
        }

        Ok(properties)
    }

    fn decode_geometry(geom_type: GeomType, commands: &[u32]) -> Result<MvtGeometry, MvtError> {
        Ok(match geom_type {
            GeomType::Unknown => {
                return Err(MvtError::Geometry("unknown geometry type".into()))
            }
            GeomType::Point => MvtGeometry::Point(Self::decode_point(commands)?),
            GeomType::Linestring => MvtGeometry::LineString(Self::decode_parts(commands, false)?),
            GeomType::Polygon => MvtGeometry::Polygon(Self::decode_parts(commands, true)?),
        })
    }

    fn decode_point(commands: &[u32]) -> Result<Vec<Point>, MvtError> {
        let mut points = Vec::with_capacity(commands.len() / 2);
        for command in CommandIterator::new(commands.iter()) {
            match command? {
                MvtGeomCommand::MoveTo(p) => points.push(p),
                command => {
                    return Err(MvtError::Geometry(format!(
                        "point geometry cannot have {command:?} command"
                    )))
                }
            }
        }

        Ok(points)
    }

    fn decode_parts(commands: &[u32], closed: bool) -> Result<Vec<Vec<Point>>, MvtError> {
        let mut parts: Vec<Vec<Point>> = vec![];
        for command in CommandIterator::new(commands.iter()) {
            match command? {
                MvtGeomCommand::MoveTo(p) => parts.push(vec![p]),
                MvtGeomCommand::LineTo(p) => match parts.last_mut() {
                    Some(part) => part.push(p),
                    None => return Err(MvtError::Geometry("LineTo before MoveTo".into())),
                },
                MvtGeomCommand::ClosePath if !closed => {
                    return Err(MvtError::Geometry(
                        "line geometry cannot have ClosePath command".into(),
                    ));
                }
                MvtGeomCommand::ClosePath => match parts.last_mut() {
                    Some(part) => part.push(part[0]),
                    None => return Err(MvtError::Geometry("ClosePath before MoveTo".into())),
                },
            }
        }

        Ok(parts)
    }
}

/// Reads geometry commands, resolving delta-encoded coordinates into absolute points.
struct CommandIterator<'a, T: Iterator<Item = &'a u32>> {
    inner: T,
    current_command: Option<(u32, u32)>,
    can_continue: bool,
    cursor: Point,
}

impl<'a, T: Iterator<Item = &'a u32>> CommandIterator<'a, T> {
    fn new(inner: T) -> Self {
        Self {
            inner,
            current_command: None,
            can_continue: true,
            cursor: Point::default(),
        }
    }

    fn read_point(&mut self) -> Result<Point, MvtError> {
        let (Some(&dx), Some(&dy)) = (self.inner.next(), self.inner.next()) else {
            return Err(MvtError::Geometry(
                "expected a coordinate pair, found end of data".into(),
            ));
        };

        self.cursor = Point::new(
            sint_to_int(dx).wrapping_add(self.cursor.x),
            sint_to_int(dy).wrapping_add(self.cursor.y),
        );
        Ok(self.cursor)
    }
}

fn sint_to_int(sint: u32) -> i32 {
    ((sint >> 1) as i32) ^ -((sint & 1) as i32)
}

impl<'a, T: Iterator<Item = &'a u32>> Iterator for CommandIterator<'a, T> {
    type Item = Result<MvtGeomCommand, MvtError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.can_continue {
            return None;
        }

        let (command_id, command_count) = match self.current_command {
            Some(command) => command,
            None => {
                let command_integer = self.inner.next()?;
                (command_integer & 0x7, command_integer >> 3)
            }
        };

        self.current_command = match command_count {
            0 => {
                self.can_continue = false;
                return Some(Err(MvtError::Geometry("command count cannot be 0".into())));
            }
            1 => None,
            v => Some((command_id, v - 1)),
        };

        let result = match command_id {
            1 => self.read_point().map(MvtGeomCommand::MoveTo),
            2 => self.read_point().map(MvtGeomCommand::LineTo),
            7 if command_count == 1 => Ok(MvtGeomCommand::ClosePath),
            7 => Err(MvtError::Geometry(format!(
                "ClosePath command must have count 1, but has {command_count}"
            ))),
            _ => Err(MvtError::Geometry(format!("unknown command id {command_id}"))),
        };

        if result.is_err() {
            self.can_continue = false;
        }

        Some(result)
    }
}

#[derive(Debug)]
enum MvtGeomCommand {
    MoveTo(Point),
    LineTo(Point),
    ClosePath,
}
