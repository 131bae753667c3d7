//! Builders for writing vector tiles.
//!
//! A [`TileBuilder`] contains a list of [`LayerBuilder`]s. Features are added to a layer through feature builders
//! ([`LineStringFeatureBuilder`], [`PolygonFeatureBuilder`]) that borrow the layer for as long as the feature is being
//! written. A feature becomes part of the layer only when [`commit`](PolygonFeatureBuilder::commit) is called,
//! dropping the builder discards it.

use geozero::mvt::tile::{Feature, GeomType, Layer};
use geozero::mvt::{Message, TagsBuilder, Tile, TileValue};

use crate::geometry::GeometryEncoder;
use crate::Point;

/// Default extent of a layer.
pub const DEFAULT_EXTENT: u32 = 4096;

const MVT_VERSION: u32 = 2;

/// Target for feature properties.
pub trait PropertySink {
    /// Adds a key-value pair to the feature.
    fn add_property(&mut self, key: &str, value: TileValue);
}

/// Vector tile being built.
#[derive(Debug, Default)]
pub struct TileBuilder {
    layers: Vec<LayerBuilder>,
}

impl TileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the layer to the tile.
    pub fn add_layer(&mut self, layer: LayerBuilder) {
        self.layers.push(layer);
    }

    /// Encodes the tile into protobuf bytes.
    pub fn serialize(self) -> Vec<u8> {
        let tile = Tile {
            layers: self.layers.into_iter().map(LayerBuilder::build).collect(),
        };
        tile.encode_to_vec()
    }
}

/// Layer being built.
pub struct LayerBuilder {
    name: String,
    extent: u32,
    tags: TagsBuilder<String>,
    features: Vec<Feature>,
}

impl std::fmt::Debug for LayerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerBuilder")
            .field("name", &self.name)
            .field("extent", &self.extent)
            .field("features", &self.features.len())
            .finish()
    }
}

impl LayerBuilder {
    pub fn new(name: impl Into<String>, extent: u32) -> Self {
        Self {
            name: name.into(),
            extent,
            tags: TagsBuilder::new(),
            features: Vec::new(),
        }
    }

    /// Number of committed features.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn linestring_feature(&mut self) -> LineStringFeatureBuilder<'_> {
        LineStringFeatureBuilder {
            inner: FeatureBuilder::new(self),
            lines: Vec::new(),
        }
    }

    pub fn polygon_feature(&mut self) -> PolygonFeatureBuilder<'_> {
        PolygonFeatureBuilder {
            inner: FeatureBuilder::new(self),
            rings: Vec::new(),
        }
    }

    fn build(self) -> Layer {
        let (keys, values) = self.tags.into_tags();
        Layer {
            version: MVT_VERSION,
            name: self.name,
            features: self.features,
            keys,
            values: values.into_iter().map(Into::into).collect(),
            extent: Some(self.extent),
        }
    }
}

struct FeatureBuilder<'a> {
    layer: &'a mut LayerBuilder,
    tags: Vec<u32>,
}

impl<'a> FeatureBuilder<'a> {
    fn new(layer: &'a mut LayerBuilder) -> Self {
        Self {
            layer,
            tags: Vec::new(),
        }
    }

    fn add_property(&mut self, key: &str, value: TileValue) {
        let (key_index, value_index) = self.layer.tags.insert(key.to_owned(), value);
        self.tags.push(key_index);
        self.tags.push(value_index);
    }

    fn commit(self, geom_type: GeomType, geometry: Vec<u32>) {
        self.layer.features.push(Feature {
            id: None,
            tags: self.tags,
            r#type: Some(geom_type as i32),
            geometry,
        });
    }
}

/// Builder of a line feature, possibly consisting of several line strings.
pub struct LineStringFeatureBuilder<'a> {
    inner: FeatureBuilder<'a>,
    lines: Vec<Vec<Point>>,
}

impl LineStringFeatureBuilder<'_> {
    /// Starts a new line string. `size` is the expected number of points.
    pub fn add_linestring(&mut self, size: usize) {
        self.lines.push(Vec::with_capacity(size));
    }

    /// Appends a point to the current line string. Starts one if none was started yet.
    pub fn set_point(&mut self, point: Point) {
        if self.lines.is_empty() {
            self.lines.push(Vec::new());
        }
        if let Some(line) = self.lines.last_mut() {
            line.push(point);
        }
    }

    /// Adds the feature to the layer.
    pub fn commit(self) {
        let mut encoder = GeometryEncoder::default();
        for line in &self.lines {
            encoder.write_path(line);
        }

        self.inner
            .commit(GeomType::Linestring, encoder.into_commands());
    }
}

impl PropertySink for LineStringFeatureBuilder<'_> {
    fn add_property(&mut self, key: &str, value: TileValue) {
        self.inner.add_property(key, value);
    }
}

/// Builder of a polygon feature. The first ring is the outer boundary, the following ones are holes.
pub struct PolygonFeatureBuilder<'a> {
    inner: FeatureBuilder<'a>,
    rings: Vec<Vec<Point>>,
}

impl PolygonFeatureBuilder<'_> {
    /// Starts a new ring. `size` is the expected number of points, including the closing one.
    pub fn add_ring(&mut self, size: usize) {
        self.rings.push(Vec::with_capacity(size));
    }

    /// Appends a point to the current ring. Starts one if none was started yet.
    pub fn set_point(&mut self, point: Point) {
        if self.rings.is_empty() {
            self.rings.push(Vec::new());
        }
        if let Some(ring) = self.rings.last_mut() {
            ring.push(point);
        }
    }

    /// Adds the feature to the layer.
    pub fn commit(self) {
        let mut encoder = GeometryEncoder::default();
        for ring in &self.rings {
            encoder.write_ring(ring);
        }

        self.inner.commit(GeomType::Polygon, encoder.into_commands());
    }
}

impl PropertySink for PolygonFeatureBuilder<'_> {
    fn add_property(&mut self, key: &str, value: TileValue) {
        self.inner.add_property(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MvtGeometry, MvtTile, MvtValue};

    fn decode(bytes: Vec<u8>) -> MvtTile {
        MvtTile::decode(bytes.as_slice(), false).expect("failed to decode tile")
    }

    #[test]
    fn empty_layer_is_serialized() {
        let mut tile = TileBuilder::new();
        tile.add_layer(LayerBuilder::new("default", DEFAULT_EXTENT));

        let decoded = decode(tile.serialize());
        assert_eq!(decoded.layers.len(), 1);
        assert_eq!(decoded.layers[0].name, "default");
        assert_eq!(decoded.layers[0].size, 4096);
        assert!(decoded.layers[0].features.is_empty());
    }

    #[test]
    fn uncommitted_feature_is_discarded() {
        let mut layer = LayerBuilder::new("default", DEFAULT_EXTENT);
        {
            let mut feature = layer.polygon_feature();
            feature.add_ring(3);
            feature.set_point(Point::new(0, 0));
        }
        assert_eq!(layer.feature_count(), 0);

        let mut feature = layer.linestring_feature();
        feature.add_linestring(2);
        feature.set_point(Point::new(0, 0));
        feature.set_point(Point::new(5, 5));
        feature.commit();
        assert_eq!(layer.feature_count(), 1);
    }

    #[test]
    fn properties_are_deduplicated() {
        let mut layer = LayerBuilder::new("default", DEFAULT_EXTENT);
        for _ in 0..2 {
            let mut feature = layer.linestring_feature();
            feature.add_linestring(2);
            feature.set_point(Point::new(0, 0));
            feature.set_point(Point::new(5, 5));
            feature.add_property("kind", TileValue::Str("road".into()));
            feature.add_property("oneway", TileValue::Bool(true));
            feature.commit();
        }

        let mut tile = TileBuilder::new();
        tile.add_layer(layer);
        let decoded = decode(tile.serialize());
        let layer = &decoded.layers[0];

        assert_eq!(layer.properties.len(), 2);
        assert_eq!(layer.features.len(), 2);
        for feature in &layer.features {
            assert!(matches!(
                feature.properties.get("kind"),
                Some(MvtValue::String(v)) if v == "road"
            ));
            assert!(matches!(
                feature.properties.get("oneway"),
                Some(MvtValue::Bool(true))
            ));
        }
    }

    #[test]
    fn polygon_with_hole() {
        let mut layer = LayerBuilder::new("default", DEFAULT_EXTENT);
        let mut feature = layer.polygon_feature();
        let outer = [(0, 0), (10, 0), (10, 10), (0, 10), (0, 0)];
        let hole = [(2, 2), (2, 4), (4, 4), (2, 2)];
        for ring in [&outer[..], &hole[..]] {
            feature.add_ring(ring.len());
            for &(x, y) in ring {
                feature.set_point(Point::new(x, y));
            }
        }
        feature.commit();

        let mut tile = TileBuilder::new();
        tile.add_layer(layer);
        let decoded = decode(tile.serialize());

        let MvtGeometry::Polygon(rings) = &decoded.layers[0].features[0].geometry else {
            panic!("invalid geometry type");
        };
        let to_points =
            |ring: &[(i32, i32)]| ring.iter().map(|&p| Point::from(p)).collect::<Vec<_>>();
        assert_eq!(rings, &vec![to_points(&outer), to_points(&hole)]);
    }

    #[test]
    fn linestring_geometry() {
        let mut layer = LayerBuilder::new("roads", 512);
        let mut feature = layer.linestring_feature();
        feature.add_linestring(3);
        feature.set_point(Point::new(1, 1));
        feature.set_point(Point::new(1, 1));
        feature.set_point(Point::new(7, -3));
        feature.commit();

        let mut tile = TileBuilder::new();
        tile.add_layer(layer);
        let decoded = decode(tile.serialize());
        assert_eq!(decoded.layers[0].size, 512);

        let MvtGeometry::LineString(lines) = &decoded.layers[0].features[0].geometry else {
            panic!("invalid geometry type");
        };
        assert_eq!(
            lines,
            &vec![vec![Point::new(1, 1), Point::new(1, 1), Point::new(7, -3)]]
        );
    }
}
