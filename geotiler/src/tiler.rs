//! Entry point serving vector tiles of GeoJSON files loaded under string keys.

use std::path::Path;
use std::sync::Arc;

use geotiler_index::{GeoJsonIndexBuilder, IndexBuilder, IndexOptions, SpatialIndex};
use serde::{Deserialize, Serialize};

use crate::assembler::TileAssembler;
use crate::cache::IndexCache;
use crate::convert::convert_feature;
use crate::error::TilerError;

/// Configuration of a [`Tiler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilerOptions {
    /// Name of the single layer of produced tiles.
    pub layer_name: String,
    /// Parameters of the indices built by [`Tiler::load`].
    pub index: IndexOptions,
}

impl Default for TilerOptions {
    fn default() -> Self {
        Self {
            layer_name: "default".to_string(),
            index: IndexOptions::default(),
        }
    }
}

/// Serves vector tiles from GeoJSON files loaded under string keys.
///
/// ```ignore
/// use geotiler::Tiler;
///
/// let tiler = Tiler::new();
/// tiler.load("roads", "roads.geojson")?;
/// let bytes = tiler.get_tile("roads", 10, 550, 335)?;
/// tiler.unload("roads");
/// ```
#[derive(Debug)]
pub struct Tiler {
    cache: IndexCache,
    layer_name: String,
    extent: u32,
}

impl Tiler {
    /// Creates a tiler with default options.
    pub fn new() -> Self {
        Self::with_options(TilerOptions::default())
    }

    /// Creates a tiler that builds [`GeoJsonIndex`](geotiler_index::GeoJsonIndex)es with the given options.
    pub fn with_options(options: TilerOptions) -> Self {
        let extent = options.index.extent;
        Self::with_builder(options.layer_name, extent, GeoJsonIndexBuilder::new(options.index))
    }

    /// Creates a tiler with a custom index builder.
    ///
    /// `extent` must match the coordinate space of features returned by indices of the builder.
    pub fn with_builder(
        layer_name: impl Into<String>,
        extent: u32,
        builder: impl IndexBuilder + 'static,
    ) -> Self {
        Self {
            cache: IndexCache::new(builder),
            layer_name: layer_name.into(),
            extent,
        }
    }

    /// Loads a GeoJSON file under the key, replacing the index previously loaded with the same key.
    pub fn load(&self, key: &str, path: impl AsRef<Path>) -> Result<(), TilerError> {
        self.cache.load(key, path)
    }

    /// Drops the index loaded under the key. Does nothing if the key is not loaded.
    pub fn unload(&self, key: &str) {
        self.cache.unload(key);
    }

    /// Produces the encoded vector tile `(z, x, y)` of the data loaded under the key.
    ///
    /// The tile always contains exactly one layer, even if no features fall into the tile. If any feature cannot be
    /// written, the whole call fails and no tile is produced.
    pub fn get_tile(&self, key: &str, z: u8, x: u32, y: u32) -> Result<Vec<u8>, TilerError> {
        let index: Arc<dyn SpatialIndex> = self.cache.lookup(key)?;
        let features = index.get_tile(z, x, y)?;

        let mut assembler = TileAssembler::new(&self.layer_name, self.extent);
        for feature in &features {
            convert_feature(feature, assembler.layer())?;
        }

        log::debug!(
            "Tile {z}/{x}/{y} of '{key}': {} of {} features written",
            assembler.feature_count(),
            features.len()
        );

        Ok(assembler.serialize())
    }

    /// Storage of loaded indices.
    pub fn cache(&self) -> &IndexCache {
        &self.cache
    }
}

impl Default for Tiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use geotiler_index::{FeatureCollection, IndexError};
    use geotiler_mvt::{MvtGeometry, MvtTile, MvtValue, Point};
    use geotiler_types::{GeometryKind, TileFeature, TileGeometry, TilePoint, ValueKind};
    use parking_lot::Mutex;

    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn fixture(name: &str) -> String {
        format!("{}/test-data/{name}", env!("CARGO_MANIFEST_DIR"))
    }

    fn decode(bytes: &[u8]) -> MvtTile {
        MvtTile::decode(bytes, false).expect("invalid tile")
    }

    fn points(coords: &[(i32, i32)]) -> Vec<Point> {
        coords.iter().map(|&p| TilePoint::from(p)).collect()
    }

    /// Index returning the same features for every tile.
    struct FixedIndex(Vec<TileFeature>);

    impl SpatialIndex for FixedIndex {
        fn get_tile(&self, _z: u8, _x: u32, _y: u32) -> Result<Vec<TileFeature>, IndexError> {
            Ok(self.0.clone())
        }

        fn feature_count(&self) -> usize {
            self.0.len()
        }
    }

    /// Builder that ignores the input and hands out prepared feature sets one by one.
    struct FixedBuilder(Mutex<Vec<Vec<TileFeature>>>);

    impl FixedBuilder {
        fn new(features: Vec<TileFeature>) -> Self {
            Self(Mutex::new(vec![features]))
        }
    }

    impl IndexBuilder for FixedBuilder {
        fn build(
            &self,
            _collection: FeatureCollection,
        ) -> Result<Box<dyn SpatialIndex>, IndexError> {
            let features = self.0.lock().pop().unwrap_or_default();
            Ok(Box::new(FixedIndex(features)))
        }
    }

    fn fixed_tiler(features: Vec<TileFeature>) -> Tiler {
        let tiler = Tiler::with_builder("default", 4096, FixedBuilder::new(features));
        tiler.load("fixed", fixture("roads.geojson")).unwrap();
        tiler
    }

    #[test]
    fn unknown_key() {
        init_logger();
        let tiler = Tiler::new();
        assert_matches!(
            tiler.get_tile("nothing", 0, 0, 0),
            Err(TilerError::UnknownKey(key)) if key == "nothing"
        );
    }

    #[test]
    fn unload_removes_key() {
        init_logger();
        let tiler = Tiler::new();
        tiler.load("roads", fixture("roads.geojson")).unwrap();
        assert!(tiler.get_tile("roads", 0, 0, 0).is_ok());

        tiler.unload("roads");
        assert_matches!(
            tiler.get_tile("roads", 0, 0, 0),
            Err(TilerError::UnknownKey(_))
        );
        tiler.unload("roads");
    }

    #[test]
    fn repeated_ring_point_is_collapsed() {
        init_logger();
        let ring = points(&[(0, 0), (0, 0), (10, 0), (10, 10), (0, 0)]);
        let tiler = fixed_tiler(vec![TileFeature::new(TileGeometry::Polygon(vec![ring]))]);

        let tile = decode(&tiler.get_tile("fixed", 5, 3, 7).unwrap());
        let features = &tile.layer("default").unwrap().features;
        assert_eq!(features.len(), 1);
        assert_eq!(
            features[0].geometry,
            MvtGeometry::Polygon(vec![points(&[(0, 0), (10, 0), (10, 10), (0, 0)])])
        );
    }

    #[test]
    fn zero_length_line_produces_empty_layer() {
        init_logger();
        let line = points(&[(5, 5), (5, 5)]);
        let tiler = fixed_tiler(vec![TileFeature::new(TileGeometry::LineString(line))]);

        let tile = decode(&tiler.get_tile("fixed", 0, 0, 0).unwrap());
        assert_eq!(tile.layers.len(), 1);
        assert!(tile.layers[0].features.is_empty());
    }

    #[test]
    fn repeated_ring_point_of_loaded_file_is_collapsed() {
        init_logger();
        let tiler = Tiler::new();
        tiler.load("ring", fixture("repeated_ring_point.geojson")).unwrap();

        let tile = decode(&tiler.get_tile("ring", 0, 0, 0).unwrap());
        let features = &tile.layer("default").unwrap().features;
        assert_eq!(features.len(), 1);
        assert_eq!(
            features[0].geometry,
            MvtGeometry::Polygon(vec![points(&[
                (2048, 2048),
                (2162, 2048),
                (2162, 1934),
                (2048, 2048)
            ])])
        );
    }

    #[test]
    fn zero_length_line_of_loaded_file_is_skipped() {
        init_logger();
        let tiler = Tiler::new();
        tiler.load("stub", fixture("zero_length_line.geojson")).unwrap();

        for (z, x, y) in [(0, 0, 0), (3, 4, 3), (10, 540, 483)] {
            let tile = decode(&tiler.get_tile("stub", z, x, y).unwrap());
            assert_eq!(tile.layers.len(), 1);
            assert!(tile.layers[0].features.is_empty(), "tile {z}/{x}/{y}");
        }
    }

    #[test]
    fn supported_values_round_trip() {
        init_logger();
        let feature = TileFeature::new(TileGeometry::LineString(points(&[(0, 0), (10, 10)])))
            .with_property("flag", true)
            .with_property("count", 42u64)
            .with_property("ratio", 0.25)
            .with_property("name", "main");
        let tiler = fixed_tiler(vec![feature]);

        let tile = decode(&tiler.get_tile("fixed", 0, 0, 0).unwrap());
        let properties = &tile.layers[0].features[0].properties;
        assert_eq!(properties.len(), 4);
        assert_eq!(properties["flag"], MvtValue::Bool(true));
        assert_eq!(properties["count"], MvtValue::Uint64(42));
        assert_matches!(properties["ratio"], MvtValue::Double(v) => assert_abs_diff_eq!(v, 0.25));
        assert_eq!(properties["name"], MvtValue::String("main".into()));
    }

    #[test]
    fn unsupported_value_fails_tile() {
        init_logger();
        let good = TileFeature::new(TileGeometry::LineString(points(&[(0, 0), (10, 10)])));
        let bad = good.clone().with_property("delta", -1i64);
        let tiler = fixed_tiler(vec![good, bad]);

        assert_matches!(
            tiler.get_tile("fixed", 0, 0, 0),
            Err(TilerError::UnsupportedValueKind { key, kind: ValueKind::Int }) if key == "delta"
        );
    }

    #[test]
    fn unsupported_geometry_fails_tile() {
        init_logger();
        let tiler = fixed_tiler(vec![TileFeature::new(TileGeometry::MultiPoint(points(&[
            (1, 1),
            (2, 2),
        ])))]);

        assert_matches!(
            tiler.get_tile("fixed", 0, 0, 0),
            Err(TilerError::UnsupportedGeometryKind(GeometryKind::MultiPoint))
        );
    }

    #[test]
    fn roads_tile() {
        init_logger();
        let tiler = Tiler::new();
        tiler.load("roads", fixture("roads.geojson")).unwrap();

        let tile = decode(&tiler.get_tile("roads", 0, 0, 0).unwrap());
        let layer = tile.layer("default").unwrap();
        assert_eq!(layer.size, 4096);
        assert_eq!(layer.features.len(), 2);

        let equator = &layer.features[0];
        assert_eq!(
            equator.geometry,
            MvtGeometry::LineString(vec![points(&[(1024, 2048), (3072, 2048)])])
        );
        assert_eq!(equator.properties["name"], MvtValue::String("equator".into()));
        assert_eq!(equator.properties["lanes"], MvtValue::Uint64(2));
        assert_eq!(equator.properties["toll"], MvtValue::Bool(false));

        let meridian = &layer.features[1];
        assert_eq!(meridian.properties["name"], MvtValue::String("meridian".into()));
        assert_eq!(meridian.properties["speed"], MvtValue::Double(62.5));
    }

    #[test]
    fn buildings_tile() {
        init_logger();
        let tiler = Tiler::with_options(TilerOptions {
            layer_name: "buildings".into(),
            ..Default::default()
        });
        tiler.load("buildings", fixture("buildings.geojson")).unwrap();

        let tile = decode(&tiler.get_tile("buildings", 0, 0, 0).unwrap());
        let layer = tile.layer("buildings").unwrap();
        assert_eq!(layer.features.len(), 2);

        assert_matches!(&layer.features[0].geometry, MvtGeometry::Polygon(rings) if rings.len() == 1);
        assert_matches!(&layer.features[1].geometry, MvtGeometry::Polygon(rings) if rings.len() == 2);
        assert_eq!(layer.features[1].properties["levels"], MvtValue::Uint64(3));
        assert_eq!(layer.features[1].properties["public"], MvtValue::Bool(true));
    }

    #[test]
    fn tile_without_features_has_layer() {
        init_logger();
        let tiler = Tiler::new();
        tiler.load("buildings", fixture("buildings.geojson")).unwrap();

        let tile = decode(&tiler.get_tile("buildings", 4, 0, 0).unwrap());
        assert_eq!(tile.layers.len(), 1);
        assert_eq!(tile.layers[0].name, "default");
        assert!(tile.layers[0].features.is_empty());
    }

    #[test]
    fn strict_on_real_data() {
        init_logger();
        let tiler = Tiler::new();
        tiler.load("points", fixture("points.geojson")).unwrap();
        tiler.load("signed", fixture("signed.geojson")).unwrap();

        assert_matches!(
            tiler.get_tile("points", 0, 0, 0),
            Err(TilerError::UnsupportedGeometryKind(GeometryKind::Point))
        );
        assert_matches!(
            tiler.get_tile("signed", 0, 0, 0),
            Err(TilerError::UnsupportedValueKind { kind: ValueKind::Int, .. })
        );
    }

    #[test]
    fn index_errors_are_propagated() {
        init_logger();
        let tiler = Tiler::new();
        tiler.load("roads", fixture("roads.geojson")).unwrap();

        assert_matches!(
            tiler.get_tile("roads", 30, 0, 0),
            Err(TilerError::Index(IndexError::ZoomOutOfRange { z: 30, .. }))
        );
    }

    #[test]
    fn options_from_config() {
        let options: TilerOptions =
            serde_json::from_str(r#"{"layer_name": "roads", "index": {"buffer": 0}}"#).unwrap();
        assert_eq!(options.layer_name, "roads");
        assert_eq!(options.index.buffer, 0);
        assert_eq!(options.index.extent, 4096);
    }

    #[test]
    fn tiler_is_shared_between_threads() {
        init_logger();
        let tiler = Arc::new(Tiler::new());
        tiler.load("roads", fixture("roads.geojson")).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let tiler = tiler.clone();
                std::thread::spawn(move || {
                    if i == 0 {
                        tiler.load("roads", fixture("roads.geojson")).map(|_| ())
                    } else {
                        tiler.get_tile("roads", 1, 0, 0).map(|_| ())
                    }
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().expect("thread panicked").is_ok());
        }
    }
}
