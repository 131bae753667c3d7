//! Single-layer output tile that converted features are written into.

use geotiler_mvt::{LayerBuilder, TileBuilder};

/// Output tile with a single layer that features are written into.
#[derive(Debug)]
pub struct TileAssembler {
    layer: LayerBuilder,
}

impl TileAssembler {
    /// Creates an empty tile with one layer of the given name and extent.
    pub fn new(layer_name: &str, extent: u32) -> Self {
        Self {
            layer: LayerBuilder::new(layer_name, extent),
        }
    }

    /// The layer of the tile.
    pub fn layer(&mut self) -> &mut LayerBuilder {
        &mut self.layer
    }

    /// Number of features written so far.
    pub fn feature_count(&self) -> usize {
        self.layer.feature_count()
    }

    /// Encodes the tile. The layer is written even if it has no features.
    pub fn serialize(self) -> Vec<u8> {
        let mut tile = TileBuilder::new();
        tile.add_layer(self.layer);
        tile.serialize()
    }
}
