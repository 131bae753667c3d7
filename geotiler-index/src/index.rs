use geo::{coord, MapCoords, Rect};
use geotiler_types::TileFeature;

use crate::clip::intersects;
use crate::convert::{project_collection, ProjectedFeature};
use crate::tile::to_tile_geometry;
use crate::{FeatureCollection, IndexBuilder, IndexError, IndexOptions, SpatialIndex};

/// Zoom levels above this value cannot be addressed with `u32` tile indices.
const MAX_ADDRESSABLE_ZOOM: u8 = 32;

/// Index over projected GeoJSON features.
///
/// Features are stored in world units along with their bounding boxes. Tiles are cut on every request, nothing is
/// cached between calls.
#[derive(Debug)]
pub struct GeoJsonIndex {
    features: Vec<ProjectedFeature>,
    options: IndexOptions,
}

impl GeoJsonIndex {
    /// Projects all features of the collection and creates the index.
    pub fn new(collection: FeatureCollection, options: IndexOptions) -> Result<Self, IndexError> {
        let features = project_collection(collection)?;
        log::debug!("Indexed {} features", features.len());

        Ok(Self { features, options })
    }

    fn max_zoom(&self) -> u8 {
        self.options.max_zoom.min(MAX_ADDRESSABLE_ZOOM)
    }
}

impl SpatialIndex for GeoJsonIndex {
    fn get_tile(&self, z: u8, x: u32, y: u32) -> Result<Vec<TileFeature>, IndexError> {
        let max_zoom = self.max_zoom();
        if z > max_zoom {
            return Err(IndexError::ZoomOutOfRange { z, max_zoom });
        }

        let tiles_count = 1u64 << z;
        if u64::from(y) >= tiles_count {
            log::debug!("Tile {z}/{x}/{y} is outside of the world");
            return Ok(vec![]);
        }
        let x = u64::from(x) % tiles_count;

        let scale = tiles_count as f64;
        let extent = f64::from(self.options.extent);
        let buffer = f64::from(self.options.buffer);
        let margin = buffer / extent;
        let (tile_x, tile_y) = (x as f64, f64::from(y));

        let world_bounds = Rect::new(
            coord! { x: (tile_x - margin) / scale, y: (tile_y - margin) / scale },
            coord! { x: (tile_x + 1.0 + margin) / scale, y: (tile_y + 1.0 + margin) / scale },
        );
        let tile_bounds = Rect::new(
            coord! { x: -buffer, y: -buffer },
            coord! { x: extent + buffer, y: extent + buffer },
        );

        let features: Vec<TileFeature> = self
            .features
            .iter()
            .filter(|feature| intersects(&feature.bbox, &world_bounds))
            .filter_map(|feature| {
                let geometry = feature.geometry.map_coords(|c| coord! {
                    x: (c.x * scale - tile_x) * extent,
                    y: (c.y * scale - tile_y) * extent,
                });

                to_tile_geometry(&geometry, &tile_bounds, self.options.tolerance).map(|geometry| {
                    TileFeature {
                        geometry,
                        properties: feature.properties.clone(),
                    }
                })
            })
            .collect();

        log::debug!(
            "Tile {z}/{x}/{y} contains {} of {} features",
            features.len(),
            self.features.len()
        );

        Ok(features)
    }

    fn feature_count(&self) -> usize {
        self.features.len()
    }
}

/// Builder of [`GeoJsonIndex`]es.
#[derive(Debug, Clone, Default)]
pub struct GeoJsonIndexBuilder {
    options: IndexOptions,
}

impl GeoJsonIndexBuilder {
    /// Creates a builder that uses the given options for all indices.
    pub fn new(options: IndexOptions) -> Self {
        Self { options }
    }
}

impl IndexBuilder for GeoJsonIndexBuilder {
    fn build(&self, collection: FeatureCollection) -> Result<Box<dyn SpatialIndex>, IndexError> {
        Ok(Box::new(GeoJsonIndex::new(collection, self.options)?))
    }
}
