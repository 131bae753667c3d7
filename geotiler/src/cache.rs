//! Keyed storage of loaded spatial indices.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use geotiler_index::{parse_geojson, IndexBuilder, SpatialIndex};
use parking_lot::RwLock;

use crate::error::TilerError;

/// Indices loaded from files, stored under caller-chosen keys.
///
/// Queries take a read lock only for the time needed to clone the index handle, so loading or unloading an index
/// never waits for tile generation to finish. An index that is replaced or unloaded while being queried is dropped
/// when the last query using it is done.
pub struct IndexCache {
    builder: Box<dyn IndexBuilder>,
    indices: RwLock<HashMap<String, Arc<dyn SpatialIndex>>>,
}

impl IndexCache {
    /// Creates an empty cache that builds indices with the given builder.
    pub fn new(builder: impl IndexBuilder + 'static) -> Self {
        Self {
            builder: Box::new(builder),
            indices: RwLock::default(),
        }
    }

    /// Reads a GeoJSON file, builds an index over it and stores it under the key.
    ///
    /// If the key is already in use, the old index is replaced. If any step fails, the cache is not changed.
    pub fn load(&self, key: &str, path: impl AsRef<Path>) -> Result<(), TilerError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| TilerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let collection = parse_geojson(&raw)?;
        let index = self.builder.build(collection)?;

        log::info!(
            "Loaded {} features from {} as '{key}'",
            index.feature_count(),
            path.display()
        );
        self.insert(key, index);

        Ok(())
    }

    /// Stores an already built index under the key, replacing the old one if present.
    pub fn insert(&self, key: &str, index: Box<dyn SpatialIndex>) {
        if self
            .indices
            .write()
            .insert(key.to_owned(), Arc::from(index))
            .is_some()
        {
            log::info!("Replaced index '{key}'");
        }
    }

    /// Removes the index stored under the key. Does nothing if there is no such index.
    pub fn unload(&self, key: &str) {
        match self.indices.write().remove(key) {
            Some(_) => log::debug!("Unloaded index '{key}'"),
            None => log::debug!("Index '{key}' is not loaded, nothing to unload"),
        }
    }

    /// Returns the index stored under the key.
    pub fn lookup(&self, key: &str) -> Result<Arc<dyn SpatialIndex>, TilerError> {
        self.indices
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| TilerError::UnknownKey(key.to_owned()))
    }

    /// Returns true if an index is stored under the key.
    pub fn contains(&self, key: &str) -> bool {
        self.indices.read().contains_key(key)
    }

    /// Keys of all loaded indices in arbitrary order.
    pub fn keys(&self) -> Vec<String> {
        self.indices.read().keys().cloned().collect()
    }

    /// Number of loaded indices.
    pub fn len(&self) -> usize {
        self.indices.read().len()
    }

    /// Returns true if no index is loaded.
    pub fn is_empty(&self) -> bool {
        self.indices.read().is_empty()
    }
}

impl std::fmt::Debug for IndexCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexCache")
            .field("keys", &self.keys())
            .finish()
    }
}
