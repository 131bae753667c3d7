use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{PropertyValue, TileGeometry};

/// Properties of a feature, keyed by name.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Feature clipped and simplified for one tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileFeature {
    /// Geometry in tile-local coordinates.
    pub geometry: TileGeometry,
    /// Feature attributes.
    pub properties: Properties,
}

impl TileFeature {
    /// Creates a feature without properties.
    pub fn new(geometry: TileGeometry) -> Self {
        Self {
            geometry,
            properties: Properties::new(),
        }
    }

    /// Adds a property to the feature, replacing the previous value with the same key.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TilePoint;

    #[test]
    fn serde_roundtrip() {
        let feature = TileFeature::new(TileGeometry::LineString(vec![
            TilePoint::new(1, 2),
            TilePoint::new(3, 4),
        ]))
        .with_property("name", "road")
        .with_property("lanes", 2u64);

        let json = serde_json::to_string(&feature).expect("serialization failed");
        let restored: TileFeature = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(restored, feature);
    }

    #[test]
    fn with_property_replaces_value() {
        let feature = TileFeature::new(TileGeometry::Point(TilePoint::new(0, 0)))
            .with_property("a", 1u64)
            .with_property("a", true);
        assert_eq!(feature.properties.len(), 1);
        assert_eq!(feature.properties["a"], PropertyValue::Bool(true));
    }
}
