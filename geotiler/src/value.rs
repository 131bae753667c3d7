//! Encoding of property values into vector tile values.

use geotiler_mvt::{PropertySink, TileValue};
use geotiler_types::PropertyValue;

use crate::error::TilerError;

/// Appends one key-value pair to the feature being built.
///
/// Only booleans, unsigned integers, doubles and strings can be written. Any other value fails the whole feature
/// with [`TilerError::UnsupportedValueKind`] and nothing is appended.
pub fn encode_property(
    key: &str,
    value: &PropertyValue,
    sink: &mut impl PropertySink,
) -> Result<(), TilerError> {
    let value = match value {
        PropertyValue::Bool(v) => TileValue::Bool(*v),
        PropertyValue::Uint(v) => TileValue::Uint(*v),
        PropertyValue::Double(v) => TileValue::Double(*v),
        PropertyValue::String(v) => TileValue::Str(v.clone()),
        PropertyValue::Null
        | PropertyValue::Int(_)
        | PropertyValue::Array(_)
        | PropertyValue::Object(_) => {
            return Err(TilerError::UnsupportedValueKind {
                key: key.to_owned(),
                kind: value.kind(),
            })
        }
    };

    sink.add_property(key, value);
    Ok(())
}

/// Encodes all properties in key order, stopping at the first value that cannot be encoded.
pub fn encode_properties<'a>(
    properties: impl IntoIterator<Item = (&'a String, &'a PropertyValue)>,
    sink: &mut impl PropertySink,
) -> Result<(), TilerError> {
    for (key, value) in properties {
        encode_property(key, value, sink)?;
    }

    Ok(())
}
