use prost::DecodeError;
use thiserror::Error;

/// Failure to read a vector tile.
///
/// Everything except [`MvtError::Proto`] and [`MvtError::NoLayers`] concerns a single layer, value or feature and can
/// be skipped by decoding with `skip_recoverable_errors`.
#[derive(Debug, Error)]
pub enum MvtError {
    /// Input is not a valid protobuf tile message.
    #[error("invalid protobuf message: {0}")]
    Proto(#[from] DecodeError),

    /// Layer uses an MVT version other than 2.
    #[error("layer '{layer}' has unsupported version {version}")]
    Version { layer: String, version: u32 },

    /// Value of the layer dictionary has zero or several fields set.
    #[error("invalid value #{index} in layer '{layer}': {reason}")]
    Value {
        layer: String,
        index: usize,
        reason: &'static str,
    },

    /// Feature tags point outside of the layer dictionary.
    #[error("invalid tags: {0}")]
    Tags(String),

    /// Feature geometry commands cannot be decoded.
    #[error("invalid geometry: {0}")]
    Geometry(String),

    /// None of the layers of the tile could be decoded.
    #[error("tile does not contain any valid layers")]
    NoLayers,
}
