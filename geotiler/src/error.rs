//! Error types used by the crate.

use std::path::PathBuf;

use geotiler_index::IndexError;
use geotiler_types::{GeometryKind, ValueKind};
use thiserror::Error;

/// Geotiler error type.
#[derive(Debug, Error)]
pub enum TilerError {
    /// No index is loaded under the key.
    #[error("no index is loaded for key '{0}'")]
    UnknownKey(String),
    /// Failed to read the source file.
    #[error("failed to read file {path:?}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse input data, build an index or query it.
    #[error(transparent)]
    Index(#[from] IndexError),
    /// Simplified feature has a geometry that cannot be written to a tile.
    #[error("geometry of type {0} cannot be encoded")]
    UnsupportedGeometryKind(GeometryKind),
    /// Property value cannot be written to a tile.
    #[error("value of property '{key}' has unsupported type {kind}")]
    UnsupportedValueKind {
        /// Property key.
        key: String,
        /// Kind of the value.
        kind: ValueKind,
    },
}
