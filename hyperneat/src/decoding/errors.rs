use crate::genomics::LayerSheet;
use crate::networks::NetworkError;

use thiserror::Error;

/// An error type indicating a CPPN that cannot
/// be decoded over a substrate geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Layer dimensions other than `[n]` or `[x, y]`,
    /// or with a zero-sized axis.
    #[error("unsupported layer dimensions {0:?}")]
    UnsupportedDimensions(Vec<usize>),
    /// No CPPN output leaves the given layer, so the
    /// substrate output layer cannot be reached.
    #[error("no CPPN output leaves layer {0:?}")]
    MissingLayerPair(LayerSheet),
    /// The CPPN's layer pairs revisit the given layer.
    #[error("CPPN layer pairs revisit layer {0:?}")]
    LayerCycle(LayerSheet),
    #[error(transparent)]
    Network(#[from] NetworkError),
}
