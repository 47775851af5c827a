use crate::genomics::CppnTuple;
use crate::{ConnectionKey, NodeKey};

use thiserror::Error;

/// An error type indicating a network that
/// cannot be built or activated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The number of supplied inputs differs from the network's.
    #[error("expected {expected} network inputs, found {found}")]
    InputArity { expected: usize, found: usize },
    /// Enabled connections form a cycle through the given node.
    #[error("enabled connections form a cycle through node {0}")]
    Cycle(NodeKey),
    /// No CPPN output governs the given layer pair.
    #[error("no CPPN output governs layer pair {0:?}")]
    UnmappedLayerPair(CppnTuple),
    /// A connection references a node that is not in the network.
    #[error("connection {0:?} references an unknown node")]
    UnknownEndpoint(ConnectionKey),
    /// An output key is not a node of the network, or
    /// a CPPN output carries no layer pair.
    #[error("output {0} is missing or malformed")]
    MissingOutput(NodeKey),
    /// An output position past the network's last output.
    #[error("output position {index} is out of range for {count} outputs")]
    OutputOutOfRange { index: usize, count: usize },
}
