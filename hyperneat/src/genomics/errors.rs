use crate::{ConnectionKey, NodeKey};

use thiserror::Error;

/// An error type indicating a violated genome invariant,
/// either while mutating or while building a genome by hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenomeError {
    /// A node with the same key already exists. During mutation
    /// this signals a broken node-key sequence.
    #[error("duplicate node insertion with key {0}")]
    DuplicateNodeKey(NodeKey),
    /// A connection with the same endpoints already exists.
    #[error("duplicate connection insertion with key {0:?}")]
    DuplicateConnection(ConnectionKey),
    /// One of the endpoints is neither a node nor an input.
    #[error("connection insertion between nonexistant endpoint(s) {0:?}")]
    MissingEndpoint(ConnectionKey),
    /// Both endpoints are output nodes.
    #[error("connection insertion between output nodes {0:?}")]
    OutputToOutput(ConnectionKey),
    /// The target endpoint is an input.
    #[error("connection insertion with an input as target {0:?}")]
    InputTarget(ConnectionKey),
}
