//! Networks are the executable phenotypes of genomes.
//!
//! A [`CppnNetwork`] is built from a genome, with disabled
//! genes ignored, and queried over substrate coordinates.
//! Decoding it yields a [`SubstrateNetwork`], the network
//! actually being evaluated by the fitness function.
//!
//! Both are evaluated in a single topological pass by a
//! shared [`FeedForwardNetwork`]; cycles are rejected when
//! the network is built.
mod connection;
mod cppn;
mod errors;
mod feed_forward;
mod substrate;

pub use cppn::CppnNetwork;
pub use errors::NetworkError;
pub use feed_forward::{FeedForwardNetwork, NodeSpec};
pub use substrate::{SubstrateConnection, SubstrateNetwork};
