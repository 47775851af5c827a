//! A Rust implementation of Deep HyperNEAT.
//!
//! HyperNEAT evolves networks indirectly: a small Compositional
//! Pattern-Producing Network (CPPN) is evolved by a speciated genetic
//! algorithm, and then queried over the coordinates of a geometric
//! substrate to produce the weights of a larger network. In the "deep"
//! variant the CPPN grows one output per substrate layer pair, so the
//! substrate gains hidden layers as the CPPN evolves.
//!
//! The crate is split into:
//! - [`genomics`]: CPPN genomes and their mutation operators.
//! - [`networks`]: feed-forward CPPN and substrate networks.
//! - [`decoding`]: substrate geometry and CPPN-to-substrate decoding.
//! - [`populations`]: speciation, reproduction and the generational loop.
//!
//! # Example usage: Evolution of an XOR substrate
//! ```
//! use hyperneat::decoding::{decode, DecodeError, SubstrateGeometry};
//! use hyperneat::genomics::{GeneticConfig, Genome};
//! use hyperneat::networks::CppnNetwork;
//! use hyperneat::populations::{Population, PopulationConfig};
//!
//! const CASES: [([f32; 3], f32); 4] = [
//!     ([0.0, 0.0, 1.0], 0.0),
//!     ([0.0, 1.0, 1.0], 1.0),
//!     ([1.0, 0.0, 1.0], 1.0),
//!     ([1.0, 1.0, 1.0], 0.0),
//! ];
//!
//! fn evaluate_xor(genome: &Genome, geometry: &SubstrateGeometry) -> Result<f32, DecodeError> {
//!     let mut cppn = CppnNetwork::from_genome(genome)?;
//!     let mut substrate = decode(&mut cppn, geometry)?;
//!     let mut error = 0.0;
//!     for (input, expected) in CASES.iter() {
//!         error += (substrate.activate(input)?[0] - expected).abs();
//!     }
//!     Ok(1.0 - error / 4.0)
//! }
//!
//! let geometry = SubstrateGeometry {
//!     input_dims: vec![1, 3],
//!     hidden_sheet_dims: vec![vec![1, 3]],
//!     output_dims: vec![1],
//!     ..SubstrateGeometry::default()
//! };
//!
//! let mut population = Population::with_seed(
//!     PopulationConfig {
//!         size: std::num::NonZeroUsize::new(30).unwrap(),
//!         ..PopulationConfig::deep_hyperneat()
//!     },
//!     GeneticConfig::deep_hyperneat(),
//!     42,
//! );
//!
//! let results = population
//!     .run(
//!         |genomes| {
//!             for (_, genome) in genomes.iter_mut() {
//!                 let fitness = evaluate_xor(genome, &geometry).unwrap_or(0.0);
//!                 genome.set_fitness(fitness);
//!             }
//!         },
//!         0.98,
//!         5,
//!         false,
//!     )
//!     .unwrap();
//!
//! assert!(results.records().len() <= 5);
//! assert!(results.best_fitness().windows(2).all(|w| w[0] <= w[1]));
//! ```

pub mod decoding;
pub mod genomics;
pub mod networks;
pub mod populations;
mod sequence;

pub use sequence::Sequence;

/// Identifies a node within a genome or substrate.
/// CPPN inputs have negative keys.
pub type NodeKey = i64;
/// Identifies a genome within a population.
pub type GenomeKey = usize;
/// Identifies a connection by its `(source, target)` nodes.
pub type ConnectionKey = (NodeKey, NodeKey);
