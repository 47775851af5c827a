//! Decoding turns a CPPN into a substrate network.
//!
//! The substrate's layer sequence is read off the CPPN's
//! output layer pairs: starting from the input layer, each
//! step follows the output whose pair leaves the current layer,
//! until the output layer is reached. Every source and target
//! node of each adjacent layer pair is then queried, and the
//! CPPN's answer becomes the connection weight if its magnitude
//! exceeds [`PRUNING_THRESHOLD`].
mod errors;
mod geometry;

pub use errors::DecodeError;
pub use geometry::{coordinates, SubstrateGeometry};

use crate::genomics::{CppnTuple, LayerSheet, INPUT_LAYER, OUTPUT_LAYER};
use crate::networks::{CppnNetwork, SubstrateConnection, SubstrateNetwork};
use crate::{NodeKey, Sequence};

use log::trace;

use std::collections::HashSet;

/// CPPN outputs of this magnitude or less
/// produce no substrate connection.
pub const PRUNING_THRESHOLD: f32 = 0.2;

/// Decodes `cppn` over `geometry` into a substrate network.
///
/// Substrate node keys are assigned sequentially from 0,
/// inputs first, then each hidden layer, then the outputs.
/// Decoding is deterministic.
///
/// # Errors
///
/// Returns an error if the geometry has unsupported
/// dimensions or the CPPN's layer pairs do not form a
/// chain from the input layer to the output layer.
///
/// # Examples
/// ```
/// use hyperneat::decoding::{decode, SubstrateGeometry};
/// use hyperneat::genomics::{ActivationType, GeneticConfig, Genome};
/// use hyperneat::networks::CppnNetwork;
/// use rand::SeedableRng;
/// use rand_pcg::Pcg64;
///
/// // A CPPN that always answers 0.7.
/// let config = GeneticConfig {
///     output_activation_types: vec![ActivationType::Identity],
///     ..GeneticConfig::zero()
/// };
/// let mut genome = Genome::new(0, &config, &mut Pcg64::seed_from_u64(7));
/// genome.connection_mut((-5, 0)).unwrap().set_weight(0.7);
///
/// let mut cppn = CppnNetwork::from_genome(&genome).unwrap();
/// let substrate = decode(&mut cppn, &SubstrateGeometry::default()).unwrap();
///
/// assert_eq!(substrate.layers(), &[vec![0, 1], vec![2]]);
/// assert_eq!(substrate.connections().len(), 2);
/// assert!(substrate.connections().iter().all(|c| c.weight == 0.7));
/// ```
pub fn decode(
    cppn: &mut CppnNetwork,
    geometry: &SubstrateGeometry,
) -> Result<SubstrateNetwork, DecodeError> {
    let chain = layer_chain(cppn.output_tuples())?;

    let mut layer_coordinates = Vec::with_capacity(chain.len() + 1);
    layer_coordinates.push(coordinates(&geometry.input_dims)?);
    for hidden in 0..chain.len() - 1 {
        layer_coordinates.push(coordinates(geometry.hidden_dims(hidden))?);
    }
    layer_coordinates.push(coordinates(&geometry.output_dims)?);

    let mut node_keys = Sequence::starting_at(0 as NodeKey);
    let layers: Vec<Vec<NodeKey>> = layer_coordinates
        .iter()
        .map(|points| points.iter().map(|_| node_keys.next_key()).collect())
        .collect();

    let mut connections = vec![];
    for (step, &(tuple, output)) in chain.iter().enumerate() {
        let (sources, targets) = (&layer_coordinates[step], &layer_coordinates[step + 1]);
        let (source_keys, target_keys) = (&layers[step], &layers[step + 1]);
        for (&source, &source_key) in sources.iter().zip(source_keys) {
            for (&target, &target_key) in targets.iter().zip(target_keys) {
                let weight = cppn.query_output(output, source, target)?;
                if weight.abs() > PRUNING_THRESHOLD {
                    connections.push(SubstrateConnection {
                        key: (source_key, target_key),
                        weight,
                    });
                }
            }
        }
        trace!("decoded layer pair {:?}", tuple);
    }

    Ok(SubstrateNetwork::new(
        layers,
        connections,
        geometry.hidden_activation,
        geometry.output_activation,
    )?)
}

/// Follows the layer pairs from the input layer to the
/// output layer, returning each pair with its output index.
fn layer_chain(tuples: &[CppnTuple]) -> Result<Vec<(CppnTuple, usize)>, DecodeError> {
    let mut chain = vec![];
    let mut visited: HashSet<LayerSheet> = HashSet::new();
    let mut current = INPUT_LAYER;
    visited.insert(current);
    loop {
        let output = tuples
            .iter()
            .position(|(source, _)| *source == current)
            .ok_or(DecodeError::MissingLayerPair(current))?;
        let tuple = tuples[output];
        chain.push((tuple, output));
        let next = tuple.1;
        if next == OUTPUT_LAYER {
            return Ok(chain);
        }
        if !visited.insert(next) {
            return Err(DecodeError::LayerCycle(next));
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{ActivationType, GeneticConfig, Genome};
    use crate::networks::NetworkError;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    /// A genome whose first output is the constant `value`.
    fn constant_genome(value: f32) -> Genome {
        let config = GeneticConfig {
            output_activation_types: vec![ActivationType::Identity],
            ..GeneticConfig::zero()
        };
        let mut genome = Genome::new(0, &config, &mut Pcg64::seed_from_u64(3));
        genome.connection_mut((-5, 0)).unwrap().set_weight(value);
        genome
    }

    fn row_geometry(inputs: usize, outputs: usize) -> SubstrateGeometry {
        SubstrateGeometry {
            input_dims: vec![inputs],
            output_dims: vec![outputs],
            ..SubstrateGeometry::default()
        }
    }

    #[test]
    fn constant_cppn_two_inputs() {
        let mut cppn = CppnNetwork::from_genome(&constant_genome(0.7)).unwrap();
        let substrate = decode(&mut cppn, &row_geometry(2, 1)).unwrap();

        assert_eq!(substrate.input_count(), 2);
        assert_eq!(substrate.output_count(), 1);
        assert_eq!(
            substrate.connections(),
            &[
                SubstrateConnection {
                    key: (0, 2),
                    weight: 0.7
                },
                SubstrateConnection {
                    key: (1, 2),
                    weight: 0.7
                },
            ]
        );
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut cppn = CppnNetwork::from_genome(&constant_genome(PRUNING_THRESHOLD)).unwrap();
        let substrate = decode(&mut cppn, &row_geometry(2, 1)).unwrap();
        assert!(substrate.connections().is_empty());

        let mut cppn = CppnNetwork::from_genome(&constant_genome(-0.5)).unwrap();
        let substrate = decode(&mut cppn, &row_geometry(2, 1)).unwrap();
        assert_eq!(substrate.connections().len(), 2);
    }

    #[test]
    fn decoding_is_pure() {
        let config = GeneticConfig {
            depth_increment_chance: 0.3,
            ..GeneticConfig::deep_hyperneat()
        };
        let mut rng = Pcg64::seed_from_u64(5);
        let mut genome = Genome::new(0, &config, &mut rng);
        for _ in 0..10 {
            genome.mutate(&config, &mut rng).unwrap();
        }
        let geometry = SubstrateGeometry {
            input_dims: vec![2, 2],
            hidden_sheet_dims: vec![vec![3, 3]],
            output_dims: vec![2],
            ..SubstrateGeometry::default()
        };

        let mut first = CppnNetwork::from_genome(&genome).unwrap();
        let mut second = CppnNetwork::from_genome(&genome).unwrap();
        let a = decode(&mut first, &geometry).unwrap();
        let b = decode(&mut first, &geometry).unwrap();
        let c = decode(&mut second, &geometry).unwrap();
        assert_eq!(a.connections(), b.connections());
        assert_eq!(a.connections(), c.connections());
        assert_eq!(a.layers(), c.layers());
    }

    #[test]
    fn deeper_cppn_adds_hidden_layer() {
        let config = GeneticConfig::zero();
        let mut genome = constant_genome(0.7);
        genome.mutate_increment_depth(&config).unwrap();
        let geometry = SubstrateGeometry {
            input_dims: vec![2],
            hidden_sheet_dims: vec![vec![1, 3]],
            output_dims: vec![1],
            ..SubstrateGeometry::default()
        };

        let mut cppn = CppnNetwork::from_genome(&genome).unwrap();
        let substrate = decode(&mut cppn, &geometry).unwrap();

        assert_eq!(substrate.layers(), &[vec![0, 1], vec![2, 3, 4], vec![5]]);
        let (to_hidden, to_output): (Vec<&SubstrateConnection>, Vec<&SubstrateConnection>) =
            substrate.connections().iter().partition(|c| c.key.1 != 5);
        assert_eq!(to_hidden.len(), 6);
        assert!(to_hidden.iter().all(|c| c.weight == 0.7));
        // Only the hidden node aligned with the output survives pruning.
        assert_eq!(
            to_output,
            vec![&SubstrateConnection {
                key: (3, 5),
                weight: 1.0
            }]
        );
    }

    #[test]
    fn hidden_dims_fall_back_to_inputs() {
        let config = GeneticConfig::zero();
        let mut genome = constant_genome(0.7);
        genome.mutate_increment_depth(&config).unwrap();
        genome.mutate_increment_depth(&config).unwrap();

        let mut cppn = CppnNetwork::from_genome(&genome).unwrap();
        let substrate = decode(&mut cppn, &row_geometry(3, 1)).unwrap();
        let sizes: Vec<usize> = substrate.layers().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);
    }

    #[test]
    fn layer_chains() {
        assert_eq!(
            layer_chain(&[((2, 0), (0, 0)), ((1, 0), (2, 0))]),
            Ok(vec![(((1, 0), (2, 0)), 1), (((2, 0), (0, 0)), 0)])
        );
        assert_eq!(layer_chain(&[]), Err(DecodeError::MissingLayerPair((1, 0))));
        assert_eq!(
            layer_chain(&[((1, 0), (2, 0))]),
            Err(DecodeError::MissingLayerPair((2, 0)))
        );
        assert_eq!(
            layer_chain(&[((1, 0), (2, 0)), ((2, 0), (1, 0))]),
            Err(DecodeError::LayerCycle((1, 0)))
        );
    }

    #[test]
    fn unsupported_geometry() {
        let mut cppn = CppnNetwork::from_genome(&constant_genome(0.7)).unwrap();
        let geometry = SubstrateGeometry {
            output_dims: vec![1, 1, 1],
            ..SubstrateGeometry::default()
        };
        assert_eq!(
            decode(&mut cppn, &geometry).unwrap_err(),
            DecodeError::UnsupportedDimensions(vec![1, 1, 1])
        );
    }

    #[test]
    fn substrate_arity_error_converts() {
        let mut cppn = CppnNetwork::from_genome(&constant_genome(0.7)).unwrap();
        let mut substrate = decode(&mut cppn, &row_geometry(2, 1)).unwrap();
        let error: DecodeError = substrate.activate(&[1.0]).unwrap_err().into();
        assert_eq!(
            error,
            DecodeError::Network(NetworkError::InputArity {
                expected: 2,
                found: 1
            })
        );
    }
}
