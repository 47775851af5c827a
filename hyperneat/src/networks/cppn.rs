use super::{FeedForwardNetwork, NetworkError, NodeSpec};
use crate::genomics::{CppnTuple, Genome, CPPN_INPUT_COUNT};

use std::convert::TryFrom;

/// The executable form of a [`Genome`]: a feed-forward
/// network whose outputs each govern a substrate layer pair.
#[derive(Clone, Debug)]
pub struct CppnNetwork {
    network: FeedForwardNetwork,
    output_tuples: Box<[CppnTuple]>,
}

impl CppnNetwork {
    /// Builds the network described by the genome.
    /// Disabled connections are not expressed.
    ///
    /// # Errors
    ///
    /// Returns an error if the enabled connections form a cycle
    /// or the genome is otherwise malformed.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{ActivationType, GeneticConfig, Genome};
    /// use hyperneat::networks::CppnNetwork;
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg64;
    ///
    /// // All weights zero, no output bias, linear output.
    /// let config = GeneticConfig {
    ///     output_activation_types: vec![ActivationType::Identity],
    ///     ..GeneticConfig::zero()
    /// };
    /// let genome = Genome::new(0, &config, &mut Pcg64::seed_from_u64(7));
    ///
    /// let mut cppn = CppnNetwork::from_genome(&genome).unwrap();
    /// assert_eq!(cppn.activate(&[0.0, 0.0, 0.0, 0.0, 1.0]).unwrap(), vec![0.0]);
    /// ```
    pub fn from_genome(genome: &Genome) -> Result<CppnNetwork, NetworkError> {
        let output_tuples = genome
            .output_keys()
            .iter()
            .map(|key| {
                genome
                    .node(*key)
                    .and_then(|node| node.cppn_tuple())
                    .ok_or(NetworkError::MissingOutput(*key))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let nodes = genome.nodes().map(|node| NodeSpec {
            key: node.key(),
            activation: node.activation_type(),
            bias: node.bias().unwrap_or(0.0),
            response: node.response(),
        });
        let connections = genome
            .connections()
            .filter(|gene| gene.enabled())
            .map(|gene| (gene.key(), gene.weight()));

        let network =
            FeedForwardNetwork::build(genome.input_keys(), genome.output_keys(), nodes, connections)?;

        Ok(CppnNetwork {
            network,
            output_tuples: output_tuples.into(),
        })
    }

    /// Evaluates the CPPN on `[x1, y1, x2, y2, bias]`,
    /// returning one value per output.
    ///
    /// # Errors
    ///
    /// Returns an error if `inputs` doesn't hold five values.
    pub fn activate(&mut self, inputs: &[f32]) -> Result<Vec<f32>, NetworkError> {
        self.network.activate(inputs)
    }

    /// Returns the layer pair governed by each output, in output order.
    pub fn output_tuples(&self) -> &[CppnTuple] {
        &self.output_tuples
    }

    /// Returns the position of the output governing `tuple`.
    ///
    /// # Errors
    ///
    /// Returns an error if no output governs the layer pair.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{GeneticConfig, Genome};
    /// use hyperneat::networks::{CppnNetwork, NetworkError};
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg64;
    ///
    /// let config = GeneticConfig::zero();
    /// let mut genome = Genome::new(0, &config, &mut Pcg64::seed_from_u64(7));
    /// genome.mutate_increment_depth(&config).unwrap();
    ///
    /// let cppn = CppnNetwork::from_genome(&genome).unwrap();
    /// assert_eq!(cppn.output_index_for(((2, 0), (0, 0))), Ok(1));
    /// assert_eq!(
    ///     cppn.output_index_for(((1, 0), (0, 0))),
    ///     Err(NetworkError::UnmappedLayerPair(((1, 0), (0, 0))))
    /// );
    /// ```
    pub fn output_index_for(&self, tuple: CppnTuple) -> Result<usize, NetworkError> {
        self.output_tuples
            .iter()
            .position(|t| *t == tuple)
            .ok_or(NetworkError::UnmappedLayerPair(tuple))
    }

    /// Returns the weight the CPPN assigns to the connection
    /// between substrate points `source` and `target`, in the
    /// layer pair `tuple`.
    ///
    /// # Errors
    ///
    /// Returns an error if no output governs the layer pair.
    pub fn query(
        &mut self,
        tuple: CppnTuple,
        source: (f32, f32),
        target: (f32, f32),
    ) -> Result<f32, NetworkError> {
        let index = self.output_index_for(tuple)?;
        self.query_output(index, source, target)
    }

    /// Like [`query`](CppnNetwork::query), with a precomputed output index.
    pub(crate) fn query_output(
        &mut self,
        index: usize,
        (sx, sy): (f32, f32),
        (tx, ty): (f32, f32),
    ) -> Result<f32, NetworkError> {
        let inputs: [f32; CPPN_INPUT_COUNT] = [sx, sy, tx, ty, 1.0];
        let outputs = self.network.activate(&inputs)?;
        outputs
            .get(index)
            .copied()
            .ok_or(NetworkError::OutputOutOfRange {
                index,
                count: self.output_tuples.len(),
            })
    }

    pub fn output_count(&self) -> usize {
        self.network.output_count()
    }
}

impl TryFrom<&Genome> for CppnNetwork {
    type Error = NetworkError;

    fn try_from(genome: &Genome) -> Result<CppnNetwork, NetworkError> {
        CppnNetwork::from_genome(genome)
    }
}
