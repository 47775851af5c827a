use super::{FeedForwardNetwork, NetworkError, NodeSpec};
use crate::genomics::ActivationType;
use crate::{ConnectionKey, NodeKey};

use serde::{Deserialize, Serialize};

/// A weighted connection between two substrate nodes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubstrateConnection {
    pub key: ConnectionKey,
    pub weight: f32,
}

/// The phenotype produced by decoding a CPPN:
/// a layered feed-forward network whose first layer
/// holds the inputs and whose last layer the outputs.
///
/// Substrate nodes have no bias.
#[derive(Clone, Debug)]
pub struct SubstrateNetwork {
    network: FeedForwardNetwork,
    layers: Vec<Vec<NodeKey>>,
    connections: Vec<SubstrateConnection>,
}

impl SubstrateNetwork {
    /// Builds a substrate network from its layers of node keys,
    /// inputs first, and its connections.
    ///
    /// Hidden layers use `hidden_activation`, the
    /// last layer `output_activation`.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection references an unknown
    /// node or the connections form a cycle.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::ActivationType;
    /// use hyperneat::networks::{SubstrateConnection, SubstrateNetwork};
    ///
    /// let mut network = SubstrateNetwork::new(
    ///     vec![vec![0, 1], vec![2]],
    ///     vec![
    ///         SubstrateConnection { key: (0, 2), weight: 1.0 },
    ///         SubstrateConnection { key: (1, 2), weight: -1.0 },
    ///     ],
    ///     ActivationType::Sigmoid,
    ///     ActivationType::Identity,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(network.activate(&[3.0, 1.0]).unwrap(), vec![2.0]);
    /// ```
    pub fn new(
        layers: Vec<Vec<NodeKey>>,
        connections: Vec<SubstrateConnection>,
        hidden_activation: ActivationType,
        output_activation: ActivationType,
    ) -> Result<SubstrateNetwork, NetworkError> {
        let inputs: &[NodeKey] = layers.first().map(Vec::as_slice).unwrap_or(&[]);
        let outputs: &[NodeKey] = if layers.len() > 1 {
            layers.last().map(Vec::as_slice).unwrap_or(&[])
        } else {
            &[]
        };

        let last = layers.len().saturating_sub(1);
        let nodes = layers
            .iter()
            .enumerate()
            .skip(1)
            .flat_map(|(depth, layer)| {
                let activation = if depth == last {
                    output_activation
                } else {
                    hidden_activation
                };
                layer.iter().map(move |&key| NodeSpec {
                    key,
                    activation,
                    bias: 0.0,
                    response: 1.0,
                })
            });

        let network = FeedForwardNetwork::build(
            inputs,
            outputs,
            nodes,
            connections.iter().map(|c| (c.key, c.weight)),
        )?;

        Ok(SubstrateNetwork {
            network,
            layers,
            connections,
        })
    }

    /// Evaluates the substrate on `inputs`, one value per
    /// input node, and returns one value per output node.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of inputs is wrong.
    pub fn activate(&mut self, inputs: &[f32]) -> Result<Vec<f32>, NetworkError> {
        self.network.activate(inputs)
    }

    /// Returns the node keys of each layer, inputs first.
    pub fn layers(&self) -> &[Vec<NodeKey>] {
        &self.layers
    }

    /// Returns every expressed connection.
    pub fn connections(&self) -> &[SubstrateConnection] {
        &self.connections
    }

    pub fn input_count(&self) -> usize {
        self.network.input_count()
    }

    pub fn output_count(&self) -> usize {
        self.network.output_count()
    }

    /// Returns the number of substrate nodes, inputs included.
    pub fn node_count(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }
}
