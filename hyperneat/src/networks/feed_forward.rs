use super::connection::Connection;
use super::NetworkError;
use crate::genomics::ActivationType;
use crate::{ConnectionKey, NodeKey};

use ahash::RandomState;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use std::collections::HashMap;
use std::fmt;

/// The parameters of a single non-input network node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeSpec {
    pub key: NodeKey,
    pub activation: ActivationType,
    pub bias: f32,
    pub response: f32,
}

/// An acyclic network evaluated in a single
/// pass, in topological order.
///
/// Every non-input node computes
/// `activation(bias + response × Σ weight × source)`.
#[derive(Clone, Debug)]
pub struct FeedForwardNetwork {
    input_count: usize,
    node_keys: Box<[NodeKey]>,
    output_indices: Box<[usize]>,
    activation_functions: Box<[ActivationType]>,
    biases: Box<[f32]>,
    responses: Box<[f32]>,
    incoming: Box<[Box<[Connection]>]>,
    evaluation_order: Box<[usize]>,
    values: Box<[f32]>,
}

impl FeedForwardNetwork {
    /// Builds a network from its inputs, outputs, nodes
    /// and (enabled) connections.
    ///
    /// Inputs are set positionally in the order of
    /// `input_keys`, and outputs are read in the order
    /// of `output_keys`. Output keys must be among the
    /// nodes or inputs.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection or output references
    /// an unknown node, or if the connections form a cycle.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::ActivationType;
    /// use hyperneat::networks::{FeedForwardNetwork, NetworkError, NodeSpec};
    ///
    /// let node = |key| NodeSpec {
    ///     key,
    ///     activation: ActivationType::Identity,
    ///     bias: 0.0,
    ///     response: 1.0,
    /// };
    ///
    /// let mut network = FeedForwardNetwork::build(
    ///     &[-1, -2],
    ///     &[0],
    ///     vec![node(0), node(1)],
    ///     vec![((-1, 1), 2.0), ((1, 0), 0.5), ((-2, 0), -1.0)],
    /// )
    /// .unwrap();
    /// assert_eq!(network.activate(&[3.0, 1.0]).unwrap(), vec![2.0]);
    ///
    /// let cyclic = FeedForwardNetwork::build(
    ///     &[-1],
    ///     &[0],
    ///     vec![node(0), node(1)],
    ///     vec![((0, 1), 1.0), ((1, 0), 1.0)],
    /// );
    /// assert!(matches!(cyclic, Err(NetworkError::Cycle(_))));
    /// ```
    pub fn build<N, C>(
        input_keys: &[NodeKey],
        output_keys: &[NodeKey],
        nodes: N,
        connections: C,
    ) -> Result<FeedForwardNetwork, NetworkError>
    where
        N: IntoIterator<Item = NodeSpec>,
        C: IntoIterator<Item = (ConnectionKey, f32)>,
    {
        let input_count = input_keys.len();
        let mut node_keys = input_keys.to_vec();
        let mut activation_functions = vec![ActivationType::Identity; input_count];
        let mut biases = vec![0.0; input_count];
        let mut responses = vec![1.0; input_count];
        for node in nodes {
            node_keys.push(node.key);
            activation_functions.push(node.activation);
            biases.push(node.bias);
            responses.push(node.response);
        }
        let total_node_count = node_keys.len();

        let node_index_from_key: HashMap<_, _, RandomState> = node_keys
            .iter()
            .enumerate()
            .map(|(i, key)| (*key, i))
            .collect();

        let mut graph = DiGraph::<usize, ()>::with_capacity(total_node_count, 0);
        for index in 0..total_node_count {
            graph.add_node(index);
        }
        let mut incoming = vec![vec![]; total_node_count];
        for (key, weight) in connections {
            let (source, target) = match (
                node_index_from_key.get(&key.0),
                node_index_from_key.get(&key.1),
            ) {
                (Some(source), Some(target)) => (*source, *target),
                _ => return Err(NetworkError::UnknownEndpoint(key)),
            };
            graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
            incoming[target].push(Connection::new(source, weight));
        }

        let evaluation_order: Vec<usize> = toposort(&graph, None)
            .map_err(|cycle| NetworkError::Cycle(node_keys[cycle.node_id().index()]))?
            .into_iter()
            .map(|index| index.index())
            .filter(|index| *index >= input_count)
            .collect();

        let output_indices = output_keys
            .iter()
            .map(|key| {
                node_index_from_key
                    .get(key)
                    .copied()
                    .ok_or(NetworkError::MissingOutput(*key))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeedForwardNetwork {
            input_count,
            node_keys: node_keys.into(),
            output_indices: output_indices.into(),
            activation_functions: activation_functions.into(),
            biases: biases.into(),
            responses: responses.into(),
            incoming: incoming.into_iter().map(|v| v.into()).collect(),
            evaluation_order: evaluation_order.into(),
            values: vec![0.0; total_node_count].into(),
        })
    }

    /// Sets the inputs, evaluates every node once in
    /// topological order and returns the output values.
    ///
    /// # Errors
    ///
    /// Returns an error if `inputs` does not hold
    /// exactly one value per network input.
    pub fn activate(&mut self, inputs: &[f32]) -> Result<Vec<f32>, NetworkError> {
        if inputs.len() != self.input_count {
            return Err(NetworkError::InputArity {
                expected: self.input_count,
                found: inputs.len(),
            });
        }
        self.values[..self.input_count].copy_from_slice(inputs);
        for &node in self.evaluation_order.iter() {
            let input_sum: f32 = self.incoming[node]
                .iter()
                .map(|c| self.values[c.source] * c.weight)
                .sum();
            self.values[node] = self.activation_functions[node]
                .apply(self.biases[node] + self.responses[node] * input_sum);
        }
        Ok(self.outputs())
    }

    /// Returns the output values of the last activation.
    pub fn outputs(&self) -> Vec<f32> {
        self.output_indices.iter().map(|&i| self.values[i]).collect()
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_count(&self) -> usize {
        self.output_indices.len()
    }

    /// Returns the keys of all nodes, inputs first.
    pub fn node_keys(&self) -> &[NodeKey] {
        &self.node_keys
    }
}

impl fmt::Display for FeedForwardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self as &dyn fmt::Debug).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sigmoid(x: f32) -> f32 {
        1.0 / (1.0 + (-4.9 * x).exp())
    }

    fn node(key: NodeKey, activation: ActivationType, bias: f32) -> NodeSpec {
        NodeSpec {
            key,
            activation,
            bias,
            response: 1.0,
        }
    }

    #[test]
    fn build_layout() {
        let network = FeedForwardNetwork::build(
            &[-1, -2],
            &[1, 0],
            vec![
                node(0, ActivationType::Sigmoid, 0.0),
                node(1, ActivationType::Identity, 0.0),
                node(2, ActivationType::Identity, 0.0),
            ],
            vec![((-1, 2), 1.0), ((2, 0), 1.0), ((-2, 1), 1.0)],
        )
        .unwrap();
        assert_eq!(network.input_count(), 2);
        assert_eq!(network.output_count(), 2);
        assert_eq!(network.node_keys(), &[-1, -2, 0, 1, 2]);
        assert_eq!(&*network.output_indices, &[3, 2]);
        // Every non-input node is evaluated exactly once.
        let mut order = network.evaluation_order.to_vec();
        order.sort_unstable();
        assert_eq!(order, vec![2, 3, 4]);
    }

    #[test]
    fn activate_double() {
        let mut network = FeedForwardNetwork::build(
            &[-1],
            &[0],
            vec![
                node(0, ActivationType::Sigmoid, 0.0),
                node(1, ActivationType::Sigmoid, 0.0),
            ],
            vec![((-1, 1), 1.0), ((1, 0), 1.0)],
        )
        .unwrap();
        for input in -20..=20 {
            let input = input as f32 / 10.0;
            assert_eq!(network.activate(&[input]).unwrap()[0], sigmoid(sigmoid(input)));
        }
    }

    #[test]
    fn bias_and_response() {
        let mut network = FeedForwardNetwork::build(
            &[-1, -2],
            &[0],
            vec![NodeSpec {
                key: 0,
                activation: ActivationType::Identity,
                bias: 0.25,
                response: 2.0,
            }],
            vec![((-1, 0), 1.5), ((-2, 0), -0.5)],
        )
        .unwrap();
        let output = network.activate(&[2.0, 1.0]).unwrap()[0];
        assert_eq!(output, 0.25 + 2.0 * (2.0 * 1.5 + 1.0 * -0.5));
    }

    #[test]
    fn unconnected_output_uses_bias() {
        let mut network = FeedForwardNetwork::build(
            &[-1],
            &[0],
            vec![node(0, ActivationType::Sigmoid, 0.0)],
            vec![],
        )
        .unwrap();
        assert_eq!(network.activate(&[5.0]).unwrap(), vec![0.5]);
    }

    #[test]
    fn repeated_activations_are_independent() {
        let mut network = FeedForwardNetwork::build(
            &[-1],
            &[0],
            vec![node(0, ActivationType::Identity, 0.0)],
            vec![((-1, 0), 3.0)],
        )
        .unwrap();
        assert_eq!(network.activate(&[1.0]).unwrap(), vec![3.0]);
        assert_eq!(network.activate(&[-1.0]).unwrap(), vec![-3.0]);
        assert_eq!(network.outputs(), vec![-3.0]);
    }

    #[test]
    fn input_arity() {
        let mut network = FeedForwardNetwork::build(
            &[-1, -2],
            &[0],
            vec![node(0, ActivationType::Identity, 0.0)],
            vec![],
        )
        .unwrap();
        assert_eq!(
            network.activate(&[1.0]),
            Err(NetworkError::InputArity {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let result = FeedForwardNetwork::build(
            &[-1],
            &[0],
            vec![node(0, ActivationType::Identity, 0.0)],
            vec![((0, 0), 1.0)],
        );
        assert_eq!(result.unwrap_err(), NetworkError::Cycle(0));
    }

    #[test]
    fn unknown_endpoint() {
        let result = FeedForwardNetwork::build(
            &[-1],
            &[0],
            vec![node(0, ActivationType::Identity, 0.0)],
            vec![((-7, 0), 1.0)],
        );
        assert_eq!(result.unwrap_err(), NetworkError::UnknownEndpoint((-7, 0)));
    }

    #[test]
    fn unknown_output() {
        let result = FeedForwardNetwork::build(
            &[-1],
            &[3],
            vec![node(0, ActivationType::Identity, 0.0)],
            vec![],
        );
        assert_eq!(result.unwrap_err(), NetworkError::MissingOutput(3));
    }
}
