use super::ActivationType;
use crate::NodeKey;

use serde::{Deserialize, Serialize};

use std::fmt;

/// A substrate layer and the sheet within it,
/// as `(layer, sheet)`.
///
/// Layer 1 is the substrate's input layer, layer 0
/// its output layer, and layers 2, 3, ... are hidden
/// layers in the order they were added.
pub type LayerSheet = (usize, usize);

/// The substrate layer pair a CPPN output node
/// governs, as `(source, target)`.
pub type CppnTuple = (LayerSheet, LayerSheet);

/// The substrate's input layer.
pub const INPUT_LAYER: LayerSheet = (1, 0);
/// The substrate's output layer.
pub const OUTPUT_LAYER: LayerSheet = (0, 0);

/// A NodeType indicates the function of
/// the node's network equivalent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// Input nodes. These carry no gene, see
    /// [`Genome::node_type`](super::Genome::node_type).
    Input,
    /// Hidden nodes.
    Hidden,
    /// Output nodes.
    Output,
}

/// Nodes are the structural elements of genomes
/// between which connections are created.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NodeGene {
    key: NodeKey,
    node_type: NodeType,
    activation_type: ActivationType,
    bias: Option<f32>,
    response: f32,
    cppn_tuple: Option<CppnTuple>,
}

impl NodeGene {
    /// Returns a new hidden node.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{ActivationType, NodeGene, NodeType};
    ///
    /// let node = NodeGene::hidden(5, ActivationType::Sigmoid, 0.25);
    /// assert_eq!(node.node_type(), NodeType::Hidden);
    /// assert_eq!(node.bias(), Some(0.25));
    /// assert_eq!(node.cppn_tuple(), None);
    /// ```
    pub fn hidden(key: NodeKey, activation_type: ActivationType, bias: f32) -> NodeGene {
        NodeGene {
            key,
            node_type: NodeType::Hidden,
            activation_type,
            bias: Some(bias),
            response: 1.0,
            cppn_tuple: None,
        }
    }

    /// Returns a new output node governing the
    /// substrate layer pair `cppn_tuple`.
    /// Passing `None` as `bias` creates a node
    /// without a bias term.
    pub fn output(
        key: NodeKey,
        activation_type: ActivationType,
        bias: Option<f32>,
        cppn_tuple: CppnTuple,
    ) -> NodeGene {
        NodeGene {
            key,
            node_type: NodeType::Output,
            activation_type,
            bias,
            response: 1.0,
            cppn_tuple: Some(cppn_tuple),
        }
    }

    /// Returns the node's key.
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// Returns the node's node type.
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Returns the node's activation type.
    pub fn activation_type(&self) -> ActivationType {
        self.activation_type
    }

    /// Sets the node's activation type.
    pub fn set_activation_type(&mut self, activation_type: ActivationType) {
        self.activation_type = activation_type;
    }

    /// Returns whether the node carries a bias term.
    pub fn has_bias(&self) -> bool {
        self.bias.is_some()
    }

    /// Returns the node's bias, if it has one.
    pub fn bias(&self) -> Option<f32> {
        self.bias
    }

    /// Sets the node's bias. This gives a bias
    /// term to nodes that had none.
    pub fn set_bias(&mut self, bias: f32) {
        self.bias = Some(bias);
    }

    /// Adds `delta` to the node's bias.
    /// Nodes without a bias term are left untouched.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{ActivationType, NodeGene};
    ///
    /// let mut hidden = NodeGene::hidden(5, ActivationType::Sigmoid, 0.25);
    /// hidden.nudge_bias(0.5);
    /// assert_eq!(hidden.bias(), Some(0.75));
    ///
    /// let mut output = NodeGene::output(0, ActivationType::Identity, None, ((1, 0), (0, 0)));
    /// output.nudge_bias(0.5);
    /// assert_eq!(output.bias(), None);
    /// ```
    pub fn nudge_bias(&mut self, delta: f32) {
        if let Some(bias) = &mut self.bias {
            *bias += delta;
        }
    }

    /// Returns the node's response gain.
    pub fn response(&self) -> f32 {
        self.response
    }

    /// Returns the layer pair governed by the node.
    /// Only output nodes have one.
    pub fn cppn_tuple(&self) -> Option<CppnTuple> {
        self.cppn_tuple
    }

    pub(super) fn set_cppn_tuple(&mut self, cppn_tuple: CppnTuple) {
        self.cppn_tuple = Some(cppn_tuple);
    }
}

impl fmt::Display for NodeGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}[{:?}, {:?}", self.key, self.node_type, self.activation_type)?;
        if let Some(bias) = self.bias {
            write!(f, ", b={:.3}", bias)?;
        }
        if let Some((source, target)) = self.cppn_tuple {
            write!(f, ", {:?}->{:?}", source, target)?;
        }
        write!(f, "]")
    }
}
