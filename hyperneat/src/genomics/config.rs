use crate::genomics::ActivationType;

use serde::{Deserialize, Serialize};

/// Configuration data for genome generation
/// and mutation.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]. Using
/// values that are not in this bound may result
/// in odd behaviours and/or incorrect programs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Possible activation types for hidden nodes.
    /// If an empty vector is given, any of
    /// [`ActivationType::ALL`] may be chosen.
    pub activation_types: Vec<ActivationType>,
    /// Possible activation types for the output nodes
    /// of newly created genomes. If an empty vector is
    /// given, [`activation_types`] is used instead.
    ///
    /// [`activation_types`]: GeneticConfig::activation_types
    pub output_activation_types: Vec<ActivationType>,
    /// Whether output nodes carry a bias term.
    pub output_bias: bool,
    /// Magnitude of the bound on initial connection weights.
    pub weight_bound: f32,
    /// Magnitude of the bound on initial node biases.
    pub bias_bound: f32,
    /// Chance of each connection's weight being nudged
    /// during mutation.
    pub weight_mutation_rate: f32,
    /// Magnitude of bound on weight nudge uniform distribution.
    pub weight_mutation_power: f32,
    /// Chance of each node's bias being nudged during mutation.
    pub bias_mutation_rate: f32,
    /// Magnitude of bound on bias nudge uniform distribution.
    pub bias_mutation_power: f32,
    /// Chance of a node addition mutation taking place.
    pub node_addition_mutation_chance: f32,
    /// Chance of a node deletion mutation taking place.
    pub node_deletion_mutation_chance: f32,
    /// Chance of a connection addition mutation taking place.
    pub connection_addition_mutation_chance: f32,
    /// Chance of a connection deletion mutation taking place.
    pub connection_deletion_mutation_chance: f32,
    /// Chance of a depth increment mutation taking place.
    pub depth_increment_chance: f32,
    /// Chance of a breadth increment mutation taking place.
    pub breadth_increment_chance: f32,
    /// Weight of non-shared genes in genetic distance.
    pub disjoint_gene_factor: f32,
    /// Weight of the shared gene weight/bias
    /// difference average in genetic distance.
    pub common_weight_factor: f32,
}

impl GeneticConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, empty or `false`.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to fill in unused values during
    /// configuration instantiation.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::GeneticConfig;
    ///
    /// let cfg = GeneticConfig {
    ///     // Specify some values here...
    ///     depth_increment_chance: 1.0,
    ///     // Default the rest...
    ///     ..GeneticConfig::zero()
    /// };
    /// ```
    pub const fn zero() -> GeneticConfig {
        GeneticConfig {
            activation_types: vec![],
            output_activation_types: vec![],
            output_bias: false,
            weight_bound: 0.0,
            bias_bound: 0.0,
            weight_mutation_rate: 0.0,
            weight_mutation_power: 0.0,
            bias_mutation_rate: 0.0,
            bias_mutation_power: 0.0,
            node_addition_mutation_chance: 0.0,
            node_deletion_mutation_chance: 0.0,
            connection_addition_mutation_chance: 0.0,
            connection_deletion_mutation_chance: 0.0,
            depth_increment_chance: 0.0,
            breadth_increment_chance: 0.0,
            disjoint_gene_factor: 0.0,
            common_weight_factor: 0.0,
        }
    }

    /// Returns the mutation rates and bounds of the
    /// reference Deep HyperNEAT setup.
    pub fn deep_hyperneat() -> GeneticConfig {
        GeneticConfig {
            output_bias: true,
            weight_bound: 1.0,
            bias_bound: 1.0,
            weight_mutation_rate: 0.8,
            weight_mutation_power: 5.0,
            bias_mutation_rate: 0.7,
            bias_mutation_power: 0.5,
            node_addition_mutation_chance: 0.3,
            node_deletion_mutation_chance: 0.2,
            connection_addition_mutation_chance: 0.5,
            connection_deletion_mutation_chance: 0.5,
            depth_increment_chance: 0.2,
            breadth_increment_chance: 0.0,
            disjoint_gene_factor: 1.0,
            common_weight_factor: 0.5,
            ..GeneticConfig::zero()
        }
    }

    /// Returns the activation types new hidden nodes may use.
    pub(crate) fn hidden_activations(&self) -> &[ActivationType] {
        if self.activation_types.is_empty() {
            &ActivationType::ALL
        } else {
            &self.activation_types
        }
    }

    /// Returns the activation types new output nodes may use.
    pub(crate) fn output_activations(&self) -> &[ActivationType] {
        if self.output_activation_types.is_empty() {
            self.hidden_activations()
        } else {
            &self.output_activation_types
        }
    }
}
