//! Genomes are the focus of evolution in HyperNEAT.
//! They describe a CPPN: a collection of nodes and connections
//! that can be instantiated as a [`CppnNetwork`], which is in turn
//! queried to produce a substrate network. Genomes are progressively
//! mutated, thus adding complexity and functionality.
//!
//! Every CPPN has five inputs, `x1, y1, x2, y2, bias`, keyed
//! `-1` through `-5`, and one output per substrate layer pair.
//!
//! [`CppnNetwork`]: crate::networks::CppnNetwork

mod activations;
mod config;
mod errors;
mod genes;
mod nodes;

pub use activations::ActivationType;
pub use config::GeneticConfig;
pub use errors::GenomeError;
pub use genes::ConnectionGene;
pub use nodes::{CppnTuple, LayerSheet, NodeGene, NodeType, INPUT_LAYER, OUTPUT_LAYER};

use crate::{ConnectionKey, GenomeKey, NodeKey, Sequence};

use log::{debug, trace};
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Number of CPPN inputs: `x1, y1, x2, y2` and a bias.
pub const CPPN_INPUT_COUNT: usize = 5;

/// A mutable collection of node and connection genes
/// describing a single CPPN.
///
/// Suports Serde for convenient genome saving and loading.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Genome {
    key: GenomeKey,
    nodes: BTreeMap<NodeKey, NodeGene>,
    connections: BTreeMap<ConnectionKey, ConnectionGene>,
    num_inputs: usize,
    num_outputs: usize,
    num_layers: usize,
    input_keys: Vec<NodeKey>,
    output_keys: Vec<NodeKey>,
    node_keys: Option<Sequence<NodeKey>>,
    fitness: Option<f32>,
}

impl Genome {
    /// Creates a new minimal genome: a single output node
    /// governing the substrate's input-to-output layer pair,
    /// with every input connected to it.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{GeneticConfig, Genome};
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg64;
    ///
    /// let config = GeneticConfig {
    ///     weight_bound: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let genome = Genome::new(0, &config, &mut Pcg64::seed_from_u64(7));
    ///
    /// assert_eq!(genome.input_keys(), &[-1, -2, -3, -4, -5]);
    /// assert_eq!(genome.output_keys(), &[0]);
    /// assert_eq!(genome.connections().count(), 5);
    /// assert!(genome.connections().all(|c| c.weight().abs() <= 1.0));
    /// assert_eq!(genome.fitness(), None);
    /// ```
    pub fn new<R: Rng>(key: GenomeKey, config: &GeneticConfig, rng: &mut R) -> Genome {
        let input_keys: Vec<NodeKey> = (1..=CPPN_INPUT_COUNT as NodeKey).map(|i| -i).collect();
        let output_keys = vec![0];

        let mut nodes = BTreeMap::new();
        for &output in &output_keys {
            let activation = random_activation(config.output_activations(), rng);
            let bias = if config.output_bias {
                Some(random_bias(config, rng))
            } else {
                None
            };
            nodes.insert(
                output,
                NodeGene::output(output, activation, bias, (INPUT_LAYER, OUTPUT_LAYER)),
            );
        }

        let mut connections = BTreeMap::new();
        for &input in &input_keys {
            for &output in &output_keys {
                let key = (input, output);
                connections.insert(key, ConnectionGene::new(key, random_weight(config, rng)));
            }
        }

        Genome {
            key,
            nodes,
            connections,
            num_inputs: input_keys.len(),
            num_outputs: output_keys.len(),
            num_layers: 2,
            input_keys,
            output_keys,
            node_keys: None,
            fitness: None,
        }
    }

    /// Returns a copy of the genome with a new identity.
    ///
    /// Every node and connection gene is copied by value,
    /// along with the node-key sequence. The copy has no fitness.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{GeneticConfig, Genome};
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg64;
    ///
    /// let mut rng = Pcg64::seed_from_u64(7);
    /// let mut parent = Genome::new(0, &GeneticConfig::zero(), &mut rng);
    /// parent.set_fitness(1.0);
    ///
    /// let child = parent.duplicate(1);
    /// assert_eq!(child.key(), 1);
    /// assert_eq!(child.fitness(), None);
    /// assert!(child.connections().eq(parent.connections()));
    /// ```
    pub fn duplicate(&self, key: GenomeKey) -> Genome {
        Genome {
            key,
            nodes: self
                .nodes
                .values()
                .map(|node| (node.key(), node.clone()))
                .collect(),
            connections: self
                .connections
                .values()
                .map(|gene| (gene.key(), gene.clone()))
                .collect(),
            num_inputs: self.num_inputs,
            num_outputs: self.num_outputs,
            num_layers: self.num_layers,
            input_keys: self.input_keys.clone(),
            output_keys: self.output_keys.clone(),
            node_keys: self.node_keys,
            fitness: None,
        }
    }

    /// Add a new hidden node to the genome.
    /// Returns a reference to the newly created node.
    ///
    /// # Errors
    ///
    /// Returns an error if a node or input with the same
    /// key already exists.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{ActivationType, GeneticConfig, Genome, NodeType};
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg64;
    ///
    /// let mut genome = Genome::new(0, &GeneticConfig::zero(), &mut Pcg64::seed_from_u64(7));
    /// let node = genome.add_node(42, ActivationType::Gaussian, 0.5).unwrap();
    /// assert_eq!(node.node_type(), NodeType::Hidden);
    ///
    /// assert!(genome.add_node(42, ActivationType::Gaussian, 0.5).is_err());
    /// assert!(genome.add_node(-1, ActivationType::Gaussian, 0.5).is_err());
    /// ```
    pub fn add_node(
        &mut self,
        key: NodeKey,
        activation_type: ActivationType,
        bias: f32,
    ) -> Result<&mut NodeGene, GenomeError> {
        if self.nodes.contains_key(&key) || self.input_keys.contains(&key) {
            return Err(GenomeError::DuplicateNodeKey(key));
        }
        Ok(self
            .nodes
            .entry(key)
            .or_insert_with(|| NodeGene::hidden(key, activation_type, bias)))
    }

    /// Add a new connection to the genome.
    /// Returns a reference to the new connection.
    ///
    /// No acyclicity check is made; cyclic genomes are
    /// rejected when building their networks.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection already exists,
    /// either endpoint is missing, the target is an input,
    /// or both endpoints are outputs.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{ActivationType, GeneticConfig, Genome};
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg64;
    ///
    /// let mut genome = Genome::new(0, &GeneticConfig::zero(), &mut Pcg64::seed_from_u64(7));
    /// genome.add_node(1, ActivationType::Sigmoid, 0.0).unwrap();
    ///
    /// let gene = genome.add_connection((-1, 1), 2.5).unwrap();
    /// assert_eq!(gene.weight(), 2.5);
    ///
    /// // Duplicates, missing endpoints and inputs as targets are rejected.
    /// assert!(genome.add_connection((-1, 1), 1.0).is_err());
    /// assert!(genome.add_connection((-1, 9), 1.0).is_err());
    /// assert!(genome.add_connection((1, -2), 1.0).is_err());
    /// ```
    pub fn add_connection(
        &mut self,
        key: ConnectionKey,
        weight: f32,
    ) -> Result<&mut ConnectionGene, GenomeError> {
        let (source, target) = key;
        if self.connections.contains_key(&key) {
            Err(GenomeError::DuplicateConnection(key))
        } else if self.input_keys.contains(&target) {
            Err(GenomeError::InputTarget(key))
        } else if !(self.has_endpoint(source) && self.nodes.contains_key(&target)) {
            Err(GenomeError::MissingEndpoint(key))
        } else if self.is_output(source) && self.is_output(target) {
            Err(GenomeError::OutputToOutput(key))
        } else {
            Ok(self
                .connections
                .entry(key)
                .or_insert_with(|| ConnectionGene::new(key, weight)))
        }
    }

    /// Removes a connection from the genome, returning it
    /// if it was present.
    pub fn remove_connection(&mut self, key: ConnectionKey) -> Option<ConnectionGene> {
        self.connections.remove(&key)
    }

    fn has_endpoint(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key) || self.input_keys.contains(&key)
    }

    fn is_output(&self, key: NodeKey) -> bool {
        self.output_keys.contains(&key)
    }

    /// Returns the next key of the genome's node-key sequence.
    ///
    /// The sequence starts one past the highest output key
    /// the first time it is needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is already in use,
    /// which means the sequence has been tampered with.
    pub fn get_new_node_key(&mut self) -> Result<NodeKey, GenomeError> {
        let start = self.output_keys.iter().copied().max().unwrap_or(-1) + 1;
        let key = self
            .node_keys
            .get_or_insert_with(|| Sequence::starting_at(start))
            .next_key();
        if self.nodes.contains_key(&key) {
            Err(GenomeError::DuplicateNodeKey(key))
        } else {
            Ok(key)
        }
    }

    /// Applies a full mutation pass to the genome.
    ///
    /// Each structural mutation is independently
    /// gated by its configured chance, so none or several
    /// may take place. Weights and biases are then nudged
    /// gene by gene.
    ///
    /// # Errors
    ///
    /// Returns an error if a node key collision occurs.
    /// Mutations that cannot take place are skipped silently.
    pub fn mutate<R: Rng>(&mut self, config: &GeneticConfig, rng: &mut R) -> Result<(), GenomeError> {
        if rng.gen::<f32>() < config.node_addition_mutation_chance {
            self.mutate_add_node(config, rng)?;
        }
        if rng.gen::<f32>() < config.node_deletion_mutation_chance {
            self.mutate_delete_node(rng);
        }
        if rng.gen::<f32>() < config.connection_addition_mutation_chance {
            self.mutate_add_connection(config, rng);
        }
        if rng.gen::<f32>() < config.connection_deletion_mutation_chance {
            self.mutate_delete_connection(rng);
        }
        if rng.gen::<f32>() < config.depth_increment_chance {
            self.mutate_increment_depth(config)?;
        }
        if rng.gen::<f32>() < config.breadth_increment_chance {
            self.mutate_increment_breadth();
        }
        self.mutate_weights(config, rng);
        self.mutate_biases(config, rng);
        Ok(())
    }

    /// Nudges each connection's weight with probability
    /// `weight_mutation_rate`, by a uniform amount in
    /// `±weight_mutation_power`.
    pub fn mutate_weights<R: Rng>(&mut self, config: &GeneticConfig, rng: &mut R) {
        let power = config.weight_mutation_power;
        for gene in self.connections.values_mut() {
            if rng.gen::<f32>() < config.weight_mutation_rate {
                gene.nudge_weight(rng.gen_range(-power..=power));
            }
        }
    }

    /// Nudges each biased node's bias with probability
    /// `bias_mutation_rate`, by a uniform amount in
    /// `±bias_mutation_power`.
    pub fn mutate_biases<R: Rng>(&mut self, config: &GeneticConfig, rng: &mut R) {
        let power = config.bias_mutation_power;
        for node in self.nodes.values_mut().filter(|n| n.has_bias()) {
            if rng.gen::<f32>() < config.bias_mutation_rate {
                node.nudge_bias(rng.gen_range(-power..=power));
            }
        }
    }

    /// Induces a _node mutation_ in the genome: a random
    /// connection is split by a new hidden node. The incoming
    /// half has weight 1, the outgoing half keeps the old weight.
    ///
    /// Returns the new node's key, or `None` if the genome
    /// has no connections to split.
    ///
    /// # Errors
    ///
    /// Returns an error if a node key collision occurs.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{GeneticConfig, Genome};
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg64;
    ///
    /// let config = GeneticConfig::zero();
    /// let mut rng = Pcg64::seed_from_u64(7);
    /// let mut genome = Genome::new(0, &config, &mut rng);
    ///
    /// let new_node = genome.mutate_add_node(&config, &mut rng).unwrap().unwrap();
    /// assert_eq!(genome.nodes().count(), 2);
    /// assert_eq!(genome.connections().count(), 5 + 1);
    /// assert!(genome.connections().any(|c| c.target() == new_node && c.weight() == 1.0));
    /// ```
    pub fn mutate_add_node<R: Rng>(
        &mut self,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<Option<NodeKey>, GenomeError> {
        let split = match self.connections.keys().copied().choose(rng) {
            Some(split) => split,
            None => {
                debug!("skipping node addition in genome {}: no connections", self.key);
                return Ok(None);
            }
        };
        let new_key = self.get_new_node_key()?;
        let old = match self.connections.remove(&split) {
            Some(gene) => gene,
            None => return Ok(None),
        };
        let (source, target) = split;

        let activation = random_activation(config.hidden_activations(), rng);
        let bias = random_bias(config, rng);
        self.nodes
            .insert(new_key, NodeGene::hidden(new_key, activation, bias));
        self.insert_connection((source, new_key), 1.0);
        // A disabled split stays unexpressed downstream.
        let mut outgoing = ConnectionGene::new((new_key, target), old.weight());
        outgoing.set_enabled(old.enabled());
        self.connections.insert(outgoing.key(), outgoing);
        trace!(
            "genome {}: split {:?} with node {}",
            self.key,
            split,
            new_key
        );

        Ok(Some(new_key))
    }

    /// Deletes a randomly-chosen non-output node from
    /// the genome, along with every connection touching it.
    ///
    /// Returns `None` if there are no deletable nodes, or
    /// `Some((node, connections))` otherwise.
    pub fn mutate_delete_node<R: Rng>(
        &mut self,
        rng: &mut R,
    ) -> Option<(NodeGene, Vec<ConnectionGene>)> {
        let key = self
            .nodes
            .keys()
            .copied()
            .filter(|k| !self.output_keys.contains(k))
            .choose(rng);
        let key = match key {
            Some(key) => key,
            None => {
                debug!("skipping node deletion in genome {}: no hidden nodes", self.key);
                return None;
            }
        };

        let node = self.nodes.remove(&key)?;
        let touching: Vec<ConnectionKey> = self
            .connections
            .keys()
            .copied()
            .filter(|(source, target)| *source == key || *target == key)
            .collect();
        let connections = touching
            .into_iter()
            .filter_map(|k| self.connections.remove(&k))
            .collect();

        Some((node, connections))
    }

    /// Induces a _connection mutation_ in the genome.
    ///
    /// The target is chosen among all nodes, the source among
    /// all nodes and inputs. If the connection already exists
    /// it is re-enabled instead. Connections between two outputs,
    /// and connections that would close a cycle, are not created.
    ///
    /// Returns the key of the added or re-enabled connection.
    pub fn mutate_add_connection<R: Rng>(
        &mut self,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Option<ConnectionKey> {
        let target = self.nodes.keys().copied().choose(rng)?;
        let source = self
            .nodes
            .keys()
            .copied()
            .chain(self.input_keys.iter().copied())
            .choose(rng)?;
        let key = (source, target);

        if let Some(existing) = self.connections.get(&key) {
            if !existing.enabled() && self.creates_cycle(key) {
                debug!("skipping re-enabling of {:?} in genome {}: cycle", key, self.key);
                return None;
            }
            if let Some(existing) = self.connections.get_mut(&key) {
                existing.set_enabled(true);
            }
            return Some(key);
        }

        if self.is_output(source) && self.is_output(target) {
            debug!("skipping connection {:?} in genome {}: output to output", key, self.key);
            return None;
        }
        if self.creates_cycle(key) {
            debug!("skipping connection {:?} in genome {}: cycle", key, self.key);
            return None;
        }

        let weight = random_weight(config, rng);
        self.insert_connection(key, weight);
        Some(key)
    }

    /// Returns whether enabling a connection `source -> target`
    /// would close a cycle over the genome's enabled connections.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{ActivationType, GeneticConfig, Genome};
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg64;
    ///
    /// let mut genome = Genome::new(0, &GeneticConfig::zero(), &mut Pcg64::seed_from_u64(7));
    /// genome.add_node(1, ActivationType::Sigmoid, 0.0).unwrap();
    /// genome.add_connection((1, 0), 1.0).unwrap();
    ///
    /// assert!(genome.creates_cycle((0, 1)));
    /// assert!(genome.creates_cycle((1, 1)));
    /// assert!(!genome.creates_cycle((-1, 1)));
    /// ```
    pub fn creates_cycle(&self, (source, target): ConnectionKey) -> bool {
        if source == target {
            return true;
        }
        let mut visited = HashSet::new();
        let mut pending = vec![target];
        while let Some(node) = pending.pop() {
            if !visited.insert(node) {
                continue;
            }
            for gene in self
                .connections
                .values()
                .filter(|g| g.enabled() && g.source() == node)
            {
                if gene.target() == source {
                    return true;
                }
                pending.push(gene.target());
            }
        }
        false
    }

    /// Deletes a randomly-chosen connection from the genome.
    ///
    /// Returns `None` if the genome has no connections,
    /// or `Some(connection)` otherwise.
    pub fn mutate_delete_connection<R: Rng>(&mut self, rng: &mut R) -> Option<ConnectionGene> {
        let key = self.connections.keys().copied().choose(rng);
        match key {
            Some(key) => self.connections.remove(&key),
            None => {
                debug!("skipping connection deletion in genome {}: no connections", self.key);
                None
            }
        }
    }

    /// Adds a CPPN output for a new substrate layer, spliced
    /// in front of the substrate's output layer.
    ///
    /// The output whose layer pair targeted the substrate
    /// output layer is retargeted to the new layer, and the
    /// new output governs the new layer's connections to the
    /// substrate output layer. It is fed by a gaussian
    /// combination of the `x` and `y` coordinate differences,
    /// so it starts out favouring aligned coordinates.
    ///
    /// Returns the new output's key.
    ///
    /// # Errors
    ///
    /// Returns an error if a node key collision occurs.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{GeneticConfig, Genome};
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg64;
    ///
    /// let config = GeneticConfig::zero();
    /// let mut genome = Genome::new(0, &config, &mut Pcg64::seed_from_u64(7));
    ///
    /// let output = genome.mutate_increment_depth(&config).unwrap();
    /// assert_eq!(genome.output_keys(), &[0, output]);
    /// assert_eq!(genome.num_layers(), 3);
    /// assert_eq!(genome.cppn_tuples(), vec![((1, 0), (2, 0)), ((2, 0), (0, 0))]);
    /// ```
    pub fn mutate_increment_depth(&mut self, config: &GeneticConfig) -> Result<NodeKey, GenomeError> {
        let new_layer = (self.num_layers, 0);

        let x_difference = self.get_new_node_key()?;
        self.nodes.insert(
            x_difference,
            NodeGene::hidden(x_difference, ActivationType::DhnGaussian, 0.0),
        );
        let y_difference = self.get_new_node_key()?;
        self.nodes.insert(
            y_difference,
            NodeGene::hidden(y_difference, ActivationType::DhnGaussian, 0.0),
        );
        let combination = self.get_new_node_key()?;
        self.nodes.insert(
            combination,
            NodeGene::hidden(combination, ActivationType::DhnGaussianPair, 0.0),
        );
        let output = self.get_new_node_key()?;

        for key in &self.output_keys {
            if let Some(node) = self.nodes.get_mut(key) {
                if let Some((source, OUTPUT_LAYER)) = node.cppn_tuple() {
                    node.set_cppn_tuple((source, new_layer));
                }
            }
        }
        let bias = if config.output_bias { Some(0.0) } else { None };
        self.nodes.insert(
            output,
            NodeGene::output(output, ActivationType::Identity, bias, (new_layer, OUTPUT_LAYER)),
        );
        self.num_outputs += 1;
        self.num_layers += 1;
        self.output_keys.push(output);

        let (x1, y1, x2, y2) = (
            self.input_keys[0],
            self.input_keys[1],
            self.input_keys[2],
            self.input_keys[3],
        );
        self.insert_connection((x1, x_difference), -1.0);
        self.insert_connection((x2, x_difference), 1.0);
        self.insert_connection((y1, y_difference), -1.0);
        self.insert_connection((y2, y_difference), 1.0);
        self.insert_connection((x_difference, combination), 1.0);
        self.insert_connection((y_difference, combination), 1.0);
        self.insert_connection((combination, output), 1.0);

        debug!(
            "genome {}: added output {} for layer {:?}",
            self.key, output, new_layer
        );
        Ok(output)
    }

    /// Reserved for widening a substrate layer into
    /// several sheets. Currently leaves the genome unchanged.
    pub fn mutate_increment_breadth(&mut self) {
        trace!("genome {}: breadth increment has no effect", self.key);
    }

    fn insert_connection(&mut self, key: ConnectionKey, weight: f32) {
        self.connections.insert(key, ConnectionGene::new(key, weight));
    }

    /// Returns the genetic distance between two genomes.
    ///
    /// Genes (nodes and connections) present in only one of
    /// the genomes count towards the disjoint term, normalized
    /// by the larger genome's gene count. Shared genes contribute
    /// their average absolute weight or bias difference.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{GeneticConfig, Genome};
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg64;
    ///
    /// let config = GeneticConfig::deep_hyperneat();
    /// let mut rng = Pcg64::seed_from_u64(7);
    /// let a = Genome::new(0, &config, &mut rng);
    /// let b = Genome::new(1, &config, &mut rng);
    ///
    /// assert_eq!(Genome::genetic_distance(&a, &a.duplicate(2), &config), 0.0);
    /// assert_eq!(
    ///     Genome::genetic_distance(&a, &b, &config),
    ///     Genome::genetic_distance(&b, &a, &config),
    /// );
    /// ```
    pub fn genetic_distance(first: &Genome, second: &Genome, config: &GeneticConfig) -> f32 {
        let disjoint = first
            .nodes
            .keys()
            .filter(|k| !second.nodes.contains_key(k))
            .count()
            + second
                .nodes
                .keys()
                .filter(|k| !first.nodes.contains_key(k))
                .count()
            + first
                .connections
                .keys()
                .filter(|k| !second.connections.contains_key(k))
                .count()
            + second
                .connections
                .keys()
                .filter(|k| !first.connections.contains_key(k))
                .count();

        let common_differences: Vec<f32> = first
            .nodes
            .iter()
            .filter_map(|(key, node)| {
                second.nodes.get(key).map(|other| {
                    (node.bias().unwrap_or(0.0) - other.bias().unwrap_or(0.0)).abs()
                })
            })
            .chain(first.connections.iter().filter_map(|(key, gene)| {
                second
                    .connections
                    .get(key)
                    .map(|other| (gene.weight() - other.weight()).abs())
            }))
            .collect();
        let common_difference = if common_differences.is_empty() {
            0.0
        } else {
            common_differences.iter().sum::<f32>() / common_differences.len() as f32
        };

        let gene_count = first.gene_count().max(second.gene_count()).max(1) as f32;

        config.disjoint_gene_factor * disjoint as f32 / gene_count
            + config.common_weight_factor * common_difference
    }

    /// Returns the genome's key.
    pub fn key(&self) -> GenomeKey {
        self.key
    }

    /// Returns an iterator over the genome's nodes, in key order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeGene> {
        self.nodes.values()
    }

    /// Returns an iterator over the genome's connections, in key order.
    pub fn connections(&self) -> impl Iterator<Item = &ConnectionGene> {
        self.connections.values()
    }

    /// Returns the node with the specified key.
    pub fn node(&self, key: NodeKey) -> Option<&NodeGene> {
        self.nodes.get(&key)
    }

    /// Returns the type of the node with the specified key.
    /// Input keys, which have no node gene, report
    /// [`NodeType::Input`].
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{GeneticConfig, Genome, NodeType};
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg64;
    ///
    /// let genome = Genome::new(0, &GeneticConfig::zero(), &mut Pcg64::seed_from_u64(0));
    /// assert_eq!(genome.node_type(-3), Some(NodeType::Input));
    /// assert_eq!(genome.node_type(0), Some(NodeType::Output));
    /// assert_eq!(genome.node_type(1), None);
    /// ```
    pub fn node_type(&self, key: NodeKey) -> Option<NodeType> {
        if self.input_keys.contains(&key) {
            Some(NodeType::Input)
        } else {
            self.nodes.get(&key).map(NodeGene::node_type)
        }
    }

    /// Returns the node with the specified key.
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut NodeGene> {
        self.nodes.get_mut(&key)
    }

    /// Returns the connection with the specified key.
    pub fn connection(&self, key: ConnectionKey) -> Option<&ConnectionGene> {
        self.connections.get(&key)
    }

    /// Returns the connection with the specified key.
    pub fn connection_mut(&mut self, key: ConnectionKey) -> Option<&mut ConnectionGene> {
        self.connections.get_mut(&key)
    }

    /// Returns the input keys, in `x1, y1, x2, y2, bias` order.
    pub fn input_keys(&self) -> &[NodeKey] {
        &self.input_keys
    }

    /// Returns the output keys, in creation order.
    pub fn output_keys(&self) -> &[NodeKey] {
        &self.output_keys
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// Returns the number of substrate layers the
    /// genome encodes, counting input and output layers.
    pub fn num_layers(&self) -> usize {
        self.num_layers
    }

    /// Returns the layer pair governed by each output,
    /// in output key order.
    pub fn cppn_tuples(&self) -> Vec<CppnTuple> {
        self.output_keys
            .iter()
            .filter_map(|k| self.nodes.get(k).and_then(NodeGene::cppn_tuple))
            .collect()
    }

    /// Returns the genome's size as `(nodes, enabled connections)`.
    pub fn complexity(&self) -> (usize, usize) {
        (
            self.nodes.len(),
            self.connections.values().filter(|c| c.enabled()).count(),
        )
    }

    fn gene_count(&self) -> usize {
        self.nodes.len() + self.connections.len()
    }

    /// Sets the genome's fitness value.
    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = Some(fitness);
    }

    /// Returns the genome's fitness value,
    /// or `None` if it hasn't been evaluated.
    pub fn fitness(&self) -> Option<f32> {
        self.fitness
    }

    /// Forgets the genome's fitness value.
    pub fn clear_fitness(&mut self) {
        self.fitness = None;
    }
}

fn random_weight<R: Rng>(config: &GeneticConfig, rng: &mut R) -> f32 {
    rng.gen_range(-config.weight_bound..=config.weight_bound)
}

fn random_bias<R: Rng>(config: &GeneticConfig, rng: &mut R) -> f32 {
    rng.gen_range(-config.bias_bound..=config.bias_bound)
}

fn random_activation<R: Rng>(choices: &[ActivationType], rng: &mut R) -> ActivationType {
    choices
        .choose(rng)
        .copied()
        .unwrap_or(ActivationType::Sigmoid)
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let connections: Vec<String> = self.connections.values().map(|c| c.to_string()).collect();
        let nodes: Vec<String> = self.nodes.values().map(|n| n.to_string()).collect();
        f.debug_struct("Genome")
            .field("Key", &self.key)
            .field("Connections", &connections)
            .field("Nodes", &nodes)
            .field("Fitness", &self.fitness)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn rng() -> Pcg64 {
        Pcg64::seed_from_u64(0xC0FFEE)
    }

    fn busy_config() -> GeneticConfig {
        GeneticConfig {
            node_addition_mutation_chance: 0.5,
            node_deletion_mutation_chance: 0.3,
            connection_addition_mutation_chance: 0.8,
            connection_deletion_mutation_chance: 0.3,
            depth_increment_chance: 0.1,
            breadth_increment_chance: 0.1,
            ..GeneticConfig::deep_hyperneat()
        }
    }

    /// A genome whose only connection is `(-1, 0)` with weight 0.5.
    fn single_connection_genome() -> Genome {
        let mut genome = Genome::new(0, &GeneticConfig::zero(), &mut rng());
        for input in [-2, -3, -4, -5] {
            genome.remove_connection((input, 0));
        }
        genome.connection_mut((-1, 0)).unwrap().set_weight(0.5);
        genome
    }

    #[test]
    fn new_minimal() {
        let config = GeneticConfig::deep_hyperneat();
        let genome = Genome::new(3, &config, &mut rng());

        assert_eq!(genome.key(), 3);
        assert_eq!(genome.num_inputs(), CPPN_INPUT_COUNT);
        assert_eq!(genome.num_outputs(), 1);
        assert_eq!(genome.num_layers(), 2);
        assert_eq!(genome.nodes().count(), 1);
        let output = genome.node(0).unwrap();
        assert_eq!(output.node_type(), NodeType::Output);
        assert_eq!(output.cppn_tuple(), Some((INPUT_LAYER, OUTPUT_LAYER)));
        assert!(output.bias().unwrap().abs() <= config.bias_bound);
        for input in genome.input_keys() {
            let gene = genome.connection((*input, 0)).unwrap();
            assert!(gene.enabled());
            assert!(gene.weight().abs() <= config.weight_bound);
        }
    }

    #[test]
    fn node_types_by_key() {
        let mut genome = Genome::new(0, &GeneticConfig::zero(), &mut rng());
        genome.add_node(1, ActivationType::Sigmoid, 0.0).unwrap();

        for input in [-1, -2, -3, -4, -5] {
            assert_eq!(genome.node_type(input), Some(NodeType::Input));
        }
        assert_eq!(genome.node_type(0), Some(NodeType::Output));
        assert_eq!(genome.node_type(1), Some(NodeType::Hidden));
        assert_eq!(genome.node_type(-6), None);
    }

    #[test]
    fn output_bias_is_optional() {
        let genome = Genome::new(0, &GeneticConfig::zero(), &mut rng());
        assert!(!genome.node(0).unwrap().has_bias());
    }

    #[test]
    fn key_invariants_hold_under_mutation() {
        let config = busy_config();
        let mut rng = rng();
        let mut genome = Genome::new(0, &config, &mut rng);
        let mut previous_outputs = genome.output_keys().to_vec();

        for _ in 0..300 {
            genome.mutate(&config, &mut rng).unwrap();

            assert_eq!(genome.input_keys(), &[-1, -2, -3, -4, -5]);
            assert!(genome.output_keys().iter().all(|k| *k >= 0));
            assert_eq!(genome.output_keys().len(), genome.num_outputs());
            assert!(genome.output_keys().starts_with(&previous_outputs));
            previous_outputs = genome.output_keys().to_vec();

            for gene in genome.connections() {
                assert!(genome.has_endpoint(gene.source()));
                assert!(genome.node(gene.target()).is_some());
                assert!(!(genome.is_output(gene.source()) && genome.is_output(gene.target())));
            }
            for output in genome.output_keys() {
                assert_eq!(genome.node(*output).unwrap().node_type(), NodeType::Output);
            }
        }
    }

    #[test]
    fn mutations_keep_genome_acyclic() {
        let config = busy_config();
        let mut rng = rng();
        let mut genome = Genome::new(0, &config, &mut rng);
        for _ in 0..300 {
            genome.mutate(&config, &mut rng).unwrap();
            for gene in genome.connections().filter(|g| g.enabled()) {
                let mut without = genome.clone();
                without.remove_connection(gene.key());
                assert!(!without.creates_cycle(gene.key()), "cycle through {}", gene);
            }
        }
    }

    #[test]
    fn add_node_splits_single_connection() {
        let mut genome = single_connection_genome();
        let new_node = genome
            .mutate_add_node(&GeneticConfig::zero(), &mut rng())
            .unwrap()
            .unwrap();

        assert!(genome.connection((-1, 0)).is_none());
        assert_eq!(genome.connections().count(), 2);
        assert_eq!(genome.connection((-1, new_node)).unwrap().weight(), 1.0);
        assert_eq!(genome.connection((new_node, 0)).unwrap().weight(), 0.5);
        assert_eq!(genome.nodes().count(), 2);
        assert_eq!(genome.node(new_node).unwrap().node_type(), NodeType::Hidden);
    }

    #[test]
    fn add_node_without_connections() {
        let mut genome = single_connection_genome();
        genome.remove_connection((-1, 0));
        let before = genome.clone();
        assert_eq!(
            genome.mutate_add_node(&GeneticConfig::zero(), &mut rng()),
            Ok(None)
        );
        assert_eq!(genome, before);
    }

    #[test]
    fn node_key_collision_is_fatal() {
        let mut genome = single_connection_genome();
        // The sequence would hand out key 1 next.
        genome.add_node(1, ActivationType::Sigmoid, 0.0).unwrap();
        assert_eq!(
            genome.mutate_add_node(&GeneticConfig::zero(), &mut rng()),
            Err(GenomeError::DuplicateNodeKey(1))
        );
    }

    #[test]
    fn new_node_keys_follow_outputs() {
        let mut genome = single_connection_genome();
        assert_eq!(genome.get_new_node_key(), Ok(1));
        assert_eq!(genome.get_new_node_key(), Ok(2));
        let mut copy = genome.duplicate(1);
        assert_eq!(copy.get_new_node_key(), Ok(3));
        assert_eq!(genome.get_new_node_key(), Ok(3));
    }

    #[test]
    fn delete_node() {
        let mut rng = rng();
        let mut genome = single_connection_genome();
        assert!(genome.mutate_delete_node(&mut rng).is_none());

        let hidden = genome
            .mutate_add_node(&GeneticConfig::zero(), &mut rng)
            .unwrap()
            .unwrap();
        let (node, connections) = genome.mutate_delete_node(&mut rng).unwrap();
        assert_eq!(node.key(), hidden);
        assert_eq!(connections.len(), 2);
        assert_eq!(genome.connections().count(), 0);
        assert_eq!(genome.nodes().count(), 1);
    }

    #[test]
    fn add_connection_reenables_instead_of_duplicating() {
        let config = GeneticConfig::zero();
        let mut rng = rng();
        let mut genome = single_connection_genome();
        genome.connection_mut((-1, 0)).unwrap().set_enabled(false);

        for _ in 0..200 {
            genome.mutate_add_connection(&config, &mut rng);
            // Only input -> output connections are possible.
            assert!(genome.connections().count() <= CPPN_INPUT_COUNT);
        }
        assert!(genome.connection((-1, 0)).unwrap().enabled());
        assert_eq!(genome.connection((-1, 0)).unwrap().weight(), 0.5);
        assert!(genome.connection((0, 0)).is_none());
    }

    #[test]
    fn add_connection_never_joins_outputs() {
        let config = GeneticConfig::zero();
        let mut rng = rng();
        let mut genome = Genome::new(0, &config, &mut rng);
        genome.mutate_increment_depth(&config).unwrap();
        genome.mutate_increment_depth(&config).unwrap();

        for _ in 0..500 {
            genome.mutate_add_connection(&config, &mut rng);
        }
        for gene in genome.connections() {
            assert!(!(genome.is_output(gene.source()) && genome.is_output(gene.target())));
        }
    }

    #[test]
    fn add_connection_rejects_outputs_pair_manually() {
        let config = GeneticConfig::zero();
        let mut genome = Genome::new(0, &config, &mut rng());
        let output = genome.mutate_increment_depth(&config).unwrap();
        assert_eq!(
            genome.add_connection((0, output), 1.0).unwrap_err(),
            GenomeError::OutputToOutput((0, output))
        );
    }

    #[test]
    fn delete_connection() {
        let mut rng = rng();
        let mut genome = single_connection_genome();
        assert_eq!(genome.mutate_delete_connection(&mut rng).unwrap().key(), (-1, 0));
        assert!(genome.mutate_delete_connection(&mut rng).is_none());
    }

    #[test]
    fn increment_depth_twice() {
        let config = GeneticConfig::zero();
        let mut genome = Genome::new(0, &config, &mut rng());

        assert_eq!(genome.mutate_increment_depth(&config), Ok(4));
        assert_eq!(genome.node(1).unwrap().activation_type(), ActivationType::DhnGaussian);
        assert_eq!(genome.node(2).unwrap().activation_type(), ActivationType::DhnGaussian);
        assert_eq!(
            genome.node(3).unwrap().activation_type(),
            ActivationType::DhnGaussianPair
        );
        assert_eq!(genome.node(4).unwrap().activation_type(), ActivationType::Identity);
        assert_eq!(genome.node(4).unwrap().bias(), None);
        let expected = [
            ((-1, 1), -1.0),
            ((-3, 1), 1.0),
            ((-2, 2), -1.0),
            ((-4, 2), 1.0),
            ((1, 3), 1.0),
            ((2, 3), 1.0),
            ((3, 4), 1.0),
        ];
        for (key, weight) in expected {
            assert_eq!(genome.connection(key).unwrap().weight(), weight);
        }

        assert_eq!(genome.mutate_increment_depth(&config), Ok(8));
        assert_eq!(genome.output_keys(), &[0, 4, 8]);
        assert_eq!(genome.num_outputs(), 3);
        assert_eq!(genome.num_layers(), 4);
        assert_eq!(
            genome.cppn_tuples(),
            vec![((1, 0), (2, 0)), ((2, 0), (3, 0)), ((3, 0), (0, 0))]
        );
    }

    #[test]
    fn increment_breadth_is_inert() {
        let mut genome = Genome::new(0, &GeneticConfig::zero(), &mut rng());
        let before = genome.clone();
        genome.mutate_increment_breadth();
        assert_eq!(genome, before);
    }

    #[test]
    fn gene_mutations_stay_in_range() {
        let config = GeneticConfig {
            weight_mutation_rate: 1.0,
            weight_mutation_power: 5.0,
            bias_mutation_rate: 1.0,
            bias_mutation_power: 0.5,
            output_bias: true,
            ..GeneticConfig::zero()
        };
        let mut rng = rng();
        let mut genome = Genome::new(0, &config, &mut rng);
        genome.mutate(&config, &mut rng).unwrap();

        assert!(genome.connections().all(|c| c.weight().abs() <= 5.0));
        assert!(genome.node(0).unwrap().bias().unwrap().abs() <= 0.5);
    }

    #[test]
    fn duplicate_shares_no_state() {
        let config = GeneticConfig {
            weight_mutation_rate: 1.0,
            weight_mutation_power: 5.0,
            ..GeneticConfig::zero()
        };
        let mut rng = rng();
        let original = Genome::new(0, &config, &mut rng);
        let mut copy = original.duplicate(1);
        copy.mutate_weights(&config, &mut rng);
        copy.mutate_add_node(&config, &mut rng).unwrap();

        assert!(original.connections().all(|c| c.weight() == 0.0));
        assert_eq!(original.nodes().count(), 1);
        assert_eq!(original.connections().count(), 5);
    }

    #[test]
    fn genetic_distance_value() {
        let config = GeneticConfig {
            disjoint_gene_factor: 1.0,
            common_weight_factor: 1.0,
            ..GeneticConfig::zero()
        };
        let first = Genome::new(0, &config, &mut rng());
        let mut second = first.duplicate(1);
        second.add_node(1, ActivationType::Identity, 0.0).unwrap();
        second.connection_mut((-1, 0)).unwrap().set_weight(1.0);

        let expected = 1.0 / 7.0 + 1.0 / 6.0;
        assert_eq!(Genome::genetic_distance(&first, &second, &config), expected);
        assert_eq!(Genome::genetic_distance(&second, &first, &config), expected);
    }

    #[test]
    fn genetic_distance_symmetric_after_mutation() {
        let config = busy_config();
        let mut rng = rng();
        let mut first = Genome::new(0, &config, &mut rng);
        let mut second = Genome::new(1, &config, &mut rng);
        for _ in 0..20 {
            first.mutate(&config, &mut rng).unwrap();
            second.mutate(&config, &mut rng).unwrap();
            assert_eq!(
                Genome::genetic_distance(&first, &second, &config),
                Genome::genetic_distance(&second, &first, &config)
            );
            assert_eq!(Genome::genetic_distance(&first, &first.clone(), &config), 0.0);
        }
    }
}
