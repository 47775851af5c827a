use crate::{ConnectionKey, NodeKey};

use serde::{Deserialize, Serialize};

use std::fmt;

/// Connection genes join two nodes (or an input and a node),
/// and become network connections in the genome's phenotype.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ConnectionGene {
    key: ConnectionKey,
    weight: f32,
    enabled: bool,
}

impl ConnectionGene {
    /// Returns a new _enabled_ connection with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::ConnectionGene;
    ///
    /// let gene = ConnectionGene::new((-1, 0), 2.0);
    /// assert_eq!(gene.source(), -1);
    /// assert_eq!(gene.target(), 0);
    /// assert!(gene.enabled());
    /// ```
    pub fn new(key: ConnectionKey, weight: f32) -> ConnectionGene {
        ConnectionGene {
            key,
            weight,
            enabled: true,
        }
    }

    /// Returns the gene's `(source, target)` key.
    pub fn key(&self) -> ConnectionKey {
        self.key
    }

    /// Returns the gene's source node key.
    pub fn source(&self) -> NodeKey {
        self.key.0
    }

    /// Returns the gene's target node key.
    pub fn target(&self) -> NodeKey {
        self.key.1
    }

    /// Returns the gene's weight.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Sets the gene's weight.
    pub fn set_weight(&mut self, w: f32) {
        self.weight = w;
    }

    /// Adds `delta` to the gene's weight.
    pub fn nudge_weight(&mut self, delta: f32) {
        self.weight += delta;
    }

    /// Returns whether the gene is expressed in the phenotype.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the gene's expression status.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::ConnectionGene;
    ///
    /// let mut gene = ConnectionGene::new((-1, 0), 2.0);
    /// gene.set_enabled(false);
    /// assert!(!gene.enabled());
    /// ```
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl fmt::Display for ConnectionGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{:?}->{:?}, {:.3}]{}",
            if self.enabled { "" } else { "(" },
            self.key.0,
            self.key.1,
            self.weight,
            if self.enabled { "" } else { ")" },
        )
    }
}
