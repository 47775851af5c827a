use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Configuration data for population generation
/// and evolution.
///
/// # Note
/// All quantities expressing fractions
/// should be in the range [0.0, 1.0]. Using
/// values that are not in this bound may result
/// in odd behaviours and/or incorrect programs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Size of the population.
    pub size: NonZeroUsize,
    /// Genetic distance threshold, beyond which
    /// genomes are considered as belonging to
    /// different species.
    pub distance_threshold: f32,
    /// Top n genomes of the population which are
    /// copied as-is to the next generation.
    pub elitism: usize,
    /// Top fraction of each species which can
    /// parent offspring.
    pub survival_threshold: f32,
    /// Number of generations without a fitness increase
    /// before a species is considered _stagnated_ and
    /// stops receiving offspring.
    pub stagnation_threshold: NonZeroUsize,
}

impl PopulationConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, or in the case of
    /// `NonZeroUsize`s, 1.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::populations::PopulationConfig;
    ///
    /// let cfg = PopulationConfig {
    ///     // Specify some values here...
    ///     elitism: 1,
    ///     // Default the rest...
    ///     ..PopulationConfig::zero()
    /// };
    /// ```
    pub const fn zero() -> PopulationConfig {
        PopulationConfig {
            // SAFETY: 1 is a valid NonZeroUsize.
            size: unsafe { NonZeroUsize::new_unchecked(1) },
            distance_threshold: 0.0,
            elitism: 0,
            survival_threshold: 0.0,
            // SAFETY: 1 is a valid NonZeroUsize.
            stagnation_threshold: unsafe { NonZeroUsize::new_unchecked(1) },
        }
    }

    /// Returns the reference Deep HyperNEAT setup:
    /// 150 genomes, 2 elites, distance threshold 3,
    /// top 20% parenting and stagnation after 15
    /// generations.
    pub const fn deep_hyperneat() -> PopulationConfig {
        PopulationConfig {
            // SAFETY: 150 is a valid NonZeroUsize.
            size: unsafe { NonZeroUsize::new_unchecked(150) },
            distance_threshold: 3.0,
            elitism: 2,
            survival_threshold: 0.2,
            // SAFETY: 15 is a valid NonZeroUsize.
            stagnation_threshold: unsafe { NonZeroUsize::new_unchecked(15) },
        }
    }
}
