//! A Population is a collection of genomes.
//! These are grouped into species, which can
//! be evolved using a fitness function as the
//! source of selective pressure.
//!
//! Each generation the population hands every genome to the
//! fitness function, records the generation's statistics,
//! and, unless the goal fitness was reached or the generation
//! budget spent, speciates the genomes and replaces them with
//! the next generation: the population's elite, carried over
//! unchanged, and mutated copies of each species' best members.
mod config;
mod errors;
mod records;
mod reproduction;
mod species;

pub use config::PopulationConfig;
pub use errors::PopulationError;
pub use records::{GenerationRecord, RunResults, Stats};
pub use species::{Species, SpeciesKey, SpeciesSet};

use crate::genomics::{GeneticConfig, Genome};
use crate::{GenomeKey, Sequence};
use records::fitness_order;
use reproduction::OffspringFactory;

use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// A population of genomes.
///
/// All randomness used while evolving the population
/// is drawn from its own generator, so populations
/// created with the same seed evolve identically
/// under deterministic fitness functions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Population {
    key: usize,
    population_config: PopulationConfig,
    genetic_config: GeneticConfig,
    generation: usize,
    genomes: BTreeMap<GenomeKey, Genome>,
    /// Whether the current generation has been evaluated
    /// and recorded, and is awaiting reproduction.
    evaluated: bool,
    species: SpeciesSet,
    genome_keys: Sequence<GenomeKey>,
    rng: Pcg64,
    best_genome: Option<Genome>,
    records: Vec<GenerationRecord>,
}

impl Population {
    /// Creates a new population of minimal genomes
    /// using the passed configurations, seeding its
    /// generator from system entropy.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::GeneticConfig;
    /// use hyperneat::populations::{Population, PopulationConfig};
    ///
    /// let population = Population::new(
    ///     PopulationConfig::deep_hyperneat(),
    ///     GeneticConfig::deep_hyperneat(),
    /// );
    ///
    /// assert_eq!(population.genomes().count(), 150);
    /// assert_eq!(population.generation(), 0);
    /// ```
    pub fn new(population_config: PopulationConfig, genetic_config: GeneticConfig) -> Population {
        Population::from_rng(population_config, genetic_config, Pcg64::from_entropy())
    }

    /// Creates a new population of minimal genomes
    /// using the passed configurations and random seed.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::GeneticConfig;
    /// use hyperneat::populations::{Population, PopulationConfig};
    ///
    /// let population_config = PopulationConfig {
    ///     size: std::num::NonZeroUsize::new(10).unwrap(),
    ///     ..PopulationConfig::deep_hyperneat()
    /// };
    /// let a = Population::with_seed(population_config.clone(), GeneticConfig::deep_hyperneat(), 1);
    /// let b = Population::with_seed(population_config, GeneticConfig::deep_hyperneat(), 1);
    ///
    /// assert!(a.genomes().eq(b.genomes()));
    /// ```
    pub fn with_seed(
        population_config: PopulationConfig,
        genetic_config: GeneticConfig,
        seed: u64,
    ) -> Population {
        Population::from_rng(population_config, genetic_config, Pcg64::seed_from_u64(seed))
    }

    fn from_rng(
        population_config: PopulationConfig,
        genetic_config: GeneticConfig,
        mut rng: Pcg64,
    ) -> Population {
        let size = population_config.size.get();
        let genomes = (0..size)
            .map(|key| (key, Genome::new(key, &genetic_config, &mut rng)))
            .collect();
        debug!("created population of {} genomes", size);
        Population {
            key: 0,
            population_config,
            genetic_config,
            generation: 0,
            genomes,
            evaluated: false,
            species: SpeciesSet::new(),
            genome_keys: Sequence::starting_at(size),
            rng,
            best_genome: None,
            records: vec![],
        }
    }

    /// Sets the population's key, used to
    /// tell apart concurrently run populations.
    pub fn with_key(mut self, key: usize) -> Population {
        self.key = key;
        self
    }

    /// Evolves the population until a genome reaches
    /// `goal_fitness` or `max_generations` generations
    /// have been evaluated.
    ///
    /// `fitness` receives every `(key, genome)` pair of the
    /// generation and must assign each genome a finite fitness.
    /// If `verbose` is set, a summary of each generation is
    /// logged at the `info` level.
    ///
    /// A later call picks up where this one stopped: the last
    /// evaluated generation is reproduced, not evaluated again.
    ///
    /// # Errors
    ///
    /// Returns an error if a genome is left without a finite
    /// fitness, or if a genome invariant is violated during
    /// reproduction.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::GeneticConfig;
    /// use hyperneat::populations::{Population, PopulationConfig};
    ///
    /// let mut population = Population::with_seed(
    ///     PopulationConfig {
    ///         size: std::num::NonZeroUsize::new(20).unwrap(),
    ///         ..PopulationConfig::deep_hyperneat()
    ///     },
    ///     GeneticConfig::deep_hyperneat(),
    ///     3,
    /// );
    ///
    /// // Reward genomes for growing.
    /// let results = population
    ///     .run(
    ///         |genomes| {
    ///             for (_, genome) in genomes.iter_mut() {
    ///                 let (nodes, connections) = genome.complexity();
    ///                 genome.set_fitness((nodes + connections) as f32);
    ///             }
    ///         },
    ///         f32::INFINITY,
    ///         4,
    ///         false,
    ///     )
    ///     .unwrap();
    ///
    /// assert!(!results.solved());
    /// assert_eq!(results.records().len(), 4);
    /// assert_eq!(population.generation(), 3);
    /// ```
    pub fn run<F>(
        &mut self,
        fitness: F,
        goal_fitness: f32,
        max_generations: usize,
        verbose: bool,
    ) -> Result<RunResults, PopulationError>
    where
        F: FnMut(&mut [(GenomeKey, &mut Genome)]),
    {
        self.run_observed(fitness, goal_fitness, max_generations, |_, population| {
            if verbose {
                if let Some(record) = population.records.last() {
                    info!("population {}: {}", population.key, record);
                }
            }
        })
    }

    /// Like [`run`](Population::run), but calls `observer`
    /// with the generation number and the population after
    /// each generation has been evaluated and recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if a genome is left without a finite
    /// fitness, or if a genome invariant is violated during
    /// reproduction.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::GeneticConfig;
    /// use hyperneat::populations::{Population, PopulationConfig};
    ///
    /// let mut population = Population::with_seed(
    ///     PopulationConfig {
    ///         size: std::num::NonZeroUsize::new(10).unwrap(),
    ///         ..PopulationConfig::deep_hyperneat()
    ///     },
    ///     GeneticConfig::deep_hyperneat(),
    ///     3,
    /// );
    ///
    /// let mut species_counts = vec![];
    /// population
    ///     .run_observed(
    ///         |genomes| genomes.iter_mut().for_each(|(_, g)| g.set_fitness(1.0)),
    ///         f32::INFINITY,
    ///         3,
    ///         |generation, population| {
    ///             species_counts.push((generation, population.species().len()))
    ///         },
    ///     )
    ///     .unwrap();
    ///
    /// // Species are formed after the first evaluation.
    /// assert_eq!(species_counts[0], (0, 0));
    /// assert_eq!(species_counts.len(), 3);
    /// ```
    pub fn run_observed<F, O>(
        &mut self,
        mut fitness: F,
        goal_fitness: f32,
        max_generations: usize,
        mut observer: O,
    ) -> Result<RunResults, PopulationError>
    where
        F: FnMut(&mut [(GenomeKey, &mut Genome)]),
        O: FnMut(usize, &Population),
    {
        let first_record = self.records.len();
        let mut solved = false;

        for _ in 0..max_generations {
            if self.evaluated {
                self.advance()?;
            }
            self.evaluate(&mut fitness)?;

            let best_fitness = self.record_generation();
            observer(self.generation, self);

            if best_fitness >= goal_fitness {
                solved = true;
                debug!(
                    "goal fitness {} reached in generation {}",
                    goal_fitness, self.generation
                );
                break;
            }
        }

        Ok(RunResults {
            records: self.records[first_record..].to_vec(),
            best_genome: self.best_genome.clone(),
            solved,
        })
    }

    /// Speciates the evaluated generation and
    /// replaces it with its offspring.
    fn advance(&mut self) -> Result<(), PopulationError> {
        self.species.speciate(
            &self.genomes,
            self.generation,
            &self.population_config,
            &self.genetic_config,
        );
        let next_generation = OffspringFactory::new(
            &self.genomes,
            &self.species,
            &self.genetic_config,
            &self.population_config,
            &mut self.genome_keys,
            &mut self.rng,
        )
        .generate_offspring()?;
        self.genomes = next_generation;
        self.evaluated = false;
        self.generation += 1;
        Ok(())
    }

    /// Clears every fitness, hands the genomes to the fitness
    /// function, then checks that each was assigned a finite one.
    fn evaluate<F>(&mut self, fitness: &mut F) -> Result<(), PopulationError>
    where
        F: FnMut(&mut [(GenomeKey, &mut Genome)]),
    {
        for genome in self.genomes.values_mut() {
            genome.clear_fitness();
        }

        let mut pairs: Vec<(GenomeKey, &mut Genome)> = self
            .genomes
            .iter_mut()
            .map(|(key, genome)| (*key, genome))
            .collect();
        fitness(pairs.as_mut_slice());

        for (key, genome) in &self.genomes {
            match genome.fitness() {
                None => return Err(PopulationError::MissingFitness(*key)),
                Some(f) if !f.is_finite() => return Err(PopulationError::InvalidFitness(*key, f)),
                Some(_) => {}
            }
        }
        self.evaluated = true;
        Ok(())
    }

    /// Records the evaluated generation and updates the
    /// best genome, returning the generation's best fitness.
    fn record_generation(&mut self) -> f32 {
        let record = match GenerationRecord::new(self.generation, self.genomes.values()) {
            Some(record) => record,
            None => return f32::NEG_INFINITY,
        };
        let best_fitness = record.best_fitness;

        let improved = self
            .best_genome
            .as_ref()
            .and_then(Genome::fitness)
            .map_or(true, |best| best_fitness > best);
        if improved {
            self.best_genome = self.genomes.get(&record.best_key).cloned();
        }

        self.records.push(record);
        best_fitness
    }

    /// Replaces every genome with a new minimal one and
    /// forgets all species and records. The population's
    /// generator is not reseeded.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::GeneticConfig;
    /// use hyperneat::populations::{Population, PopulationConfig};
    ///
    /// let mut population = Population::with_seed(
    ///     PopulationConfig::deep_hyperneat(),
    ///     GeneticConfig::deep_hyperneat(),
    ///     3,
    /// );
    /// population
    ///     .run(|g| g.iter_mut().for_each(|(_, g)| g.set_fitness(0.0)), 1.0, 2, false)
    ///     .unwrap();
    ///
    /// population.reset();
    /// assert_eq!(population.generation(), 0);
    /// assert!(population.records().is_empty());
    /// assert!(population.best_genome().is_none());
    /// ```
    pub fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = Population::from_rng(
            self.population_config.clone(),
            self.genetic_config.clone(),
            rng,
        )
        .with_key(self.key);
    }

    /// Returns the best genome of the current generation,
    /// or `None` if it hasn't been evaluated.
    pub fn champion(&self) -> Option<&Genome> {
        self.genomes
            .values()
            .filter(|g| g.fitness().is_some())
            .min_by(|a, b| fitness_order(a, b))
    }

    /// Returns the best genome ever evaluated by the population.
    pub fn best_genome(&self) -> Option<&Genome> {
        self.best_genome.as_ref()
    }

    /// Returns an iterator over the current genomes, in key order.
    pub fn genomes(&self) -> impl Iterator<Item = &Genome> {
        self.genomes.values()
    }

    /// Returns the current genome with the specified key.
    pub fn genome(&self, key: GenomeKey) -> Option<&Genome> {
        self.genomes.get(&key)
    }

    /// Returns the species formed during the last speciation.
    pub fn species(&self) -> &SpeciesSet {
        &self.species
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the record of every generation evaluated
    /// since the population was created or last reset.
    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    pub fn population_config(&self) -> &PopulationConfig {
        &self.population_config
    }

    pub fn genetic_config(&self) -> &GeneticConfig {
        &self.genetic_config
    }

    pub fn key(&self) -> usize {
        self.key
    }
}
