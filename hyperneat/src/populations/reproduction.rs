use super::records::fitness_order;
use super::{PopulationConfig, PopulationError, Species, SpeciesSet};
use crate::genomics::{GeneticConfig, Genome};
use crate::{GenomeKey, Sequence};

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use std::collections::BTreeMap;

/// Auxiliary type for offspring generation.
/// Handles all the tasks of generating a population's
/// next generation from the current, speciated one,
/// according to the specified configs.
pub(super) struct OffspringFactory<'a, R> {
    genomes: &'a BTreeMap<GenomeKey, Genome>,
    species: &'a SpeciesSet,
    genetic_config: &'a GeneticConfig,
    population_config: &'a PopulationConfig,
    genome_keys: &'a mut Sequence<GenomeKey>,
    rng: &'a mut R,
}

impl<'a, R: Rng> OffspringFactory<'a, R> {
    pub(super) fn new(
        genomes: &'a BTreeMap<GenomeKey, Genome>,
        species: &'a SpeciesSet,
        genetic_config: &'a GeneticConfig,
        population_config: &'a PopulationConfig,
        genome_keys: &'a mut Sequence<GenomeKey>,
        rng: &'a mut R,
    ) -> OffspringFactory<'a, R> {
        OffspringFactory {
            genomes,
            species,
            genetic_config,
            population_config,
            genome_keys,
            rng,
        }
    }

    /// Generates the next generation: the population's
    /// elite, followed by the mutated offspring allotted
    /// to each eligible species.
    pub(super) fn generate_offspring(
        &mut self,
    ) -> Result<BTreeMap<GenomeKey, Genome>, PopulationError> {
        let size = self.population_config.size.get();
        let mut next_generation = BTreeMap::new();

        for elite in self.elite() {
            let mut elite = elite.clone();
            elite.clear_fitness();
            next_generation.insert(elite.key(), elite);
        }

        let offspring = size.saturating_sub(next_generation.len());
        for (species, allotted) in self.allot_offspring(offspring) {
            self.add_mutated_offspring(species, allotted, &mut next_generation)?;
        }

        Ok(next_generation)
    }

    /// Returns the top [`elitism`] genomes of the
    /// population, by decreasing fitness and then
    /// increasing key.
    ///
    /// [`elitism`]: PopulationConfig::elitism
    fn elite(&self) -> Vec<&'a Genome> {
        let genomes = self.genomes;
        let mut ranked: Vec<&Genome> = genomes.values().collect();
        ranked.sort_by(|a, b| fitness_order(a, b));
        ranked.truncate(
            self.population_config
                .elitism
                .min(self.population_config.size.get()),
        );
        ranked
    }

    /// Allots `offspring` children among the species
    /// that haven't stagnated, proportionally to their
    /// adjusted fitness.
    ///
    /// If every species has stagnated, the one holding the
    /// population's champion is kept.
    fn allot_offspring(&self, offspring: usize) -> Vec<(&'a Species, usize)> {
        let species_set = self.species;
        let mut eligible: Vec<&Species> = species_set
            .iter()
            .filter(|s| !s.is_stagnant(self.population_config))
            .collect();

        if eligible.is_empty() {
            let champion = self
                .genomes
                .values()
                .min_by(|a, b| fitness_order(a, b))
                .and_then(|g| species_set.species_of(g.key()))
                .and_then(|key| species_set.get(key));
            warn!(
                "all species stagnated, keeping the champion's species {:?}",
                champion.map(Species::key)
            );
            eligible.extend(champion);
        }

        if eligible.is_empty() {
            return vec![];
        }

        let shares = self.offspring_shares(&eligible, offspring);
        let allotted = round_retain_sum(&shares, offspring);
        debug!(
            "allotted offspring {:?}",
            eligible
                .iter()
                .map(|s| s.key())
                .zip(allotted.iter().copied())
                .collect::<Vec<_>>()
        );
        eligible.into_iter().zip(allotted).collect()
    }

    /// Returns the fractional number of offspring each species
    /// deserves, based on fitness sharing. Shares are equal
    /// if every species' adjusted fitness is zero.
    fn offspring_shares(&self, eligible: &[&Species], offspring: usize) -> Vec<f32> {
        let fitnesses: Vec<f32> = eligible
            .iter()
            .flat_map(|s| s.members())
            .filter_map(|key| self.genomes.get(key).and_then(Genome::fitness))
            .collect();
        let min = fitnesses.iter().copied().fold(f32::INFINITY, f32::min);
        let max = fitnesses.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let range = (max - min).max(1.0);

        let adjusted: Vec<f32> = eligible
            .iter()
            .map(|s| (s.mean_fitness().unwrap_or(min) - min) / range)
            .collect();
        let total: f32 = adjusted.iter().sum();

        if total > 0.0 {
            adjusted
                .iter()
                .map(|f| f / total * offspring as f32)
                .collect()
        } else {
            vec![offspring as f32 / eligible.len() as f32; eligible.len()]
        }
    }

    /// Duplicates and mutates parents chosen uniformly among
    /// the top [`survival_threshold`] of the species,
    /// adding the children to the next generation.
    ///
    /// [`survival_threshold`]: PopulationConfig::survival_threshold
    fn add_mutated_offspring(
        &mut self,
        species: &Species,
        offspring: usize,
        next_generation: &mut BTreeMap<GenomeKey, Genome>,
    ) -> Result<(), PopulationError> {
        let genomes = self.genomes;
        let mut ranked: Vec<&Genome> = species
            .members()
            .iter()
            .filter_map(|key| genomes.get(key))
            .collect();
        ranked.sort_by(|a, b| fitness_order(a, b));

        let survivors = ((ranked.len() as f32 * self.population_config.survival_threshold).ceil()
            as usize)
            .max(1)
            .min(ranked.len());
        let parents = &ranked[..survivors];

        for _ in 0..offspring {
            let parent = match parents.choose(self.rng) {
                Some(parent) => parent,
                None => break,
            };
            let mut child = parent.duplicate(self.genome_keys.next_key());
            child.mutate(self.genetic_config, self.rng)?;
            next_generation.insert(child.key(), child);
        }
        Ok(())
    }
}

/// Rounds all values to whole numbers summing to `total`,
/// preserving their order. The leftover units go to the
/// values with the largest fractional parts, earlier values
/// winning ties, which minimizes the average error to the
/// original set of values.
fn round_retain_sum(values: &[f32], total: usize) -> Vec<usize> {
    if values.is_empty() {
        return vec![];
    }
    let mut truncated: Vec<(usize, usize, f32)> = values
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let u = f.max(0.0).floor();
            (i, u as usize, f - u)
        })
        .collect();
    let truncated_sum: usize = truncated.iter().map(|(_, u, _)| *u).sum();
    let remainder = total.saturating_sub(truncated_sum);
    // Sort in decreasing order of error
    truncated.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    let len = truncated.len();
    for i in 0..remainder {
        truncated[i % len].1 += 1;
    }
    truncated.sort_by_key(|(i, ..)| *i);
    truncated.iter().map(|(_, u, _)| *u).collect()
}
