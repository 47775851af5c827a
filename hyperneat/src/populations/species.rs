use super::PopulationConfig;
use crate::genomics::{GeneticConfig, Genome};
use crate::{GenomeKey, Sequence};

use log::debug;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// Identifies a species within a population.
/// Keys are handed out in order of creation.
pub type SpeciesKey = usize;

/// Species are collections of reproductively
/// compatible (within a certain [genetic distance])
/// genomes. Membership is determined by calculating
/// the genetic distance to a _representative_, which
/// after each speciation becomes the member closest
/// to the previous representative.
///
/// Species stagnate after [`stagnation_threshold`]
/// generations without improving their best fitness,
/// and thereafter receive no offspring.
///
/// [genetic distance]: PopulationConfig::distance_threshold
/// [`stagnation_threshold`]: PopulationConfig::stagnation_threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    key: SpeciesKey,
    created: usize,
    representative: Genome,
    members: Vec<GenomeKey>,
    mean_fitness: Option<f32>,
    max_fitness: Option<f32>,
    best_fitness: Option<f32>,
    stagnation: usize,
}

impl Species {
    /// Creates a new, memberless species with the
    /// specified key and representative.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{GeneticConfig, Genome};
    /// use hyperneat::populations::Species;
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg64;
    ///
    /// let genome = Genome::new(0, &GeneticConfig::zero(), &mut Pcg64::seed_from_u64(1));
    /// let species = Species::new(4, 10, genome);
    ///
    /// assert_eq!(species.key(), 4);
    /// assert_eq!(species.created(), 10);
    /// assert!(species.members().is_empty());
    /// ```
    pub fn new(key: SpeciesKey, generation: usize, representative: Genome) -> Species {
        Species {
            key,
            created: generation,
            representative,
            members: vec![],
            mean_fitness: None,
            max_fitness: None,
            best_fitness: None,
            stagnation: 0,
        }
    }

    /// Returns the species' key.
    pub fn key(&self) -> SpeciesKey {
        self.key
    }

    /// Returns the generation in which the species was created.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Returns the species' representative.
    pub fn representative(&self) -> &Genome {
        &self.representative
    }

    /// Returns the keys of the species' members, in ascending order.
    pub fn members(&self) -> &[GenomeKey] {
        &self.members
    }

    /// Returns the genetic distance between the species'
    /// representative and `genome`.
    pub fn genetic_distance(&self, genome: &Genome, config: &GeneticConfig) -> f32 {
        Genome::genetic_distance(&self.representative, genome, config)
    }

    /// Returns the mean fitness of the species'
    /// members at the last speciation.
    pub fn mean_fitness(&self) -> Option<f32> {
        self.mean_fitness
    }

    /// Returns the maximum fitness of the species'
    /// members at the last speciation.
    pub fn max_fitness(&self) -> Option<f32> {
        self.max_fitness
    }

    /// Returns the best fitness the species ever reached.
    pub fn best_fitness(&self) -> Option<f32> {
        self.best_fitness
    }

    /// Returns the number of generations the species'
    /// best fitness hasn't improved.
    pub fn time_stagnated(&self) -> usize {
        self.stagnation
    }

    /// Returns whether the species has stagnated
    /// under the passed configuration.
    pub fn is_stagnant(&self, config: &PopulationConfig) -> bool {
        self.stagnation >= config.stagnation_threshold.get()
    }

    /// Records the members' mean and maximum fitness, and
    /// updates the stagnation counter. Unevaluated members
    /// are ignored.
    pub(super) fn update_fitness(&mut self, genomes: &BTreeMap<GenomeKey, Genome>) {
        let fitnesses: Vec<f32> = self
            .members
            .iter()
            .filter_map(|key| genomes.get(key).and_then(Genome::fitness))
            .collect();
        if fitnesses.is_empty() {
            return;
        }
        let max = fitnesses.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        self.mean_fitness = Some(fitnesses.iter().sum::<f32>() / fitnesses.len() as f32);
        self.max_fitness = Some(max);
        match self.best_fitness {
            Some(best) if max <= best => self.stagnation += 1,
            _ => {
                self.best_fitness = Some(max);
                self.stagnation = 0;
            }
        }
    }
}

/// The species of a population, ordered by key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesSet {
    species: BTreeMap<SpeciesKey, Species>,
    species_keys: Sequence<SpeciesKey>,
}

impl Default for SpeciesSet {
    fn default() -> SpeciesSet {
        SpeciesSet::new()
    }
}

impl SpeciesSet {
    /// Returns an empty species set.
    pub fn new() -> SpeciesSet {
        SpeciesSet {
            species: BTreeMap::new(),
            species_keys: Sequence::starting_at(0),
        }
    }

    /// Partitions `genomes` into species.
    ///
    /// Genomes are visited in key order, each joining the
    /// first species (in key order) whose representative lies
    /// within the distance threshold, or founding a new one.
    /// Species left without members are dropped, and each
    /// remaining species' representative is replaced by the
    /// member closest to it. Finally, species fitness and
    /// stagnation are updated.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::{GeneticConfig, Genome};
    /// use hyperneat::populations::{PopulationConfig, SpeciesSet};
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg64;
    /// use std::collections::BTreeMap;
    ///
    /// let genetic_config = GeneticConfig::deep_hyperneat();
    /// let mut rng = Pcg64::seed_from_u64(1);
    /// let genomes: BTreeMap<_, _> = (0..10)
    ///     .map(|key| (key, Genome::new(key, &genetic_config, &mut rng)))
    ///     .collect();
    ///
    /// let mut species = SpeciesSet::new();
    /// let population_config = PopulationConfig {
    ///     distance_threshold: f32::INFINITY,
    ///     ..PopulationConfig::zero()
    /// };
    /// species.speciate(&genomes, 0, &population_config, &genetic_config);
    ///
    /// assert_eq!(species.len(), 1);
    /// assert_eq!(species.species_of(7), Some(0));
    /// ```
    pub fn speciate(
        &mut self,
        genomes: &BTreeMap<GenomeKey, Genome>,
        generation: usize,
        population_config: &PopulationConfig,
        genetic_config: &GeneticConfig,
    ) {
        for species in self.species.values_mut() {
            species.members.clear();
        }

        for (key, genome) in genomes {
            let compatible = self.species.values_mut().find(|s| {
                s.genetic_distance(genome, genetic_config) < population_config.distance_threshold
            });
            match compatible {
                Some(species) => species.members.push(*key),
                None => {
                    let species_key = self.species_keys.next_key();
                    let mut species = Species::new(species_key, generation, genome.clone());
                    species.members.push(*key);
                    self.species.insert(species_key, species);
                }
            }
        }

        self.species.retain(|_, s| !s.members.is_empty());

        for species in self.species.values_mut() {
            let mut closest: Option<(f32, &Genome)> = None;
            for genome in species.members.iter().filter_map(|key| genomes.get(key)) {
                let distance = species.genetic_distance(genome, genetic_config);
                if closest.map_or(true, |(best, _)| distance < best) {
                    closest = Some((distance, genome));
                }
            }
            if let Some((_, genome)) = closest {
                species.representative = genome.clone();
            }
            species.update_fitness(genomes);
        }

        debug!(
            "generation {}: {} species, sizes {:?}",
            generation,
            self.species.len(),
            self.species
                .values()
                .map(|s| s.members.len())
                .collect::<Vec<_>>()
        );
    }

    /// Returns an iterator over the species, in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.species.values()
    }

    /// Returns the species with the specified key.
    pub fn get(&self, key: SpeciesKey) -> Option<&Species> {
        self.species.get(&key)
    }

    /// Returns the key of the species containing `genome`.
    pub fn species_of(&self, genome: GenomeKey) -> Option<SpeciesKey> {
        self.species
            .values()
            .find(|s| s.members.binary_search(&genome).is_ok())
            .map(Species::key)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn genomes(count: usize) -> BTreeMap<GenomeKey, Genome> {
        let config = GeneticConfig::deep_hyperneat();
        let mut rng = Pcg64::seed_from_u64(99);
        (0..count)
            .map(|key| {
                let mut genome = Genome::new(key, &config, &mut rng);
                genome.set_fitness(key as f32);
                (key, genome)
            })
            .collect()
    }

    fn threshold(distance_threshold: f32) -> PopulationConfig {
        PopulationConfig {
            distance_threshold,
            stagnation_threshold: std::num::NonZeroUsize::new(2).unwrap(),
            ..PopulationConfig::zero()
        }
    }

    #[test]
    fn single_species() {
        let genomes = genomes(6);
        let mut set = SpeciesSet::new();
        set.speciate(&genomes, 0, &threshold(f32::INFINITY), &GeneticConfig::deep_hyperneat());

        assert_eq!(set.len(), 1);
        let species = set.get(0).unwrap();
        assert_eq!(species.members(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(species.mean_fitness(), Some(2.5));
        assert_eq!(species.max_fitness(), Some(5.0));
        assert_eq!(species.best_fitness(), Some(5.0));
        assert_eq!(species.time_stagnated(), 0);
    }

    #[test]
    fn tiny_threshold_isolates_genomes() {
        let genomes = genomes(4);
        let mut set = SpeciesSet::new();
        set.speciate(&genomes, 0, &threshold(1e-6), &GeneticConfig::deep_hyperneat());

        assert_eq!(set.len(), 4);
        for key in 0..4 {
            assert_eq!(set.species_of(key), Some(key));
            assert_eq!(set.get(key).unwrap().representative().key(), key);
        }
    }

    #[test]
    fn empty_species_are_dropped() {
        let mut genomes = genomes(3);
        let mut set = SpeciesSet::new();
        let config = GeneticConfig::deep_hyperneat();
        set.speciate(&genomes, 0, &threshold(1e-6), &config);
        assert_eq!(set.len(), 3);

        genomes.remove(&1);
        set.speciate(&genomes, 1, &threshold(1e-6), &config);
        assert_eq!(set.iter().map(Species::key).collect::<Vec<_>>(), vec![0, 2]);

        // New species never reuse keys.
        let mut extra = genomes[&0].duplicate(7);
        extra.set_fitness(0.0);
        extra.connection_mut((-1, 0)).unwrap().nudge_weight(1.0);
        genomes.insert(7, extra);
        set.speciate(&genomes, 2, &threshold(1e-6), &config);
        assert_eq!(set.species_of(7), Some(3));
        assert_eq!(set.get(3).unwrap().created(), 2);
    }

    #[test]
    fn stagnation() {
        let mut genomes = genomes(2);
        let mut set = SpeciesSet::new();
        let config = GeneticConfig::deep_hyperneat();
        let population_config = threshold(f32::INFINITY);

        set.speciate(&genomes, 0, &population_config, &config);
        set.speciate(&genomes, 1, &population_config, &config);
        assert_eq!(set.get(0).unwrap().time_stagnated(), 1);
        assert!(!set.get(0).unwrap().is_stagnant(&population_config));

        set.speciate(&genomes, 2, &population_config, &config);
        assert!(set.get(0).unwrap().is_stagnant(&population_config));

        genomes.get_mut(&0).unwrap().set_fitness(10.0);
        set.speciate(&genomes, 3, &population_config, &config);
        let species = set.get(0).unwrap();
        assert_eq!(species.time_stagnated(), 0);
        assert_eq!(species.best_fitness(), Some(10.0));
    }

    #[test]
    fn representative_moves_to_closest_member() {
        let config = GeneticConfig::deep_hyperneat();
        let mut genomes = genomes(1);
        let mut set = SpeciesSet::new();
        let population_config = threshold(f32::INFINITY);
        set.speciate(&genomes, 0, &population_config, &config);

        // Replace the founder with two descendants at different distances.
        let founder = genomes.remove(&0).unwrap();
        let mut near = founder.duplicate(1);
        near.connection_mut((-1, 0)).unwrap().nudge_weight(0.1);
        let mut far = founder.duplicate(2);
        far.connection_mut((-1, 0)).unwrap().nudge_weight(3.0);
        genomes.insert(1, near);
        genomes.insert(2, far);

        set.speciate(&genomes, 1, &population_config, &config);
        assert_eq!(set.get(0).unwrap().representative().key(), 1);
    }
}
