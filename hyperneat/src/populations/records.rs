use crate::genomics::Genome;
use crate::GenomeKey;

use serde::{Deserialize, Serialize};

use std::cmp::Ordering;
use std::fmt;

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    /// An empty sequence yields all zeroes.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::populations::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f32>) -> Stats {
        let mut data: Vec<f32> = data.collect();
        if data.is_empty() {
            return Stats {
                maximum: 0.0,
                minimum: 0.0,
                mean: 0.0,
                median: 0.0,
            };
        }
        let (mut max, mut min, mut sum) = (f32::MIN, f32::MAX, 0.0);
        for d in &data {
            max = d.max(max);
            min = d.min(min);
            sum += d;
        }
        let mean = sum / data.len() as f32;
        data.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Stats {
            maximum: max,
            minimum: min,
            mean,
            median,
        }
    }
}

/// A summary of one evaluated generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    pub best_key: GenomeKey,
    /// Node counts over the population.
    pub node_counts: Stats,
    /// Enabled connection counts over the population.
    pub connection_counts: Stats,
    /// Node plus enabled connection counts over the population.
    pub complexity: Stats,
}

impl GenerationRecord {
    /// Summarizes a generation of evaluated genomes.
    /// Returns `None` if there are no genomes.
    pub(super) fn new<'a>(
        generation: usize,
        genomes: impl Iterator<Item = &'a Genome> + Clone,
    ) -> Option<GenerationRecord> {
        let champion = genomes.clone().min_by(|a, b| fitness_order(a, b))?;
        let fitnesses: Vec<f32> = genomes.clone().filter_map(Genome::fitness).collect();
        let mean_fitness = fitnesses.iter().sum::<f32>() / fitnesses.len().max(1) as f32;
        let complexities: Vec<(usize, usize)> = genomes.map(Genome::complexity).collect();

        Some(GenerationRecord {
            generation,
            best_fitness: champion.fitness().unwrap_or(f32::NEG_INFINITY),
            mean_fitness,
            best_key: champion.key(),
            node_counts: Stats::from(complexities.iter().map(|(n, _)| *n as f32)),
            connection_counts: Stats::from(complexities.iter().map(|(_, c)| *c as f32)),
            complexity: Stats::from(complexities.iter().map(|(n, c)| (n + c) as f32)),
        })
    }
}

impl fmt::Display for GenerationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {}: best {:.4} (genome {}), mean {:.4}, complexity {:.1} [{}..{}]",
            self.generation,
            self.best_fitness,
            self.best_key,
            self.mean_fitness,
            self.complexity.mean,
            self.complexity.minimum,
            self.complexity.maximum,
        )
    }
}

/// The outcome of a population run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunResults {
    pub(super) records: Vec<GenerationRecord>,
    pub(super) best_genome: Option<Genome>,
    pub(super) solved: bool,
}

impl RunResults {
    /// Returns the record of each generation of the run.
    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    /// Returns the best genome ever evaluated by the population.
    pub fn best_genome(&self) -> Option<&Genome> {
        self.best_genome.as_ref()
    }

    /// Returns whether the goal fitness was reached.
    pub fn solved(&self) -> bool {
        self.solved
    }

    /// Returns the generation in which the best
    /// fitness of the run was first reached.
    pub fn best_generation(&self) -> Option<usize> {
        self.records
            .iter()
            .fold(None, |best: Option<&GenerationRecord>, r| match best {
                Some(b) if b.best_fitness >= r.best_fitness => best,
                _ => Some(r),
            })
            .map(|r| r.generation)
    }

    pub fn best_fitness(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.best_fitness).collect()
    }

    pub fn avg_fitness(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.mean_fitness).collect()
    }

    pub fn min_complexity(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.complexity.minimum).collect()
    }

    pub fn avg_complexity(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.complexity.mean).collect()
    }

    pub fn max_complexity(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.complexity.maximum).collect()
    }
}

/// Orders genomes by decreasing fitness, then by increasing key.
/// Unevaluated genomes come last.
pub(super) fn fitness_order(a: &Genome, b: &Genome) -> Ordering {
    let fa = a.fitness().unwrap_or(f32::NEG_INFINITY);
    let fb = b.fitness().unwrap_or(f32::NEG_INFINITY);
    fb.partial_cmp(&fa)
        .unwrap_or(Ordering::Equal)
        .then(a.key().cmp(&b.key()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::GeneticConfig;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn median_of_even_count() {
        let stats = Stats::from([4.0, 1.0, 3.0, 2.0].iter().copied());
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.mean, 2.5);
    }

    #[test]
    fn empty_stats() {
        assert_eq!(Stats::from(std::iter::empty()).maximum, 0.0);
    }

    #[test]
    fn record_prefers_lowest_key_among_ties() {
        let config = GeneticConfig::zero();
        let mut rng = Pcg64::seed_from_u64(0);
        let genomes: Vec<Genome> = [1.0, 3.0, 3.0, 2.0]
            .iter()
            .enumerate()
            .map(|(key, fitness)| {
                let mut genome = Genome::new(key, &config, &mut rng);
                genome.set_fitness(*fitness);
                genome
            })
            .collect();

        let record = GenerationRecord::new(4, genomes.iter()).unwrap();
        assert_eq!(record.generation, 4);
        assert_eq!(record.best_key, 1);
        assert_eq!(record.best_fitness, 3.0);
        assert_eq!(record.mean_fitness, 2.25);
        assert_eq!(record.node_counts.mean, 1.0);
        assert_eq!(record.connection_counts.maximum, 5.0);
        assert_eq!(record.complexity.median, 6.0);
    }

    #[test]
    fn best_generation_is_first_maximum() {
        let stats = Stats::from(std::iter::once(1.0));
        let record = |generation, best_fitness| GenerationRecord {
            generation,
            best_fitness,
            mean_fitness: 0.0,
            best_key: 0,
            node_counts: stats.clone(),
            connection_counts: stats.clone(),
            complexity: stats.clone(),
        };
        let results = RunResults {
            records: vec![record(0, 0.5), record(1, 0.9), record(2, 0.9)],
            best_genome: None,
            solved: false,
        };
        assert_eq!(results.best_generation(), Some(1));
        assert_eq!(results.best_fitness(), vec![0.5, 0.9, 0.9]);
        assert_eq!(results.max_complexity(), vec![1.0; 3]);
    }
}
