use hyperneat::decoding::{decode, DecodeError, SubstrateGeometry};
use hyperneat::genomics::{ActivationType, GeneticConfig, Genome};
use hyperneat::networks::CppnNetwork;
use hyperneat::populations::{Population, PopulationConfig, Stats};
use hyperneat::GenomeKey;

use log::{info, warn};
use rayon::prelude::*;
use ron::ser::PrettyConfig;

use std::error::Error;

const ERROR_MARGIN: f32 = 0.3;
const GOAL_FITNESS: f32 = 16.0;
const MAX_GENERATIONS: usize = 300;

/// XOR cases; the third input is a constant bias.
const CASES: [([f32; 3], f32); 4] = [
    ([0.0, 0.0, 1.0], 0.0),
    ([0.0, 1.0, 1.0], 1.0),
    ([1.0, 0.0, 1.0], 1.0),
    ([1.0, 1.0, 1.0], 0.0),
];

fn evaluate_xor(genome: &Genome, geometry: &SubstrateGeometry) -> Result<f32, DecodeError> {
    let mut cppn = CppnNetwork::from_genome(genome)?;
    let mut substrate = decode(&mut cppn, geometry)?;

    let mut errors = [0.0; 4];
    for (i, (input, output)) in CASES.iter().enumerate() {
        errors[i] = (substrate.activate(input)?[0] - output).abs();
        if errors[i] < ERROR_MARGIN {
            errors[i] = 0.0;
        }
    }

    Ok((4.0 - errors.iter().copied().sum::<f32>()).powf(2.0))
}

fn fitness(geometry: &SubstrateGeometry) -> impl FnMut(&mut [(GenomeKey, &mut Genome)]) + '_ {
    move |genomes: &mut [(GenomeKey, &mut Genome)]| {
        genomes.par_iter_mut().for_each(|(key, genome)| {
            let fitness = evaluate_xor(genome, geometry).unwrap_or_else(|e| {
                warn!("genome {} failed to decode: {}", key, e);
                0.0
            });
            genome.set_fitness(fitness);
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let genetic_config = GeneticConfig {
        activation_types: vec![
            ActivationType::Sigmoid,
            ActivationType::Sinusoidal,
            ActivationType::DhnGaussian,
            ActivationType::Identity,
        ],
        output_activation_types: vec![ActivationType::Identity],
        ..GeneticConfig::deep_hyperneat()
    };
    let population_config = PopulationConfig::deep_hyperneat();
    let geometry = SubstrateGeometry {
        input_dims: vec![1, 3],
        hidden_sheet_dims: vec![vec![1, 3]],
        output_dims: vec![1],
        hidden_activation: ActivationType::Sigmoid,
        output_activation: ActivationType::Sigmoid,
    };

    solve(&genetic_config, &population_config, &geometry)?;
    stress_test(&genetic_config, &population_config, &geometry)?;
    serde_test(&genetic_config, &population_config, &geometry)?;
    Ok(())
}

/// Evolves a single population, printing its champion.
fn solve(
    genetic_config: &GeneticConfig,
    population_config: &PopulationConfig,
    geometry: &SubstrateGeometry,
) -> Result<(), Box<dyn Error>> {
    let mut population = Population::new(population_config.clone(), genetic_config.clone());
    let results = population.run(fitness(geometry), GOAL_FITNESS, MAX_GENERATIONS, true)?;

    info!(
        "{} after {} generations",
        if results.solved() { "solved" } else { "gave up" },
        results.records().len()
    );
    if let Some(champion) = results.best_genome() {
        println!("{}", champion);
        println!(
            "{}",
            ron::ser::to_string_pretty(champion, PrettyConfig::new())?
        );
        let mut substrate = decode(&mut CppnNetwork::from_genome(champion)?, geometry)?;
        for (input, output) in CASES.iter() {
            println!("{:?} -> {:.3} (expected {})", input, substrate.activate(input)?[0], output);
        }
    }
    Ok(())
}

/// Runs many independent populations, reporting
/// the number of generations successful runs took.
fn stress_test(
    genetic_config: &GeneticConfig,
    population_config: &PopulationConfig,
    geometry: &SubstrateGeometry,
) -> Result<(), Box<dyn Error>> {
    const ITERATIONS: usize = 20;

    let generations = (0..ITERATIONS)
        .into_par_iter()
        .map(|key| {
            let mut population = Population::new(population_config.clone(), genetic_config.clone())
                .with_key(key);
            population
                .run(fitness(geometry), GOAL_FITNESS, MAX_GENERATIONS, false)
                .map(|results| {
                    if results.solved() {
                        Some(population.generation())
                    } else {
                        None
                    }
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    println!(
        "Successful run generation count {:?}, {}% failure rate over {} iterations",
        Stats::from(generations.iter().filter_map(|g| g.map(|g| g as f32))),
        generations.iter().filter(|g| g.is_none()).count() as f32 * 100.0 / ITERATIONS as f32,
        ITERATIONS
    );
    Ok(())
}

/// Checks that a population survives a round trip
/// through RON mid-run and keeps evolving.
fn serde_test(
    genetic_config: &GeneticConfig,
    population_config: &PopulationConfig,
    geometry: &SubstrateGeometry,
) -> Result<(), Box<dyn Error>> {
    let mut population = Population::with_seed(population_config.clone(), genetic_config.clone(), 0);
    population.run(fitness(geometry), GOAL_FITNESS, 10, false)?;

    let saved = ron::to_string(&population)?;
    let mut population: Population = ron::from_str(&saved)?;
    let results = population.run(fitness(geometry), GOAL_FITNESS, MAX_GENERATIONS, false)?;
    println!(
        "Restored population finished at generation {} (solved: {})",
        population.generation(),
        results.solved()
    );
    Ok(())
}
