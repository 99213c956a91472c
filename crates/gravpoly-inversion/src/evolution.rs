//! Differential evolution over a bounded box
//!
//! Population of `population_size × dimensions` members (at least 5),
//! Latin-hypercube initialisation, `best1bin` or `rand1bin` mutation with the
//! mutation factor dithered once per generation, binomial crossover and
//! greedy selection.
//!
//! Updating is deferred: every trial of a generation is drawn from the same
//! population snapshot, all trials are evaluated in parallel, and selection
//! then runs in member order. Random numbers are only drawn on the calling
//! thread, so a fixed seed reproduces the same run on any number of threads.

use gravpoly_core::error::{GravpolyError, Result};
use gravpoly_core::models::{MutationStrategy, SearchBounds};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Smallest population that leaves enough distinct donors for `rand1bin`
const MIN_POPULATION: usize = 5;

/// Something to minimise over a flat parameter vector
pub trait CostFunction: Sync {
    fn cost(&self, candidate: &[f64]) -> f64;
}

impl<F> CostFunction for F
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    fn cost(&self, candidate: &[f64]) -> f64 {
        self(candidate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionConfig {
    /// Population size as a multiple of the number of dimensions
    pub population_size: usize,
    pub max_generations: usize,
    /// Relative tolerance: converged when `std(costs) <= tolerance * |mean(costs)|`
    pub tolerance: f64,
    /// Range the mutation factor is drawn from each generation
    pub mutation: (f64, f64),
    /// Crossover probability
    pub recombination: f64,
    pub strategy: MutationStrategy,
    /// `None` seeds from system entropy
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 15,
            max_generations: 1000,
            tolerance: 0.01,
            mutation: (0.5, 1.0),
            recombination: 0.7,
            strategy: MutationStrategy::Best1Bin,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(invalid("population_size", "must be at least 1".to_string()));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(invalid("tolerance", format!("must be non-negative, got {}", self.tolerance)));
        }
        let (lo, hi) = self.mutation;
        if !(0.0..=2.0).contains(&lo) || !(0.0..=2.0).contains(&hi) || lo > hi {
            return Err(invalid("mutation", format!("invalid range ({}, {})", lo, hi)));
        }
        if !(0.0..=1.0).contains(&self.recombination) {
            return Err(invalid(
                "recombination",
                format!("must be within [0, 1], got {}", self.recombination),
            ));
        }
        Ok(())
    }

    /// Number of members for a search space of `dimensions`
    pub fn population_for(&self, dimensions: usize) -> usize {
        (self.population_size * dimensions).max(MIN_POPULATION)
    }
}

fn invalid(key: &str, reason: String) -> GravpolyError {
    GravpolyError::ConfigInvalid { key: key.to_string(), reason }
}

/// Summary of one generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_cost: f64,
    /// Standard deviation of the population's costs
    pub spread: f64,
    pub evaluations: usize,
}

/// Differential-evolution optimiser, stepped one generation at a time
pub struct DifferentialEvolution<'a, C: CostFunction> {
    cost: &'a C,
    bounds: &'a SearchBounds,
    config: EvolutionConfig,
    rng: StdRng,
    population: Vec<Vec<f64>>,
    costs: Vec<f64>,
    best: usize,
    generation: usize,
    evaluations: usize,
}

impl<'a, C: CostFunction> DifferentialEvolution<'a, C> {
    /// Initialise and evaluate the starting population
    pub fn new(cost: &'a C, bounds: &'a SearchBounds, config: EvolutionConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let size = config.population_for(bounds.dimensions());
        let population = latin_hypercube(&mut rng, bounds, size);
        let costs = evaluate(cost, &population);
        let best = argmin(&costs);

        tracing::debug!(
            population = size,
            dimensions = bounds.dimensions(),
            best_cost = costs[best],
            "Initialised population"
        );

        Ok(Self {
            cost,
            bounds,
            config,
            rng,
            population,
            costs,
            best,
            generation: 0,
            evaluations: size,
        })
    }

    pub fn population_size(&self) -> usize {
        self.population.len()
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn best(&self) -> &[f64] {
        &self.population[self.best]
    }

    pub fn best_cost(&self) -> f64 {
        self.costs[self.best]
    }

    /// Population standard deviation of the costs; NaN while any cost is
    /// infinite
    pub fn spread(&self) -> f64 {
        let n = self.costs.len() as f64;
        let mean = self.costs.iter().sum::<f64>() / n;
        let var = self.costs.iter().map(|c| (c - mean) * (c - mean)).sum::<f64>() / n;
        var.sqrt()
    }

    pub fn converged(&self) -> bool {
        let n = self.costs.len() as f64;
        let mean = self.costs.iter().sum::<f64>() / n;
        self.spread() <= self.config.tolerance * mean.abs()
    }

    pub fn stats(&self) -> GenerationStats {
        GenerationStats {
            generation: self.generation,
            best_cost: self.best_cost(),
            spread: self.spread(),
            evaluations: self.evaluations,
        }
    }

    /// Run one generation
    pub fn step(&mut self) -> GenerationStats {
        let (lo, hi) = self.config.mutation;
        let scale = if lo < hi { self.rng.gen_range(lo..hi) } else { lo };

        let trials: Vec<Vec<f64>> =
            (0..self.population.len()).map(|i| self.trial(i, scale)).collect();
        let trial_costs = evaluate(self.cost, &trials);

        for (i, (trial, cost)) in trials.into_iter().zip(trial_costs).enumerate() {
            if cost <= self.costs[i] {
                self.population[i] = trial;
                self.costs[i] = cost;
            }
        }

        self.best = argmin(&self.costs);
        self.generation += 1;
        self.evaluations += self.population.len();

        let stats = self.stats();
        tracing::debug!(
            generation = stats.generation,
            best_cost = stats.best_cost,
            spread = stats.spread,
            "Generation complete"
        );
        stats
    }

    /// Mutant of member `index` crossed with the member itself
    fn trial(&mut self, index: usize, scale: f64) -> Vec<f64> {
        let dims = self.bounds.dimensions();
        let donors = self.donors(index);

        let (base, a, b) = match self.config.strategy {
            MutationStrategy::Best1Bin => (self.best, donors[0], donors[1]),
            MutationStrategy::Rand1Bin => (donors[0], donors[1], donors[2]),
        };

        let forced = self.rng.gen_range(0..dims);
        let mut trial = self.population[index].clone();
        for (d, value) in trial.iter_mut().enumerate() {
            if d == forced || self.rng.gen::<f64>() < self.config.recombination {
                let mutant = self.population[base][d]
                    + scale * (self.population[a][d] - self.population[b][d]);
                *value = self.bounds.clip(d, mutant);
            }
        }
        trial
    }

    /// Three distinct member indices other than `index`
    fn donors(&mut self, index: usize) -> [usize; 3] {
        let picked = rand::seq::index::sample(&mut self.rng, self.population.len() - 1, 3);
        let mut out = [0; 3];
        for (slot, i) in out.iter_mut().zip(picked.iter()) {
            *slot = if i >= index { i + 1 } else { i };
        }
        out
    }
}

/// Stratified sample: each coordinate range is cut into `size` equal
/// segments and every segment is used exactly once
fn latin_hypercube(rng: &mut StdRng, bounds: &SearchBounds, size: usize) -> Vec<Vec<f64>> {
    let mut population = vec![vec![0.0; bounds.dimensions()]; size];
    let segment = 1.0 / size as f64;

    for d in 0..bounds.dimensions() {
        let mut samples: Vec<f64> =
            (0..size).map(|k| (k as f64 + rng.gen::<f64>()) * segment).collect();
        samples.shuffle(rng);

        let (min, max) = (bounds.lower(d), bounds.upper(d));
        for (member, u) in population.iter_mut().zip(samples) {
            member[d] = min + u * (max - min);
        }
    }

    population
}

fn evaluate<C: CostFunction>(cost: &C, members: &[Vec<f64>]) -> Vec<f64> {
    members
        .par_iter()
        .map(|m| {
            let c = cost.cost(m);
            if c.is_finite() {
                c
            } else {
                f64::INFINITY
            }
        })
        .collect()
}

/// Index of the lowest cost; the first one on ties
fn argmin(costs: &[f64]) -> usize {
    let mut best = 0;
    for (i, c) in costs.iter().enumerate() {
        if *c < costs[best] {
            best = i;
        }
    }
    best
}
