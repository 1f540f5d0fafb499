use crate::config::Config;
use crate::error::{AsResult, AssignError};
use crate::optimizer::chromosome::Chromosome;
use crate::optimizer::crossover::crossover_two_point;
use crate::optimizer::evaluation::{Evaluator, Individual};
use crate::optimizer::mutation::{default_rate, mutate_uniform, random_chromosome};
use crate::optimizer::repair::repair_grades;
use crate::optimizer::selection::{binary_tournament, survive};
use crate::problem::Problem;
use fastrand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationOptions {
    pub pop_size: usize,
    pub generations: usize,
    pub threads: usize,
    pub seed: u64,
    pub crossover_rate: f64,
    pub mutation_rate: Option<f64>,
    pub duplicate_retries: usize,
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for OptimizationOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            pop_size: cfg.search.pop_size,
            generations: cfg.search.generations,
            threads: cfg.search.threads,
            seed: cfg.search.seed,
            crossover_rate: cfg.search.crossover_rate,
            mutation_rate: cfg.search.mutation_rate,
            duplicate_retries: cfg.search.duplicate_retries,
        }
    }
}

/// Snapshot handed to the progress callback after every generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub feasible: usize,
    pub front_size: usize,
    /// Per-objective minimum over the first front.
    pub best: Vec<f64>,
    pub min_violation: f64,
    pub evaluations: usize,
}

/// Receives per-generation statistics. It observes only; a run always
/// completes its configured generation count.
pub trait ProgressCallback: Send + Sync {
    fn on_generation(&self, stats: &GenerationStats);
}

impl<F> ProgressCallback for F
where
    F: Fn(&GenerationStats) + Send + Sync,
{
    fn on_generation(&self, stats: &GenerationStats) {
        self(stats)
    }
}

pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_generation(&self, _stats: &GenerationStats) {}
}

#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub population: Vec<Individual>,
    /// Members of the final population with rank 0.
    pub front: Vec<Individual>,
    pub evaluations: usize,
    pub failed_evaluations: usize,
    pub generations: usize,
}

impl OptimizationResult {
    pub fn feasible_count(&self) -> usize {
        self.population.iter().filter(|i| i.is_feasible()).count()
    }
}

pub struct Optimizer {
    problem: Arc<Problem>,
    evaluator: Evaluator,
    options: OptimizationOptions,
}

impl Optimizer {
    pub fn new(problem: Arc<Problem>, options: OptimizationOptions) -> AsResult<Self> {
        if options.pop_size < 2 {
            return Err(AssignError::Config(format!(
                "pop_size must be at least 2 (got {})",
                options.pop_size
            )));
        }
        let evaluator = Evaluator::new(problem.clone(), options.threads)?;
        Ok(Self {
            problem,
            evaluator,
            options,
        })
    }

    pub fn options(&self) -> &OptimizationOptions {
        &self.options
    }

    pub fn run<CB: ProgressCallback>(&self, callback: &CB) -> AsResult<OptimizationResult> {
        let opts = &self.options;
        let layout = *self.problem.layout();
        let mutation_rate = opts.mutation_rate.unwrap_or_else(|| default_rate(&layout));
        let mut rng = Rng::with_seed(opts.seed);
        let start = Instant::now();

        info!(
            "🧬 Evolving {} individuals for {} generations ({} genes, {} threads, seed {})",
            opts.pop_size,
            opts.generations,
            layout.len(),
            self.evaluator.threads(),
            opts.seed
        );

        // 1. Initial population
        let mut seen: HashSet<Chromosome> = HashSet::with_capacity(opts.pop_size * 2);
        let mut initial = Vec::with_capacity(opts.pop_size);
        for _ in 0..opts.pop_size {
            let mut candidate = random_chromosome(&layout, &mut rng);
            let mut retries = 0;
            while seen.contains(&candidate) && retries < opts.duplicate_retries {
                candidate = random_chromosome(&layout, &mut rng);
                retries += 1;
            }
            seen.insert(candidate.clone());
            initial.push(candidate);
        }

        let (evaluated, mut failed) = self.evaluator.evaluate_batch(initial);
        let mut evaluations = evaluated.len();
        let mut population = survive(evaluated, opts.pop_size);

        // 2. Generational loop
        for generation in 1..=opts.generations {
            let mut seen: HashSet<Chromosome> =
                population.iter().map(|i| i.chromosome.clone()).collect();
            let mut offspring: Vec<Chromosome> = Vec::with_capacity(opts.pop_size);

            while offspring.len() < opts.pop_size {
                let p1 = &population[binary_tournament(&population, &mut rng)].chromosome;
                let p2 = &population[binary_tournament(&population, &mut rng)].chromosome;

                let (c1, c2) = if rng.f64() < opts.crossover_rate {
                    crossover_two_point(p1, p2, &layout, &mut rng)
                } else {
                    (p1.clone(), p2.clone())
                };

                for mut child in [c1, c2] {
                    if offspring.len() >= opts.pop_size {
                        break;
                    }
                    mutate_uniform(&mut child, &layout, mutation_rate, &mut rng);
                    repair_grades(&self.problem, &mut child, &mut rng);

                    let mut retries = 0;
                    while seen.contains(&child) && retries < opts.duplicate_retries {
                        mutate_uniform(&mut child, &layout, mutation_rate.max(default_rate(&layout)), &mut rng);
                        repair_grades(&self.problem, &mut child, &mut rng);
                        retries += 1;
                    }

                    seen.insert(child.clone());
                    offspring.push(child);
                }
            }

            let (children, batch_failed) = self.evaluator.evaluate_batch(offspring);
            evaluations += children.len();
            failed += batch_failed;

            let mut pool = population;
            pool.extend(children);
            population = survive(pool, opts.pop_size);

            let stats = self.stats(generation, &population, evaluations);
            debug!(
                "   Gen {:>4}: front {:>3}, feasible {:>3}/{}, best {:?}",
                generation,
                stats.front_size,
                stats.feasible,
                population.len(),
                stats.best
            );
            callback.on_generation(&stats);
        }

        let front: Vec<Individual> = population.iter().filter(|i| i.rank == 0).cloned().collect();
        let result = OptimizationResult {
            population,
            front,
            evaluations,
            failed_evaluations: failed,
            generations: opts.generations,
        };

        if failed > 0 {
            warn!("⚠️  {} evaluations failed and were penalised", failed);
        }
        info!(
            "✅ Done in {:.2?}: {} evaluations, front of {}, {}/{} feasible",
            start.elapsed(),
            result.evaluations,
            result.front.len(),
            result.feasible_count(),
            result.population.len()
        );

        Ok(result)
    }

    fn stats(&self, generation: usize, population: &[Individual], evaluations: usize) -> GenerationStats {
        let m = self.problem.profile().objective_count();
        let mut best = vec![f64::INFINITY; m];
        let mut front_size = 0;
        for ind in population.iter().filter(|i| i.rank == 0) {
            front_size += 1;
            for (b, v) in best.iter_mut().zip(&ind.objectives) {
                *b = b.min(*v);
            }
        }

        GenerationStats {
            generation,
            feasible: population.iter().filter(|i| i.is_feasible()).count(),
            front_size,
            best,
            min_violation: population
                .iter()
                .map(|i| i.total_violation())
                .fold(f64::INFINITY, f64::min),
            evaluations,
        }
    }
}
