use crate::error::{AsResult, AssignError};
use crate::optimizer::chromosome::{decode, Chromosome, CodecError};
use crate::optimizer::constraints::{evaluate_constraints, total_violation};
use crate::optimizer::objectives::evaluate_objectives;
use crate::problem::{Problem, Profile};
use rayon::prelude::*;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Value written into every entry of a failed evaluation.
pub const SENTINEL: f64 = 1e10;

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub objectives: Vec<f64>,
    pub violations: Vec<f64>,
}

impl Evaluation {
    pub fn sentinel(profile: Profile) -> Self {
        Self {
            objectives: vec![SENTINEL; profile.objective_count()],
            violations: vec![SENTINEL; profile.constraint_count()],
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationFailure {
    #[error(transparent)]
    Decode(#[from] CodecError),

    #[error("non-finite {what} at entry {index}")]
    NonFinite { what: &'static str, index: usize },
}

/// Pure function of (problem, chromosome).
pub fn evaluate(problem: &Problem, chromosome: &Chromosome) -> Result<Evaluation, EvaluationFailure> {
    let decoded = decode(problem.layout(), chromosome)?;
    let objectives = evaluate_objectives(problem, &decoded);
    let violations = evaluate_constraints(problem, &decoded);

    if let Some(index) = objectives.iter().position(|v| !v.is_finite()) {
        return Err(EvaluationFailure::NonFinite {
            what: "objective",
            index,
        });
    }
    if let Some(index) = violations.iter().position(|v| !v.is_finite()) {
        return Err(EvaluationFailure::NonFinite {
            what: "constraint",
            index,
        });
    }

    Ok(Evaluation {
        objectives,
        violations,
    })
}

/// An evaluated chromosome plus the ranking data the selector attaches.
#[derive(Debug, Clone)]
pub struct Individual {
    pub chromosome: Chromosome,
    pub objectives: Vec<f64>,
    pub violations: Vec<f64>,
    pub rank: usize,
    pub crowding: f64,
}

impl Individual {
    pub fn new(chromosome: Chromosome, eval: Evaluation) -> Self {
        Self {
            chromosome,
            objectives: eval.objectives,
            violations: eval.violations,
            rank: usize::MAX,
            crowding: 0.0,
        }
    }

    pub fn total_violation(&self) -> f64 {
        total_violation(&self.violations)
    }

    pub fn is_feasible(&self) -> bool {
        self.total_violation() == 0.0
    }
}

/// Fans batches of chromosomes out on a dedicated, bounded pool.
pub struct Evaluator {
    problem: Arc<Problem>,
    pool: rayon::ThreadPool,
}

impl Evaluator {
    pub fn new(problem: Arc<Problem>, threads: usize) -> AsResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("classforge-eval-{}", i))
            .build()
            .map_err(|e| AssignError::Config(format!("cannot build evaluation pool: {}", e)))?;
        Ok(Self { problem, pool })
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Evaluates in parallel and returns individuals in input order, plus
    /// the number of failed evaluations (mapped to the sentinel).
    pub fn evaluate_batch(&self, batch: Vec<Chromosome>) -> (Vec<Individual>, usize) {
        let problem = &*self.problem;
        let results: Vec<(Individual, bool)> = self.pool.install(|| {
            batch
                .into_par_iter()
                .map(|chromosome| match evaluate(problem, &chromosome) {
                    Ok(eval) => (Individual::new(chromosome, eval), false),
                    Err(e) => {
                        warn!("⚠️  Evaluation failed ({}); using sentinel", e);
                        let eval = Evaluation::sentinel(problem.profile());
                        (Individual::new(chromosome, eval), true)
                    }
                })
                .collect()
        });

        let failed = results.iter().filter(|(_, f)| *f).count();
        (results.into_iter().map(|(ind, _)| ind).collect(), failed)
    }
}
