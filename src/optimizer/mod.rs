pub mod chromosome;
pub mod constraints;
pub mod crossover;
pub mod evaluation;
pub mod extract;
pub mod mutation;
pub mod objectives;
pub mod repair;
pub mod runner;
pub mod selection;

pub use chromosome::{decode, encode, Chromosome, CodecError, Decoded, Layout};
pub use evaluation::{evaluate, Evaluation, EvaluationFailure, Evaluator, Individual, SENTINEL};
pub use extract::{extract_best, select_row, TieBreak};
pub use runner::{
    GenerationStats, NoProgress, OptimizationOptions, OptimizationResult, Optimizer,
    ProgressCallback,
};
