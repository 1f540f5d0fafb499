use crate::optimizer::chromosome::{Chromosome, Layout};
use fastrand::Rng;

/// Uniform sample within per-gene bounds.
pub fn random_chromosome(layout: &Layout, rng: &mut Rng) -> Chromosome {
    let genes = (0..layout.len())
        .map(|i| rng.u32(0..=layout.upper_bound(i)))
        .collect();
    Chromosome::new(genes)
}

/// Rate used when none is configured: one expected flip per chromosome.
pub fn default_rate(layout: &Layout) -> f64 {
    if layout.is_empty() {
        0.0
    } else {
        1.0 / layout.len() as f64
    }
}

/// Resets each gene to a uniformly drawn legal value with probability
/// `rate`. Returns how many genes were redrawn.
pub fn mutate_uniform(chromosome: &mut Chromosome, layout: &Layout, rate: f64, rng: &mut Rng) -> usize {
    let mut redrawn = 0;
    for (i, gene) in chromosome.genes.iter_mut().enumerate() {
        if rng.f64() < rate {
            *gene = rng.u32(0..=layout.upper_bound(i));
            redrawn += 1;
        }
    }
    redrawn
}
