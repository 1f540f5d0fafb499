use classforge::optimizer::selection::{crowding_distance, dominates, rank_population, survive};
use classforge::optimizer::{Chromosome, Evaluation, Individual};

fn ind(tag: u32, objectives: Vec<f64>, violations: Vec<f64>) -> Individual {
    Individual::new(
        Chromosome::new(vec![tag]),
        Evaluation {
            objectives,
            violations,
        },
    )
}

#[test]
fn test_dominating_individual_never_ranks_worse() {
    // A dominates B; C and D trade off against A
    let mut pop = vec![
        ind(0, vec![2.0, 2.0], vec![0.0]),
        ind(1, vec![3.0, 3.0], vec![0.0]),
        ind(2, vec![0.0, 5.0], vec![0.0]),
        ind(3, vec![5.0, 0.0], vec![0.0]),
    ];
    assert!(dominates(&pop[0].objectives, &pop[1].objectives));

    rank_population(&mut pop);
    assert!(pop[0].rank < pop[1].rank);
    assert_eq!(pop[2].rank, 0);
    assert_eq!(pop[3].rank, 0);
}

#[test]
fn test_extremes_have_infinite_crowding() {
    let points = vec![
        vec![0.0, 5.0],
        vec![1.0, 3.0],
        vec![2.0, 2.0],
        vec![5.0, 0.0],
    ];
    let d = crowding_distance(&points, &[0, 1, 2, 3]);
    assert!(d[0].is_infinite());
    assert!(d[3].is_infinite());
    assert!(d[1].is_finite() && d[2].is_finite());
}

#[test]
fn test_infeasible_layering_uses_violation() {
    // Same objectives, different violation: lower violation is a better front
    let mut pop = vec![
        ind(0, vec![1.0, 1.0], vec![4.0, 0.0]),
        ind(1, vec![1.0, 1.0], vec![1.0, 1.0]),
        ind(2, vec![9.0, 9.0], vec![0.0, 0.0]),
    ];
    rank_population(&mut pop);
    assert_eq!(pop[2].rank, 0);
    assert_eq!(pop[1].rank, 1);
    assert_eq!(pop[0].rank, 2);
}

#[test]
fn test_truncation_keeps_boundaries() {
    let pool: Vec<Individual> = (0..6)
        .map(|i| ind(i, vec![i as f64, 5.0 - i as f64], vec![0.0]))
        .collect();
    let kept = survive(pool, 3);
    let tags: Vec<u32> = kept.iter().map(|i| i.chromosome.genes[0]).collect();

    assert_eq!(kept.len(), 3);
    assert!(tags.contains(&0));
    assert!(tags.contains(&5));
}
