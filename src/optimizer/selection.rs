//! Constrained non-dominated ranking, crowding and survival.
//!
//! Feasible individuals (total violation 0) always rank ahead of
//! infeasible ones. The feasible set is layered by dominance on the
//! objectives; the infeasible set by dominance on the objectives extended
//! with the total violation as one more minimized coordinate.

use crate::optimizer::evaluation::Individual;
use fastrand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;

/// `a` is no worse anywhere and strictly better somewhere.
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    let mut strictly_better = false;
    for (x, y) in a.iter().zip(b) {
        match x.total_cmp(y) {
            Ordering::Greater => return false,
            Ordering::Less => strictly_better = true,
            Ordering::Equal => {}
        }
    }
    strictly_better
}

/// Layers `points` into Pareto fronts. Indices inside each front are
/// ascending.
pub fn fast_non_dominated_sort(points: &[Vec<f64>]) -> Vec<Vec<usize>> {
    let n = points.len();
    if n == 0 {
        return vec![];
    }

    let mut domination_count = vec![0usize; n];
    let mut dominated_set: Vec<Vec<usize>> = vec![vec![]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            if dominates(&points[i], &points[j]) {
                dominated_set[i].push(j);
                domination_count[j] += 1;
            } else if dominates(&points[j], &points[i]) {
                dominated_set[j].push(i);
                domination_count[i] += 1;
            }
        }
    }

    let mut fronts: Vec<Vec<usize>> = vec![];
    let mut current: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();

    while !current.is_empty() {
        let mut next = vec![];
        for &i in &current {
            for &j in &dominated_set[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        next.sort_unstable();
        fronts.push(current);
        current = next;
    }

    fronts
}

/// Crowding distance of each member of `front`, aligned with `front`.
///
/// Boundaries get `+inf`, interior members add the normalised gap between
/// their neighbours. Objectives with zero range add nothing. Fronts of at
/// most two members are all `+inf`.
pub fn crowding_distance(points: &[Vec<f64>], front: &[usize]) -> Vec<f64> {
    let n = front.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let mut distance = vec![0.0; n];
    let m = points[front[0]].len();
    let mut order: Vec<usize> = (0..n).collect();

    for obj in 0..m {
        order.sort_by(|&a, &b| points[front[a]][obj].total_cmp(&points[front[b]][obj]));

        let min = points[front[order[0]]][obj];
        let max = points[front[order[n - 1]]][obj];
        let range = max - min;
        if !(range > 0.0) || !range.is_finite() {
            continue;
        }

        distance[order[0]] = f64::INFINITY;
        distance[order[n - 1]] = f64::INFINITY;

        for k in 1..n - 1 {
            let prev = points[front[order[k - 1]]][obj];
            let next = points[front[order[k + 1]]][obj];
            distance[order[k]] += (next - prev) / range;
        }
    }

    distance
}

/// Assigns `rank` and `crowding` to every individual. Returns the fronts
/// as indices into `population`, best first.
pub fn rank_population(population: &mut [Individual]) -> Vec<Vec<usize>> {
    let (feasible, infeasible): (Vec<usize>, Vec<usize>) =
        (0..population.len()).partition(|&i| population[i].is_feasible());

    let mut fronts = layer(population, &feasible, false);
    fronts.extend(layer(population, &infeasible, true));

    for (rank, front) in fronts.iter().enumerate() {
        let points: Vec<Vec<f64>> = front
            .iter()
            .map(|&i| population[i].objectives.clone())
            .collect();
        let local: Vec<usize> = (0..front.len()).collect();
        let crowd = crowding_distance(&points, &local);

        for (&i, c) in front.iter().zip(crowd) {
            population[i].rank = rank;
            population[i].crowding = c;
        }
    }

    fronts
}

fn layer(population: &[Individual], members: &[usize], with_violation: bool) -> Vec<Vec<usize>> {
    let points: Vec<Vec<f64>> = members
        .iter()
        .map(|&i| {
            let ind = &population[i];
            let mut p = ind.objectives.clone();
            if with_violation {
                p.push(ind.total_violation());
            }
            p
        })
        .collect();

    fast_non_dominated_sort(&points)
        .into_iter()
        .map(|front| front.into_iter().map(|k| members[k]).collect())
        .collect()
}

/// Keeps `capacity` individuals out of `pool`.
///
/// Identical chromosomes are dropped before ranking and only come back
/// when the unique ones cannot fill the population. Survivors are ranked
/// again among themselves so `rank`/`crowding` describe the new
/// population.
pub fn survive(pool: Vec<Individual>, capacity: usize) -> Vec<Individual> {
    let mut seen = HashSet::with_capacity(pool.len());
    let mut unique = Vec::with_capacity(pool.len());
    let mut duplicates = Vec::new();
    for ind in pool {
        if seen.insert(ind.chromosome.clone()) {
            unique.push(ind);
        } else {
            duplicates.push(ind);
        }
    }

    let fronts = rank_population(&mut unique);
    let mut chosen: Vec<usize> = Vec::with_capacity(capacity);

    for front in fronts {
        if chosen.len() + front.len() <= capacity {
            chosen.extend(front);
            continue;
        }
        let room = capacity - chosen.len();
        let mut by_crowding = front;
        by_crowding.sort_by(|&a, &b| unique[b].crowding.total_cmp(&unique[a].crowding));
        chosen.extend(by_crowding.into_iter().take(room));
        break;
    }

    let mut slots: Vec<Option<Individual>> = unique.into_iter().map(Some).collect();
    let mut survivors: Vec<Individual> = chosen
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();

    if survivors.len() < capacity {
        let missing = capacity - survivors.len();
        survivors.extend(duplicates.into_iter().take(missing));
    }

    rank_population(&mut survivors);
    survivors
}

/// Binary tournament over `population`; returns the winner's index.
pub fn binary_tournament(population: &[Individual], rng: &mut Rng) -> usize {
    let n = population.len();
    let a = rng.usize(0..n);
    let b = rng.usize(0..n);
    match compare(&population[a], &population[b]) {
        Ordering::Less => a,
        Ordering::Greater => b,
        Ordering::Equal => {
            if rng.bool() {
                a
            } else {
                b
            }
        }
    }
}

/// `Less` means `a` is preferred.
fn compare(a: &Individual, b: &Individual) -> Ordering {
    let (va, vb) = (a.total_violation(), b.total_violation());
    if va > 0.0 || vb > 0.0 {
        let by_violation = va.total_cmp(&vb);
        if by_violation != Ordering::Equal {
            return by_violation;
        }
    }
    a.rank
        .cmp(&b.rank)
        .then_with(|| b.crowding.total_cmp(&a.crowding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::chromosome::Chromosome;
    use crate::optimizer::evaluation::Evaluation;

    fn ind(genes: Vec<u32>, objectives: Vec<f64>, violations: Vec<f64>) -> Individual {
        Individual::new(
            Chromosome::new(genes),
            Evaluation {
                objectives,
                violations,
            },
        )
    }

    #[test]
    fn test_dominates() {
        assert!(dominates(&[1.0, 2.0], &[1.0, 3.0]));
        assert!(!dominates(&[1.0, 2.0], &[1.0, 2.0]));
        assert!(!dominates(&[0.0, 4.0], &[1.0, 3.0]));
    }

    #[test]
    fn test_sort_layers() {
        let pts = vec![
            vec![1.0, 1.0],
            vec![2.0, 2.0],
            vec![0.5, 3.0],
            vec![3.0, 3.0],
        ];
        let fronts = fast_non_dominated_sort(&pts);
        assert_eq!(fronts, vec![vec![0, 2], vec![1], vec![3]]);
    }

    #[test]
    fn test_crowding_small_fronts_are_infinite() {
        let pts = vec![vec![1.0], vec![2.0]];
        assert!(crowding_distance(&pts, &[0, 1]).iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn test_crowding_interior() {
        let pts = vec![vec![0.0, 4.0], vec![1.0, 3.0], vec![3.0, 1.0], vec![4.0, 0.0]];
        let d = crowding_distance(&pts, &[0, 1, 2, 3]);
        assert!(d[0].is_infinite() && d[3].is_infinite());
        assert!((d[1] - 1.5).abs() < 1e-12);
        assert!((d[2] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_feasible_rank_before_infeasible() {
        let mut pop = vec![
            ind(vec![0], vec![0.0, 0.0], vec![1.0]),
            ind(vec![1], vec![9.0, 9.0], vec![0.0]),
            ind(vec![2], vec![5.0, 5.0], vec![3.0]),
        ];
        let fronts = rank_population(&mut pop);
        assert_eq!(fronts[0], vec![1]);
        assert_eq!(pop[1].rank, 0);
        assert!(pop[0].rank < pop[2].rank);
    }

    #[test]
    fn test_survive_drops_duplicates_first() {
        let pool = vec![
            ind(vec![0], vec![1.0, 1.0], vec![0.0]),
            ind(vec![0], vec![1.0, 1.0], vec![0.0]),
            ind(vec![1], vec![2.0, 2.0], vec![0.0]),
            ind(vec![2], vec![3.0, 3.0], vec![0.0]),
        ];
        let kept = survive(pool.clone(), 3);
        let genes: Vec<u32> = kept.iter().map(|i| i.chromosome.genes[0]).collect();
        assert_eq!(genes, vec![0, 1, 2]);

        let kept = survive(pool, 4);
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn test_tournament_prefers_lower_violation() {
        let mut pop = vec![
            ind(vec![0], vec![0.0], vec![5.0]),
            ind(vec![1], vec![9.0], vec![0.0]),
        ];
        rank_population(&mut pop);
        assert_eq!(compare(&pop[1], &pop[0]), Ordering::Less);

        let mut rng = Rng::with_seed(5);
        for _ in 0..20 {
            let w = binary_tournament(&pop, &mut rng);
            let l = if w == 0 { 1 } else { 0 };
            assert_ne!(compare(&pop[w], &pop[l]), Ordering::Greater);
        }
    }
}
