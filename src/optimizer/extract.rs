use crate::error::{AsResult, AssignError};
use crate::optimizer::evaluation::Individual;
use crate::optimizer::runner::OptimizationResult;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum_macros::Display;

/// How one row is chosen from an objective matrix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TieBreak {
    /// Last objective first, then the one before it, down to objective 0.
    #[default]
    ReversedLexicographic,
    /// Objective 0 first.
    Lexicographic,
    /// Argmin of objective 0.
    FirstObjective,
}

impl TieBreak {
    fn compare(self, a: &[f64], b: &[f64]) -> Ordering {
        match self {
            TieBreak::ReversedLexicographic => a
                .iter()
                .rev()
                .zip(b.iter().rev())
                .map(|(x, y)| x.total_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal),
            TieBreak::Lexicographic => a
                .iter()
                .zip(b)
                .map(|(x, y)| x.total_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal),
            TieBreak::FirstObjective => match (a.first(), b.first()) {
                (Some(x), Some(y)) => x.total_cmp(y),
                _ => Ordering::Equal,
            },
        }
    }
}

/// Index of the preferred row. Full ties go to the lowest index.
pub fn select_row(rows: &[Vec<f64>], policy: TieBreak) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, row) in rows.iter().enumerate() {
        match best {
            Some(b) if policy.compare(row, &rows[b]) != Ordering::Less => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Picks the individual to persist: from the first front, else from the
/// whole final population.
pub fn extract_best(result: &OptimizationResult, policy: TieBreak) -> AsResult<&Individual> {
    let pool = if result.front.is_empty() {
        &result.population
    } else {
        &result.front
    };

    let rows: Vec<Vec<f64>> = pool.iter().map(|i| i.objectives.clone()).collect();
    select_row(&rows, policy)
        .map(|i| &pool[i])
        .ok_or_else(|| AssignError::Extraction("final population is empty".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policies_on_reference_matrix() {
        let f = vec![vec![1.0, 5.0, 2.0], vec![1.0, 2.0, 9.0], vec![3.0, 0.0, 0.0]];
        assert_eq!(select_row(&f, TieBreak::ReversedLexicographic), Some(2));
        assert_eq!(select_row(&f, TieBreak::Lexicographic), Some(1));
        assert_eq!(select_row(&f, TieBreak::FirstObjective), Some(0));
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(select_row(&[vec![4.0, 4.0]], TieBreak::Lexicographic), Some(0));
        assert_eq!(select_row(&[], TieBreak::Lexicographic), None);
    }

    #[test]
    fn test_identical_rows_pick_first() {
        let f = vec![vec![2.0, 1.0], vec![1.0, 1.0], vec![1.0, 1.0]];
        assert_eq!(select_row(&f, TieBreak::ReversedLexicographic), Some(1));
    }
}
