use crate::optimizer::chromosome::Decoded;
use crate::problem::{Problem, Profile};
use std::collections::HashSet;

/// Objective vector of a decoded assignment. Every entry is minimized.
pub fn evaluate_objectives(problem: &Problem, decoded: &Decoded) -> Vec<f64> {
    match problem.profile() {
        Profile::Full => vec![
            mean_abs_deviation(&decoded.class_load, problem.settings().target_class_size),
            mean_student_distance(problem, decoded),
            mean_teacher_distance(problem, decoded),
            establishment_repeats(problem, decoded) as f64,
        ],
        Profile::Reduced => vec![
            std_dev(&decoded.class_load),
            mean_student_distance(problem, decoded),
            0.0 - paired_site_fraction(problem, decoded),
        ],
    }
}

pub fn mean_abs_deviation(loads: &[u32], target: f64) -> f64 {
    if loads.is_empty() {
        return 0.0;
    }
    let total: f64 = loads.iter().map(|&l| (l as f64 - target).abs()).sum();
    total / loads.len() as f64
}

/// Population standard deviation.
pub fn std_dev(loads: &[u32]) -> f64 {
    if loads.is_empty() {
        return 0.0;
    }
    let n = loads.len() as f64;
    let mean = loads.iter().map(|&l| l as f64).sum::<f64>() / n;
    let var = loads
        .iter()
        .map(|&l| {
            let d = l as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    var.sqrt()
}

pub fn mean_student_distance(problem: &Problem, decoded: &Decoded) -> f64 {
    let n = decoded.student_class.len();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = decoded
        .student_class
        .iter()
        .enumerate()
        .map(|(s, &c)| problem.student_distance(s, c))
        .sum();
    total / n as f64
}

/// Averaged over classes that are active and staffed; 0 when none are.
pub fn mean_teacher_distance(problem: &Problem, decoded: &Decoded) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for (c, teacher) in decoded.class_teacher.iter().enumerate() {
        if let Some(t) = *teacher {
            if decoded.is_active(c) {
                total += problem.teacher_distance(t, c);
                count += 1;
            }
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Classes whose establishment already appeared among the same teacher's
/// lower-indexed classes.
pub fn establishment_repeats(problem: &Problem, decoded: &Decoded) -> usize {
    let classes = problem.classes();
    let mut seen: HashSet<(usize, u64)> = HashSet::new();
    decoded
        .class_teacher
        .iter()
        .enumerate()
        .filter_map(|(c, t)| t.map(|t| (t, classes[c].establishment_id)))
        .filter(|pair| !seen.insert(*pair))
        .count()
}

/// Share of teachers holding exactly two classes at one establishment.
pub fn paired_site_fraction(problem: &Problem, decoded: &Decoded) -> f64 {
    let n_teachers = decoded.teacher_load.len();
    if n_teachers == 0 {
        return 0.0;
    }
    let classes = problem.classes();
    let paired = decoded
        .teacher_classes()
        .iter()
        .filter(|held| {
            held.len() == 2
                && classes[held[0]].establishment_id == classes[held[1]].establishment_id
        })
        .count();
    paired as f64 / n_teachers as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_metrics() {
        assert_eq!(mean_abs_deviation(&[30, 30], 30.0), 0.0);
        assert_eq!(mean_abs_deviation(&[20, 40, 30], 30.0), 20.0 / 3.0);
        assert_eq!(std_dev(&[5, 5, 5]), 0.0);
        assert!((std_dev(&[2, 4, 4, 4, 5, 5, 7, 9]) - 2.0).abs() < 1e-12);
        assert_eq!(std_dev(&[]), 0.0);
    }
}
