use crate::optimizer::chromosome::Decoded;
use crate::problem::{Problem, Profile};

/// Most classes a teacher may hold before the overload constraint kicks in.
pub const MAX_CLASSES_PER_TEACHER: u32 = 2;

/// Constraint vector of a decoded assignment. Entries are `>= 0`,
/// positive means violated.
pub fn evaluate_constraints(problem: &Problem, decoded: &Decoded) -> Vec<f64> {
    match problem.profile() {
        Profile::Full => vec![
            capacity_overflow(problem, decoded) as f64,
            unstaffed_active(decoded) as f64,
            teacher_overload(decoded) as f64,
            shift_collisions(problem, decoded) as f64,
            grade_mismatches(problem, decoded) as f64,
        ],
        Profile::Reduced => vec![
            capacity_overflow(problem, decoded) as f64,
            unstaffed_active(decoded) as f64,
            distance_exceeded(problem, decoded) as f64,
        ],
    }
}

pub fn capacity_overflow(problem: &Problem, decoded: &Decoded) -> u64 {
    problem
        .classes()
        .iter()
        .zip(&decoded.class_load)
        .map(|(c, &load)| load.saturating_sub(c.capacity) as u64)
        .sum()
}

/// Active classes carrying the "no teacher" value.
pub fn unstaffed_active(decoded: &Decoded) -> usize {
    decoded
        .class_teacher
        .iter()
        .enumerate()
        .filter(|(c, t)| t.is_none() && decoded.is_active(*c))
        .count()
}

pub fn teacher_overload(decoded: &Decoded) -> u64 {
    decoded
        .teacher_load
        .iter()
        .map(|&n| n.saturating_sub(MAX_CLASSES_PER_TEACHER) as u64)
        .sum()
}

/// One unit per teacher holding exactly two classes on the same shift.
pub fn shift_collisions(problem: &Problem, decoded: &Decoded) -> usize {
    let classes = problem.classes();
    decoded
        .teacher_classes()
        .iter()
        .filter(|held| held.len() == 2 && classes[held[0]].shift == classes[held[1]].shift)
        .count()
}

pub fn grade_mismatches(problem: &Problem, decoded: &Decoded) -> usize {
    decoded
        .student_class
        .iter()
        .enumerate()
        .filter(|(s, &c)| problem.grade_mismatch(*s, c))
        .count()
}

pub fn distance_exceeded(problem: &Problem, decoded: &Decoded) -> usize {
    let limit = problem.settings().max_distance_km;
    decoded
        .class_teacher
        .iter()
        .enumerate()
        .filter(|(c, t)| match t {
            Some(t) => decoded.is_active(*c) && problem.teacher_distance(*t, *c) > limit,
            None => false,
        })
        .count()
}

/// Sum of the positive parts of a constraint vector.
pub fn total_violation(violations: &[f64]) -> f64 {
    violations.iter().map(|g| g.max(0.0)).sum()
}
