use crate::optimizer::chromosome::Chromosome;
use crate::problem::Problem;
use fastrand::Rng;

/// Moves students out of grade-incompatible classes.
///
/// Pass one collects every student whose class grade differs from their
/// own; pass two redraws each of them uniformly among classes of their
/// grade, or among all classes when their grade has none. Only the
/// student block is touched. Returns the number of students moved.
pub fn repair_grades(problem: &Problem, chromosome: &mut Chromosome, rng: &mut Rng) -> usize {
    let layout = problem.layout();
    if chromosome.len() != layout.len() {
        return 0;
    }

    let unassigned: Vec<usize> = chromosome.genes[layout.student_block()]
        .iter()
        .enumerate()
        .filter(|(s, &c)| (c as usize) < layout.n_classes && problem.grade_mismatch(*s, c as usize))
        .map(|(s, _)| s)
        .collect();

    for &s in &unassigned {
        let grade = problem.students()[s].grade;
        chromosome.genes[s] = match problem.classes_for_grade(grade) {
            Some(pool) => pool[rng.usize(0..pool.len())],
            None => rng.u32(0..layout.n_classes as u32),
        };
    }

    unassigned.len()
}
