mod common;

use classforge::error::AssignError;
use classforge::optimizer::{evaluate, Chromosome, Individual};
use classforge::problem::Profile;
use classforge::records::Shift;
use classforge::store::{
    build_assignment_rows, save_assignment, save_front, AssignmentStore, CsvAssignmentStore,
};
use common::*;
use std::fs;

fn individual(p: &classforge::problem::Problem, genes: Vec<u32>) -> Individual {
    let chrom = Chromosome::new(genes);
    let eval = evaluate(p, &chrom).unwrap();
    Individual::new(chrom, eval)
}

#[test]
fn test_rows_follow_assignment() {
    let mut records = scenario_records();
    records.classes[1].section = Some("B".into());
    let p = problem(records, Profile::Full);

    let rows = build_assignment_rows(&p, &individual(&p, vec![0, 0, 1, 1, 0])).unwrap();
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].student_id, 1);
    assert_eq!(rows[0].teacher_id, 11);
    assert_eq!(rows[0].establishment_id, 7);
    assert_eq!(rows[0].section, "A");
    assert_eq!(rows[0].shift, Shift::Morning);

    assert_eq!(rows[2].teacher_id, 10);
    assert_eq!(rows[2].section, "B");
    assert_eq!(rows[2].grade, Some(2));
    assert!(rows[2].distance_km < 1.0);
}

#[test]
fn test_missing_teacher_falls_back_to_nearest() {
    let p = problem(scenario_records(), Profile::Full);
    // Both classes carry the "no teacher" value
    let rows = build_assignment_rows(&p, &individual(&p, vec![0, 0, 1, 2, 2])).unwrap();
    assert_eq!(rows[0].teacher_id, 10);
    assert_eq!(rows[2].teacher_id, 11);
}

#[test]
fn test_replace_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assignments.csv");
    let p = problem(scenario_records(), Profile::Full);
    let store = CsvAssignmentStore::new(&path);

    assert_eq!(save_assignment(&store, &p, &individual(&p, vec![0, 0, 1, 0, 1])).unwrap(), 3);
    let first = store.load_all().unwrap();
    assert_eq!(first.len(), 3);

    save_assignment(&store, &p, &individual(&p, vec![0, 1, 1, 0, 1])).unwrap();
    let second = store.load_all().unwrap();
    assert_eq!(second.len(), 3);
    assert_eq!(second[1].establishment_id, 8);
    assert_eq!(second, build_assignment_rows(&p, &individual(&p, vec![0, 1, 1, 0, 1])).unwrap());
}

#[test]
fn test_failed_build_leaves_previous_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assignments.csv");
    let p = problem(scenario_records(), Profile::Full);
    let store = CsvAssignmentStore::new(&path);

    save_assignment(&store, &p, &individual(&p, vec![0, 0, 1, 0, 1])).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    let mut broken = individual(&p, vec![0, 0, 1, 0, 1]);
    broken.chromosome = Chromosome::new(vec![0, 0]);
    assert!(matches!(
        save_assignment(&store, &p, &broken),
        Err(AssignError::Codec(_))
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_failed_rename_discards_temporary_file() {
    let dir = tempfile::tempdir().unwrap();
    // A non-empty directory sits where the table should go
    let target = dir.path().join("assignments.csv");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep.txt"), "x").unwrap();

    let p = problem(scenario_records(), Profile::Full);
    let store = CsvAssignmentStore::new(&target);
    let err = save_assignment(&store, &p, &individual(&p, vec![0, 0, 1, 0, 1])).unwrap_err();
    assert!(matches!(err, AssignError::Persistence { .. }));

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert!(target.join("keep.txt").exists());
}

#[test]
fn test_front_file_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("front.csv");
    let p = problem(scenario_records(), Profile::Reduced);
    let front = vec![
        individual(&p, vec![0, 0, 1, 0, 1]),
        individual(&p, vec![0, 1, 1, 0, 1]),
    ];

    save_front(&path, "run-7", &front).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "run,f1,f2,f3,cv");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("run-7,"));
}
