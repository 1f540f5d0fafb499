#![allow(dead_code)]

use classforge::problem::{Problem, ProblemSettings, Profile};
use classforge::records::{Class, Establishment, RecordSet, Shift, Student, Teacher};
use std::path::Path;
use std::sync::Arc;

pub fn student(id: u64, lat: f64, lng: f64, grade: Option<u32>) -> Student {
    Student {
        id,
        name: Some(format!("Student {}", id)),
        lat,
        lng,
        grade,
        department: Some("Central".into()),
        locality: Some("Luque".into()),
        neighborhood: None,
    }
}

pub fn teacher(id: u64, lat: f64, lng: f64) -> Teacher {
    Teacher {
        id,
        name: Some(format!("Teacher {}", id)),
        lat,
        lng,
        department: Some("Central".into()),
        locality: Some("Luque".into()),
        neighborhood: None,
    }
}

pub fn class(id: u64, grade: Option<u32>, shift: Shift, capacity: u32, establishment_id: u64) -> Class {
    Class {
        id,
        grade,
        shift,
        capacity,
        min_capacity: None,
        section: None,
        establishment_id,
        institution_id: 1,
        lat: None,
        lng: None,
    }
}

pub fn establishment(id: u64, lat: f64, lng: f64) -> Establishment {
    Establishment {
        id,
        institution_id: 1,
        lat,
        lng,
        department: Some("Central".into()),
        locality: Some("Luque".into()),
        neighborhood: None,
    }
}

/// Three students (grades 1, 1, 2), a capacity-1 grade-1 class next to the
/// grade-1 students and a capacity-5 grade-2 class next to the grade-2
/// student, two teachers.
pub fn scenario_records() -> RecordSet {
    RecordSet {
        students: vec![
            student(1, 0.0, 0.0, Some(1)),
            student(2, 0.0, 0.01, Some(1)),
            student(3, 1.0, 1.0, Some(2)),
        ],
        teachers: vec![teacher(10, 0.0, 0.02), teacher(11, 1.0, 1.02)],
        classes: vec![
            class(100, Some(1), Shift::Morning, 1, 7),
            class(101, Some(2), Shift::Afternoon, 5, 8),
        ],
        establishments: vec![establishment(7, 0.0, 0.005), establishment(8, 1.0, 1.0)],
        rejected: Vec::new(),
    }
}

/// Seeded synthetic instance around one city.
pub fn random_records(n_students: usize, n_classes: usize, n_teachers: usize, seed: u64) -> RecordSet {
    let mut rng = fastrand::Rng::with_seed(seed);
    let n_sites = n_classes.div_ceil(2).max(1);
    let shifts = [Shift::Morning, Shift::Afternoon, Shift::Night];

    let establishments = (0..n_sites)
        .map(|e| establishment(e as u64 + 1, -25.3 + rng.f64() * 0.3, -57.6 + rng.f64() * 0.3))
        .collect();
    let classes = (0..n_classes)
        .map(|c| {
            class(
                c as u64 + 100,
                Some(rng.u32(1..=3)),
                shifts[c % 3],
                rng.u32(5..=15),
                (c % n_sites) as u64 + 1,
            )
        })
        .collect();
    let students = (0..n_students)
        .map(|s| student(s as u64 + 1000, -25.3 + rng.f64() * 0.3, -57.6 + rng.f64() * 0.3, Some(rng.u32(1..=3))))
        .collect();
    let teachers = (0..n_teachers)
        .map(|t| teacher(t as u64 + 500, -25.3 + rng.f64() * 0.3, -57.6 + rng.f64() * 0.3))
        .collect();

    RecordSet {
        students,
        teachers,
        classes,
        establishments,
        rejected: Vec::new(),
    }
}

pub fn problem(records: RecordSet, profile: Profile) -> Arc<Problem> {
    let settings = ProblemSettings {
        profile,
        ..ProblemSettings::default()
    };
    Arc::new(Problem::new(records, settings).expect("fixture must validate"))
}

fn write_table<T: serde::Serialize>(path: &Path, rows: &[T]) {
    let mut wtr = csv::Writer::from_path(path).unwrap();
    for row in rows {
        wtr.serialize(row).unwrap();
    }
    wtr.flush().unwrap();
}

/// Lays `records` out as the four CSV tables the provider reads.
pub fn write_data_dir(dir: &Path, records: &RecordSet) {
    write_table(&dir.join("students.csv"), &records.students);
    write_table(&dir.join("teachers.csv"), &records.teachers);
    write_table(&dir.join("classes.csv"), &records.classes);
    write_table(&dir.join("establishments.csv"), &records.establishments);
}
