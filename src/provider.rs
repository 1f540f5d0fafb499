use crate::error::{AsResult, AssignError};
use crate::records::{Class, Establishment, RecordSet, RejectedRow, Student, Teacher};
use clap::Args;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

pub const STUDENTS_FILE: &str = "students.csv";
pub const TEACHERS_FILE: &str = "teachers.csv";
pub const CLASSES_FILE: &str = "classes.csv";
pub const ESTABLISHMENTS_FILE: &str = "establishments.csv";

/// Source of the four input collections. Implementations never fail:
/// they log the cause and hand back an empty collection instead, and the
/// problem builder rejects empty inputs. Providers that can tell a bad row
/// from a missing table report the former through `load_all`.
pub trait RecordProvider {
    fn students(&self) -> Vec<Student>;
    fn teachers(&self) -> Vec<Teacher>;
    fn classes(&self) -> Vec<Class>;
    fn establishments(&self) -> Vec<Establishment>;

    fn load_all(&self) -> RecordSet {
        RecordSet {
            students: self.students(),
            teachers: self.teachers(),
            classes: self.classes(),
            establishments: self.establishments(),
            rejected: Vec::new(),
        }
    }
}

/// Reads the four tables as headed CSV files from one directory.
#[derive(Debug, Clone)]
pub struct CsvRecordProvider {
    root: PathBuf,
}

impl CsvRecordProvider {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Checks that every table exists and has a readable header row.
    pub fn health_check(&self) -> AsResult<()> {
        for name in [STUDENTS_FILE, TEACHERS_FILE, CLASSES_FILE, ESTABLISHMENTS_FILE] {
            let path = self.root.join(name);
            if !path.is_file() {
                return Err(AssignError::Validation(format!(
                    "missing table {}",
                    path.display()
                )));
            }
            let mut rdr = csv::ReaderBuilder::new().from_path(&path)?;
            if rdr.headers()?.is_empty() {
                return Err(AssignError::Validation(format!(
                    "table {} has no header",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    fn read_table<T: DeserializeOwned>(&self, name: &str) -> (Vec<T>, Vec<RejectedRow>) {
        let path = self.root.join(name);
        match read_rows(&path, name) {
            Ok(table) => table,
            Err(e) => {
                error!("❌ Could not load {}: {}", path.display(), e);
                (Vec::new(), Vec::new())
            }
        }
    }
}

impl RecordProvider for CsvRecordProvider {
    fn students(&self) -> Vec<Student> {
        self.read_table(STUDENTS_FILE).0
    }

    fn teachers(&self) -> Vec<Teacher> {
        self.read_table(TEACHERS_FILE).0
    }

    fn classes(&self) -> Vec<Class> {
        self.read_table(CLASSES_FILE).0
    }

    fn establishments(&self) -> Vec<Establishment> {
        self.read_table(ESTABLISHMENTS_FILE).0
    }

    fn load_all(&self) -> RecordSet {
        let mut rejected = Vec::new();
        let (students, bad) = self.read_table(STUDENTS_FILE);
        rejected.extend(bad);
        let (teachers, bad) = self.read_table(TEACHERS_FILE);
        rejected.extend(bad);
        let (classes, bad) = self.read_table(CLASSES_FILE);
        rejected.extend(bad);
        let (establishments, bad) = self.read_table(ESTABLISHMENTS_FILE);
        rejected.extend(bad);

        RecordSet {
            students,
            teachers,
            classes,
            establishments,
            rejected,
        }
    }
}

/// Deserializes every row. Rows with a missing or malformed field are
/// returned separately so the caller can refuse the whole table.
fn read_rows<T: DeserializeOwned>(path: &Path, table: &str) -> AsResult<(Vec<T>, Vec<RejectedRow>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    let mut rejected = Vec::new();

    for (row_idx, result) in rdr.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                // Header is line 1
                let line = e.position().map_or(row_idx as u64 + 2, |p| p.line());
                debug!("   [Line {}] {}", line, e);
                rejected.push(RejectedRow {
                    table: table.to_string(),
                    line,
                    reason: e.to_string(),
                });
            }
        }
    }

    if !rejected.is_empty() {
        warn!(
            "⚠️  {} invalid rows in {}",
            rejected.len(),
            path.display()
        );
    }
    debug!("   Loaded {} rows from {}", rows.len(), path.display());

    Ok((rows, rejected))
}

/// Narrows a record set before the problem is built.
#[derive(Args, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Keep only students and classes of this grade
    #[arg(long)]
    pub grade: Option<u32>,

    /// Keep only records tagged with this department
    #[arg(long)]
    pub department: Option<String>,

    /// Keep only records tagged with this locality
    #[arg(long)]
    pub locality: Option<String>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.grade.is_none() && self.department.is_none() && self.locality.is_none()
    }

    fn tags_match(&self, department: Option<&str>, locality: Option<&str>) -> bool {
        tag_matches(self.department.as_deref(), department)
            && tag_matches(self.locality.as_deref(), locality)
    }

    fn grade_matches(&self, grade: Option<u32>) -> bool {
        match self.grade {
            Some(g) => grade == Some(g),
            None => true,
        }
    }

    /// Classes follow their establishment's tags.
    pub fn apply(&self, records: RecordSet) -> RecordSet {
        if self.is_empty() {
            return records;
        }

        let establishments: Vec<Establishment> = records
            .establishments
            .into_iter()
            .filter(|e| self.tags_match(e.department.as_deref(), e.locality.as_deref()))
            .collect();
        let kept_sites: HashSet<u64> = establishments.iter().map(|e| e.id).collect();

        let filtered = RecordSet {
            students: records
                .students
                .into_iter()
                .filter(|s| {
                    self.grade_matches(s.grade)
                        && self.tags_match(s.department.as_deref(), s.locality.as_deref())
                })
                .collect(),
            teachers: records
                .teachers
                .into_iter()
                .filter(|t| self.tags_match(t.department.as_deref(), t.locality.as_deref()))
                .collect(),
            classes: records
                .classes
                .into_iter()
                .filter(|c| self.grade_matches(c.grade) && kept_sites.contains(&c.establishment_id))
                .collect(),
            establishments,
            rejected: records.rejected,
        };

        debug!(
            "   Filter kept {} students, {} teachers, {} classes",
            filtered.students.len(),
            filtered.teachers.len(),
            filtered.classes.len()
        );
        filtered
    }
}

fn tag_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match (wanted, actual) {
        (None, _) => true,
        (Some(w), Some(a)) => w.trim().eq_ignore_ascii_case(a.trim()),
        (Some(_), None) => false,
    }
}
