use crate::error::{AsResult, AssignError};
use crate::geo::nearest;
use crate::optimizer::chromosome::decode;
use crate::optimizer::evaluation::Individual;
use crate::problem::Problem;
use crate::records::Shift;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// One persisted student placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub student_id: u64,
    pub teacher_id: u64,
    pub establishment_id: u64,
    pub institution_id: u64,
    pub grade: Option<u32>,
    pub section: String,
    pub shift: Shift,
    pub distance_km: f64,
}

/// Durable home of the extracted assignment table.
pub trait AssignmentStore {
    /// Replaces the whole table. Either every row lands or prior state is
    /// left untouched.
    fn replace_all(&self, rows: &[AssignmentRow]) -> AsResult<()>;
    fn load_all(&self) -> AsResult<Vec<AssignmentRow>>;
}

#[derive(Debug, Clone)]
pub struct CsvAssignmentStore {
    path: PathBuf,
}

impl CsvAssignmentStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AssignmentStore for CsvAssignmentStore {
    fn replace_all(&self, rows: &[AssignmentRow]) -> AsResult<()> {
        write_atomically(&self.path, |file| {
            let mut wtr = csv::Writer::from_writer(file);
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
            Ok(())
        })
    }

    fn load_all(&self) -> AsResult<Vec<AssignmentRow>> {
        let mut rdr = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for row in rdr.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }
}

/// Writes through a temporary sibling file and renames it over `path`
/// once `fill` and the flush succeed. The temporary file is removed on
/// every error path.
fn write_atomically<F>(path: &Path, fill: F) -> AsResult<()>
where
    F: FnOnce(&mut NamedTempFile) -> AsResult<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let persistence = |source: std::io::Error| AssignError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(&dir).map_err(persistence)?;
    fill(&mut tmp).map_err(|e| match e {
        AssignError::Io(source) => persistence(source),
        AssignError::Csv(err) => persistence(err.into()),
        other => other,
    })?;
    tmp.as_file_mut().sync_all().map_err(persistence)?;
    tmp.persist(path).map_err(|e| persistence(e.error))?;
    Ok(())
}

/// One row per student of the decoded chromosome. Classes carrying the
/// "no teacher" value record the teacher living nearest to the site.
pub fn build_assignment_rows(problem: &Problem, individual: &Individual) -> AsResult<Vec<AssignmentRow>> {
    let decoded = decode(problem.layout(), &individual.chromosome)?;
    let students = problem.students();
    let teachers = problem.teachers();
    let classes = problem.classes();

    let mut rows = Vec::with_capacity(students.len());
    for (s, &c) in decoded.student_class.iter().enumerate() {
        let class = &classes[c];
        let site = problem.class_site(c);
        let teacher = match decoded.class_teacher[c] {
            Some(t) => t,
            None => nearest(site, teachers.iter().map(|t| t.home())).ok_or_else(|| {
                AssignError::Validation("no teachers to fall back on".into())
            })?,
        };

        rows.push(AssignmentRow {
            student_id: students[s].id,
            teacher_id: teachers[teacher].id,
            establishment_id: class.establishment_id,
            institution_id: class.institution_id,
            grade: class.grade,
            section: class.section.clone().unwrap_or_else(|| "A".to_string()),
            shift: class.shift,
            distance_km: problem.student_distance(s, c),
        });
    }
    Ok(rows)
}

pub fn save_assignment<S: AssignmentStore + ?Sized>(
    store: &S,
    problem: &Problem,
    individual: &Individual,
) -> AsResult<usize> {
    let rows = build_assignment_rows(problem, individual)?;
    store.replace_all(&rows)?;
    info!("💾 Saved {} assignment rows", rows.len());
    Ok(rows.len())
}

/// Writes the objective vectors and total violation of `front`, one row
/// per individual, tagged with `label`.
pub fn save_front(path: &Path, label: &str, front: &[Individual]) -> AsResult<()> {
    let width = front.first().map(|i| i.objectives.len()).unwrap_or(0);
    write_atomically(path, |file| {
        let mut wtr = csv::Writer::from_writer(file);

        let mut header = vec!["run".to_string()];
        header.extend((1..=width).map(|k| format!("f{}", k)));
        header.push("cv".to_string());
        wtr.write_record(&header)?;

        for ind in front {
            let mut record = vec![label.to_string()];
            record.extend(ind.objectives.iter().map(|v| v.to_string()));
            record.push(ind.total_violation().to_string());
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    })?;
    info!("💾 Saved front of {} to {}", front.len(), path.display());
    Ok(())
}
