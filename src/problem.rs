use crate::config::ModelParams;
use crate::error::{AsResult, AssignError};
use crate::geo::{haversine_km, GeoPoint};
use crate::optimizer::chromosome::Layout;
use crate::records::{Class, RecordSet, Student, Teacher};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use strum_macros::Display;
use tracing::{debug, info};

/// Which objective/constraint set a problem is evaluated with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Profile {
    /// 4 objectives, 5 constraints.
    #[default]
    Full,
    /// 3 objectives, 3 constraints.
    Reduced,
}

impl Profile {
    pub fn objective_names(self) -> &'static [&'static str] {
        match self {
            Profile::Full => &["balance", "student_km", "teacher_km", "site_repeats"],
            Profile::Reduced => &["balance_std", "student_km", "neg_site_pairs"],
        }
    }

    pub fn constraint_names(self) -> &'static [&'static str] {
        match self {
            Profile::Full => &[
                "capacity",
                "no_teacher",
                "overload",
                "shift_clash",
                "grade",
            ],
            Profile::Reduced => &["capacity", "no_teacher", "max_distance"],
        }
    }

    pub fn objective_count(self) -> usize {
        self.objective_names().len()
    }

    pub fn constraint_count(self) -> usize {
        self.constraint_names().len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProblemSettings {
    pub profile: Profile,
    pub max_distance_km: f64,
    pub target_class_size: f64,
}

impl Default for ProblemSettings {
    fn default() -> Self {
        Self::from(&ModelParams::default())
    }
}

impl From<&ModelParams> for ProblemSettings {
    fn from(m: &ModelParams) -> Self {
        Self {
            profile: m.profile,
            max_distance_km: m.max_distance_km,
            target_class_size: m.target_class_size,
        }
    }
}

/// Immutable, validated input of one optimization run.
#[derive(Debug)]
pub struct Problem {
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    classes: Vec<Class>,
    class_sites: Vec<GeoPoint>,
    classes_by_grade: HashMap<u32, Vec<u32>>,
    layout: Layout,
    settings: ProblemSettings,
}

impl Problem {
    pub fn new(records: RecordSet, settings: ProblemSettings) -> AsResult<Self> {
        let RecordSet {
            students,
            teachers,
            classes,
            establishments,
            rejected,
        } = records;

        if !rejected.is_empty() {
            let shown: Vec<String> = rejected.iter().take(5).map(|r| r.to_string()).collect();
            let mut msg = format!("unreadable input rows: {}", shown.join("; "));
            if rejected.len() > shown.len() {
                msg.push_str(&format!(" (+{} more)", rejected.len() - shown.len()));
            }
            return Err(AssignError::Validation(msg));
        }

        if students.is_empty() {
            return Err(AssignError::Validation("no students loaded".into()));
        }
        if teachers.is_empty() {
            return Err(AssignError::Validation("no teachers loaded".into()));
        }
        if classes.is_empty() {
            return Err(AssignError::Validation("no classes loaded".into()));
        }
        if teachers.len() >= u32::MAX as usize || classes.len() > u32::MAX as usize {
            return Err(AssignError::Validation(
                "too many teachers or classes for a 32-bit gene".into(),
            ));
        }

        let mut issues: Vec<String> = Vec::new();

        check_unique("student", students.iter().map(|s| s.id), &mut issues);
        check_unique("teacher", teachers.iter().map(|t| t.id), &mut issues);
        check_unique("class", classes.iter().map(|c| c.id), &mut issues);

        for s in &students {
            if !s.home().is_valid() {
                issues.push(format!("student {} has invalid coordinates", s.id));
            }
        }
        for t in &teachers {
            if !t.home().is_valid() {
                issues.push(format!("teacher {} has invalid coordinates", t.id));
            }
        }

        let sites: HashMap<u64, GeoPoint> = establishments
            .iter()
            .filter(|e| e.site().is_valid())
            .map(|e| (e.id, e.site()))
            .collect();

        let mut class_sites = Vec::with_capacity(classes.len());
        for c in &classes {
            if c.capacity == 0 {
                issues.push(format!("class {} has zero capacity", c.id));
            }
            if let Some(min) = c.min_capacity {
                if min > c.capacity {
                    issues.push(format!(
                        "class {} min_capacity {} exceeds capacity {}",
                        c.id, min, c.capacity
                    ));
                }
            }

            let site = match (c.lat, c.lng) {
                (Some(_), None) | (None, Some(_)) => {
                    issues.push(format!("class {} has only one coordinate", c.id));
                    None
                }
                _ => c
                    .own_site()
                    .or_else(|| sites.get(&c.establishment_id).copied()),
            };

            match site {
                Some(p) if p.is_valid() => class_sites.push(p),
                Some(_) => {
                    issues.push(format!("class {} has invalid coordinates", c.id));
                    class_sites.push(GeoPoint::new(0.0, 0.0));
                }
                None => {
                    issues.push(format!(
                        "class {} has no coordinates and establishment {} is unknown",
                        c.id, c.establishment_id
                    ));
                    class_sites.push(GeoPoint::new(0.0, 0.0));
                }
            }
        }

        if !(settings.max_distance_km.is_finite() && settings.max_distance_km > 0.0) {
            issues.push(format!(
                "max_distance_km must be positive (got {})",
                settings.max_distance_km
            ));
        }
        if !(settings.target_class_size.is_finite() && settings.target_class_size > 0.0) {
            issues.push(format!(
                "target_class_size must be positive (got {})",
                settings.target_class_size
            ));
        }

        if !issues.is_empty() {
            let shown = issues.len().min(5);
            let mut msg = issues[..shown].join("; ");
            if issues.len() > shown {
                msg.push_str(&format!(" (+{} more)", issues.len() - shown));
            }
            return Err(AssignError::Validation(msg));
        }

        let mut classes_by_grade: HashMap<u32, Vec<u32>> = HashMap::new();
        for (idx, c) in classes.iter().enumerate() {
            if let Some(g) = c.grade {
                classes_by_grade.entry(g).or_default().push(idx as u32);
            }
        }

        let layout = Layout::new(students.len(), classes.len(), teachers.len());

        info!(
            "🏫 Problem ready: {} students, {} teachers, {} classes ({} profile)",
            layout.n_students, layout.n_teachers, layout.n_classes, settings.profile
        );
        debug!("   Grades with classes: {}", classes_by_grade.len());

        Ok(Self {
            students,
            teachers,
            classes,
            class_sites,
            classes_by_grade,
            layout,
            settings,
        })
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    pub fn class_site(&self, class: usize) -> GeoPoint {
        self.class_sites[class]
    }

    pub fn class_sites(&self) -> &[GeoPoint] {
        &self.class_sites
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn settings(&self) -> &ProblemSettings {
        &self.settings
    }

    pub fn profile(&self) -> Profile {
        self.settings.profile
    }

    /// Class indices sharing `grade`, if any exist.
    pub fn classes_for_grade(&self, grade: Option<u32>) -> Option<&[u32]> {
        grade
            .and_then(|g| self.classes_by_grade.get(&g))
            .map(|v| v.as_slice())
            .filter(|v| !v.is_empty())
    }

    #[inline]
    pub fn student_distance(&self, student: usize, class: usize) -> f64 {
        haversine_km(self.students[student].home(), self.class_sites[class])
    }

    #[inline]
    pub fn teacher_distance(&self, teacher: usize, class: usize) -> f64 {
        haversine_km(self.teachers[teacher].home(), self.class_sites[class])
    }

    /// Both sides known and different.
    #[inline]
    pub fn grade_mismatch(&self, student: usize, class: usize) -> bool {
        match (self.students[student].grade, self.classes[class].grade) {
            (Some(s), Some(c)) => s != c,
            _ => false,
        }
    }
}

fn check_unique(kind: &str, ids: impl Iterator<Item = u64>, issues: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            issues.push(format!("duplicate {} id {}", kind, id));
        }
    }
}
