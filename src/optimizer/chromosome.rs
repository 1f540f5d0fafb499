//! Integer-vector encoding of one complete assignment.
//!
//! The vector has two contiguous blocks:
//! - block A (`n_students` genes): class index per student, `0..n_classes`;
//! - block B (`n_classes` genes): teacher index per class, `0..=n_teachers`,
//!   where `n_teachers` itself means "no teacher".

use std::ops::Range;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("chromosome has {found} genes, layout expects {expected}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("gene {index} = {value} exceeds upper bound {max}")]
    GeneOutOfRange { index: usize, value: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub n_students: usize,
    pub n_classes: usize,
    pub n_teachers: usize,
}

impl Layout {
    pub fn new(n_students: usize, n_classes: usize, n_teachers: usize) -> Self {
        Self {
            n_students,
            n_classes,
            n_teachers,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.n_students + self.n_classes
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn student_block(&self) -> Range<usize> {
        0..self.n_students
    }

    pub fn teacher_block(&self) -> Range<usize> {
        self.n_students..self.len()
    }

    /// The "no teacher" gene value.
    #[inline(always)]
    pub fn no_teacher(&self) -> u32 {
        self.n_teachers as u32
    }

    /// Inclusive upper bound of the gene at `index`. A layout without
    /// classes has no legal student gene; its bound reads as 0.
    #[inline(always)]
    pub fn upper_bound(&self, index: usize) -> u32 {
        if index < self.n_students {
            self.n_classes.saturating_sub(1) as u32
        } else {
            self.n_teachers as u32
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chromosome {
    pub genes: Vec<u32>,
}

impl Chromosome {
    pub fn new(genes: Vec<u32>) -> Self {
        Self { genes }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn student_genes(&self, layout: &Layout) -> &[u32] {
        &self.genes[layout.student_block()]
    }

    pub fn teacher_genes(&self, layout: &Layout) -> &[u32] {
        &self.genes[layout.teacher_block()]
    }

    pub fn in_bounds(&self, layout: &Layout) -> bool {
        self.genes.len() == layout.len()
            && self
                .genes
                .iter()
                .enumerate()
                .all(|(i, &g)| {
                    let legal_class = i >= layout.n_students || (g as usize) < layout.n_classes;
                    legal_class && g <= layout.upper_bound(i)
                })
    }
}

/// Full relational view of a chromosome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub student_class: Vec<usize>,
    pub class_load: Vec<u32>,
    pub class_teacher: Vec<Option<usize>>,
    pub teacher_load: Vec<u32>,
}

impl Decoded {
    #[inline(always)]
    pub fn is_active(&self, class: usize) -> bool {
        self.class_load[class] > 0
    }

    /// Classes held by each teacher, in class-index order.
    pub fn teacher_classes(&self) -> Vec<Vec<usize>> {
        let mut held: Vec<Vec<usize>> = self
            .teacher_load
            .iter()
            .map(|&n| Vec::with_capacity(n as usize))
            .collect();
        for (class, teacher) in self.class_teacher.iter().enumerate() {
            if let Some(t) = *teacher {
                held[t].push(class);
            }
        }
        held
    }
}

pub fn decode(layout: &Layout, chromosome: &Chromosome) -> Result<Decoded, CodecError> {
    if chromosome.len() != layout.len() {
        return Err(CodecError::LengthMismatch {
            expected: layout.len(),
            found: chromosome.len(),
        });
    }

    let mut student_class = Vec::with_capacity(layout.n_students);
    let mut class_load = vec![0u32; layout.n_classes];

    for (i, &gene) in chromosome.student_genes(layout).iter().enumerate() {
        let class = gene as usize;
        if class >= layout.n_classes {
            return Err(CodecError::GeneOutOfRange {
                index: i,
                value: gene,
                max: layout.upper_bound(i),
            });
        }
        class_load[class] += 1;
        student_class.push(class);
    }

    let mut class_teacher = Vec::with_capacity(layout.n_classes);
    let mut teacher_load = vec![0u32; layout.n_teachers];
    let offset = layout.n_students;

    for (l, &gene) in chromosome.teacher_genes(layout).iter().enumerate() {
        let teacher = gene as usize;
        if teacher == layout.n_teachers {
            class_teacher.push(None);
        } else if teacher < layout.n_teachers {
            teacher_load[teacher] += 1;
            class_teacher.push(Some(teacher));
        } else {
            return Err(CodecError::GeneOutOfRange {
                index: offset + l,
                value: gene,
                max: layout.upper_bound(offset + l),
            });
        }
    }

    Ok(Decoded {
        student_class,
        class_load,
        class_teacher,
        teacher_load,
    })
}

pub fn encode(
    layout: &Layout,
    student_class: &[usize],
    class_teacher: &[Option<usize>],
) -> Result<Chromosome, CodecError> {
    if student_class.len() != layout.n_students || class_teacher.len() != layout.n_classes {
        return Err(CodecError::LengthMismatch {
            expected: layout.len(),
            found: student_class.len() + class_teacher.len(),
        });
    }

    let mut genes = Vec::with_capacity(layout.len());

    for (i, &class) in student_class.iter().enumerate() {
        if class >= layout.n_classes {
            return Err(CodecError::GeneOutOfRange {
                index: i,
                value: class as u32,
                max: layout.upper_bound(i),
            });
        }
        genes.push(class as u32);
    }

    for (l, teacher) in class_teacher.iter().enumerate() {
        let gene = match *teacher {
            None => layout.no_teacher(),
            Some(t) if t < layout.n_teachers => t as u32,
            Some(t) => {
                let index = layout.n_students + l;
                return Err(CodecError::GeneOutOfRange {
                    index,
                    value: t as u32,
                    max: layout.upper_bound(index),
                });
            }
        };
        genes.push(gene);
    }

    Ok(Chromosome { genes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::new(4, 2, 3)
    }

    #[test]
    fn test_decode_counts() {
        let chrom = Chromosome::new(vec![0, 1, 1, 1, 2, 3]);
        let d = decode(&layout(), &chrom).unwrap();

        assert_eq!(d.student_class, vec![0, 1, 1, 1]);
        assert_eq!(d.class_load, vec![1, 3]);
        assert_eq!(d.class_teacher, vec![Some(2), None]);
        assert_eq!(d.teacher_load, vec![0, 0, 1]);
    }

    #[test]
    fn test_layout_without_classes() {
        let empty = Layout::new(2, 0, 1);
        assert_eq!(empty.upper_bound(0), 0);
        assert_eq!(empty.upper_bound(2), 1);

        let chrom = Chromosome::new(vec![0, 0]);
        assert!(!chrom.in_bounds(&empty));
        assert!(matches!(
            decode(&empty, &chrom),
            Err(CodecError::GeneOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn test_out_of_range_is_surfaced() {
        let chrom = Chromosome::new(vec![0, 2, 1, 1, 2, 3]);
        let err = decode(&layout(), &chrom).unwrap_err();
        assert_eq!(
            err,
            CodecError::GeneOutOfRange {
                index: 1,
                value: 2,
                max: 1
            }
        );

        let chrom = Chromosome::new(vec![0, 1, 1, 1, 4, 0]);
        assert!(matches!(
            decode(&layout(), &chrom),
            Err(CodecError::GeneOutOfRange { index: 4, .. })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let chrom = Chromosome::new(vec![0, 1]);
        assert!(matches!(
            decode(&layout(), &chrom),
            Err(CodecError::LengthMismatch {
                expected: 6,
                found: 2
            })
        ));
    }

    #[test]
    fn test_encode_inverts_decode() {
        let chrom = Chromosome::new(vec![1, 0, 0, 1, 3, 0]);
        let d = decode(&layout(), &chrom).unwrap();
        let back = encode(&layout(), &d.student_class, &d.class_teacher).unwrap();
        assert_eq!(back, chrom);
    }

    #[test]
    fn test_bounds() {
        let l = layout();
        assert_eq!(l.upper_bound(0), 1);
        assert_eq!(l.upper_bound(4), 3);
        assert_eq!(l.no_teacher(), 3);
        assert!(Chromosome::new(vec![1, 1, 1, 1, 3, 3]).in_bounds(&l));
        assert!(!Chromosome::new(vec![1, 1, 1, 1, 3, 4]).in_bounds(&l));
    }
}
