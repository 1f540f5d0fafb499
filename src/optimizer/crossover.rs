use crate::optimizer::chromosome::{Chromosome, Layout};
use fastrand::Rng;
use std::ops::Range;

/// Two-point crossover run separately on the student block and the
/// teacher block. Cuts never straddle the block boundary, so genes keep
/// their bounds.
pub fn crossover_two_point(
    p1: &Chromosome,
    p2: &Chromosome,
    layout: &Layout,
    rng: &mut Rng,
) -> (Chromosome, Chromosome) {
    let mut c1 = p1.clone();
    let mut c2 = p2.clone();

    for block in [layout.student_block(), layout.teacher_block()] {
        swap_segment(&mut c1.genes, &mut c2.genes, block, rng);
    }

    (c1, c2)
}

fn swap_segment(a: &mut [u32], b: &mut [u32], block: Range<usize>, rng: &mut Rng) {
    let n = block.len();
    if n == 0 {
        return;
    }
    let x = rng.usize(0..=n);
    let y = rng.usize(0..=n);
    let (lo, hi) = if x <= y { (x, y) } else { (y, x) };

    let seg = block.start + lo..block.start + hi;
    a[seg.clone()].swap_with_slice(&mut b[seg]);
}
