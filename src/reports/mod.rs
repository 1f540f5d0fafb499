use classforge::optimizer::Individual;
use classforge::problem::{Problem, Profile};
use classforge::records::Shift;
use classforge::store::AssignmentRow;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::collections::{BTreeMap, BTreeSet};
use strum::IntoEnumIterator;

/// Rows of the front shown before the averages line.
const FRONT_ROWS: usize = 10;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_right(table: &mut Table, from: usize, to: usize) {
    for i in from..=to {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_input_summary(problem: &Problem) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Shift").add_attribute(Attribute::Bold),
        Cell::new("Classes"),
        Cell::new("Capacity"),
        Cell::new("Grades"),
    ]);

    let classes = problem.classes();
    for shift in Shift::iter() {
        let of_shift: Vec<_> = classes.iter().filter(|c| c.shift == shift).collect();
        let capacity: u64 = of_shift.iter().map(|c| c.capacity as u64).sum();
        let grades: BTreeSet<u32> = of_shift.iter().filter_map(|c| c.grade).collect();
        table.add_row(vec![
            Cell::new(shift.to_string()).add_attribute(Attribute::Bold),
            Cell::new(of_shift.len()),
            Cell::new(capacity),
            Cell::new(
                grades
                    .iter()
                    .map(|g| g.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        ]);
    }
    align_right(&mut table, 1, 2);

    let total_capacity: u64 = classes.iter().map(|c| c.capacity as u64).sum();
    let students = problem.students().len() as u64;

    println!("\n{}", table);
    println!(
        "Students: {} | Teachers: {} | Classes: {} | Seats: {}",
        students,
        problem.teachers().len(),
        classes.len(),
        total_capacity
    );
    if students > total_capacity {
        println!("⚠️  More students than seats: overflow cannot reach zero");
    }
}

/// First rows of the front plus the per-objective average over all of it.
pub fn print_front_summary(profile: Profile, front: &[Individual]) {
    let names = profile.objective_names();
    let mut table = new_table();

    let mut header = vec![Cell::new("#").add_attribute(Attribute::Bold)];
    header.extend(names.iter().map(|n| Cell::new(n).fg(Color::Cyan)));
    header.push(Cell::new("CV").fg(Color::Red));
    table.add_row(header);

    for (i, ind) in front.iter().take(FRONT_ROWS).enumerate() {
        let mut row = vec![Cell::new(i + 1)];
        row.extend(ind.objectives.iter().map(|v| Cell::new(format!("{:.3}", v))));
        row.push(Cell::new(format!("{:.0}", ind.total_violation())));
        table.add_row(row);
    }

    if !front.is_empty() {
        let n = front.len() as f64;
        let mut row = vec![Cell::new("avg").add_attribute(Attribute::Bold)];
        for k in 0..names.len() {
            let mean = front.iter().map(|i| i.objectives[k]).sum::<f64>() / n;
            row.push(Cell::new(format!("{:.3}", mean)).add_attribute(Attribute::Bold));
        }
        let cv = front.iter().map(|i| i.total_violation()).sum::<f64>() / n;
        row.push(Cell::new(format!("{:.1}", cv)).add_attribute(Attribute::Bold));
        table.add_row(row);
    }

    align_right(&mut table, 1, names.len() + 1);
    println!("\nFront: {} individuals", front.len());
    println!("{}", table);
}

pub fn print_best(profile: Profile, best: &Individual) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Term").add_attribute(Attribute::Bold),
        Cell::new("Value"),
    ]);

    for (name, v) in profile.objective_names().iter().zip(&best.objectives) {
        table.add_row(vec![Cell::new(name), Cell::new(format!("{:.4}", v)).fg(Color::Cyan)]);
    }
    for (name, g) in profile.constraint_names().iter().zip(&best.violations) {
        let cell = Cell::new(format!("{:.0}", g));
        let cell = if *g > 0.0 {
            cell.fg(Color::Red)
        } else {
            cell.fg(Color::Green)
        };
        table.add_row(vec![Cell::new(format!("g:{}", name)), cell]);
    }
    align_right(&mut table, 1, 1);
    println!("\nSelected assignment:");
    println!("{}", table);
}

pub fn print_assignment_report(rows: &[AssignmentRow]) {
    #[derive(Default)]
    struct SiteStats {
        students: usize,
        teachers: BTreeSet<u64>,
        distance: f64,
    }

    let mut by_site: BTreeMap<u64, SiteStats> = BTreeMap::new();
    let mut by_shift: BTreeMap<String, usize> = BTreeMap::new();

    for r in rows {
        let site = by_site.entry(r.establishment_id).or_default();
        site.students += 1;
        site.teachers.insert(r.teacher_id);
        site.distance += r.distance_km;
        *by_shift.entry(r.shift.to_string()).or_default() += 1;
    }

    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Establishment").add_attribute(Attribute::Bold),
        Cell::new("Students"),
        Cell::new("Teachers"),
        Cell::new("Mean km").fg(Color::Cyan),
    ]);
    for (id, s) in &by_site {
        table.add_row(vec![
            Cell::new(id).add_attribute(Attribute::Bold),
            Cell::new(s.students),
            Cell::new(s.teachers.len()),
            Cell::new(format!("{:.2}", s.distance / s.students as f64)),
        ]);
    }
    align_right(&mut table, 1, 3);
    println!("\n{}", table);

    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Shift").add_attribute(Attribute::Bold),
        Cell::new("Students"),
    ]);
    for (shift, n) in &by_shift {
        table.add_row(vec![Cell::new(shift), Cell::new(n)]);
    }
    align_right(&mut table, 1, 1);
    println!("\n{}", table);

    let mean = rows.iter().map(|r| r.distance_km).sum::<f64>() / rows.len() as f64;
    println!("Rows: {} | Mean distance: {:.2} km", rows.len(), mean);
}
